use crate::config::Config;
use crate::errors::AppError;
use crate::helper::admin_helpers;
use crate::helper::moderation_helpers::{self, CommentDraft, PostDraft, PostPatch, PostScope};
use crate::middleware::ActingAdmin;
use crate::models::admin_actions;
use crate::models::listing_query::parse_limit;
use crate::routes::{ok_message, parse_body, preflight, required_param};
use actix_web::{http::Method, web, HttpResponse};
use redb::Database;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize)]
pub struct PostsQuery {
    id: Option<String>,
    action: Option<String>,
    admin: Option<String>,
    #[serde(rename = "empresaId")]
    empresa_id: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<String>,
    #[serde(rename = "postId")]
    post_id: Option<String>,
    #[serde(rename = "comentarioId")]
    comentario_id: Option<String>,
    limit: Option<String>,
}

impl PostsQuery {
    fn targets_comments(&self) -> bool {
        matches!(self.action.as_deref(), Some("comentario") | Some("comentarios"))
    }
}

#[derive(Deserialize)]
struct LikesBody {
    curtidas: Option<i64>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/posts")
            .route(web::get().to(list_posts))
            .route(web::post().to(create_post))
            .route(web::patch().to(update_post))
            .route(web::delete().to(delete_post))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

async fn list_posts(
    db: web::Data<Database>,
    config: web::Data<Config>,
    query: web::Query<PostsQuery>,
) -> Result<HttpResponse, AppError> {
    if query.targets_comments() {
        let post_id = required_param(&query.post_id, "postId")?;
        let comments = web::block(move || moderation_helpers::list_comments(&db, &post_id)).await??;
        return Ok(HttpResponse::Ok().json(comments));
    }

    let scope = PostScope::from_params(
        query.admin.as_deref(),
        query.user_id.as_deref(),
        query.empresa_id.as_deref(),
    );
    let limit = parse_limit(query.limit.as_deref(), config.max_result_limit);
    let posts = web::block(move || moderation_helpers::list_posts(&db, &scope, limit)).await??;
    Ok(HttpResponse::Ok().json(posts))
}

async fn create_post(
    db: web::Data<Database>,
    query: web::Query<PostsQuery>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    if query.targets_comments() {
        let mut draft: CommentDraft = parse_body(body)?;
        if draft.post_id.is_none() {
            draft.post_id = query.post_id.clone();
        }
        let comment = web::block(move || moderation_helpers::create_comment(&db, &draft)).await??;
        return Ok(HttpResponse::Created().json(comment));
    }

    let draft: PostDraft = parse_body(body)?;
    let post = web::block(move || moderation_helpers::create_post(&db, &draft)).await??;
    Ok(HttpResponse::Created().json(post))
}

async fn update_post(
    db: web::Data<Database>,
    query: web::Query<PostsQuery>,
    admin: ActingAdmin,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let id = required_param(&query.id, "id")?;

    if query.targets_comments() {
        let likes = parse_body::<LikesBody>(body)?
            .curtidas
            .ok_or_else(|| AppError::validation("Informe o número de curtidas"))?;
        let comment = web::block(move || moderation_helpers::set_comment_likes(&db, &id, likes)).await??;
        return Ok(HttpResponse::Ok().json(comment));
    }

    let patch: PostPatch = parse_body(body)?;
    let admin_id = admin.or_body(patch.admin_aprovador_id.as_deref());

    let post = web::block(move || {
        let (post, action) = moderation_helpers::update_post(&db, &id, &patch, admin_id.as_deref())?;
        if let Some(action) = action {
            admin_helpers::record_admin_action(
                &db,
                admin_id.as_deref(),
                action.log_code(),
                "post",
                &post.id,
                post.data.title.clone(),
            );
        }
        Ok::<_, AppError>(post)
    })
    .await??;

    Ok(HttpResponse::Ok().json(post))
}

async fn delete_post(
    db: web::Data<Database>,
    query: web::Query<PostsQuery>,
    admin: ActingAdmin,
) -> Result<HttpResponse, AppError> {
    if query.targets_comments() {
        let comment_id = required_param(&query.comentario_id, "comentarioId")
            .or_else(|_| required_param(&query.id, "comentarioId"))?;
        let requester = query.user_id.clone();
        web::block(move || moderation_helpers::delete_comment(&db, &comment_id, requester.as_deref())).await??;
        return Ok(ok_message("Comentário excluído"));
    }

    let id = required_param(&query.id, "id")?;
    let removed_comments = web::block(move || {
        let (post, removed_comments) = moderation_helpers::delete_post(&db, &id)?;
        admin_helpers::record_admin_action(
            &db,
            admin.id(),
            admin_actions::DELETE_POST,
            "post",
            &post.id,
            format!("{} ({} comentários)", post.data.title, removed_comments),
        );
        Ok::<_, AppError>(removed_comments)
    })
    .await??;

    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "message": "Publicação excluída",
        "comentarios_removidos": removed_comments,
    })))
}
