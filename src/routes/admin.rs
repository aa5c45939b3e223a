use crate::config::Config;
use crate::errors::AppError;
use crate::helper::admin_helpers::{self, LogEntryDraft};
use crate::middleware::ActingAdmin;
use crate::models::admin_actions;
use crate::models::listing_query::parse_limit;
use crate::routes::{ok_message, preflight, required_param};
use crate::DbPool;
use actix_web::{http::Method, web, HttpResponse};
use redb::Database;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AdminQuery {
    action: Option<String>,
    id: Option<String>,
    limit: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/admin")
            .route(web::get().to(admin_overview))
            .route(web::post().to(append_log_entry))
            .route(web::patch().to(update_user))
            .route(web::delete().to(delete_user))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

fn unknown_action(action: Option<&str>) -> AppError {
    AppError::validation(format!("Ação inválida: '{}'", action.unwrap_or_default()))
}

async fn admin_overview(
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    query: web::Query<AdminQuery>,
) -> Result<HttpResponse, AppError> {
    match query.action.as_deref() {
        Some("stats") => {
            let stats = web::block(move || admin_helpers::directory_stats(&db, &pool)).await??;
            Ok(HttpResponse::Ok().json(stats))
        }
        Some("usuarios") => {
            let users = web::block(move || admin_helpers::fetch_all_users(&pool)).await??;
            Ok(HttpResponse::Ok().json(users))
        }
        Some("logs") => {
            let limit = parse_limit(query.limit.as_deref(), config.max_result_limit);
            let entries = web::block(move || admin_helpers::latest_log_entries(&db, limit)).await??;
            Ok(HttpResponse::Ok().json(entries))
        }
        other => Err(unknown_action(other)),
    }
}

async fn append_log_entry(db: web::Data<Database>, body: web::Json<LogEntryDraft>) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner();
    let entry = web::block(move || admin_helpers::append_log_entry(&db, &draft)).await??;
    Ok(HttpResponse::Created().json(entry))
}

async fn update_user(
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    query: web::Query<AdminQuery>,
    admin: ActingAdmin,
) -> Result<HttpResponse, AppError> {
    if query.action.as_deref() != Some("toggle_admin") {
        return Err(unknown_action(query.action.as_deref()));
    }
    let id = required_param(&query.id, "id")?;

    let account = web::block(move || {
        let account = admin_helpers::toggle_admin(&pool, &id)?;
        let state = if account.is_admin { "concedido" } else { "revogado" };
        admin_helpers::record_admin_action(
            &db,
            admin.id(),
            admin_actions::TOGGLE_ADMIN,
            "usuario",
            &account.id,
            format!("{}: acesso de administrador {}", account.email, state),
        );
        Ok::<_, AppError>(account)
    })
    .await??;

    Ok(HttpResponse::Ok().json(account))
}

async fn delete_user(
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    query: web::Query<AdminQuery>,
    admin: ActingAdmin,
) -> Result<HttpResponse, AppError> {
    if query.action.as_deref() != Some("usuario") {
        return Err(unknown_action(query.action.as_deref()));
    }
    let id = required_param(&query.id, "id")?;

    web::block(move || {
        admin_helpers::delete_user(&pool, &id)?;
        admin_helpers::record_admin_action(
            &db,
            admin.id(),
            admin_actions::DELETE_USER,
            "usuario",
            &id,
            String::new(),
        );
        Ok::<_, AppError>(())
    })
    .await??;

    Ok(ok_message("Usuário excluído"))
}
