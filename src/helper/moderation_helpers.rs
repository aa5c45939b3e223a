use crate::errors::AppError;
use crate::helper::sanitization_helpers::{strip_all_html, strip_optional};
use crate::models::db_operations::{listings_db_operations, posts_db_operations};
use crate::models::workflow::{apply_post_action, PostAction};
use crate::models::{Comment, CommentData, ModerationStatus, Post, PostData};
use chrono::Utc;
use redb::Database;
use serde::Deserialize;

/// Which posts a `GET /api/posts` caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    /// Every post, any status.
    Admin,
    /// One author's posts, any status.
    Author(String),
    /// Approved posts linked to one listing.
    Listing(String),
    /// Approved posts only.
    Public,
}

impl PostScope {
    pub fn from_params(admin: Option<&str>, user_id: Option<&str>, listing_id: Option<&str>) -> Self {
        let present = |v: Option<&str>| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        if admin.map(str::trim) == Some("true") {
            PostScope::Admin
        } else if let Some(user_id) = present(user_id) {
            PostScope::Author(user_id)
        } else if let Some(listing_id) = present(listing_id) {
            PostScope::Listing(listing_id)
        } else {
            PostScope::Public
        }
    }

    fn admits(&self, post: &PostData) -> bool {
        match self {
            PostScope::Admin => true,
            PostScope::Author(user_id) => post.author_id == *user_id,
            PostScope::Listing(listing_id) => {
                post.status == ModerationStatus::Approved && post.listing_id.as_deref() == Some(listing_id.as_str())
            }
            PostScope::Public => post.status == ModerationStatus::Approved,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PostDraft {
    pub user_id: Option<String>,
    pub autor_nome: Option<String>,
    pub autor_bairro: Option<String>,
    pub empresa_id: Option<String>,
    pub titulo: Option<String>,
    pub conteudo: Option<String>,
    #[serde(default)]
    pub imagens: Vec<String>,
    pub bairro: Option<String>,
    pub logradouro: Option<String>,
}

/// Body of `PATCH /api/posts`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct PostPatch {
    pub aprovado: Option<bool>,
    pub motivo_rejeicao: Option<String>,
    pub admin_aprovador_id: Option<String>,
    pub curtidas: Option<i64>,
    pub conteudo: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct CommentDraft {
    pub post_id: Option<String>,
    pub user_id: Option<String>,
    pub autor_nome: Option<String>,
    pub conteudo: Option<String>,
}

fn required(value: Option<&str>, message: &str) -> Result<String, AppError> {
    strip_optional(value).ok_or_else(|| AppError::validation(message))
}

fn counter(value: i64) -> u64 {
    value.max(0) as u64
}

pub fn list_posts(db: &Database, scope: &PostScope, limit: usize) -> Result<Vec<Post>, AppError> {
    let posts = posts_db_operations::read_all_posts(db)?
        .into_iter()
        .filter(|p| scope.admits(&p.data))
        .take(limit)
        .collect();
    Ok(posts)
}

/// Stores a new post awaiting moderation.
pub fn create_post(db: &Database, draft: &PostDraft) -> Result<Post, AppError> {
    let listing_id = strip_optional(draft.empresa_id.as_deref());
    if let Some(listing_id) = &listing_id {
        if listings_db_operations::read_listing(db, listing_id)?.is_none() {
            return Err(AppError::validation("Empresa vinculada não encontrada"));
        }
    }

    let post = PostData {
        author_id: required(draft.user_id.as_deref(), "Informe o autor da publicação")?,
        author_name: required(draft.autor_nome.as_deref(), "Informe o nome do autor")?,
        author_neighborhood: strip_optional(draft.autor_bairro.as_deref()),
        listing_id,
        title: required(draft.titulo.as_deref(), "Informe o título")?,
        body: required(draft.conteudo.as_deref(), "Informe o conteúdo")?,
        images: draft
            .imagens
            .iter()
            .map(|i| strip_all_html(i))
            .filter(|i| !i.is_empty())
            .collect(),
        neighborhood: strip_optional(draft.bairro.as_deref()),
        street: strip_optional(draft.logradouro.as_deref()),
        status: ModerationStatus::Pending,
        approved_at: None,
        approved_by: None,
        rejection_reason: None,
        likes: 0,
        created_at: Utc::now(),
    };
    Ok(posts_db_operations::create_post(db, post)?)
}

/// Turns the moderation part of a PATCH body into an action, if it has one.
/// `acting_admin` fills in for a missing `admin_aprovador_id`.
pub fn resolve_post_action(patch: &PostPatch, acting_admin: Option<&str>) -> Result<Option<PostAction>, AppError> {
    let action = match patch.aprovado {
        Some(true) => Some(PostAction::approve(patch.admin_aprovador_id.as_deref().or(acting_admin))?),
        Some(false) => Some(PostAction::reject(patch.motivo_rejeicao.as_deref())?),
        None => None,
    };
    Ok(action)
}

/// Applies moderation, counter and content changes from a PATCH body.
pub fn update_post(
    db: &Database,
    id: &str,
    patch: &PostPatch,
    acting_admin: Option<&str>,
) -> Result<(Post, Option<PostAction>), AppError> {
    let action = resolve_post_action(patch, acting_admin)?;
    let body = match &patch.conteudo {
        Some(text) => Some(required(Some(text.as_str()), "O conteúdo não pode ficar vazio")?),
        None => None,
    };

    let now = Utc::now();
    let updated = posts_db_operations::update_post(db, id, |post: &mut PostData| {
        if let Some(action) = &action {
            apply_post_action(post, action, now)?;
        }
        if let Some(likes) = patch.curtidas {
            post.likes = counter(likes);
        }
        if let Some(body) = &body {
            post.body = body.clone();
        }
        Ok::<(), AppError>(())
    })?
    .ok_or_else(|| AppError::not_found("Publicação não encontrada"))?;
    Ok((updated, action))
}

/// Removes a post and its comments; returns the post and the comment count.
pub fn delete_post(db: &Database, id: &str) -> Result<(Post, usize), AppError> {
    posts_db_operations::delete_post(db, id)?.ok_or_else(|| AppError::not_found("Publicação não encontrada"))
}

pub fn list_comments(db: &Database, post_id: &str) -> Result<Vec<Comment>, AppError> {
    Ok(posts_db_operations::read_comments_for_post(db, post_id)?)
}

pub fn create_comment(db: &Database, draft: &CommentDraft) -> Result<Comment, AppError> {
    let comment = CommentData {
        post_id: required(draft.post_id.as_deref(), "Informe a publicação")?,
        author_id: required(draft.user_id.as_deref(), "Informe o autor do comentário")?,
        author_name: required(draft.autor_nome.as_deref(), "Informe o nome do autor")?,
        body: required(draft.conteudo.as_deref(), "Informe o comentário")?,
        likes: 0,
        created_at: Utc::now(),
    };
    Ok(posts_db_operations::create_comment(db, comment)?)
}

pub fn set_comment_likes(db: &Database, id: &str, likes: i64) -> Result<Comment, AppError> {
    posts_db_operations::update_comment(db, id, |comment: &mut CommentData| {
        comment.likes = counter(likes);
        Ok::<(), AppError>(())
    })?
    .ok_or_else(|| AppError::not_found("Comentário não encontrado"))
}

/// Deletes a comment on behalf of `requester`, who must be the comment's
/// author or the author of the post it belongs to.
pub fn delete_comment(db: &Database, comment_id: &str, requester: Option<&str>) -> Result<(), AppError> {
    let comment = posts_db_operations::read_comment(db, comment_id)?
        .ok_or_else(|| AppError::not_found("Comentário não encontrado"))?;

    let requester = requester.map(str::trim).filter(|r| !r.is_empty());
    let allowed = match requester {
        None => false,
        Some(user) if comment.data.author_id == user => true,
        Some(user) => posts_db_operations::read_post(db, &comment.data.post_id)?
            .map_or(false, |post| post.data.author_id == user),
    };
    if !allowed {
        return Err(AppError::Forbidden(
            "Apenas o autor do comentário ou da publicação pode excluí-lo".to_string(),
        ));
    }

    posts_db_operations::delete_comment(db, comment_id)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup::setup_documents_in_memory;

    fn draft(author: &str, title: &str) -> PostDraft {
        PostDraft {
            user_id: Some(author.to_string()),
            autor_nome: Some("Maria".to_string()),
            titulo: Some(title.to_string()),
            conteudo: Some("Poste apagado na esquina".to_string()),
            ..Default::default()
        }
    }

    fn comment_on(post_id: &str, author: &str) -> CommentDraft {
        CommentDraft {
            post_id: Some(post_id.to_string()),
            user_id: Some(author.to_string()),
            autor_nome: Some("João".to_string()),
            conteudo: Some("Também vi".to_string()),
        }
    }

    #[test]
    fn pending_posts_are_hidden_from_the_public_feed() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("u1", "Poste")).unwrap();
        assert_eq!(post.data.status, ModerationStatus::Pending);

        assert!(list_posts(&db, &PostScope::Public, 50).unwrap().is_empty());
        assert_eq!(list_posts(&db, &PostScope::Author("u1".into()), 50).unwrap().len(), 1);
        assert!(list_posts(&db, &PostScope::Author("u2".into()), 50).unwrap().is_empty());
        assert_eq!(list_posts(&db, &PostScope::Admin, 50).unwrap().len(), 1);
    }

    #[test]
    fn approval_uses_the_acting_admin_when_body_has_none() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("u1", "Poste")).unwrap();
        let patch = PostPatch { aprovado: Some(true), ..Default::default() };

        assert!(matches!(update_post(&db, &post.id, &patch, None), Err(AppError::Validation(_))));

        let (approved, action) = update_post(&db, &post.id, &patch, Some("admin-1")).unwrap();
        assert_eq!(action, Some(PostAction::Approve { admin_id: "admin-1".into() }));
        assert_eq!(approved.data.approved_by.as_deref(), Some("admin-1"));
        assert!(approved.data.approved_at.is_some());
        assert_eq!(list_posts(&db, &PostScope::Public, 50).unwrap().len(), 1);
    }

    #[test]
    fn rejection_needs_a_reason_and_is_final() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("u1", "Poste")).unwrap();

        let no_reason = PostPatch { aprovado: Some(false), ..Default::default() };
        assert!(update_post(&db, &post.id, &no_reason, Some("admin-1")).is_err());

        let reject = PostPatch {
            aprovado: Some(false),
            motivo_rejeicao: Some("fora do tema".into()),
            ..Default::default()
        };
        let (rejected, _) = update_post(&db, &post.id, &reject, Some("admin-1")).unwrap();
        assert_eq!(rejected.data.status, ModerationStatus::Rejected);
        assert_eq!(rejected.data.approved_at, None);

        let approve = PostPatch { aprovado: Some(true), ..Default::default() };
        assert!(update_post(&db, &post.id, &approve, Some("admin-1")).is_err());
    }

    #[test]
    fn likes_are_floored_at_zero() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("u1", "Poste")).unwrap();
        let patch = PostPatch { curtidas: Some(-4), ..Default::default() };
        let (updated, action) = update_post(&db, &post.id, &patch, None).unwrap();
        assert_eq!(action, None);
        assert_eq!(updated.data.likes, 0);

        let patch = PostPatch { curtidas: Some(7), ..Default::default() };
        assert_eq!(update_post(&db, &post.id, &patch, None).unwrap().0.data.likes, 7);
    }

    #[test]
    fn listing_feed_shows_only_approved_posts() {
        let db = setup_documents_in_memory().unwrap();
        let listing = crate::helper::directory_helpers::create(
            &db,
            &crate::helper::directory_helpers::ListingDraft { nome: Some("Padaria".into()), ..Default::default() },
        )
        .unwrap();
        let mut d = draft("u1", "Pão quentinho");
        d.empresa_id = Some(listing.id.clone());
        let post = create_post(&db, &d).unwrap();

        let scope = PostScope::Listing(listing.id.clone());
        assert!(list_posts(&db, &scope, 50).unwrap().is_empty());

        let approve = PostPatch { aprovado: Some(true), ..Default::default() };
        update_post(&db, &post.id, &approve, Some("a1")).unwrap();
        assert_eq!(list_posts(&db, &scope, 50).unwrap().len(), 1);
        assert!(list_posts(&db, &PostScope::Listing("outra".into()), 50).unwrap().is_empty());
    }

    #[test]
    fn posts_linked_to_unknown_listings_are_refused() {
        let db = setup_documents_in_memory().unwrap();
        let mut d = draft("u1", "Promoção");
        d.empresa_id = Some(uuid::Uuid::new_v4().to_string());
        assert!(matches!(create_post(&db, &d), Err(AppError::Validation(_))));
    }

    #[test]
    fn comment_deletion_is_limited_to_the_two_authors() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("post-author", "Poste")).unwrap();

        let c1 = create_comment(&db, &comment_on(&post.id, "commenter")).unwrap();
        let c2 = create_comment(&db, &comment_on(&post.id, "commenter")).unwrap();
        let c3 = create_comment(&db, &comment_on(&post.id, "commenter")).unwrap();

        assert!(matches!(delete_comment(&db, &c1.id, Some("stranger")), Err(AppError::Forbidden(_))));
        assert!(matches!(delete_comment(&db, &c1.id, None), Err(AppError::Forbidden(_))));

        delete_comment(&db, &c1.id, Some("commenter")).unwrap();
        delete_comment(&db, &c2.id, Some("post-author")).unwrap();
        let remaining: Vec<String> = list_comments(&db, &post.id).unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(remaining, vec![c3.id]);
    }

    #[test]
    fn comment_likes_are_set_absolutely() {
        let db = setup_documents_in_memory().unwrap();
        let post = create_post(&db, &draft("u1", "Poste")).unwrap();
        let c = create_comment(&db, &comment_on(&post.id, "u2")).unwrap();
        assert_eq!(set_comment_likes(&db, &c.id, 3).unwrap().data.likes, 3);
        assert_eq!(set_comment_likes(&db, &c.id, -1).unwrap().data.likes, 0);
    }

    #[test]
    fn scope_prefers_admin_then_author_then_listing() {
        assert_eq!(PostScope::from_params(Some("true"), Some("u1"), None), PostScope::Admin);
        assert_eq!(PostScope::from_params(None, Some("u1"), Some("e1")), PostScope::Author("u1".into()));
        assert_eq!(PostScope::from_params(Some("false"), Some(" "), Some("e1")), PostScope::Listing("e1".into()));
        assert_eq!(PostScope::from_params(None, None, None), PostScope::Public);
    }
}
