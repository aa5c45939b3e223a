use crate::models::db_operations::DbError;
use crate::models::listing_query::QueryError;
use crate::models::workflow::WorkflowError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use std::sync::OnceLock;
use thiserror::Error;

static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

/// Lets 500 responses carry the internal error text. Called once at start-up
/// for non-production environments; later calls are ignored.
pub fn expose_error_detail(expose: bool) {
    let _ = EXPOSE_ERROR_DETAIL.set(expose);
}

fn error_detail_exposed() -> bool {
    EXPOSE_ERROR_DETAIL.get().copied().unwrap_or(false)
}

/// Errors as they reach the HTTP boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Erro interno do servidor")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        AppError::Internal(detail.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({ "status": "error", "message": self.to_string() });
        if let AppError::Internal(detail) = self {
            log::error!("Request failed: {}", detail);
            if error_detail_exposed() {
                body["error"] = json!(detail);
            }
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => AppError::NotFound(format!("Não encontrado: {}", what)),
            DbError::Duplicate(_) => AppError::Validation("Registro já existe".to_string()),
            DbError::Uuid(_) => AppError::Validation("Identificador inválido".to_string()),
            other => AppError::internal(other),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<QueryError> for AppError {
    fn from(e: QueryError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::internal(e)
    }
}

impl From<r2d2::Error> for AppError {
    fn from(e: r2d2::Error) -> Self {
        AppError::internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn storage_errors_map_to_http_statuses() {
        let missing: AppError = DbError::NotFound("empresa".into()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let bad_id: AppError = DbError::from(uuid::Uuid::parse_str("nope").unwrap_err()).into();
        assert_eq!(bad_id.status_code(), StatusCode::BAD_REQUEST);

        let dup: AppError = DbError::Duplicate("a@b.c".into()).into();
        assert_eq!(dup.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn workflow_refusals_are_validation_errors() {
        let err: AppError = WorkflowError::MissingInput("Informe o motivo do bloqueio").into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Informe o motivo do bloqueio");
    }

    #[actix_web::test]
    async fn error_body_carries_status_and_message() {
        let resp = AppError::Forbidden("Sem permissão".into()).error_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Sem permissão");
    }
}
