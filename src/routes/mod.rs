use crate::errors::AppError;
use actix_web::{web, HttpResponse};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub mod admin;
pub mod auth;
pub mod empresas;
pub mod posts;
pub mod status;
pub mod vagas;

/// Mounts every API resource under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .configure(empresas::config_api)
            .configure(posts::config_api)
            .configure(vagas::config_api)
            .configure(auth::config_api)
            .configure(admin::config_api)
            .configure(status::config_api),
    );
}

/// Bare 200 for `OPTIONS` requests that get past the CORS layer.
pub(crate) async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub(crate) fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok", "message": message }))
}

/// A query parameter that must be present and non-blank.
pub(crate) fn required_param(value: &Option<String>, name: &str) -> Result<String, AppError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("Parâmetro '{}' é obrigatório", name)))
}

fn invalid_body(detail: impl std::fmt::Display) -> AppError {
    AppError::validation(format!("Corpo da requisição inválido: {}", detail))
}

/// JSON extraction failures (content type, syntax, size) answer 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| invalid_body(err).into())
}

/// Decodes a JSON body whose shape depends on the `action` parameter.
pub(crate) fn parse_body<T: DeserializeOwned>(body: web::Json<Value>) -> Result<T, AppError> {
    serde_json::from_value(body.into_inner()).map_err(invalid_body)
}

/// For handlers where only some actions carry a body: the extraction result,
/// turned into a 400 when the body is needed but was not usable.
pub(crate) fn require_body(body: Result<web::Json<Value>, actix_web::Error>) -> Result<web::Json<Value>, AppError> {
    body.map_err(|e| AppError::validation(e.to_string()))
}
