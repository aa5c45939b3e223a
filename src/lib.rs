use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

pub mod config;
pub mod errors;
pub mod helper;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod setup;

const ALLOWED_METHODS: [&str; 5] = ["GET", "POST", "PATCH", "DELETE", "OPTIONS"];

/// CORS policy for the API. `ALLOWED_ORIGINS=*` answers every origin with a
/// wildcard; otherwise only the comma-separated origins are admitted.
pub fn build_cors(config: &config::Config) -> Cors {
    let allowed_headers = vec![
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::AUTHORIZATION,
        HeaderName::from_static("x-admin-id"),
    ];

    let allowed_origins = config.allowed_origins.trim();
    let cors = if allowed_origins == "*" {
        Cors::default().allow_any_origin().send_wildcard()
    } else {
        allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(ALLOWED_METHODS)
        .allowed_headers(allowed_headers)
        .max_age(3600)
}
