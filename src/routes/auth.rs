use crate::config::Config;
use crate::errors::AppError;
use crate::helper::auth_helpers::{self, Credentials};
use crate::routes::preflight;
use crate::DbPool;
use actix_web::{http::Method, web, HttpResponse};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct AuthQuery {
    action: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/auth")
            .route(web::post().to(authenticate))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

async fn authenticate(
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
    query: web::Query<AuthQuery>,
    body: web::Json<Credentials>,
) -> Result<HttpResponse, AppError> {
    let credentials = body.into_inner();

    match query.action.as_deref() {
        Some("register") => {
            let cost = config.bcrypt_cost;
            let account = web::block(move || auth_helpers::register(&pool, &credentials, cost)).await??;
            log::info!("Registered account {}", account.id);
            Ok(HttpResponse::Created().json(account))
        }
        Some("login") => {
            let account = web::block(move || auth_helpers::login(&pool, &credentials)).await??;
            Ok(HttpResponse::Ok().json(account))
        }
        _ => Err(AppError::validation("Ação inválida. Use 'register' ou 'login'")),
    }
}
