use crate::config::Config;
use crate::errors::AppError;
use crate::helper::jobs_helpers::{self, JobDraft, JobParams};
use crate::routes::{ok_message, preflight, required_param};
use actix_web::{http::Method, web, HttpResponse};
use redb::Database;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct IdQuery {
    id: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/vagas")
            .route(web::get().to(list_jobs))
            .route(web::post().to(create_job))
            .route(web::delete().to(delete_job))
            .route(web::method(Method::OPTIONS).to(preflight)),
    );
}

async fn list_jobs(
    db: web::Data<Database>,
    config: web::Data<Config>,
    query: web::Query<JobParams>,
) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    let max_limit = config.max_result_limit;
    let jobs = web::block(move || jobs_helpers::list_jobs(&db, &params, max_limit)).await??;
    Ok(HttpResponse::Ok().json(jobs))
}

async fn create_job(db: web::Data<Database>, body: web::Json<JobDraft>) -> Result<HttpResponse, AppError> {
    let draft = body.into_inner();
    let offer = web::block(move || jobs_helpers::create_job(&db, &draft)).await??;
    Ok(HttpResponse::Created().json(offer))
}

async fn delete_job(db: web::Data<Database>, query: web::Query<IdQuery>) -> Result<HttpResponse, AppError> {
    let id = required_param(&query.id, "id")?;
    web::block(move || jobs_helpers::delete_job(&db, &id)).await??;
    Ok(ok_message("Vaga excluída"))
}
