use crate::config::Config;
use crate::errors::AppError;
use crate::models::db_operations::{count_documents, EMPRESAS};
use crate::DbPool;
use actix_web::{web, HttpResponse};
use redb::Database;
use serde_json::json;

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(status));
}

fn ping(db: &Database, pool: &DbPool) -> Result<(), AppError> {
    let listings = count_documents(db, EMPRESAS)?;
    log::debug!("Status check: {} listings stored", listings);
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(AppError::internal)?;
    Ok(())
}

async fn status(
    db: web::Data<Database>,
    pool: web::Data<DbPool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    web::block(move || ping(&db, &pool)).await??;
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "database": config.database_name,
    })))
}
