#![allow(dead_code)]

use actix_web::web;
use aquiguaira_backend::config::{Config, WebConfig};
use aquiguaira_backend::setup::db_setup::{setup_accounts_db, setup_documents_in_memory};
use aquiguaira_backend::DbPool;
use r2d2_sqlite::SqliteConnectionManager;
use redb::Database;

pub const ADMIN_ID: &str = "7b1d2c3e-0000-4000-8000-00000000a001";

pub fn test_config() -> Config {
    Config {
        web: WebConfig { host: "127.0.0.1".into(), port: 0 },
        database_path: "/tmp/aquiguaira-tests".into(),
        allowed_origins: "*".into(),
        log_level: "warn".into(),
        app_env: "test".into(),
        database_name: "aqui-guaira-test".into(),
        max_result_limit: 200,
        bcrypt_cost: 4,
    }
}

pub fn documents() -> web::Data<Database> {
    web::Data::new(setup_documents_in_memory().unwrap())
}

pub fn accounts() -> web::Data<DbPool> {
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .build(SqliteConnectionManager::memory())
        .unwrap();
    setup_accounts_db(&mut pool.get().unwrap()).unwrap();
    web::Data::new(pool)
}

/// Builds the full API over fresh in-memory stores.
macro_rules! test_app {
    () => {{
        let config = common::test_config();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(aquiguaira_backend::build_cors(&config))
                .app_data(actix_web::web::Data::new(config.clone()))
                .app_data(common::documents())
                .app_data(common::accounts())
                .configure(aquiguaira_backend::routes::configure),
        )
        .await
    }};
}
