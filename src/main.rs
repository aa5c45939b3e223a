use actix_web::{middleware::{DefaultHeaders, Logger}, web, App, HttpServer};
use aquiguaira_backend::{build_cors, config::Config, errors, routes, setup::db_setup, DbPool};
use clap::Parser;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use redb::Database;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "aquiguaira_server", author, version, about = "Starts the Aqui Guaíra API server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

fn fatal(context: &str, e: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("FATAL: {}: {}", context, e))
}

fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) => fs::create_dir_all(dir),
        None => Ok(()),
    }
}

fn open_documents(config: &Config) -> io::Result<Database> {
    let path = config.documents_db_path();
    create_parent_dir(&path)?;
    let db = Database::create(&path).map_err(|e| fatal("Failed to open documents database", e))?;
    db_setup::setup_documents_db(&db).map_err(|e| fatal("Failed to prepare documents database", e))?;
    Ok(db)
}

fn open_accounts(config: &Config) -> io::Result<DbPool> {
    let path = config.accounts_db_path();
    create_parent_dir(&path)?;
    let pool = Pool::builder()
        .build(SqliteConnectionManager::file(&path))
        .map_err(|e| fatal("Failed to create SQLite connection pool", e))?;
    let mut conn = pool.get().map_err(|e| fatal("Failed to get a SQLite connection", e))?;
    db_setup::setup_accounts_db(&mut conn).map_err(|e| fatal("Failed to prepare accounts database", e))?;
    Ok(pool)
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file).map_err(|e| fatal("Failed to load configuration", e))?;

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));
    errors::expose_error_detail(!config.is_production());

    let documents = web::Data::new(open_documents(&config)?);
    let accounts = web::Data::new(open_accounts(&config)?);

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!(
        "Server starting at http://{} (database '{}', env '{}')",
        server_address,
        config.database_name,
        config.app_env
    );

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&config))
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(documents.clone())
            .app_data(accounts.clone())
            .configure(routes::configure)
    })
    .bind(server_address)?
    .run()
    .await
}
