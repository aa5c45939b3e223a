use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_NAME: &str = "aqui-guaira";
pub const DEFAULT_MAX_RESULT_LIMIT: usize = 200;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub web: WebConfig,
    // Populated from the .env file
    pub database_path: String,
    pub allowed_origins: String,
    pub log_level: String,
    pub app_env: String,
    pub database_name: String,
    pub max_result_limit: usize,
    pub bcrypt_cost: u32,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env(env_path: &Path) -> Result<Self, config::ConfigError> {
        dotenvy::from_path(env_path).map_err(|e| {
            config::ConfigError::Message(format!(
                "FATAL: Failed to load .env file from '{}'. Error: {}",
                env_path.display(),
                e
            ))
        })?;

        let database_path = env::var("DATABASE_PATH").map_err(|_| {
            config::ConfigError::Message(
                "FATAL: Environment variable 'DATABASE_PATH' is not set in your .env file.".to_string(),
            )
        })?;

        if Path::new(&database_path).is_relative() {
            return Err(config::ConfigError::Message(format!(
                "FATAL: The 'DATABASE_PATH' in your .env file is a relative path ('{}'). It MUST be an absolute path.",
                database_path
            )));
        }

        let allowed_origins = env_or("ALLOWED_ORIGINS", "*");
        let log_level = env_or("LOG_LEVEL", "info");
        let app_env = env_or("APP_ENV", "production");
        let database_name = env_or("DATABASE_NAME", DEFAULT_DATABASE_NAME);

        let max_result_limit = env_or("MAX_RESULT_LIMIT", &DEFAULT_MAX_RESULT_LIMIT.to_string())
            .parse::<usize>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or_else(|| {
                config::ConfigError::Message("FATAL: 'MAX_RESULT_LIMIT' must be a positive integer.".to_string())
            })?;

        let bcrypt_cost = env_or("BCRYPT_COST", &bcrypt::DEFAULT_COST.to_string())
            .parse::<u32>()
            .ok()
            .filter(|cost| (4..=31).contains(cost))
            .ok_or_else(|| {
                config::ConfigError::Message("FATAL: 'BCRYPT_COST' must be an integer between 4 and 31.".to_string())
            })?;

        let builder = config::Config::builder()
            // Base settings (web host/port) come from the TOML file.
            .add_source(config::File::new("config/default.toml", config::FileFormat::Toml))
            .set_override("database_path", database_path)?
            .set_override("allowed_origins", allowed_origins)?
            .set_override("log_level", log_level)?
            .set_override("app_env", app_env)?
            .set_override("database_name", database_name)?
            .set_override("max_result_limit", max_result_limit as u64)?
            .set_override("bcrypt_cost", bcrypt_cost as u64)?
            .build()?;

        builder.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// SQLite file holding the `usuarios` table.
    pub fn accounts_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path).join("accounts").join("accounts.db")
    }

    /// Redb file holding listings, posts, comments, job offers and the admin log.
    pub fn documents_db_path(&self) -> PathBuf {
        PathBuf::from(&self.database_path).join("documents").join("documents.redb")
    }
}
