use aquiguaira_backend::config::Config;
use aquiguaira_backend::helper::auth_helpers::normalize_email;
use aquiguaira_backend::helper::directory_helpers::{self, ListingSeed};
use aquiguaira_backend::models::db_operations::users_db_operations;
use aquiguaira_backend::setup::db_setup;
use clap::{Parser, Subcommand};
use redb::Database;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "Administrative CLI for the Aqui Guaíra backend.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    Listing {
        #[command(subcommand)]
        action: ListingAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the schemas. Without an argument both stores are set up.
    Setup {
        /// `documents` or `accounts`
        db_type: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AdminAction {
    /// Creates an administrator, or promotes an existing account.
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        nome: Option<String>,
    },
    List,
}

#[derive(Subcommand, Debug)]
enum ListingAction {
    /// Imports listings from a JSON array.
    Import {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env(&cli.env_file) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup { db_type } => match db_type.as_deref() {
                Some("accounts") => setup_accounts_database(&config),
                Some("documents") => setup_documents_database(&config),
                Some(other) => {
                    eprintln!("❌ Error: Unknown database type '{}'. Use 'accounts' or 'documents'.", other)
                }
                None => {
                    setup_accounts_database(&config);
                    setup_documents_database(&config);
                }
            },
        },
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password, nome } => {
                create_admin_user(&config, email, password, nome.as_deref());
            }
            AdminAction::List => list_admin_users(&config),
        },
        Commands::Listing { action } => match action {
            ListingAction::Import { file } => import_listings(&config, file),
        },
    }
}

fn ensure_parent_dir(path: &Path) -> bool {
    match path.parent().map(fs::create_dir_all) {
        Some(Err(e)) => {
            eprintln!("❌ Could not create directory for '{}': {}", path.display(), e);
            false
        }
        _ => true,
    }
}

fn setup_accounts_database(config: &Config) {
    let db_path = config.accounts_db_path();
    println!("\nSetting up accounts database at '{}'...", db_path.display());
    if !ensure_parent_dir(&db_path) {
        return;
    }

    let mut conn = match Connection::open(&db_path) {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("❌ Could not open accounts database: {}", e);
            return;
        }
    };
    match db_setup::setup_accounts_db(&mut conn) {
        Ok(_) => println!("✅ Accounts database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up accounts database: {}", e),
    }
}

fn setup_documents_database(config: &Config) {
    let db_path = config.documents_db_path();
    println!("\nSetting up documents database at '{}'...", db_path.display());
    if !ensure_parent_dir(&db_path) {
        return;
    }

    let result = Database::create(&db_path)
        .map_err(db_setup::SetupError::from)
        .and_then(|db| db_setup::setup_documents_db(&db));
    match result {
        Ok(_) => println!("✅ Documents database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up documents database: {}", e),
    }
}

fn open_accounts(config: &Config) -> Option<Connection> {
    let db_path = config.accounts_db_path();
    if !db_path.exists() {
        eprintln!(
            "❌ Error: Accounts database not found at '{}'. Please run `setup_cli db setup` first.",
            db_path.display()
        );
        return None;
    }
    match Connection::open(&db_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("❌ Could not open accounts database: {}", e);
            None
        }
    }
}

fn create_admin_user(config: &Config, email: &str, password: &str, nome: Option<&str>) {
    let Some(email) = normalize_email(email) else {
        eprintln!("❌ Error: '{}' is not a valid email address.", email);
        return;
    };
    if password.is_empty() {
        eprintln!("❌ Error: The password cannot be empty.");
        return;
    }
    let Some(conn) = open_accounts(config) else {
        return;
    };

    let name = nome
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Administrador");
    match users_db_operations::upsert_admin(&conn, &email, name, password, config.bcrypt_cost) {
        Ok(_) => println!("✅ Administrator '{}' is ready.", email),
        Err(e) => eprintln!("❌ Error creating administrator: {}", e),
    }
}

fn list_admin_users(config: &Config) {
    let Some(conn) = open_accounts(config) else {
        return;
    };
    match users_db_operations::list_admin_emails(&conn) {
        Ok(emails) => {
            println!("Listing administrators:");
            for email in emails {
                println!("- {}", email);
            }
        }
        Err(e) => eprintln!("❌ Error fetching administrators: {}", e),
    }
}

fn import_listings(config: &Config, file: &Path) {
    let seeds: Vec<ListingSeed> = match fs::read_to_string(file)
        .map_err(|e| e.to_string())
        .and_then(|raw| serde_json::from_str(&raw).map_err(|e| e.to_string()))
    {
        Ok(seeds) => seeds,
        Err(e) => {
            eprintln!("❌ Could not read listings from '{}': {}", file.display(), e);
            return;
        }
    };

    let db_path = config.documents_db_path();
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            eprintln!(
                "❌ Could not open documents database at '{}': {}. Please run `setup_cli db setup` first.",
                db_path.display(),
                e
            );
            return;
        }
    };

    let mut imported = 0;
    for seed in &seeds {
        match directory_helpers::seed(&db, seed) {
            Ok(listing) => {
                imported += 1;
                println!("- {} ({})", listing.data.name, listing.data.slug);
            }
            Err(e) => eprintln!("❌ Skipped '{}': {}", seed.draft.nome.as_deref().unwrap_or("?"), e),
        }
    }
    println!("✅ Imported {} of {} listings.", imported, seeds.len());
}
