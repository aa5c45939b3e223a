use crate::models::db_operations::{
    DocumentTable, COMENTARIOS, EMPRESAS, LOGS, LOG_CHRONOLOGICAL_INDEX, POSTS, POST_COMMENTS_INDEX,
    SLUG_INDEX, VAGAS,
};
use redb::backends::InMemoryBackend;
use redb::{CommitError, Database, DatabaseError, StorageError, TableError, TransactionError};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("Redb database error: {0}")]
    RedbDatabase(#[from] DatabaseError),
    #[error("Redb storage error: {0}")]
    RedbStorage(#[from] StorageError),
    #[error("Redb transaction error: {0}")]
    RedbTransaction(#[from] TransactionError),
    #[error("Redb table error: {0}")]
    RedbTable(#[from] TableError),
    #[error("Redb commit error: {0}")]
    RedbCommit(#[from] CommitError),
}

/// Creates the `usuarios` table. Safe to run against an existing database.
pub fn setup_accounts_db(conn: &mut Connection) -> Result<(), SetupError> {
    let tx = conn.transaction()?;
    log::info!("Creating 'usuarios' table...");
    tx.execute(
        "CREATE TABLE IF NOT EXISTS usuarios (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            nome TEXT NOT NULL,
            senha_hash TEXT NOT NULL,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;
    tx.commit()?;
    Ok(())
}

/// Creates every document collection and index table. Safe to run repeatedly.
pub fn setup_documents_db(db: &Database) -> Result<(), SetupError> {
    let collections: [(&str, DocumentTable); 5] = [
        ("empresas", EMPRESAS),
        ("posts", POSTS),
        ("comentarios", COMENTARIOS),
        ("logs", LOGS),
        ("vagas", VAGAS),
    ];

    let write_txn = db.begin_write()?;
    {
        for (name, table) in collections {
            log::info!("Creating '{}' table in Redb...", name);
            write_txn.open_table(table)?;
        }

        log::info!("Creating index tables in Redb...");
        write_txn.open_table(SLUG_INDEX)?;
        write_txn.open_table(POST_COMMENTS_INDEX)?;
        write_txn.open_table(LOG_CHRONOLOGICAL_INDEX)?;
    }
    write_txn.commit()?;
    Ok(())
}

/// A ready-to-use document store that lives only in memory.
pub fn setup_documents_in_memory() -> Result<Database, SetupError> {
    let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
    setup_documents_db(&db)?;
    Ok(db)
}
