use crate::models::Record;
use redb::{
    CommitError, Database, DatabaseError, ReadableTable, StorageError, TableDefinition, TableError,
    TransactionError, WriteTransaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub mod admin_logs_db_operations;
pub mod jobs_db_operations;
pub mod listings_db_operations;
pub mod posts_db_operations;
pub mod users_db_operations;

#[derive(Error, Debug)]
pub enum DbError {
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
    #[error("Rusqlite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),
    #[error("R2D2 pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("UUID parse error: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("Item not found in database: {0}")]
    NotFound(String),
    #[error("Duplicate value: {0}")]
    Duplicate(String),
}

/// A JSON document collection keyed by the 16 raw bytes of a UUID.
pub type DocumentTable = TableDefinition<'static, &'static [u8; 16], &'static str>;

// --- Document collections ---
pub const EMPRESAS: DocumentTable = TableDefinition::new("empresas");
pub const POSTS: DocumentTable = TableDefinition::new("posts");
pub const COMENTARIOS: DocumentTable = TableDefinition::new("comentarios");
pub const LOGS: DocumentTable = TableDefinition::new("logs");
pub const VAGAS: DocumentTable = TableDefinition::new("vagas");

// --- Secondary indices ---
pub const SLUG_INDEX: TableDefinition<&str, &[u8; 16]> = TableDefinition::new("slug_index");
/// (post id, created_at micros, comment id)
pub const POST_COMMENTS_INDEX: TableDefinition<(&[u8; 16], i64, &[u8; 16]), ()> =
    TableDefinition::new("post_comments_index");
/// (-created_at micros, log id); iterating forwards yields newest first.
pub const LOG_CHRONOLOGICAL_INDEX: TableDefinition<(i64, &[u8; 16]), ()> =
    TableDefinition::new("log_chronological_index");

pub fn parse_id(id: &str) -> Result<[u8; 16], DbError> {
    Ok(Uuid::parse_str(id.trim())?.into_bytes())
}

pub fn id_to_string(id_bytes: &[u8; 16]) -> String {
    Uuid::from_bytes(*id_bytes).to_string()
}

/// Serializes `doc` and stores it under `id_bytes` inside an open write transaction.
pub fn put_document<T: Serialize>(
    txn: &WriteTransaction,
    table: DocumentTable,
    id_bytes: &[u8; 16],
    doc: &T,
) -> Result<(), DbError> {
    let json = serde_json::to_string(doc)?;
    let mut t = txn.open_table(table)?;
    t.insert(id_bytes, json.as_str())?;
    Ok(())
}

/// Reads a document inside an open write transaction.
pub fn load_document<T: DeserializeOwned>(
    txn: &WriteTransaction,
    table: DocumentTable,
    id_bytes: &[u8; 16],
) -> Result<Option<T>, DbError> {
    let t = txn.open_table(table)?;
    let doc = match t.get(id_bytes)? {
        Some(guard) => Some(serde_json::from_str(guard.value())?),
        None => None,
    };
    Ok(doc)
}

/// Inserts a brand-new document and returns it with its public id.
pub fn insert_document<T: Serialize>(db: &Database, table: DocumentTable, doc: T) -> Result<Record<T>, DbError> {
    let id = Uuid::new_v4();
    let write_txn = db.begin_write()?;
    put_document(&write_txn, table, id.as_bytes(), &doc)?;
    write_txn.commit()?;
    Ok(Record { id: id.to_string(), data: doc })
}

pub fn read_document<T: DeserializeOwned>(
    db: &Database,
    table: DocumentTable,
    id: &str,
) -> Result<Option<Record<T>>, DbError> {
    let id_bytes = parse_id(id)?;
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;
    let doc = match t.get(&id_bytes)? {
        Some(guard) => Some(Record { id: id_to_string(&id_bytes), data: serde_json::from_str(guard.value())? }),
        None => None,
    };
    Ok(doc)
}

/// Decodes one stored document. A row that does not decode is logged and
/// skipped; storage errors are left to the caller.
pub fn decode_row<T: DeserializeOwned>(id_bytes: &[u8; 16], json: &str) -> Option<Record<T>> {
    let id = id_to_string(id_bytes);
    match serde_json::from_str::<T>(json) {
        Ok(data) => Some(Record { id, data }),
        Err(e) => {
            log::warn!("Skipping undecodable document '{}': {}", id, e);
            None
        }
    }
}

/// Loads every document of a collection.
pub fn scan_documents<T: DeserializeOwned>(db: &Database, table: DocumentTable) -> Result<Vec<Record<T>>, DbError> {
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;
    let mut docs = Vec::new();
    for item_result in t.iter()? {
        let (id_bytes, json) = item_result?;
        docs.extend(decode_row(id_bytes.value(), json.value()));
    }
    Ok(docs)
}

/// Reads, mutates and writes back one document inside a single write
/// transaction. Returns `Ok(None)` when the id is unknown; when `mutate` fails
/// the transaction is dropped and nothing is written.
pub fn modify_document<T, E, F>(
    db: &Database,
    table: DocumentTable,
    id: &str,
    mutate: F,
) -> Result<Option<Record<T>>, E>
where
    T: Serialize + DeserializeOwned,
    E: From<DbError>,
    F: FnOnce(&mut T) -> Result<(), E>,
{
    let id_bytes = parse_id(id)?;
    let write_txn = db.begin_write().map_err(DbError::from)?;
    let mut doc: T = match load_document(&write_txn, table, &id_bytes)? {
        Some(doc) => doc,
        None => return Ok(None),
    };
    if let Err(e) = mutate(&mut doc) {
        write_txn.abort().map_err(DbError::from)?;
        return Err(e);
    }
    put_document(&write_txn, table, &id_bytes, &doc)?;
    write_txn.commit().map_err(DbError::from)?;
    Ok(Some(Record { id: id_to_string(&id_bytes), data: doc }))
}

/// Removes a document. Returns whether it existed.
pub fn remove_document(db: &Database, table: DocumentTable, id: &str) -> Result<bool, DbError> {
    let id_bytes = parse_id(id)?;
    let write_txn = db.begin_write()?;
    let existed = {
        let mut t = write_txn.open_table(table)?;
        let removed = t.remove(&id_bytes)?;
        removed.is_some()
    };
    write_txn.commit()?;
    Ok(existed)
}

pub fn count_documents(db: &Database, table: DocumentTable) -> Result<usize, DbError> {
    let read_txn = db.begin_read()?;
    let t = read_txn.open_table(table)?;
    Ok(t.len()? as usize)
}
