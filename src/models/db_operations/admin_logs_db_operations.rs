use crate::models::db_operations::{
    decode_row, id_to_string, put_document, DbError, LOGS, LOG_CHRONOLOGICAL_INDEX,
};
use crate::models::{AdminLogData, AdminLogEntry, Record};
use redb::{Database, ReadableTable};
use uuid::Uuid;

/// Appends an entry to the admin log. Entries are never updated or removed.
pub fn append_log_entry(db: &Database, entry: AdminLogData) -> Result<AdminLogEntry, DbError> {
    let log_uuid = Uuid::new_v4();
    let log_id_bytes = log_uuid.into_bytes();

    let write_txn = db.begin_write()?;
    put_document(&write_txn, LOGS, &log_id_bytes, &entry)?;
    {
        let mut chrono_index = write_txn.open_table(LOG_CHRONOLOGICAL_INDEX)?;
        chrono_index.insert((-entry.created_at.timestamp_micros(), &log_id_bytes), ())?;
    }
    write_txn.commit()?;

    Ok(Record { id: log_uuid.to_string(), data: entry })
}

/// Most recent entries first.
pub fn read_latest_log_entries(db: &Database, limit: usize) -> Result<Vec<AdminLogEntry>, DbError> {
    let read_txn = db.begin_read()?;
    let chrono_index = read_txn.open_table(LOG_CHRONOLOGICAL_INDEX)?;
    let logs_table = read_txn.open_table(LOGS)?;

    let mut entries = Vec::new();
    for item_result in chrono_index.iter()? {
        if entries.len() >= limit {
            break;
        }
        let (key, _) = item_result?;
        let log_id_bytes = key.value().1;
        match logs_table.get(log_id_bytes)? {
            Some(json) => entries.extend(decode_row(log_id_bytes, json.value())),
            None => log::warn!("Log index points at missing entry '{}'", id_to_string(log_id_bytes)),
        }
    }
    Ok(entries)
}
