use crate::models::db_operations::DbError;
use crate::models::UserAccount;
use bcrypt::{hash, verify, BcryptError};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Error as RusqliteError, Row};
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, nome, is_admin, created_at, updated_at";

fn bcrypt_to_rusqlite_error(e: BcryptError) -> RusqliteError {
    RusqliteError::ToSqlConversionFailure(Box::new(e))
}

fn account_from_row(row: &Row) -> Result<UserAccount, RusqliteError> {
    Ok(UserAccount {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn is_unique_violation(e: &RusqliteError) -> bool {
    matches!(e, RusqliteError::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation)
}

/// Inserts a new account. `email` must already be normalized.
pub fn create_user(
    conn: &Connection,
    email: &str,
    name: &str,
    password: &str,
    is_admin: bool,
    bcrypt_cost: u32,
) -> Result<UserAccount, DbError> {
    let hashed_password = hash(password, bcrypt_cost).map_err(bcrypt_to_rusqlite_error)?;
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    conn.execute(
        "INSERT INTO usuarios (id, email, nome, senha_hash, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![id, email, name, hashed_password, is_admin, now],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DbError::Duplicate(email.to_string())
        } else {
            DbError::Rusqlite(e)
        }
    })?;

    Ok(UserAccount {
        id,
        email: email.to_string(),
        name: name.to_string(),
        is_admin,
        created_at: now,
        updated_at: now,
    })
}

/// Creates an administrator, or promotes and resets the password of the
/// account that already owns `email`.
pub fn upsert_admin(
    conn: &Connection,
    email: &str,
    name: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<(), DbError> {
    let hashed_password = hash(password, bcrypt_cost).map_err(bcrypt_to_rusqlite_error)?;
    let now = Utc::now();
    conn.execute(
        "INSERT INTO usuarios (id, email, nome, senha_hash, is_admin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
         ON CONFLICT(email) DO UPDATE SET
            nome = excluded.nome,
            senha_hash = excluded.senha_hash,
            is_admin = 1,
            updated_at = excluded.updated_at",
        params![Uuid::new_v4().to_string(), email, name, hashed_password, now],
    )?;
    Ok(())
}

/// Returns the account when `password` matches the stored bcrypt hash.
pub fn verify_credentials(conn: &Connection, email: &str, password: &str) -> Result<Option<UserAccount>, DbError> {
    let res: Option<(String, UserAccount)> = conn
        .query_row(
            &format!("SELECT senha_hash, {} FROM usuarios WHERE email = ?1", ACCOUNT_COLUMNS),
            [email],
            |row| {
                let hash: String = row.get(0)?;
                let account = UserAccount {
                    id: row.get(1)?,
                    email: row.get(2)?,
                    name: row.get(3)?,
                    is_admin: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                };
                Ok((hash, account))
            },
        )
        .optional()?;

    match res {
        Some((hash, account)) => {
            let matches = verify(password, &hash).map_err(bcrypt_to_rusqlite_error)?;
            Ok(matches.then_some(account))
        }
        None => Ok(None),
    }
}

pub fn read_user_by_id(conn: &Connection, id: &str) -> Result<Option<UserAccount>, DbError> {
    let account = conn
        .query_row(
            &format!("SELECT {} FROM usuarios WHERE id = ?1", ACCOUNT_COLUMNS),
            [id],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

/// Newest accounts first.
pub fn read_all_users(conn: &Connection) -> Result<Vec<UserAccount>, DbError> {
    let mut stmt = conn.prepare(&format!("SELECT {} FROM usuarios ORDER BY created_at DESC", ACCOUNT_COLUMNS))?;
    let user_iter = stmt.query_map([], account_from_row)?;

    let mut users = Vec::new();
    for user in user_iter {
        users.push(user?);
    }
    Ok(users)
}

pub fn list_admin_emails(conn: &Connection) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare("SELECT email FROM usuarios WHERE is_admin = 1 ORDER BY email")?;
    let rows = stmt.query_map([], |row| row.get(0))?;

    let mut emails = Vec::new();
    for email in rows {
        emails.push(email?);
    }
    Ok(emails)
}

/// Flips the administrator flag and returns the updated account.
pub fn toggle_admin(conn: &Connection, id: &str) -> Result<Option<UserAccount>, DbError> {
    let changed = conn.execute(
        "UPDATE usuarios SET is_admin = NOT is_admin, updated_at = ?1 WHERE id = ?2",
        params![Utc::now(), id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    read_user_by_id(conn, id)
}

pub fn delete_user(conn: &Connection, id: &str) -> Result<bool, DbError> {
    let removed = conn.execute("DELETE FROM usuarios WHERE id = ?1", [id])?;
    Ok(removed > 0)
}

/// (all accounts, administrators)
pub fn count_users(conn: &Connection) -> Result<(usize, usize), DbError> {
    let counts = conn.query_row(
        "SELECT COUNT(*), COALESCE(SUM(is_admin), 0) FROM usuarios",
        [],
        |row| Ok((row.get::<_, i64>(0)? as usize, row.get::<_, i64>(1)? as usize)),
    )?;
    Ok(counts)
}
