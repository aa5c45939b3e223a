use crate::errors::AppError;
use crate::helper::sanitization_helpers::strip_optional;
use crate::models::db_operations::{admin_logs_db_operations, listings_db_operations, posts_db_operations, users_db_operations};
use crate::models::{AdminLogData, AdminLogEntry, DirectoryStats, ModerationStatus, UserAccount};
use crate::DbPool;
use chrono::Utc;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;
use redb::Database;
use serde::Deserialize;

/// Body of `POST /api/admin`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LogEntryDraft {
    pub admin_id: Option<String>,
    pub acao: Option<String>,
    pub entidade_tipo: Option<String>,
    pub entidade_id: Option<String>,
    pub detalhes: Option<String>,
}

// Helper to get a connection from the pool
fn get_conn(pool: &DbPool) -> Result<PooledConnection<SqliteConnectionManager>, AppError> {
    Ok(pool.get()?)
}

pub fn append_log_entry(db: &Database, draft: &LogEntryDraft) -> Result<AdminLogEntry, AppError> {
    let required = |value: &Option<String>, message: &str| {
        strip_optional(value.as_deref()).ok_or_else(|| AppError::validation(message))
    };
    let entry = AdminLogData {
        admin_id: required(&draft.admin_id, "Informe o administrador")?,
        action: required(&draft.acao, "Informe a ação")?,
        entity_type: required(&draft.entidade_tipo, "Informe o tipo da entidade")?,
        entity_id: required(&draft.entidade_id, "Informe a entidade")?,
        details: strip_optional(draft.detalhes.as_deref()).unwrap_or_default(),
        created_at: Utc::now(),
    };
    Ok(admin_logs_db_operations::append_log_entry(db, entry)?)
}

/// Appends a log entry for a mutation that already happened. The log is
/// advisory: without an acting admin nothing is written, and a failed append
/// is only reported as a warning.
pub fn record_admin_action(
    db: &Database,
    admin_id: Option<&str>,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    details: String,
) {
    let Some(admin_id) = admin_id.map(str::trim).filter(|a| !a.is_empty()) else {
        return;
    };
    let entry = AdminLogData {
        admin_id: admin_id.to_string(),
        action: action.to_string(),
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        details,
        created_at: Utc::now(),
    };
    if let Err(e) = admin_logs_db_operations::append_log_entry(db, entry) {
        log::warn!("Failed to record admin action '{}' on {} {}: {}", action, entity_type, entity_id, e);
    }
}

pub fn latest_log_entries(db: &Database, limit: usize) -> Result<Vec<AdminLogEntry>, AppError> {
    Ok(admin_logs_db_operations::read_latest_log_entries(db, limit)?)
}

pub fn directory_stats(db: &Database, pool: &DbPool) -> Result<DirectoryStats, AppError> {
    let mut stats = DirectoryStats::default();

    for listing in listings_db_operations::read_all_listings(db)? {
        let l = &listing.data;
        stats.total_empresas += 1;
        if l.is_publicly_visible() {
            stats.empresas_ativas += 1;
        } else if l.is_blocked() {
            stats.empresas_bloqueadas += 1;
        } else if l.status == ModerationStatus::Pending {
            stats.empresas_pendentes += 1;
        }
    }

    for post in posts_db_operations::read_all_posts(db)? {
        stats.total_posts += 1;
        match post.data.status {
            ModerationStatus::Pending => stats.posts_pendentes += 1,
            ModerationStatus::Approved => stats.posts_aprovados += 1,
            ModerationStatus::Rejected => stats.posts_rejeitados += 1,
        }
    }

    let conn = get_conn(pool)?;
    let (total_usuarios, total_admins) = users_db_operations::count_users(&conn)?;
    stats.total_usuarios = total_usuarios;
    stats.total_admins = total_admins;
    Ok(stats)
}

pub fn fetch_all_users(pool: &DbPool) -> Result<Vec<UserAccount>, AppError> {
    let conn = get_conn(pool)?;
    Ok(users_db_operations::read_all_users(&conn)?)
}

pub fn toggle_admin(pool: &DbPool, user_id: &str) -> Result<UserAccount, AppError> {
    let conn = get_conn(pool)?;
    users_db_operations::toggle_admin(&conn, user_id)?.ok_or_else(|| AppError::not_found("Usuário não encontrado"))
}

pub fn delete_user(pool: &DbPool, user_id: &str) -> Result<(), AppError> {
    let conn = get_conn(pool)?;
    if users_db_operations::delete_user(&conn, user_id)? {
        Ok(())
    } else {
        Err(AppError::not_found("Usuário não encontrado"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup::{setup_accounts_db, setup_documents_in_memory};

    fn pool() -> DbPool {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .unwrap();
        setup_accounts_db(&mut pool.get().unwrap()).unwrap();
        pool
    }

    #[test]
    fn actions_without_an_admin_are_not_logged() {
        let db = setup_documents_in_memory().unwrap();
        record_admin_action(&db, None, "aprovar_empresa", "empresa", "e1", String::new());
        record_admin_action(&db, Some("  "), "aprovar_empresa", "empresa", "e1", String::new());
        assert!(latest_log_entries(&db, 10).unwrap().is_empty());

        record_admin_action(&db, Some("admin-1"), "aprovar_empresa", "empresa", "e1", "ok".into());
        let logged = latest_log_entries(&db, 10).unwrap();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].data.action, "aprovar_empresa");
    }

    #[test]
    fn manual_entries_need_admin_and_action() {
        let db = setup_documents_in_memory().unwrap();
        let missing = LogEntryDraft { acao: Some("x".into()), ..Default::default() };
        assert!(matches!(append_log_entry(&db, &missing), Err(AppError::Validation(_))));

        let full = LogEntryDraft {
            admin_id: Some("admin-1".into()),
            acao: Some("bloquear_empresa".into()),
            entidade_tipo: Some("empresa".into()),
            entidade_id: Some("e1".into()),
            detalhes: None,
        };
        let entry = append_log_entry(&db, &full).unwrap();
        assert_eq!(entry.data.details, "");
    }

    #[test]
    fn toggling_and_deleting_unknown_users_is_not_found() {
        let pool = pool();
        assert!(matches!(toggle_admin(&pool, "nope"), Err(AppError::NotFound(_))));
        assert!(matches!(delete_user(&pool, "nope"), Err(AppError::NotFound(_))));
    }
}
