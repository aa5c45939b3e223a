use crate::errors::AppError;
use crate::helper::sanitization_helpers::strip_optional;
use crate::models::db_operations::{users_db_operations, DbError};
use crate::models::UserAccount;
use crate::DbPool;
use serde::Deserialize;

/// Body of `POST /api/auth`.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Credentials {
    pub email: Option<String>,
    pub senha: Option<String>,
    pub nome: Option<String>,
}

/// Trimmed, lower-cased email, or `None` when it cannot be one.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    let valid = email.len() >= 3 && email.contains('@') && !email.starts_with('@') && !email.ends_with('@');
    valid.then_some(email)
}

fn email_and_password(credentials: &Credentials) -> Result<(String, &str), AppError> {
    let email = credentials.email.as_deref().and_then(normalize_email);
    let password = credentials.senha.as_deref().filter(|p| !p.is_empty());
    match (email, password) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => Err(AppError::validation("Email e senha são obrigatórios")),
    }
}

pub fn register(pool: &DbPool, credentials: &Credentials, bcrypt_cost: u32) -> Result<UserAccount, AppError> {
    let (email, password) = email_and_password(credentials)?;
    let name = strip_optional(credentials.nome.as_deref())
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

    let conn = pool.get()?;
    users_db_operations::create_user(&conn, &email, &name, password, false, bcrypt_cost).map_err(|e| match e {
        DbError::Duplicate(_) => AppError::validation("Email já cadastrado"),
        other => AppError::from(other),
    })
}

pub fn login(pool: &DbPool, credentials: &Credentials) -> Result<UserAccount, AppError> {
    let (email, password) = email_and_password(credentials)?;
    let conn = pool.get()?;
    users_db_operations::verify_credentials(&conn, &email, password)?
        .ok_or_else(|| AppError::Unauthorized("Email ou senha inválidos".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup::setup_accounts_db;
    use r2d2_sqlite::SqliteConnectionManager;

    fn pool() -> DbPool {
        let pool = r2d2::Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .unwrap();
        setup_accounts_db(&mut pool.get().unwrap()).unwrap();
        pool
    }

    fn creds(email: &str, senha: &str) -> Credentials {
        Credentials { email: Some(email.into()), senha: Some(senha.into()), nome: None }
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Ana@Guaira.PR "), Some("ana@guaira.pr".to_string()));
        assert_eq!(normalize_email("sem-arroba"), None);
        assert_eq!(normalize_email("@x"), None);
    }

    #[test]
    fn register_then_login_with_any_email_casing() {
        let pool = pool();
        let account = register(&pool, &creds("Ana@Guaira.pr", "segredo"), 4).unwrap();
        assert_eq!(account.email, "ana@guaira.pr");
        assert_eq!(account.name, "ana");
        assert!(!account.is_admin);

        let logged = login(&pool, &creds(" ANA@guaira.pr", "segredo")).unwrap();
        assert_eq!(logged.id, account.id);
    }

    #[test]
    fn second_registration_with_same_email_is_a_validation_error() {
        let pool = pool();
        register(&pool, &creds("ana@guaira.pr", "segredo"), 4).unwrap();
        let err = register(&pool, &creds("ANA@guaira.pr", "outra"), 4).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_fields_and_bad_passwords() {
        let pool = pool();
        assert!(matches!(register(&pool, &creds("ana@guaira.pr", ""), 4), Err(AppError::Validation(_))));
        register(&pool, &creds("ana@guaira.pr", "segredo"), 4).unwrap();
        assert!(matches!(login(&pool, &creds("ana@guaira.pr", "errada")), Err(AppError::Unauthorized(_))));
    }
}
