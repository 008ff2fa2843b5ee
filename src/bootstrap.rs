use chrono::Utc;
use thiserror::Error;

use crate::{
    auth::{AuthError, hash_password},
    config::AppConfig,
    models::{AdminAccount, new_id},
    repository::{Repository, RepositoryError},
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// bootstrap_admin
///
/// Creates the first password admin from `ADMIN_BOOTSTRAP_EMAIL` and
/// `ADMIN_BOOTSTRAP_PASSWORD`. Only runs against an empty admin collection:
/// once any admin exists, the bootstrap credentials are ignored.
///
/// Returns the account it created, if any.
pub async fn bootstrap_admin(
    repo: &dyn Repository,
    config: &AppConfig,
) -> Result<Option<AdminAccount>, BootstrapError> {
    let Some((email, password)) = &config.bootstrap_admin else {
        return Ok(None);
    };

    let existing = repo.count_admins().await?;
    if existing > 0 {
        tracing::debug!(existing, "admins already present; skipping bootstrap");
        return Ok(None);
    }

    let admin = AdminAccount {
        id: new_id(),
        email: email.trim().to_lowercase(),
        name: None,
        password_hash: hash_password(password)?,
        created_at: Utc::now(),
    };

    match repo.create_admin(admin).await {
        Ok(admin) => {
            tracing::info!(admin_id = %admin.id, email = %admin.email, "bootstrap admin created");
            Ok(Some(admin))
        }
        // Another replica created it first.
        Err(RepositoryError::Duplicate(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
