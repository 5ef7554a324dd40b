use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use fanhub_db::Database;
use fanhub_types::models::Role;

use crate::config::{Config, Credentials};
use crate::error::{AppError, AppResult};
use crate::password::hash_password;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub auth: AuthSettings,
    /// Receiver of user chat messages that name no admin.
    pub support_admin: String,
}

pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub default_admin: Option<DefaultAccount>,
    pub default_user: Option<DefaultAccount>,
}

/// Bootstrap account from configuration. Only the hash is kept in memory.
#[derive(Debug, Clone)]
pub struct DefaultAccount {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

impl DefaultAccount {
    fn from_credentials(creds: &Credentials, role: Role) -> anyhow::Result<Self> {
        Ok(Self {
            username: creds.username.clone(),
            password_hash: hash_password(&creds.password)?,
            role,
        })
    }
}

impl AuthSettings {
    /// True when `username` is reserved by a configured default account.
    pub fn is_default_account(&self, username: &str) -> bool {
        [&self.default_admin, &self.default_user]
            .into_iter()
            .flatten()
            .any(|acc| acc.username == username)
    }
}

impl AppStateInner {
    pub fn from_config(config: &Config, db: Database) -> anyhow::Result<AppState> {
        let default_admin = config
            .default_admin
            .as_ref()
            .map(|c| DefaultAccount::from_credentials(c, Role::SuperAdmin))
            .transpose()?;
        let default_user = config
            .default_user
            .as_ref()
            .map(|c| DefaultAccount::from_credentials(c, Role::User))
            .transpose()?;

        if let Some(acc) = &default_admin {
            info!("Default admin account '{}' enabled", acc.username);
        }
        if let Some(acc) = &default_user {
            info!("Default test user '{}' enabled", acc.username);
        }

        let token_ttl = chrono::Duration::try_hours(config.token_ttl_hours)
            .with_context(|| format!("token TTL of {} hours is out of range", config.token_ttl_hours))?;

        Ok(Arc::new(Self {
            db: Arc::new(db),
            auth: AuthSettings {
                jwt_secret: config.jwt_secret.clone(),
                token_ttl,
                default_admin,
                default_user,
            },
            support_admin: config.support_admin.clone(),
        }))
    }

    /// Runs a database call on the blocking pool.
    pub async fn db<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        blocking(move || f(&db)).await
    }
}

/// Runs CPU-heavy or blocking work (SQLite, Argon2) off the async runtime.
pub async fn blocking<F, T>(f: F) -> AppResult<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Internal(anyhow::anyhow!("background task failed"))
        })?
        .map_err(AppError::from)
}
