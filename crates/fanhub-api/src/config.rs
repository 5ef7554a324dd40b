use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24 * 7;
const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

/// Server configuration, read from `FANHUB_*` environment variables.
///
/// | Env Var                  | Required | Default     |
/// |--------------------------|----------|-------------|
/// | `FANHUB_JWT_SECRET`      | **yes**  | --          |
/// | `FANHUB_HOST`            | no       | `0.0.0.0`   |
/// | `FANHUB_PORT`            | no       | `3000`      |
/// | `FANHUB_DB_PATH`         | no       | `fanhub.db` |
/// | `FANHUB_TOKEN_TTL_HOURS` | no       | `168`       |
/// | `FANHUB_DEFAULT_ADMIN`   | no       | --          |
/// | `FANHUB_DEFAULT_USER`    | no       | --          |
/// | `FANHUB_SUPPORT_ADMIN`   | no       | `admin`     |
/// | `FANHUB_CORS_ORIGIN`     | no       | permissive  |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub default_admin: Option<Credentials>,
    pub default_user: Option<Credentials>,
    pub support_admin: String,
    pub cors_origin: Option<String>,
}

/// A `username:password` pair for a bootstrap account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn parse(var: &str, raw: &str) -> anyhow::Result<Self> {
        let (username, password) = raw
            .split_once(':')
            .with_context(|| format!("{var} must look like username:password"))?;
        if username.trim().is_empty() || password.is_empty() {
            bail!("{var} must have a non-empty username and password");
        }
        Ok(Self {
            username: username.trim().to_string(),
            password: password.to_string(),
        })
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("FANHUB_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("FANHUB_JWT_SECRET is unset or still a placeholder; set it in .env");
        }

        let port = match get("FANHUB_PORT") {
            Some(raw) => raw.parse().with_context(|| format!("invalid FANHUB_PORT '{raw}'"))?,
            None => 3000,
        };

        let token_ttl_hours = match get("FANHUB_TOKEN_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|h| (1..=MAX_TOKEN_TTL_HOURS).contains(h))
                .with_context(|| {
                    format!("invalid FANHUB_TOKEN_TTL_HOURS '{raw}' (1..={MAX_TOKEN_TTL_HOURS})")
                })?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        let default_admin = get("FANHUB_DEFAULT_ADMIN")
            .map(|raw| Credentials::parse("FANHUB_DEFAULT_ADMIN", &raw))
            .transpose()?;
        let default_user = get("FANHUB_DEFAULT_USER")
            .map(|raw| Credentials::parse("FANHUB_DEFAULT_USER", &raw))
            .transpose()?;

        if let (Some(admin), Some(user)) = (&default_admin, &default_user) {
            if admin.username == user.username {
                bail!("FANHUB_DEFAULT_ADMIN and FANHUB_DEFAULT_USER share the username '{}'", admin.username);
            }
        }

        Ok(Self {
            host: get("FANHUB_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: get("FANHUB_DB_PATH").unwrap_or_else(|| "fanhub.db".into()).into(),
            jwt_secret,
            token_ttl_hours,
            default_admin,
            default_user,
            support_admin: get("FANHUB_SUPPORT_ADMIN").unwrap_or_else(|| "admin".into()),
            cors_origin: get("FANHUB_CORS_ORIGIN"),
        })
    }
}
