use anyhow::Context;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use fanhub_types::api::Claims;
use fanhub_types::models::Role;

/// Signs an HS256 token carrying `{username, role}`.
pub fn create_token(
    secret: &str,
    username: &str,
    role: Role,
    ttl: chrono::Duration,
) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let exp = now
        .checked_add_signed(ttl)
        .context("token lifetime overflows the calendar")?;
    let claims = Claims {
        username: username.to_string(),
        role,
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Checks signature and expiry.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
