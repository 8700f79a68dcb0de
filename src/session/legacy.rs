use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::cookies::percent_decode;
use crate::models::Role;

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LegacyCookieError {
    #[error("application key is not configured")]
    MissingKey,

    #[error("application key must be 32 bytes")]
    InvalidKey,

    #[error("malformed identity cookie: {0}")]
    Malformed(String),

    #[error("identity cookie could not be decrypted")]
    Decrypt,

    #[error("unexpected identity payload")]
    Payload,
}

#[derive(Deserialize)]
struct CookieEnvelope {
    iv: String,
    value: String,
    #[serde(default)]
    tag: String,
    #[allow(dead_code)]
    #[serde(default)]
    mac: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegacyIdentity {
    pub user_id: i64,
    pub role: Role,
}

/// Accepts the raw 32-byte key or the `base64:` form.
pub fn decode_key(app_key: &str) -> Result<Vec<u8>, LegacyCookieError> {
    let app_key = app_key.trim();
    if app_key.is_empty() {
        return Err(LegacyCookieError::MissingKey);
    }
    let key = match app_key.strip_prefix("base64:") {
        Some(encoded) => STANDARD
            .decode(encoded)
            .map_err(|_| LegacyCookieError::InvalidKey)?,
        None => app_key.as_bytes().to_vec(),
    };
    if key.len() != 32 {
        return Err(LegacyCookieError::InvalidKey);
    }
    Ok(key)
}

fn b64(field: &str, value: &str) -> Result<Vec<u8>, LegacyCookieError> {
    STANDARD
        .decode(value)
        .map_err(|e| LegacyCookieError::Malformed(format!("{field}: {e}")))
}

/// Decrypt the identity cookie into `user_id` and role.
pub fn decrypt_identity(
    cookie_value: &str,
    app_key: &str,
) -> Result<LegacyIdentity, LegacyCookieError> {
    let key = decode_key(app_key)?;

    let raw = b64("envelope", &percent_decode(cookie_value))?;
    let envelope: CookieEnvelope = serde_json::from_slice(&raw)
        .map_err(|e| LegacyCookieError::Malformed(e.to_string()))?;

    let iv = b64("iv", &envelope.iv)?;
    if iv.len() != NONCE_LEN {
        return Err(LegacyCookieError::Malformed(format!(
            "iv must be {NONCE_LEN} bytes"
        )));
    }
    let mut ciphertext = b64("value", &envelope.value)?;
    if !envelope.tag.is_empty() {
        ciphertext.extend(b64("tag", &envelope.tag)?);
    }

    let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| LegacyCookieError::InvalidKey)?;
    let plain = cipher
        .decrypt(Nonce::from_slice(&iv), ciphertext.as_slice())
        .map_err(|_| LegacyCookieError::Decrypt)?;
    let plain = String::from_utf8(plain).map_err(|_| LegacyCookieError::Payload)?;

    let (id, role) = plain.split_once('|').ok_or(LegacyCookieError::Payload)?;
    Ok(LegacyIdentity {
        user_id: id.trim().parse().map_err(|_| LegacyCookieError::Payload)?,
        role: Role::parse(role).ok_or(LegacyCookieError::Payload)?,
    })
}
