use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CoreError, Result};

const TOKEN_BYTES: usize = 32;

/// Opaque bearer token handed to a client. Only its HMAC is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn generate(now: DateTime<Utc>, lifetime: Duration) -> Result<Self> {
        let mut token_bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut token_bytes).map_err(|e| {
            CoreError::Internal(format!("Failed to generate session token: {e}"))
        })?;

        Ok(Self {
            value: URL_SAFE_NO_PAD.encode(token_bytes),
            expires_at: now + lifetime,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}
