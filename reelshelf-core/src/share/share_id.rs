use std::fmt;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};

use crate::error::{CoreError, Result};

const SHARE_ID_BYTES: usize = 16;
/// Encoded length of 16 bytes in unpadded URL-safe base64.
pub const SHARE_ID_LEN: usize = 22;

/// Opaque, URL-safe public identifier of a share image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareId(String);

impl ShareId {
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; SHARE_ID_BYTES];
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            CoreError::Internal(format!("Failed to generate share id: {e}"))
        })?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// Accepts only strings shaped like a generated id. Anything else cannot
    /// be in the registry, so lookups can short-circuit.
    pub fn parse(value: &str) -> Option<Self> {
        Self::is_valid(value).then(|| Self(value.to_string()))
    }

    pub fn is_valid(value: &str) -> bool {
        value.len() == SHARE_ID_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_fixed_length_and_url_safe() {
        let id = ShareId::generate().unwrap();
        assert_eq!(id.as_str().len(), SHARE_ID_LEN);
        assert!(ShareId::is_valid(id.as_str()));
    }

    #[test]
    fn generated_ids_differ() {
        let a = ShareId::generate().unwrap();
        let b = ShareId::generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert!(ShareId::parse("short").is_none());
        assert!(ShareId::parse("../../etc/passwd/xxxxxx").is_none());
        assert!(ShareId::parse("aaaaaaaaaaaaaaaaaaaaa=").is_none());
        assert!(ShareId::parse("abcdefghijklmnopqrs-_0").is_some());
    }
}
