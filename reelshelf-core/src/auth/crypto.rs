use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, ParamsBuilder, Version,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
};
use hmac::{Hmac, Mac};
use rand::{TryRngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Password hashing (Argon2id plus a server pepper) and bearer-token hashing
/// (HMAC-SHA-256) with one set of secrets.
pub struct AuthCrypto {
    argon2: Argon2<'static>,
    password_pepper: Zeroizing<Vec<u8>>,
    token_mac: HmacSha256,
}

impl fmt::Debug for AuthCrypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthCrypto")
            .field("argon2", &self.argon2)
            .field("password_pepper", &"<redacted>")
            .field("token_mac", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum AuthCryptoError {
    #[error("password pepper must not be empty")]
    EmptyPasswordPepper,
    #[error("token HMAC key must not be empty")]
    EmptyTokenKey,
    #[error("invalid Argon2 parameters: {0}")]
    InvalidArgon2Params(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl From<password_hash::Error> for AuthCryptoError {
    fn from(err: password_hash::Error) -> Self {
        AuthCryptoError::PasswordHash(err.to_string())
    }
}

impl From<AuthCryptoError> for CoreError {
    fn from(err: AuthCryptoError) -> Self {
        CoreError::Internal(err.to_string())
    }
}

impl AuthCrypto {
    const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
    const DEFAULT_ITERATIONS: u32 = 2;
    const DEFAULT_PARALLELISM: u32 = 1;
    const SALT_LENGTH: usize = password_hash::Salt::RECOMMENDED_LENGTH;

    pub fn new(
        password_pepper: impl AsRef<[u8]>,
        token_hmac_key: impl AsRef<[u8]>,
    ) -> Result<Self, AuthCryptoError> {
        let params = ParamsBuilder::new()
            .m_cost(Self::DEFAULT_MEMORY_KIB)
            .t_cost(Self::DEFAULT_ITERATIONS)
            .p_cost(Self::DEFAULT_PARALLELISM)
            .output_len(32)
            .build()
            .map_err(|err| AuthCryptoError::InvalidArgon2Params(err.to_string()))?;
        Self::with_params(password_pepper, token_hmac_key, params)
    }

    /// Caller-chosen Argon2 cost, mainly so tests can hash quickly.
    pub fn with_params(
        password_pepper: impl AsRef<[u8]>,
        token_hmac_key: impl AsRef<[u8]>,
        params: Params,
    ) -> Result<Self, AuthCryptoError> {
        let pepper = password_pepper.as_ref();
        if pepper.is_empty() {
            return Err(AuthCryptoError::EmptyPasswordPepper);
        }

        let key = token_hmac_key.as_ref();
        if key.is_empty() {
            return Err(AuthCryptoError::EmptyTokenKey);
        }
        let token_mac = HmacSha256::new_from_slice(key)
            .map_err(|_| AuthCryptoError::EmptyTokenKey)?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::default(), params),
            password_pepper: Zeroizing::new(pepper.to_vec()),
            token_mac,
        })
    }

    /// Minimum-cost parameters for tests.
    #[cfg(any(test, feature = "test-support"))]
    pub fn for_tests() -> Self {
        let params = ParamsBuilder::new()
            .m_cost(Params::MIN_M_COST)
            .t_cost(Params::MIN_T_COST)
            .p_cost(Params::MIN_P_COST)
            .build()
            .unwrap_or_default();
        match Self::with_params("test-pepper", "test-token-key", params) {
            Ok(crypto) => crypto,
            Err(err) => unreachable!("static test secrets are non-empty: {err}"),
        }
    }

    fn peppered(&self, password: &str) -> Zeroizing<Vec<u8>> {
        let mut material = Zeroizing::new(Vec::with_capacity(
            password.len() + self.password_pepper.len(),
        ));
        material.extend_from_slice(password.as_bytes());
        material.extend_from_slice(&self.password_pepper);
        material
    }

    /// PHC string suitable for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthCryptoError> {
        let mut salt_bytes = [0u8; Self::SALT_LENGTH];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|err| AuthCryptoError::PasswordHash(err.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)?;

        let material = self.peppered(password);
        Ok(self.argon2.hash_password(&material, &salt)?.to_string())
    }

    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthCryptoError> {
        let parsed = PasswordHash::new(password_hash)?;
        let material = self.peppered(password);
        Ok(self.argon2.verify_password(&material, &parsed).is_ok())
    }

    /// Hex HMAC of a bearer token, the only form that reaches the database.
    pub fn hash_token(&self, token: &str) -> String {
        let mut mac = self.token_mac.clone();
        mac.update(token.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
