//! Accounts, sessions and password re-confirmation.

pub mod accounts;
pub mod crypto;
pub mod session;
pub mod status_cache;

use async_trait::async_trait;

use crate::error::Result;

pub use accounts::{AccountService, DEFAULT_SESSION_TTL_HOURS, LoginOutcome};
pub use crypto::{AuthCrypto, AuthCryptoError};
pub use session::SessionToken;
pub use status_cache::UserStatusCache;

/// Re-confirms a signed-in user's password before destructive or
/// data-revealing operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    /// `InvalidCredentials` when the password does not match.
    async fn confirm_password(&self, username: &str, password: &str) -> Result<()>;
}
