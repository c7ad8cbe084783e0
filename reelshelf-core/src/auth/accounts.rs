use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use tracing::{info, warn};

use super::{AuthCrypto, PasswordVerifier, SessionToken, UserStatusCache};
use crate::application::unit_of_work::AppUnitOfWork;
use crate::clock::Clock;
use crate::database::ports::{shares::ShareRegistry, users::UsersRepository};
use crate::error::{CoreError, Result};
use crate::share::share_image_key;
use crate::storage::BlobStore;

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const PASSWORD_MIN: usize = 8;

/// A fresh session for a user who just registered or logged in.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub username: String,
    pub token: SessionToken,
}

/// Registration, login, token authentication and account deletion.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepository>,
    shares: Arc<dyn ShareRegistry>,
    blobs: Arc<dyn BlobStore>,
    crypto: Arc<AuthCrypto>,
    status_cache: Arc<UserStatusCache>,
    clock: Arc<dyn Clock>,
    session_ttl: Duration,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("blobs", &self.blobs)
            .field("status_cache", &self.status_cache.len())
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    let mut errors = Vec::new();

    let valid_chars = username
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&username.len()) || !valid_chars {
        errors.push(format!(
            "username: must be {USERNAME_MIN}-{USERNAME_MAX} characters of letters, digits, '_' or '-'"
        ));
    }
    if password.chars().count() < PASSWORD_MIN {
        errors.push(format!(
            "password: must be at least {PASSWORD_MIN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation(errors))
    }
}

impl AccountService {
    pub fn new(
        unit_of_work: &AppUnitOfWork,
        blobs: Arc<dyn BlobStore>,
        crypto: Arc<AuthCrypto>,
        status_cache: Arc<UserStatusCache>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users: Arc::clone(&unit_of_work.users),
            shares: Arc::clone(&unit_of_work.shares),
            blobs,
            crypto,
            status_cache,
            clock,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        validate_credentials(username, password)?;

        let password_hash = self.crypto.hash_password(password)?;
        let user = self.users.create_user(username, &password_hash).await?;
        info!(username = %user.username, "user registered");

        self.issue_session(&user.username).await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let user = self
            .users
            .get_user(username)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        if !self.crypto.verify_password(password, &user.password_hash)? {
            return Err(CoreError::InvalidCredentials);
        }
        if !user.enabled {
            return Err(CoreError::AccountDisabled);
        }

        self.issue_session(&user.username).await
    }

    /// Resolve a bearer token to its username. The enabled flag is served
    /// from the status cache when fresh.
    pub async fn authenticate(&self, token: &str) -> Result<String> {
        let token_hash = self.crypto.hash_token(token);
        let session = self
            .users
            .find_session(&token_hash)
            .await?
            .ok_or(CoreError::Unauthorized)?;

        if session.expires_at <= self.clock.now() {
            return Err(CoreError::Unauthorized);
        }

        let enabled = match self.status_cache.get(&session.username) {
            Some(enabled) => enabled,
            None => {
                let user = self
                    .users
                    .get_user(&session.username)
                    .await?
                    .ok_or(CoreError::Unauthorized)?;
                self.status_cache.insert(&user.username, user.enabled);
                user.enabled
            }
        };

        if !enabled {
            return Err(CoreError::AccountDisabled);
        }
        Ok(session.username)
    }

    pub async fn set_enabled(&self, username: &str, enabled: bool) -> Result<()> {
        self.users.set_enabled(username, enabled).await?;
        self.status_cache.invalidate(username);
        info!(username = %username, enabled, "user status changed");
        Ok(())
    }

    /// Removes the user and everything they own. The share image blob is
    /// deleted best effort after the rows are gone.
    pub async fn delete_account(&self, username: &str, password: &str) -> Result<()> {
        self.confirm_password(username, password).await?;

        if !self.users.delete_user(username).await? {
            return Err(CoreError::NotFound(format!("user {username}")));
        }
        self.status_cache.invalidate(username);

        // Normally already gone through the cascade.
        if let Err(err) = self.shares.delete_share(username).await {
            warn!(username = %username, error = %err, "failed to delete share record");
        }
        if let Err(err) = self.blobs.delete(&share_image_key(username)).await {
            warn!(username = %username, error = %err, "failed to delete share image");
        }

        info!(username = %username, "account deleted");
        Ok(())
    }

    async fn issue_session(&self, username: &str) -> Result<LoginOutcome> {
        let token = SessionToken::generate(self.clock.now(), self.session_ttl)?;
        self.users
            .create_session(
                &self.crypto.hash_token(token.as_str()),
                username,
                token.expires_at(),
            )
            .await?;

        Ok(LoginOutcome {
            username: username.to_string(),
            token,
        })
    }
}

#[async_trait]
impl PasswordVerifier for AccountService {
    async fn confirm_password(&self, username: &str, password: &str) -> Result<()> {
        let user = self
            .users
            .get_user(username)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        if self.crypto.verify_password(password, &user.password_hash)? {
            Ok(())
        } else {
            Err(CoreError::InvalidCredentials)
        }
    }
}
