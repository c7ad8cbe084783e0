use std::{fmt, sync::Arc};

use chrono::Duration;

use crate::infra::config::Config;
use reelshelf_core::application::unit_of_work::AppUnitOfWork;
use reelshelf_core::auth::{AccountService, AuthCrypto, UserStatusCache};
use reelshelf_core::clock::Clock;
use reelshelf_core::share::{GlyphRasterizer, ShareService};
use reelshelf_core::storage::BlobStore;
use reelshelf_core::transfer::ProfileTransferService;

/// Everything a handler can reach.
#[derive(Clone)]
pub struct AppState {
    pub unit_of_work: Arc<AppUnitOfWork>,
    pub config: Arc<Config>,
    pub accounts: Arc<AccountService>,
    pub shares: Arc<ShareService>,
    pub transfer: Arc<ProfileTransferService>,
    pub status_cache: Arc<UserStatusCache>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

/// Collaborators that differ between production and tests.
#[derive(Clone)]
pub struct AppServices {
    pub unit_of_work: AppUnitOfWork,
    pub crypto: Arc<AuthCrypto>,
    pub blobs: Arc<dyn BlobStore>,
    pub glyphs: Arc<dyn GlyphRasterizer>,
    pub clock: Arc<dyn Clock>,
}

impl fmt::Debug for AppServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServices")
            .field("unit_of_work", &self.unit_of_work)
            .field("blobs", &self.blobs)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config, services: AppServices) -> Self {
        let AppServices {
            unit_of_work,
            crypto,
            blobs,
            glyphs,
            clock,
        } = services;

        let status_cache = Arc::new(UserStatusCache::new(
            Duration::seconds(
                i64::try_from(config.auth.status_cache_ttl_secs).unwrap_or(i64::MAX),
            ),
            config.auth.status_cache_capacity,
            Arc::clone(&clock),
        ));

        let accounts = Arc::new(
            AccountService::new(
                &unit_of_work,
                Arc::clone(&blobs),
                crypto,
                Arc::clone(&status_cache),
                Arc::clone(&clock),
            )
            .with_session_ttl(Duration::hours(config.auth.session_ttl_hours)),
        );

        let shares = Arc::new(ShareService::new(
            &unit_of_work,
            blobs,
            glyphs,
            Arc::clone(&clock),
        ));

        let transfer = Arc::new(ProfileTransferService::new(
            &unit_of_work,
            accounts.clone(),
            clock,
        ));

        Self {
            unit_of_work: Arc::new(unit_of_work),
            config: Arc::new(config),
            accounts,
            shares,
            transfer,
            status_cache,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
