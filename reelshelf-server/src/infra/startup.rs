use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::infra::app_state::{AppServices, AppState};
use crate::infra::config::{Config, ConfigWarnings};
use reelshelf_core::application::unit_of_work::AppUnitOfWork;
use reelshelf_core::auth::AuthCrypto;
use reelshelf_core::clock::SystemClock;
use reelshelf_core::database::PostgresDatabase;
use reelshelf_core::share::FontdueRasterizer;
use reelshelf_core::storage::LocalBlobStore;

pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub fn log_config_warnings(config: &Config, warnings: &ConfigWarnings) {
    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.metadata.config_path {
        info!(path = %path.display(), "loaded configuration file");
    }
    for warning in warnings.iter() {
        match &warning.hint {
            Some(hint) => warn!(hint = %hint, "{}", warning.message),
            None => warn!("{}", warning.message),
        }
    }
}

pub async fn connect_database(config: &Config) -> anyhow::Result<PostgresDatabase> {
    let url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| anyhow!("no database URL configured (set DATABASE_URL)"))?;

    PostgresDatabase::connect(url, config.database.max_connections)
        .await
        .context("failed to connect to PostgreSQL")
}

/// Wire production collaborators: Postgres repositories, local blob storage,
/// the configured TrueType font and the system clock.
pub async fn build_app_state(
    config: Config,
    database: &PostgresDatabase,
) -> anyhow::Result<AppState> {
    let font_path = config.share.font_path.clone().ok_or_else(|| {
        anyhow!("no share font configured (set SHARE_FONT_PATH or share.font_path)")
    })?;
    let glyphs = tokio::task::spawn_blocking(move || {
        FontdueRasterizer::from_path(&font_path)
    })
    .await
    .context("font loading task failed")?
    .context("failed to load share font")?;

    let blobs = LocalBlobStore::new(config.storage.root.clone());
    blobs
        .ensure_root()
        .await
        .context("failed to prepare storage root")?;

    let crypto = AuthCrypto::new(
        config.auth.password_pepper.as_bytes(),
        config.auth.token_key.as_bytes(),
    )
    .context("failed to initialize authentication crypto helpers")?;

    let services = AppServices {
        unit_of_work: AppUnitOfWork::from_postgres(database),
        crypto: Arc::new(crypto),
        blobs: Arc::new(blobs),
        glyphs: Arc::new(glyphs),
        clock: Arc::new(SystemClock),
    };

    Ok(AppState::new(config, services))
}
