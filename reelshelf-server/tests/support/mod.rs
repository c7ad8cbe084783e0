#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use axum_test::TestServer;
use reelshelf_core::application::unit_of_work::AppUnitOfWork;
use reelshelf_core::auth::{AuthCrypto, DEFAULT_SESSION_TTL_HOURS};
use reelshelf_core::clock::SystemClock;
use reelshelf_core::database::PostgresDatabase;
use reelshelf_core::share::FixedAdvanceGlyphs;
use reelshelf_core::storage::{BlobStore, LocalBlobStore, MemoryBlobStore};
use reelshelf_core::test_support::InMemoryDatabase;
use reelshelf_model::api::routes::v1;
use reelshelf_server::create_app;
use reelshelf_server::infra::app_state::{AppServices, AppState};
use reelshelf_server::infra::config::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ServerConfig, ShareConfig, StorageConfig,
};
use serde_json::{Value, json};
use sqlx::PgPool;
use tempfile::TempDir;

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    _tempdir: TempDir,
}

fn test_config(storage_root: PathBuf) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig {
            url: None,
            max_connections: 2,
        },
        storage: StorageConfig { root: storage_root },
        share: ShareConfig { font_path: None },
        auth: AuthConfig {
            password_pepper: "test-pepper".into(),
            token_key: "test-token-key".into(),
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
            status_cache_ttl_secs: 60,
            status_cache_capacity: 64,
        },
        cors: CorsConfig {
            allowed_origins: vec![],
        },
        metadata: ConfigMetadata::default(),
    }
}

fn build(
    unit_of_work: AppUnitOfWork,
    blobs: Arc<dyn BlobStore>,
    tempdir: TempDir,
) -> Result<TestApp> {
    let config = test_config(tempdir.path().to_path_buf());
    let services = AppServices {
        unit_of_work,
        crypto: Arc::new(AuthCrypto::for_tests()),
        blobs,
        glyphs: Arc::new(FixedAdvanceGlyphs),
        clock: Arc::new(SystemClock),
    };
    let state = AppState::new(config, services);
    let server = TestServer::new(create_app(state.clone()))
        .map_err(|err| anyhow!(err.to_string()))?;

    Ok(TestApp {
        server,
        state,
        _tempdir: tempdir,
    })
}

/// App over the in-memory repositories and blob store.
pub fn build_memory_app() -> Result<(TestApp, Arc<MemoryBlobStore>)> {
    let db = InMemoryDatabase::new();
    let blobs = Arc::new(MemoryBlobStore::new());
    let app = build(db.unit_of_work(), blobs.clone(), tempfile::tempdir()?)?;
    Ok((app, blobs))
}

/// App over PostgreSQL with share images written under a temp directory.
pub fn build_test_app(pool: PgPool) -> Result<TestApp> {
    let tempdir = tempfile::tempdir()?;
    let blobs = Arc::new(LocalBlobStore::new(tempdir.path().join("blobs")));
    let unit_of_work =
        AppUnitOfWork::from_postgres(&PostgresDatabase::from_pool(pool));
    build(unit_of_work, blobs, tempdir)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Register a user and return their access token.
pub async fn register(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post(v1::auth::REGISTER)
        .json(&json!({ "username": username, "password": password }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["data"]["access_token"]
        .as_str()
        .unwrap_or_else(|| panic!("access_token missing: {body}"))
        .to_string()
}

pub async fn add_book(server: &TestServer, token: &str, book: Value) {
    server
        .post(v1::books::COLLECTION)
        .add_header("Authorization", bearer(token))
        .json(&book)
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}

pub async fn add_movie(server: &TestServer, token: &str, movie: Value) {
    server
        .post(v1::movies::COLLECTION)
        .add_header("Authorization", bearer(token))
        .json(&movie)
        .await
        .assert_status(axum::http::StatusCode::CREATED);
}
