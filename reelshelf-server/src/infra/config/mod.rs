//! Layered configuration: CLI flags, then environment (with `.env`), then
//! `reelshelf.toml`, then defaults.

pub mod loader;
pub mod models;
pub mod sources;
pub mod warnings;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ServerConfig, ShareConfig, StorageConfig,
};
pub use warnings::{ConfigWarning, ConfigWarnings};
