use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    #[serde(default)]
    pub share: FileShareConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileShareConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_cache_ttl_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_cache_capacity: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub storage_root: Option<PathBuf>,
    pub share_font_path: Option<PathBuf>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub auth_session_ttl_hours: Option<i64>,
    pub auth_status_cache_ttl_secs: Option<u64>,
    pub auth_status_cache_capacity: Option<usize>,
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            config_path: std::env::var("REELSHELF_CONFIG").ok().map(PathBuf::from),
            server_host: std::env::var("SERVER_HOST").ok(),
            server_port: parse_var("SERVER_PORT"),
            database_url: std::env::var("DATABASE_URL").ok(),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS"),
            storage_root: std::env::var("STORAGE_ROOT").ok().map(PathBuf::from),
            share_font_path: std::env::var("SHARE_FONT_PATH")
                .ok()
                .map(PathBuf::from),
            auth_password_pepper: std::env::var("AUTH_PASSWORD_PEPPER").ok(),
            auth_token_key: std::env::var("AUTH_TOKEN_KEY").ok(),
            auth_session_ttl_hours: parse_var("AUTH_SESSION_TTL_HOURS"),
            auth_status_cache_ttl_secs: parse_var("AUTH_STATUS_CACHE_TTL_SECS"),
            auth_status_cache_capacity: parse_var("AUTH_STATUS_CACHE_CAPACITY"),
            cors_allowed_origins: parse_csv_var("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse().ok())
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| split_csv(&raw))
}

pub(crate) fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|part| {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
