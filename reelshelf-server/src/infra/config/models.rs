use std::path::PathBuf;

/// Fully resolved server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub share: ShareConfig,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Blob root; share images live under `share-images/`.
    pub root: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ShareConfig {
    /// TrueType font used to render share images.
    pub font_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub password_pepper: String,
    pub token_key: String,
    pub session_ttl_hours: i64,
    pub status_cache_ttl_secs: u64,
    pub status_cache_capacity: usize,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password_pepper", &"<redacted>")
            .field("token_key", &"<redacted>")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .field("status_cache_ttl_secs", &self.status_cache_ttl_secs)
            .field("status_cache_capacity", &self.status_cache_capacity)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Empty means any origin.
    pub allowed_origins: Vec<String>,
}

/// Where the configuration came from, for startup logging.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
