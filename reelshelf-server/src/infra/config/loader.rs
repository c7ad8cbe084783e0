use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ServerConfig, ShareConfig, StorageConfig,
    },
    sources::{EnvConfig, FileConfig},
    warnings::ConfigWarnings,
};
use reelshelf_core::auth::DEFAULT_SESSION_TTL_HOURS;
use reelshelf_core::database::DEFAULT_MAX_CONNECTIONS;

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["reelshelf.toml", "config/reelshelf.toml"];

pub const DEFAULT_PASSWORD_PEPPER: &str = "reelshelf-dev-pepper";
pub const DEFAULT_TOKEN_KEY: &str = "reelshelf-dev-token-key";
pub const DEFAULT_STATUS_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_STATUS_CACHE_CAPACITY: usize = 10_000;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment and the TOML file, and
    /// compose them. Environment values win over file values.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                dotenvy::Error::Io(_) => Ok(false),
                _ => Err(err),
            })?,
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose from an already gathered environment.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            Some(path) => path,
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    toml::from_str(&contents).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No reelshelf.toml detected; using environment variables and defaults",
            "Create reelshelf.toml or set REELSHELF_CONFIG",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        storage: file_storage,
        share: file_share,
        auth: file_auth,
        cors: file_cors,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(3000),
    };

    let database = DatabaseConfig {
        url: env
            .database_url
            .or(file_database.url)
            .filter(|url| !url.trim().is_empty()),
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };
    if database.max_connections == 0 {
        return Err(ConfigLoadError::InvalidValue {
            field: "database.max_connections",
            reason: "must be at least 1".into(),
        });
    }
    if database.url.is_none() {
        warnings.push_with_hint(
            "No database URL configured",
            "Set DATABASE_URL or database.url",
        );
    }

    let storage = StorageConfig {
        root: env
            .storage_root
            .or(file_storage.root)
            .unwrap_or_else(|| PathBuf::from("./data")),
    };

    let share = ShareConfig {
        font_path: env.share_font_path.or(file_share.font_path),
    };

    let password_pepper = env
        .auth_password_pepper
        .or(file_auth.password_pepper)
        .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string());
    let token_key = env
        .auth_token_key
        .or(file_auth.token_key)
        .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string());
    if password_pepper == DEFAULT_PASSWORD_PEPPER
        || token_key == DEFAULT_TOKEN_KEY
    {
        warnings.push_with_hint(
            "Development authentication secrets are in use",
            "Set AUTH_PASSWORD_PEPPER and AUTH_TOKEN_KEY before deploying",
        );
    }

    let auth = AuthConfig {
        password_pepper,
        token_key,
        session_ttl_hours: env
            .auth_session_ttl_hours
            .or(file_auth.session_ttl_hours)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
        status_cache_ttl_secs: env
            .auth_status_cache_ttl_secs
            .or(file_auth.status_cache_ttl_secs)
            .unwrap_or(DEFAULT_STATUS_CACHE_TTL_SECS),
        status_cache_capacity: env
            .auth_status_cache_capacity
            .or(file_auth.status_cache_capacity)
            .unwrap_or(DEFAULT_STATUS_CACHE_CAPACITY),
    };
    if auth.session_ttl_hours <= 0 {
        return Err(ConfigLoadError::InvalidValue {
            field: "auth.session_ttl_hours",
            reason: "must be positive".into(),
        });
    }
    if auth.status_cache_capacity == 0 {
        return Err(ConfigLoadError::InvalidValue {
            field: "auth.status_cache_capacity",
            reason: "must be at least 1".into(),
        });
    }

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
    };

    let config = Config {
        server,
        database,
        storage,
        share,
        auth,
        cors,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    Ok((config, warnings))
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}
