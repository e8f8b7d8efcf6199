use std::path::{Path, PathBuf};

use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE, DEFAULT_HOST, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT, DEFAULT_REALM, DEFAULT_REQUEST_CHARSET,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STORAGE_FOLDER,
};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub encoding: EncodingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_size: u64,
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            tls: None,
        }
    }
}

/// PEM certificate chain and private key used to serve HTTPS.
#[derive(Debug, Clone, Deserialize)]
pub struct TlsConfig {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodingConfig {
    /// Charset tried when the request does not declare one, or the declared one fails.
    pub request: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            request: DEFAULT_REQUEST_CHARSET.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Every request is granted.
    #[default]
    None,
    /// Passwords checked against `auth.users`, calendars checked against a casbin policy.
    Policy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    pub realm: String,
    #[serde(default)]
    pub policy_file: Option<PathBuf>,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            method: AuthMethod::None,
            realm: DEFAULT_REALM.to_string(),
            policy_file: None,
            users: Vec::new(),
        }
    }
}

/// A user allowed to authenticate, with an Argon2 PHC-format password hash.
#[derive(Clone, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub password_hash: String,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub folder: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_STORAGE_FOLDER),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, an optional TOML file and environment variables.
    /// Environment variables (`ALMANAC__SECTION__KEY`) take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load_from(file: &Path) -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("server.max_body_size", DEFAULT_MAX_BODY_SIZE)?
            .set_default("encoding.request", DEFAULT_REQUEST_CHARSET)?
            .set_default("auth.method", "none")?
            .set_default("auth.realm", DEFAULT_REALM)?
            .set_default("storage.folder", DEFAULT_STORAGE_FOLDER)?
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            // TOML file
            .add_source(config::File::from(file).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from `.env`, the file named by `ALMANAC_CONFIG` (or `almanac.toml`)
/// and environment variables.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let file = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);
    tracing::debug!(file = %file.display(), "Loading configuration");

    Settings::load_from(&file)
}
