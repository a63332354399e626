//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Background queue configuration.
    #[serde(default)]
    pub queue: QueueConfig,
    /// Board presentation settings.
    #[serde(default)]
    pub board: BoardConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
}

/// Background queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Whether the voter notification worker runs in this process.
    #[serde(default = "default_true")]
    pub run_workers: bool,
    /// Attempts per job before it is dead-lettered.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    /// Concurrent jobs per worker.
    #[serde(default = "default_worker_concurrency")]
    pub concurrency: usize,
}

/// Board presentation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Board name shown in page titles.
    #[serde(default = "default_board_name")]
    pub name: String,
    /// Maximum notifications shown in the bell dropdown.
    #[serde(default = "default_notification_page_size")]
    pub notification_page_size: u64,
    /// Characters of a comment kept in a notification payload.
    #[serde(default = "default_comment_excerpt_length")]
    pub comment_excerpt_length: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            run_workers: default_true(),
            max_attempts: default_max_attempts(),
            concurrency: default_worker_concurrency(),
        }
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            notification_page_size: default_notification_page_size(),
            comment_excerpt_length: default_comment_excerpt_length(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_true() -> bool {
    true
}

const fn default_max_attempts() -> usize {
    3
}

const fn default_worker_concurrency() -> usize {
    4
}

fn default_board_name() -> String {
    "Idea Board".to_string()
}

const fn default_notification_page_size() -> u64 {
    20
}

const fn default_comment_excerpt_length() -> usize {
    50
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `IDEABOARD_ENV`)
    /// 3. Environment variables with `IDEABOARD_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("IDEABOARD_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("IDEABOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("IDEABOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
