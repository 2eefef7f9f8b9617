use std::env;
use std::str::FromStr;
use crate::error::{EngineError, EngineResult};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Search engine configuration
    pub engine: EngineConfig,
    /// Optional startup seeding
    pub seed: Option<SeedConfig>,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Whole-request deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

/// Search engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine base URL, without trailing slash
    pub base_url: String,
    /// Index holding employee documents
    pub index: String,
    /// Outbound call deadline in milliseconds
    pub request_timeout_ms: u64,
    /// Outbound connect deadline in milliseconds
    pub connect_timeout_ms: u64,
}

/// Half-open identifier range seeded at startup
#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub id_start: i64,
    pub id_end: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> EngineResult<Self> {
        // Load .env file if it exists
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("Could not load .env file: {}", e);
        }

        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
                request_timeout_ms: parse_var("REQUEST_TIMEOUT_MS", defaults.server.request_timeout_ms)?,
                max_request_size: parse_var("MAX_REQUEST_SIZE", defaults.server.max_request_size)?,
            },
            engine: EngineConfig {
                base_url: env::var("ENGINE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.engine.base_url),
                index: env::var("ENGINE_INDEX").unwrap_or(defaults.engine.index),
                request_timeout_ms: parse_var("ENGINE_TIMEOUT_MS", defaults.engine.request_timeout_ms)?,
                connect_timeout_ms: parse_var("ENGINE_CONNECT_TIMEOUT_MS", defaults.engine.connect_timeout_ms)?,
            },
            seed: seed_from_env()?,
        };

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> EngineResult<()> {
        if self.server.port == 0 {
            return Err(EngineError::ConfigError("Server port cannot be 0".to_string()));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(EngineError::ConfigError("Request timeout must be greater than 0".to_string()));
        }

        let url = url::Url::parse(&self.engine.base_url)
            .map_err(|e| EngineError::ConfigError(format!("Invalid ENGINE_URL: {}", e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(EngineError::ConfigError("ENGINE_URL must start with http:// or https://".to_string()));
        }

        if self.engine.index.is_empty()
            || self.engine.index.contains('/')
            || self.engine.index.chars().any(|c| c.is_uppercase())
        {
            return Err(EngineError::ConfigError(
                "ENGINE_INDEX must be a non-empty lowercase name without '/'".to_string(),
            ));
        }

        if self.engine.request_timeout_ms == 0 || self.engine.connect_timeout_ms == 0 {
            return Err(EngineError::ConfigError("Engine timeouts must be greater than 0".to_string()));
        }

        if let Some(seed) = &self.seed {
            if seed.id_start > seed.id_end {
                return Err(EngineError::ConfigError(format!(
                    "Seed range start {} is greater than end {}",
                    seed.id_start, seed.id_end
                )));
            }
        }

        Ok(())
    }
}

fn parse_var<T>(name: &str, default: T) -> EngineResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| EngineError::ConfigError(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

fn seed_from_env() -> EngineResult<Option<SeedConfig>> {
    let start = env::var("SEED_ID_START").ok();
    let end = env::var("SEED_ID_END").ok();

    match (start, end) {
        (None, None) => Ok(None),
        (Some(start), Some(end)) => {
            let id_start = start
                .parse()
                .map_err(|e| EngineError::ConfigError(format!("Invalid SEED_ID_START: {}", e)))?;
            let id_end = end
                .parse()
                .map_err(|e| EngineError::ConfigError(format!("Invalid SEED_ID_END: {}", e)))?;
            Ok(Some(SeedConfig { id_start, id_end }))
        }
        _ => Err(EngineError::ConfigError(
            "SEED_ID_START and SEED_ID_END must be set together".to_string(),
        )),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8181,
                request_timeout_ms: 10_000,
                max_request_size: 65_536, // 64KB
            },
            engine: EngineConfig {
                base_url: "http://localhost:9200".to_string(),
                index: "employee".to_string(),
                request_timeout_ms: 5_000,
                connect_timeout_ms: 2_000,
            },
            seed: None,
        }
    }
}
