use crate::scoring::SchemaVariant;
use crate::tabular::{IngestOptions, DEFAULT_MIN_FACTORS};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Default request body limit for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Deployment stage the service runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the service and the command line.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Read `.env` if present, then the `APP_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&env_or("APP_ENV", "development"));
        let server = ServerConfig {
            host: env_or("APP_HOST", "127.0.0.1"),
            port: env_or("APP_PORT", "3000")
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort)?,
        };
        let telemetry = TelemetryConfig {
            log_level: env_or("APP_LOG_LEVEL", "info"),
        };

        let variant = match env::var("APP_SCHEMA_VARIANT") {
            Ok(value) => value
                .parse::<SchemaVariant>()
                .map_err(|_| ConfigError::InvalidSchemaVariant { value })?,
            Err(_) => SchemaVariant::default(),
        };
        let scoring = ScoringConfig {
            variant,
            min_factors: positive_env(
                "APP_MIN_FACTORS",
                DEFAULT_MIN_FACTORS,
                ConfigError::InvalidMinFactors,
            )?,
            max_upload_bytes: positive_env(
                "APP_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
                ConfigError::InvalidUploadLimit,
            )?,
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            scoring,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// A variable that must hold an integer above zero when set.
fn positive_env(key: &str, default: usize, invalid: ConfigError) -> Result<usize, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|parsed| *parsed > 0)
            .ok_or(invalid),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Which factor registry is active and how uploads are filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub variant: SchemaVariant,
    pub min_factors: usize,
    pub max_upload_bytes: usize,
}

impl ScoringConfig {
    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            min_factors: self.min_factors,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            variant: SchemaVariant::default(),
            min_factors: DEFAULT_MIN_FACTORS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSchemaVariant { value: String },
    InvalidMinFactors,
    InvalidUploadLimit,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSchemaVariant { value } => write!(
                f,
                "APP_SCHEMA_VARIANT must be 'standard' or 'extended', got '{value}'"
            ),
            ConfigError::InvalidMinFactors => {
                write!(f, "APP_MIN_FACTORS must be a positive integer")
            }
            ConfigError::InvalidUploadLimit => {
                write!(f, "APP_MAX_UPLOAD_BYTES must be a positive number of bytes")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSchemaVariant { .. }
            | ConfigError::InvalidMinFactors
            | ConfigError::InvalidUploadLimit => None,
        }
    }
}
