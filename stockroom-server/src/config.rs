//! Server configuration, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

use stockroom_core::thresholds::{DEFAULT_TOP_N, LOW_STOCK_THRESHOLD};
use stockroom_core::{DashboardOptions, ParsePolicyError, ValidationPolicy};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = ":memory:";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("STOCKROOM_VALIDATION_POLICY: {0}")]
    Policy(#[from] ParsePolicyError),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// SQLite path, or `:memory:` for a process-lifetime database.
    pub database: String,
    pub validation_policy: ValidationPolicy,
    /// Directory where uploads are spooled while they are imported.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub dashboard: DashboardOptions,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            database: DEFAULT_DATABASE.to_string(),
            validation_policy: ValidationPolicy::default(),
            upload_dir: env::temp_dir().join("stockroom-uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            dashboard: DashboardOptions::default(),
            log_json: false,
        }
    }
}

fn lookup_bool(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: bool) -> bool {
    lookup(name)
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn lookup_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> T {
    lookup(name)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port: u16 = lookup_parsed(&lookup, "PORT", DEFAULT_PORT);
        let bind_addr = lookup("STOCKROOM_BIND").unwrap_or_else(|| format!("0.0.0.0:{port}"));

        let validation_policy = match lookup("STOCKROOM_VALIDATION_POLICY") {
            Some(raw) => raw.parse::<ValidationPolicy>()?,
            None => defaults.validation_policy,
        };

        Ok(Self {
            bind_addr,
            database: lookup("STOCKROOM_DATABASE").unwrap_or(defaults.database),
            validation_policy,
            upload_dir: lookup("STOCKROOM_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: lookup_parsed(
                &lookup,
                "STOCKROOM_MAX_UPLOAD_BYTES",
                DEFAULT_MAX_UPLOAD_BYTES,
            ),
            dashboard: DashboardOptions {
                top_n: lookup_parsed(&lookup, "STOCKROOM_TOP_N", DEFAULT_TOP_N),
                low_stock_threshold: lookup_parsed(
                    &lookup,
                    "STOCKROOM_LOW_STOCK_THRESHOLD",
                    LOW_STOCK_THRESHOLD,
                ),
            },
            log_json: lookup_bool(&lookup, "STOCKROOM_LOG_JSON", false),
        })
    }
}
