//! Configuration management for the wabridge service.

use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use wabridge_gateway::GatewayConfig;

const CONFIG_FILE: &str = "wabridge.toml";

/// Older environment variable names and the fields they set.
const LEGACY_ENV_NAMES: &[(&str, &str)] = &[
    ("db_uri", "database_url"),
    ("instance_id", "gateway_instance_id"),
    ("api_token", "gateway_api_token"),
];

/// Returns the field a legacy environment variable name sets.
fn legacy_field(key: &str) -> Option<&'static str> {
    LEGACY_ENV_NAMES
        .iter()
        .find(|(legacy, _)| key.eq_ignore_ascii_case(legacy))
        .map(|(_, field)| *field)
}

fn env_is_set(name: &str) -> bool {
    std::env::vars_os()
        .any(|(key, _)| key.to_str().is_some_and(|key| key.eq_ignore_ascii_case(name)))
}

/// Complete service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`wabridge.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// Environment variable names are matched case-insensitively against the
/// field names below. The gateway instance id and token have no default and
/// must be provided.
///
/// `DB_URI`, `INSTANCE_ID` and `API_TOKEN` are accepted as older names. When
/// both an older and the current name are set, the current name wins.
///
/// # Example
///
/// ```no_run
/// use wabridge_api::Config;
///
/// let config = Config::load().expect("Failed to load configuration");
///
/// println!("Server will bind to {}:{}", config.host, config.port);
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    // Database
    /// PostgreSQL connection URL.
    ///
    /// Environment variable: `DATABASE_URL` (or `DB_URI`)
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Maximum number of database connections in the pool.
    ///
    /// Environment variable: `DATABASE_MAX_CONNECTIONS`
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    /// Minimum number of connections to maintain in the pool.
    ///
    /// Environment variable: `DATABASE_MIN_CONNECTIONS`
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    /// Database connection acquire timeout in seconds.
    ///
    /// Environment variable: `DATABASE_CONNECTION_TIMEOUT`
    #[serde(default = "default_acquire_timeout")]
    pub database_connection_timeout: u64,

    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    // Gateway
    /// Base URL of the gateway API.
    ///
    /// Environment variable: `GATEWAY_API_URL`
    #[serde(default = "default_gateway_api_url")]
    pub gateway_api_url: String,
    /// Gateway instance identifier.
    ///
    /// Environment variable: `GATEWAY_INSTANCE_ID` (or `INSTANCE_ID`)
    #[serde(default, deserialize_with = "string_or_number")]
    pub gateway_instance_id: String,
    /// Gateway instance API token.
    ///
    /// Environment variable: `GATEWAY_API_TOKEN` (or `API_TOKEN`)
    #[serde(default, deserialize_with = "string_or_number")]
    pub gateway_api_token: String,
    /// Timeout for a single gateway call in seconds.
    ///
    /// Environment variable: `GATEWAY_TIMEOUT_SECONDS`
    #[serde(default = "default_gateway_timeout")]
    pub gateway_timeout_seconds: u64,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

impl Config {
    /// Load configuration from defaults, config file, and environment variable
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the merged
    /// configuration fails validation.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(
                Env::prefixed("")
                    .filter(|key| {
                        legacy_field(key.as_str()).map_or(true, |field| !env_is_set(field))
                    })
                    .map(|key| {
                        legacy_field(key.as_str()).map_or_else(|| key.as_str().into(), Into::into)
                    }),
            );

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Convert to the gateway client's configuration.
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(&self.gateway_instance_id, &self.gateway_api_token)
            .with_api_url(&self.gateway_api_url)
            .with_timeout(Duration::from_secs(self.gateway_timeout_seconds))
    }

    /// Parse server socket address from host and port configuration.
    pub fn parse_server_addr(&self) -> Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.host, self.port);
        SocketAddr::from_str(&addr_str).context("Invalid server address")
    }

    /// Get database URL with password masked for logging.
    pub fn database_url_masked(&self) -> String {
        if let Some(at_pos) = self.database_url.find('@') {
            if let Some(colon_pos) = self.database_url[..at_pos].rfind(':') {
                // A colon right after the scheme means there is no password
                if !self.database_url[..colon_pos].ends_with("postgresql")
                    && !self.database_url[..colon_pos].ends_with("postgres")
                {
                    let mut masked = self.database_url.clone();
                    masked.replace_range(colon_pos + 1..at_pos, "***");
                    return masked;
                }
            }
        }
        self.database_url.clone()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            anyhow::bail!("port must be greater than 0");
        }

        if self.database_max_connections == 0 {
            anyhow::bail!("database max_connections must be greater than 0");
        }

        if self.database_min_connections > self.database_max_connections {
            anyhow::bail!("database min_connections cannot exceed max_connections");
        }

        if self.gateway_instance_id.trim().is_empty() {
            anyhow::bail!("gateway_instance_id must be set (GATEWAY_INSTANCE_ID or INSTANCE_ID)");
        }

        if self.gateway_api_token.trim().is_empty() {
            anyhow::bail!("gateway_api_token must be set (GATEWAY_API_TOKEN or API_TOKEN)");
        }

        reqwest::Url::parse(&self.gateway_api_url).context("gateway_api_url is not a valid URL")?;

        Ok(())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url_masked())
            .field("database_max_connections", &self.database_max_connections)
            .field("database_min_connections", &self.database_min_connections)
            .field("database_connection_timeout", &self.database_connection_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .field("gateway_api_url", &self.gateway_api_url)
            .field("gateway_instance_id", &self.gateway_instance_id)
            .field("gateway_api_token", &"***")
            .field("gateway_timeout_seconds", &self.gateway_timeout_seconds)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            database_max_connections: default_max_connections(),
            database_min_connections: default_min_connections(),
            database_connection_timeout: default_acquire_timeout(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            gateway_api_url: default_gateway_api_url(),
            gateway_instance_id: String::new(),
            gateway_api_token: String::new(),
            gateway_timeout_seconds: default_gateway_timeout(),
            rust_log: default_log_level(),
        }
    }
}

/// Environment values that look numeric (instance ids) arrive as numbers.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
    })
}

fn default_database_url() -> String {
    "postgresql://localhost/wabridge".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_gateway_api_url() -> String {
    wabridge_gateway::DEFAULT_API_URL.to_string()
}

fn default_gateway_timeout() -> u64 {
    wabridge_gateway::DEFAULT_TIMEOUT_SECONDS
}

fn default_log_level() -> String {
    "info,wabridge=debug,tower_http=debug".to_string()
}
