//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `myhouse.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP command surface settings.
    pub server: ServerConfig,
    /// MCP listener settings.
    pub mcp: McpConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Token encryption settings.
    pub security: SecurityConfig,
    /// Rule engine settings.
    pub rules: RulesConfig,
    /// Client seeded at startup.
    pub bootstrap: BootstrapConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// MCP listener configuration. Binds on the server host.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct McpConfig {
    pub enabled: bool,
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Passphrase the token encryption key is derived from.
    pub encryption_key: Option<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("encryption_key", &self.encryption_key.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Cascade depth guard. Absent means unbounded.
    pub max_depth: Option<u32>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    pub client_id: Option<String>,
    pub client_token: Option<String>,
}

impl std::fmt::Debug for BootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapConfig")
            .field("client_id", &self.client_id)
            .field("client_token", &self.client_token.as_ref().map(|_| ".."))
            .finish()
    }
}

impl BootstrapConfig {
    /// The seed client, when both halves are configured.
    #[must_use]
    pub fn client(&self) -> Option<(&str, &str)> {
        self.client_id.as_deref().zip(self.client_token.as_deref())
    }
}

impl Config {
    /// Load configuration from `myhouse.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("myhouse.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MYHOUSE_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("MYHOUSE_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("MYHOUSE_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("MYHOUSE_MCP_PORT") {
            if let Ok(port) = val.parse() {
                self.mcp.port = port;
            }
        }
        if let Ok(val) = std::env::var("MYHOUSE_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("MYHOUSE_ENCRYPTION_KEY") {
            self.security.encryption_key = Some(val);
        }
        if let Ok(val) = std::env::var("MYHOUSE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.mcp.enabled {
            if self.mcp.port == 0 {
                return Err(ConfigError::Validation(
                    "mcp port must be non-zero".to_string(),
                ));
            }
            if self.mcp.port == self.server.port {
                return Err(ConfigError::Validation(
                    "mcp port must differ from server port".to_string(),
                ));
            }
        }
        if self.rules.max_depth == Some(0) {
            return Err(ConfigError::Validation(
                "rules.max_depth must be non-zero".to_string(),
            ));
        }
        if self.bootstrap.client_id.is_some() != self.bootstrap.client_token.is_some() {
            return Err(ConfigError::Validation(
                "bootstrap needs both client_id and client_token".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address of the command surface.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the `host:port` bind address of the MCP listener.
    #[must_use]
    pub fn mcp_bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.mcp.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 3001,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:myhouse.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "myhoused=info,myhouse=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
