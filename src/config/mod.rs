// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::{AppState, StateError};
pub use types::{
    Config, ErrorsConfig, HealthConfig, LoggingConfig, MetricsConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Directory of error documents
pub const ERROR_FILES_PATH_ENV: &str = "ERROR_FILES_PATH";
/// Default response format
pub const DEFAULT_RESPONSE_FORMAT_ENV: &str = "DEFAULT_RESPONSE_FORMAT";
/// Any non-empty value enables the debug header echo
pub const DEBUG_ENV: &str = "DEBUG";

/// Default config file (without extension)
const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from the path given as first CLI argument,
    /// or "config" (any supported extension) when none is given
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load configuration from specified file path and the process environment
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_with_env(config_path, std::env::vars().collect())
    }

    /// Load configuration from specified file path and an explicit environment
    ///
    /// Precedence, lowest first: built-in defaults, config file,
    /// `SERVER_` prefixed variables (`__` separates nested keys),
    /// then `ERROR_FILES_PATH`, `DEFAULT_RESPONSE_FORMAT` and `DEBUG`.
    pub fn load_with_env(
        config_path: &str,
        env: config::Map<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let root_path = env.get(ERROR_FILES_PATH_ENV).cloned();
        let default_format = env.get(DEFAULT_RESPONSE_FORMAT_ENV).cloned();
        let debug = env.get(DEBUG_ENV).map(|v| !v.is_empty());

        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("errors.root_path", "/www")?
            .set_default("errors.default_format", "text/html")?
            .set_default("errors.debug", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("performance.shutdown_grace_period", 10)?
            .set_override_option("errors.root_path", root_path)?
            .set_override_option("errors.default_format", default_format)?
            .set_override_option("errors.debug", debug)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
