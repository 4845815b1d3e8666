use crate::error::{Result, TmdbError};
use reqwest::blocking::{Client, ClientBuilder};
use std::str::FromStr;
use std::time::Duration;

/// API versions this crate has been exercised against
pub const SUPPORTED_API_VERSIONS: &[u32] = &[3];

/// Create the HTTP client for TMDB requests
/// with connection pooling and the configured timeouts
pub fn create_rest_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .pool_max_idle_per_host(50)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Configuration for the TMDB client
#[derive(Debug, Clone)]
pub struct Config {
    /// URL scheme (http or https)
    pub scheme: String,
    /// API host, optionally with a port
    pub host: String,
    /// API version, used as the first path segment
    pub api_version: u32,
    /// Keep the API key out of log output
    pub safe_logging: bool,
    /// Overall per-request timeout
    pub timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scheme: "https".to_string(),
            host: "api.themoviedb.org".to_string(),
            api_version: 3,
            safe_logging: true,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Create a new configuration with the given scheme and host
    pub fn new(scheme: String, host: String) -> Self {
        Config {
            scheme,
            host,
            ..Config::default()
        }
    }

    /// Build a configuration from `TMDB_*` environment variables,
    /// falling back to defaults for anything unset
    ///
    /// Recognised variables: `TMDB_API_SCHEME`, `TMDB_API_HOST`,
    /// `TMDB_API_VERSION`, `TMDB_SAFE_LOGGING`, `TMDB_TIMEOUT_SECS`,
    /// `TMDB_CONNECT_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reading values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(scheme) = lookup("TMDB_API_SCHEME") {
            config.scheme = match scheme.trim().to_ascii_lowercase().as_str() {
                s @ ("http" | "https") => s.to_string(),
                _ => {
                    return Err(TmdbError::InvalidConfig(format!(
                        "TMDB_API_SCHEME: expected http or https, got {scheme:?}"
                    )))
                }
            };
        }
        if let Some(host) = lookup("TMDB_API_HOST") {
            config.host = host;
        }
        if let Some(version) = lookup("TMDB_API_VERSION") {
            config.api_version = parse_var("TMDB_API_VERSION", &version)?;
        }
        if let Some(flag) = lookup("TMDB_SAFE_LOGGING") {
            config.safe_logging = parse_flag("TMDB_SAFE_LOGGING", &flag)?;
        }
        if let Some(secs) = lookup("TMDB_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var("TMDB_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("TMDB_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout =
                Duration::from_secs(parse_var("TMDB_CONNECT_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }

    /// Set the API version
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Allow or forbid secrets in log output
    pub fn with_safe_logging(mut self, safe_logging: bool) -> Self {
        self.safe_logging = safe_logging;
        self
    }

    /// Set the overall request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Whether `api_version` is one of [`SUPPORTED_API_VERSIONS`]
    pub fn is_supported_version(&self) -> bool {
        SUPPORTED_API_VERSIONS.contains(&self.api_version)
    }

    /// Get the base URL for API requests, always ending in `/`
    pub fn base_url(&self) -> String {
        format!("{}://{}/{}/", self.scheme, self.host, self.api_version)
    }

    /// Get the token endpoint, without the API key
    pub fn auth_url(&self) -> String {
        format!("{}authentication/token/new", self.base_url())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TmdbError::InvalidConfig(format!("{name}: cannot parse {value:?}")))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(TmdbError::InvalidConfig(format!(
            "{name}: expected a boolean, got {value:?}"
        ))),
    }
}
