use crate::client::{Config, SUPPORTED_API_VERSIONS};
use crate::error::Result;
use crate::response::{Param, Response};
use crate::rest::RestContext;
use reqwest::blocking::Response as HttpResponse;
use serde_json::Value;
use std::io::Write;

/// Entry point for the TMDB API.
///
/// Construction authenticates once; afterwards the session token is renewed
/// transparently whenever it gets close to expiry.
#[derive(Debug)]
pub struct TmdbApi {
    rest: RestContext,
}

impl TmdbApi {
    /// Connect to the public TMDB v3 API with safe logging enabled
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, Config::default())
    }

    /// Connect with a configuration read from `TMDB_*` environment variables
    pub fn from_env(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, Config::from_env()?)
    }

    /// Connect with a custom configuration.
    ///
    /// An API version outside [`SUPPORTED_API_VERSIONS`] is logged as a
    /// warning and used anyway.
    pub fn with_config(api_key: impl Into<String>, config: Config) -> Result<Self> {
        if !config.is_supported_version() {
            tracing::warn!(
                api_version = config.api_version,
                supported = ?SUPPORTED_API_VERSIONS,
                "Untested API version"
            );
        }

        let rest = RestContext::new(api_key.into(), config)?;
        rest.authenticate()?;

        Ok(TmdbApi { rest })
    }

    /// The underlying authenticated session
    pub fn rest(&self) -> &RestContext {
        &self.rest
    }

    /// HTTP GET against an API endpoint, e.g. `movie/550`
    pub fn get(&self, endpoint: &str, params: &Param) -> Result<Response> {
        self.rest.get(endpoint, params)
    }

    /// HTTP POST against an API endpoint with a JSON body
    pub fn post(&self, endpoint: &str, params: &Param, data: &Value) -> Result<Response> {
        self.rest.post(endpoint, params, data)
    }

    /// GET an absolute URL with the session headers, response unread
    pub fn download_file(&self, file_url: &str) -> Result<HttpResponse> {
        self.rest.download_file(file_url)
    }

    /// Download an absolute URL into `writer`
    pub fn download_to<W>(&self, file_url: &str, writer: &mut W) -> Result<u64>
    where
        W: Write + ?Sized,
    {
        self.rest.download_to(file_url, writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TmdbError;
    use tracing_test::traced_test;

    fn unreachable_config() -> Config {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        Config::new("http".to_string(), format!("127.0.0.1:{}", port))
    }

    #[test]
    #[traced_test]
    fn test_unsupported_version_warns_and_proceeds() {
        let result = TmdbApi::with_config("key", unreachable_config().with_api_version(4));

        // the version is only flagged; construction goes on to authenticate
        assert!(matches!(result, Err(TmdbError::RequestFailed(_))));
        assert!(logs_contain("Untested API version"));
        assert!(logs_contain("requesting session token"));
    }

    #[test]
    #[traced_test]
    fn test_supported_version_does_not_warn() {
        let _ = TmdbApi::with_config("key", unreachable_config());
        assert!(!logs_contain("Untested API version"));
    }
}
