use crate::client::{create_rest_client, Config};
use crate::error::{Result, TmdbError};
use crate::response::{Param, Response};
use crate::token::Token;
use chrono::{DateTime, Utc};
use hyper::ext::ReasonPhrase;
use reqwest::blocking::{Client, Response as HttpResponse};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::instrument;
use url::Url;

/// Page size sent as `top` when the caller does not pick one.
pub const DEFAULT_TOP: u64 = 10_000;

/// Token and the default headers derived from it. Replaced as a whole on
/// every successful authentication.
#[derive(Debug, Default)]
struct SessionState {
    token: Option<Token>,
    headers: HeaderMap,
}

/// Authenticated session against the TMDB REST API.
///
/// Owns the HTTP transport and the current session token. Every request
/// first checks the token and re-authenticates when it expires within
/// [`RENEWAL_MARGIN_SECS`](crate::RENEWAL_MARGIN_SECS). The check and
/// the renewal run under one lock, so a `RestContext` can be shared between
/// threads.
pub struct RestContext {
    /// HTTP client
    client: Client,
    /// Configuration
    config: Config,
    /// Base URL for API requests, ending in `/`
    base_url: String,
    api_key: String,
    state: Mutex<SessionState>,
}

impl fmt::Debug for RestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestContext")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("token_expiry", &self.token_expiry())
            .finish()
    }
}

impl RestContext {
    /// Create an unauthenticated context; the first request authenticates.
    pub fn new(api_key: String, config: Config) -> Result<Self> {
        Ok(RestContext {
            client: create_rest_client(&config)?,
            base_url: config.base_url(),
            config,
            api_key,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Configuration this context was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Expiry of the current session token, `None` before the first
    /// successful authentication
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.lock_state().token.as_ref().map(Token::expires_at)
    }

    /// Request a new session token and install it for all later requests.
    ///
    /// # Returns
    /// The absolute expiry of the new token
    #[instrument(skip_all)]
    pub fn authenticate(&self) -> Result<DateTime<Utc>> {
        let mut state = self.lock_state();
        self.authenticate_locked(&mut state)
    }

    /// Re-authenticate if the token is missing or expires within the
    /// renewal margin.
    ///
    /// # Returns
    /// The expiry of the token that the next request will use
    #[instrument(skip_all)]
    pub fn ensure_authenticated(&self) -> Result<DateTime<Utc>> {
        let mut state = self.lock_state();
        self.ensure_authenticated_locked(&mut state)
    }

    /// Send a request with the session headers and return the raw HTTP response
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `url` - Absolute request URL
    /// * `params` - Query string pairs, appended as given
    /// * `body` - Optional JSON body
    #[instrument(skip_all, fields(method = %method, url = %url))]
    pub fn request(
        &self,
        method: Method,
        url: Url,
        params: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let headers = {
            let mut state = self.lock_state();
            self.ensure_authenticated_locked(&mut state)?;
            state.headers.clone()
        };

        tracing::debug!(?params, "sending request");

        let mut request = self.client.request(method, url).headers(headers);
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        request.send().map_err(|e| {
            tracing::error!(error = %e, "request failed");
            TmdbError::RequestFailed(e)
        })
    }

    /// Execute a JSON request against an API endpoint
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `endpoint` - Path relative to the versioned base URL, e.g. `movie/550`
    /// * `params` - Query parameters; `top` defaults to [`DEFAULT_TOP`]
    /// * `data` - Optional JSON body
    ///
    /// # Returns
    /// The decoded response for any 2xx status
    pub fn do_request(
        &self,
        method: Method,
        endpoint: &str,
        params: &Param,
        data: Option<&Value>,
    ) -> Result<Response> {
        let params = with_default_params(params);
        let url = self.endpoint_url(endpoint)?;

        let http_response = self.request(method, url, &query_pairs(&params), data)?;
        let status = http_response.status();
        let reason = reason_phrase(&http_response);

        let body = http_response.bytes().map_err(|e| {
            tracing::error!(
                success = false,
                status = status.as_u16(),
                error = %e,
                "failed to read response body"
            );
            TmdbError::RequestFailed(e)
        })?;

        let data: Value = serde_json::from_slice(&body).map_err(|e| {
            tracing::error!(
                success = false,
                status = status.as_u16(),
                error = %e,
                "bad JSON in response"
            );
            TmdbError::BadResponseFormat(e)
        })?;

        if status.is_success() {
            tracing::debug!(success = true, status = status.as_u16(), %reason, "request completed");
            return Ok(Response::new(status.as_u16(), reason, data));
        }

        tracing::error!(success = false, status = status.as_u16(), %reason, "request failed");
        Err(TmdbError::api(status, reason, data))
    }

    /// HTTP GET against an API endpoint
    pub fn get(&self, endpoint: &str, params: &Param) -> Result<Response> {
        self.do_request(Method::GET, endpoint, params, None)
    }

    /// HTTP POST against an API endpoint with a JSON body
    pub fn post(&self, endpoint: &str, params: &Param, data: &Value) -> Result<Response> {
        self.do_request(Method::POST, endpoint, params, Some(data))
    }

    /// HTTP GET of an absolute URL with the session headers.
    ///
    /// No base URL or default parameters are applied and the response is
    /// returned unread, whatever its status.
    pub fn download_file(&self, file_url: &str) -> Result<HttpResponse> {
        let url = Url::parse(file_url)?;
        self.request(Method::GET, url, &[], None)
    }

    /// Download an absolute URL into `writer`.
    ///
    /// # Returns
    /// The number of bytes written
    pub fn download_to<W>(&self, file_url: &str, writer: &mut W) -> Result<u64>
    where
        W: Write + ?Sized,
    {
        let mut http_response = self.download_file(file_url)?;
        let status = http_response.status();

        if !status.is_success() {
            let reason = reason_phrase(&http_response);
            tracing::error!(success = false, status = status.as_u16(), %reason, "download failed");
            return Err(TmdbError::api(status, reason, Value::Null));
        }

        let written = std::io::copy(&mut http_response, writer)?;
        tracing::debug!(bytes = written, "download completed");
        Ok(written)
    }

    fn authenticate_locked(&self, state: &mut SessionState) -> Result<DateTime<Utc>> {
        let auth_url = self.config.auth_url();
        if self.config.safe_logging {
            tracing::debug!(url = %auth_url, "requesting session token");
        } else {
            tracing::debug!(url = %auth_url, api_key = %self.api_key, "requesting session token");
        }

        let reply = self
            .client
            .post(&auth_url)
            .query(&[("api_key", self.api_key.as_str())])
            .json(&self.api_key)
            .send()
            .and_then(|response| response.bytes())
            .map_err(|e| {
                // the URL carries the API key
                let e = if self.config.safe_logging { e.without_url() } else { e };
                tracing::error!(error = %e, "authentication request failed");
                TmdbError::RequestFailed(e)
            })?;

        let grant: Value = serde_json::from_slice(&reply).map_err(|e| {
            tracing::error!(error = %e, "bad JSON in token response");
            TmdbError::BadResponseFormat(e)
        })?;

        let token = Token::from_grant(&grant, Utc::now()).map_err(|e| {
            tracing::error!(error = %e, "authentication rejected");
            e
        })?;
        let headers = token.default_headers()?;
        let expires_at = token.expires_at();

        *state = SessionState {
            token: Some(token),
            headers,
        };

        tracing::debug!(%expires_at, "session token installed");
        Ok(expires_at)
    }

    fn ensure_authenticated_locked(&self, state: &mut SessionState) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        if let Some(token) = state.token.as_ref().filter(|t| !t.needs_renewal(now)) {
            return Ok(token.expires_at());
        }

        if state.token.is_some() {
            tracing::debug!("session token about to expire, re-authenticating");
        }
        self.authenticate_locked(state)
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let url = format!("{}{}", self.base_url, endpoint.trim_start_matches('/'));
        Ok(Url::parse(&url)?)
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Reason phrase from the status line, or the canonical one when the server
/// sent the standard text
fn reason_phrase(response: &HttpResponse) -> String {
    match response.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => response
            .status()
            .canonical_reason()
            .unwrap_or_default()
            .to_string(),
    }
}

/// Fresh copy of `params` with `top` set to [`DEFAULT_TOP`] unless present
pub fn with_default_params(params: &Param) -> Param {
    let mut merged = params.clone();
    merged
        .entry("top".to_string())
        .or_insert_with(|| Value::from(DEFAULT_TOP));
    merged
}

/// Flatten parameters into query string pairs, sorted by key.
/// Strings are sent bare, `null` values are left out, anything else as JSON.
pub fn query_pairs(params: &Param) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect();
    pairs.sort();
    pairs
}
