use crate::error::{Result, TmdbError};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Tokens expiring within this many seconds are renewed before use.
pub const RENEWAL_MARGIN_SECS: i64 = 120;

/// Reply of the token endpoint, success or failure.
#[derive(Debug, Deserialize)]
struct Grant {
    #[serde(rename = "access_token")]
    access_token: Option<String>,

    #[serde(rename = "expires_in")]
    expires_in: Option<i64>,

    /// Error description on failure
    details: Option<String>,

    /// TMDB's usual error text
    status_message: Option<String>,
}

/// Token is a bearer session token together with its absolute expiry.
#[derive(Clone)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

// the bearer value stays out of Debug output
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Token {
    /// Create a new Token
    pub fn new(access_token: String, expires_at: DateTime<Utc>) -> Self {
        Token {
            access_token,
            expires_at,
        }
    }

    /// Build a Token from a decoded token endpoint reply received at `now`.
    ///
    /// The reply must carry `access_token` (string) and `expires_in`
    /// (integer seconds). Otherwise the error message is taken from
    /// `details`, then `status_message`.
    pub fn from_grant(grant: &Value, now: DateTime<Utc>) -> Result<Self> {
        let grant = Grant::deserialize(grant).map_err(|e| {
            TmdbError::AuthenticationFailed(format!("malformed token response: {e}"))
        })?;

        let (Some(access_token), Some(expires_in)) = (grant.access_token, grant.expires_in) else {
            let details = grant
                .details
                .or(grant.status_message)
                .unwrap_or_else(|| "token response is missing access_token or expires_in".to_string());
            return Err(TmdbError::AuthenticationFailed(details));
        };

        let expires_at = Duration::try_seconds(expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                TmdbError::AuthenticationFailed(format!("expires_in out of range: {expires_in}"))
            })?;

        Ok(Token::new(access_token, expires_at))
    }

    /// Absolute expiry of the token
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Check if the token expires within the renewal margin of `now`
    pub fn needs_renewal(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(RENEWAL_MARGIN_SECS) >= self.expires_at
    }

    /// Default headers carrying this token for every authenticated request
    pub fn default_headers(&self) -> Result<HeaderMap> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", self.access_token))
            .map_err(|_| {
                TmdbError::AuthenticationFailed("access token is not a valid header value".to_string())
            })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }
}
