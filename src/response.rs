use serde_json::Value;

/// Param is a convenience type for query parameters passed to TMDB requests.
pub type Param = std::collections::HashMap<String, Value>;

/// Response is the outcome of a successful TMDB call: the HTTP status,
/// its reason phrase and the decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status_code: u16,
    message: String,
    data: Value,
}

impl Response {
    /// Create a new Response
    pub fn new(status_code: u16, message: impl Into<String>, data: Value) -> Self {
        Response {
            status_code,
            message: message.into(),
            data,
        }
    }

    /// HTTP status code
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Human readable result, usually the HTTP reason phrase
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the raw decoded payload
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consume the response and return the payload
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Apply unmarshals the response data into the provided type
    pub fn apply<T>(&self) -> Result<T, crate::error::TmdbError>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(self.data.clone()).map_err(|e| e.into())
    }

    /// Get a value from the response data by a slash-separated path.
    /// For example, "genres/0/name" reads the name of the first genre.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let parts = path.split('/').filter(|s| !s.is_empty());

        let mut current = &self.data;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    /// Get a string value from the response data by a slash-separated path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(|v| v.as_str().map(|s| s.to_string()))
    }
}
