/// Errors raised while talking to the CommServe REST API.
///
/// # Examples
///
/// ```rust
/// use cvmon_api::error::ApiError;
///
/// let err = ApiError::malformed("/V4/mediaAgent", "mediaAgents[0].displayName");
/// assert!(err.to_string().contains("displayName"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection refused, DNS failure, timeout or any other transport fault.
    #[error("Network error calling {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("HTTP error from {endpoint}: status={status}, body={body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// A field the projection depends on is missing or has the wrong type.
    #[error("Malformed response from {endpoint}: missing or invalid {field}")]
    Malformed { endpoint: String, field: String },

    /// The body was not valid JSON.
    #[error("JSON error from {endpoint}: {source}")]
    Json {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Client configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    pub fn malformed(endpoint: impl Into<String>, field: impl Into<String>) -> Self {
        ApiError::Malformed {
            endpoint: endpoint.into(),
            field: field.into(),
        }
    }
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, ApiError>;
