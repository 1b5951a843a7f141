use std::time::Duration;

/// Errors raised while handing metrics to the trapper.
///
/// # Examples
///
/// ```rust
/// use cvmon_sink::error::SinkError;
///
/// let err = SinkError::InvalidKey("status.ma[a\nb]".to_string());
/// assert!(err.to_string().contains("control"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sender process could not be started.
    #[error("Sink: failed to spawn sender: {0}")]
    Spawn(#[from] std::io::Error),

    /// The sender did not finish within the configured timeout.
    #[error("Sink: sender timed out after {0:?}")]
    Timeout(Duration),

    /// The sender exited non-zero.
    #[error("Sink: submission of {key} rejected (exit code {exit_code}): {output}")]
    Rejected {
        key: String,
        exit_code: i32,
        output: String,
    },

    /// Item keys may not contain control characters.
    #[error("Sink: item key contains control characters: {0:?}")]
    InvalidKey(String),

    /// A discovery batch could not be serialized.
    #[error("Sink: failed to encode discovery payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, SinkError>;
