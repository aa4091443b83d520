use vidgen_core::error::CoreError;

use crate::api::ApiError;
use crate::store::StoreError;

/// Caller-visible failure of a workflow or session operation.
///
/// Local validation failures never reach the network. Backend errors
/// carry the server-provided message when one was returned.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A local precondition failed (empty prompt, password mismatch, ...).
    #[error("{0}")]
    Validation(String),

    /// Credentials were rejected or a token could not be issued.
    #[error("{0}")]
    Auth(String),

    #[error("Image upload failed: {0}")]
    Upload(String),

    #[error("Video generation failed to start: {0}")]
    Submission(String),

    /// A status poll returned an error response.
    #[error("Failed to check video status: {0}")]
    StatusCheck(String),

    /// The backend reported the job as failed.
    #[error("{0}")]
    JobFailed(String),

    #[error("Video generation timed out after {attempts} status checks")]
    JobTimeout { attempts: u32 },

    /// Transport-level failure: no response was received.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The caller stopped waiting.
    #[error("Cancelled")]
    Cancelled,

    /// Durable session state could not be written.
    #[error("Session storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl ClientError {
    /// Classify an API failure in the context of one operation.
    ///
    /// Transport failures become [`ClientError::Network`]. Error responses,
    /// malformed bodies and requests that could not be built (never sent)
    /// become `wrap(message)`, using the backend detail when present and
    /// `fallback` otherwise.
    pub(crate) fn from_api(err: ApiError, wrap: fn(String) -> Self, fallback: &str) -> Self {
        match err {
            ApiError::Request(e) if e.is_builder() => wrap(format!("{fallback}: {e}")),
            ApiError::Request(e) => Self::Network(e),
            ApiError::InvalidUrl(e) => wrap(format!("{fallback}: {e}")),
            ApiError::Decode(e) => wrap(format!("{fallback}: malformed response ({e})")),
            api @ ApiError::Api { .. } => wrap(api.detail().unwrap_or_else(|| fallback.to_string())),
        }
    }
}
