//! Error types for the licensing module.

use thiserror::Error;

/// Failures while turning a license string into a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The stripped body is not valid base64, or does not decode to UTF-8 text.
    #[error("malformed encoding")]
    MalformedEncoding,

    /// The decoded text is not `<id>:<YYYYMMDD>`.
    #[error("malformed payload")]
    MalformedPayload,

    /// The date token does not name a real calendar day.
    #[error("invalid date")]
    InvalidDate,
}

/// Failures reading or writing the persisted license record.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be (de)serialized.
    #[error("storage error: serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store could not be reached.
    #[error("storage error: unavailable: {0}")]
    Unavailable(String),
}

/// Failures of a manual license submission.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The license string could not be decoded.
    #[error("license rejected: {0}")]
    Decode(#[from] DecodeError),

    /// The decision could not be persisted.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Another submission is still in flight.
    #[error("a license check is already running")]
    Busy,
}

impl SubmitError {
    /// Inline message shown next to the license input.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Decode(DecodeError::InvalidDate) => "license date is invalid",
            Self::Decode(_) => "license malformed",
            Self::Storage(_) => "could not reach storage, try again",
            Self::Busy => "a license check is already running",
        }
    }
}

/// Result type for decode operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
