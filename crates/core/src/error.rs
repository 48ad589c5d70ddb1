//! Core Error Types
//!
//! Defines the error taxonomy for the Listing Lens workspace.
//!
//! Two families:
//! - `PipelineError` - pipeline-level failures. Only `EmptyListing` and
//!   `Cancelled` are listing-fatal; analysis and photo-level failures are
//!   isolated by the stages that produce them.
//! - `ProviderError` - typed failures from enhancement backends. The engine
//!   never inspects provider payloads beyond these variants; only
//!   `RateLimited` is retryable.

use std::time::Duration;

use thiserror::Error;

/// Pipeline-level error type for the Listing Lens workspace.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A single photo could not be analyzed. Non-fatal to the listing:
    /// the analyzer converts this into a degraded analysis.
    #[error("Analysis failed for photo {photo_id}: {message}")]
    Analysis { photo_id: String, message: String },

    /// The listing carries no photos; no strategy can be built.
    #[error("Listing has no photos to prepare")]
    EmptyListing,

    /// Durable storage read/write failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An enhancement backend failed in a way the executor did not absorb.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// The run was cancelled by the caller.
    #[error("Run cancelled")]
    Cancelled,

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for pipeline errors
pub type CoreResult<T> = Result<T, PipelineError>;

impl PipelineError {
    /// Create an analysis error scoped to one photo
    pub fn analysis(photo_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Analysis {
            photo_id: photo_id.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error terminates the whole listing run.
    pub fn is_listing_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::EmptyListing | PipelineError::Cancelled | PipelineError::Internal(_)
        )
    }
}

/// Convert PipelineError to a string
impl From<PipelineError> for String {
    fn from(err: PipelineError) -> String {
        err.to_string()
    }
}

/// Typed error surface of an enhancement backend.
///
/// Adapters map their wire-level failures into these variants; everything
/// downstream (executor retry policy, photo fallback rules) keys off the
/// variant alone.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Backend applied rate limiting. Retried with backoff, bounded count.
    #[error("Rate limited: {message}")]
    RateLimited {
        message: String,
        /// Server-suggested wait, when the backend supplied one.
        retry_after: Option<Duration>,
    },

    /// Backend is down or returned a server-side failure.
    #[error("Provider unavailable: {message}")]
    Unavailable { message: String },

    /// Backend rejected the request as malformed or unsupported.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The call exceeded its wall-clock budget.
    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    /// Transport-level failure before a response was produced.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The response arrived but could not be decoded.
    #[error("Failed to parse provider response: {message}")]
    Parse { message: String },

    /// Credentials rejected.
    #[error("Authentication failed: {message}")]
    Auth { message: String },
}

/// Result type alias for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    /// Create a rate-limited error without a server hint
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited {
            message: msg.into(),
            retry_after: None,
        }
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable {
            message: msg.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network {
            message: msg.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth {
            message: msg.into(),
        }
    }

    /// Whether the executor may retry this call.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited { .. })
    }
}
