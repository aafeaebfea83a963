//! Failure taxonomy for remote commerce operations.
//!
//! Every operation on a store or the checkout workflow reports one of these
//! variants. Call sites are expected to match exhaustively: `NotFound` is
//! benign for removals, fatal for updates; auth variants are routed to the
//! session collaborator rather than retried. Nothing in the engine retries
//! automatically.

use thiserror::Error;

/// Errors from the remote commerce backend or local validation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response: connect failure, timeout, or a dropped connection.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rejected locally before any remote call was issued.
    #[error("validation error: {0}")]
    Validation(String),

    /// The target resource is already absent server-side.
    #[error("not found: {0}")]
    NotFound(String),

    /// No bearer token in the credential holder.
    #[error("authentication required")]
    AuthRequired,

    /// The server rejected the bearer token (401/403).
    #[error("authentication rejected: {0}")]
    AuthRejected(String),

    /// Any other non-2xx response, with the server's `message` field.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response body did not parse.
    #[error("response parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The operation was abandoned via its cancellation token before the
    /// remote call settled. Local state was not touched.
    #[error("operation cancelled")]
    Cancelled,
}

impl ApiError {
    /// Whether this is the benign "already absent" case.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether this failure should be routed to the session collaborator.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::AuthRequired | Self::AuthRejected(_))
    }

    /// The human-readable reason surfaced to the UI.
    #[must_use]
    pub fn reason(&self) -> String {
        self.to_string()
    }
}
