//! Error taxonomy for backend calls.
//!
//! Every failure a caller can observe flows through [`ApiError`]. HTTP status
//! codes are folded into coarse categories so command handlers can match on
//! meaning instead of raw numbers; the backend's `detail` message is carried
//! along verbatim for display.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the client, the request gateway, and on-disk state.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure: DNS, connect, TLS, timeout, or a broken body.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 401 from the backend after refresh handling is exhausted.
    #[error("unauthorized: {detail}")]
    Unauthorized { detail: String },

    /// 403 — authenticated but not allowed (admin-only route, wrong role).
    #[error("forbidden: {detail}")]
    Forbidden { detail: String },

    /// 404 — the named resource does not exist.
    #[error("not found: {detail}")]
    NotFound { detail: String },

    /// 400/422 — the backend rejected the request payload or parameters.
    #[error("validation failed: {detail}")]
    Validation { detail: String },

    /// Any other 4xx status.
    #[error("request rejected ({status}): {detail}")]
    Client { status: u16, detail: String },

    /// 5xx status.
    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    /// A 401 needed a token refresh but no refresh token is stored.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// No base URL configured; nothing can be sent.
    #[error("no API base URL configured (set DOMOCTL_API_URL or api_url in the config file)")]
    MissingBaseUrl,

    /// The caller cancelled the request before a response arrived.
    #[error("request cancelled")]
    Cancelled,

    /// Reading or writing persisted state under the state directory failed.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ApiError {
    /// Maps an HTTP status code and extracted detail message to a variant.
    ///
    /// 422 is grouped with 400; the backend uses both for rejected input.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            400 | 422 => ApiError::Validation { detail },
            401 => ApiError::Unauthorized { detail },
            403 => ApiError::Forbidden { detail },
            404 => ApiError::NotFound { detail },
            402..=499 => ApiError::Client { status, detail },
            _ => ApiError::Server { status, detail },
        }
    }

    /// The HTTP status behind this error, when one exists.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::Validation { .. } => Some(400),
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend answered 401.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}
