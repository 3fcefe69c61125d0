//! Shared error type across calguard crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Creation vetoed by a rate limit or quota.
    TooManyRequests,
    /// A collaborator (resolver, limiter, oracle, settings) failed.
    ServiceUnavailable,
    /// Invalid input or configuration.
    BadRequest,
    /// Unsupported configuration version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::TooManyRequests => "TOO_MANY_REQUESTS",
            ClientCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// HTTP status a host should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            ClientCode::TooManyRequests => 429,
            ClientCode::ServiceUnavailable => 503,
            ClientCode::BadRequest | ClientCode::UnsupportedVersion => 400,
            ClientCode::Internal => 500,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, GuardError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Rolling-window attempt threshold exceeded for a creation category.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },
    /// Absolute ceiling on owned collections reached.
    #[error("{message}")]
    QuotaExceeded { message: String },
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl GuardError {
    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        GuardError::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        GuardError::QuotaExceeded {
            message: message.into(),
        }
    }

    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            GuardError::RateLimited { .. } | GuardError::QuotaExceeded { .. } => {
                ClientCode::TooManyRequests
            }
            GuardError::Unavailable(_) => ClientCode::ServiceUnavailable,
            GuardError::BadRequest(_) => ClientCode::BadRequest,
            GuardError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            GuardError::Internal(_) => ClientCode::Internal,
        }
    }

    /// True for the two veto kinds raised by the guard itself.
    pub fn is_veto(&self) -> bool {
        matches!(
            self,
            GuardError::RateLimited { .. } | GuardError::QuotaExceeded { .. }
        )
    }

    /// Retry hint in seconds, known only for rate-limit vetoes.
    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            GuardError::RateLimited {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}
