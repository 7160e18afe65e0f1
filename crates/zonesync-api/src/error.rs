use thiserror::Error;

/// SmartZone error code for "no active session" (returned alongside 401/403).
pub const NO_ACTIVE_SESSION_CODE: i64 = 201;

/// Top-level error type for the `zonesync-api` crate.
///
/// Every variant falls into one of two buckets the rest of the workspace
/// cares about: the controller could not be reached ([`is_unreachable`]),
/// or it answered and said no ([`is_rejected`]). The upstream error body is
/// always carried verbatim for diagnostics.
///
/// [`is_unreachable`]: Error::is_unreachable
/// [`is_rejected`]: Error::is_rejected
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, reset, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request exceeded the configured timeout.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or trust anchor error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Controller responses ────────────────────────────────────────
    /// The controller no longer accepts the presented credential.
    #[error("Session rejected by controller (HTTP {status}): {message}")]
    Unauthorized {
        status: u16,
        message: String,
        body: String,
    },

    /// Any other non-2xx answer from the controller.
    #[error("Controller rejected request (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        error_code: Option<i64>,
        body: String,
    },

    /// Login answered 2xx but no `Set-Cookie` header came back.
    #[error("Login succeeded but the controller returned no session cookie")]
    MissingCookie,

    /// Ticket endpoint answered 2xx without a ticket in the body.
    #[error("Controller returned no service ticket: {body}")]
    MissingTicket { body: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// `true` when the controller could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Tls(_)
        )
    }

    /// `true` when the controller answered with a rejection.
    pub fn is_rejected(&self) -> bool {
        !self.is_unreachable()
    }

    /// `true` when the credential used for the call is no longer accepted
    /// and a fresh login might resolve the failure.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::Unauthorized { .. } => true,
            Self::Rejected { error_code, .. } => *error_code == Some(NO_ACTIVE_SESSION_CODE),
            _ => false,
        }
    }

    /// HTTP status of a controller rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Raw upstream body attached to the error, if any.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { body, .. }
            | Self::Rejected { body, .. }
            | Self::MissingTicket { body }
            | Self::Deserialization { body, .. } => Some(body),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_authorization_class() {
        let err = Error::Unauthorized {
            status: 401,
            message: "expired".into(),
            body: String::new(),
        };
        assert!(err.is_authorization());
        assert!(err.is_rejected());
        assert!(!err.is_unreachable());
    }

    #[test]
    fn no_active_session_code_is_authorization_class() {
        let err = Error::Rejected {
            status: 403,
            message: "No active session".into(),
            error_code: Some(NO_ACTIVE_SESSION_CODE),
            body: String::new(),
        };
        assert!(err.is_authorization());
    }

    #[test]
    fn plain_rejection_is_not_authorization_class() {
        let err = Error::Rejected {
            status: 500,
            message: "boom".into(),
            error_code: Some(0),
            body: "{\"message\":\"boom\"}".into(),
        };
        assert!(!err.is_authorization());
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.upstream_body(), Some("{\"message\":\"boom\"}"));
    }

    #[test]
    fn timeout_is_unreachable() {
        assert!(Error::Timeout { timeout_secs: 5 }.is_unreachable());
    }
}
