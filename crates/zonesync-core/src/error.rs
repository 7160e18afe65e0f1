// ── Core error types ──
//
// Errors surfaced by zonesync-core. Callers see upstream failures in two
// classes (unreachable vs rejected) rather than raw HTTP details. The
// `From<zonesync_api::Error>` impl does the translation.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Upstream errors ──────────────────────────────────────────────
    /// Transport failure, timeout or TLS failure. Nothing was answered.
    #[error("Cannot reach controller: {message}")]
    UpstreamUnreachable { message: String },

    /// The controller answered, but not with what was asked for.
    #[error("Controller rejected the request{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    UpstreamRejected {
        status: Option<u16>,
        message: String,
        /// Upstream error body, verbatim.
        body: Option<String>,
        /// HTTP 401 or "no active session".
        authorization: bool,
    },

    /// Logging in (or creating a ticket) failed.
    #[error("No controller session available: {cause}")]
    SessionUnavailable {
        #[source]
        cause: Box<CoreError>,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Invalid query: {message}")]
    InvalidQuery { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether the upstream refused the presented credential.
    pub fn is_authorization(&self) -> bool {
        match self {
            Self::UpstreamRejected { authorization, .. } => *authorization,
            Self::SessionUnavailable { cause } => cause.is_authorization(),
            _ => false,
        }
    }

    /// Whether the controller could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        match self {
            Self::UpstreamUnreachable { .. } => true,
            Self::SessionUnavailable { cause } => cause.is_unreachable(),
            _ => false,
        }
    }

    /// Raw upstream body, if the controller sent one.
    pub fn upstream_body(&self) -> Option<&str> {
        match self {
            Self::UpstreamRejected { body, .. } => body.as_deref(),
            Self::SessionUnavailable { cause } => cause.upstream_body(),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<zonesync_api::Error> for CoreError {
    fn from(err: zonesync_api::Error) -> Self {
        if let zonesync_api::Error::InvalidUrl(e) = &err {
            return CoreError::Config {
                message: format!("Invalid URL: {e}"),
            };
        }
        if err.is_unreachable() {
            return CoreError::UpstreamUnreachable {
                message: err.to_string(),
            };
        }

        let authorization = err.is_authorization();
        let status = err.status();
        let body = err.upstream_body().map(str::to_owned);
        let message = match &err {
            zonesync_api::Error::Unauthorized { message, .. }
            | zonesync_api::Error::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        };

        CoreError::UpstreamRejected {
            status,
            message,
            body,
            authorization,
        }
    }
}
