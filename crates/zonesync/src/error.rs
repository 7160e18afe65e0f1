//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use zonesync_config::ConfigError;
use zonesync_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("Could not reach the controller: {message}")]
    #[diagnostic(
        code(zonesync::connection_failed),
        help(
            "Check the controller URL and that port 8443 is reachable.\n\
             For a self-signed certificate use --ca-cert, or --insecure as a last resort."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(zonesync::auth_failed),
        help(
            "Verify the admin username and password for this profile.\n\
             The password is read from ZONESYNC_PASSWORD, the keyring entry \
             'zonesync' / '<profile>/password', or the profile itself."
        )
    )]
    AuthFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(zonesync::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
        body: Option<String>,
    },

    // ── Local ────────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(zonesync::not_found),
        help("Run: zonesync {list_command} to see what is stored")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(zonesync::validation))]
    Validation { field: String, reason: String },

    #[error("Store error: {message}")]
    #[diagnostic(
        code(zonesync::store),
        help("Point --store at a writable file, or remove a corrupt one.")
    )]
    Store { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(zonesync::profile_not_found),
        help("Add a [profiles.{name}] table to {path}")
    )]
    ProfileNotFound { name: String, path: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(zonesync::no_config),
        help(
            "Pass --controller, set ZONESYNC_CONTROLLER, or create a profile.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(zonesync::no_credentials),
        help("Pass --username and --password, or set ZONESYNC_USERNAME and ZONESYNC_PASSWORD.")
    )]
    NoCredentials { profile: String },

    #[error(transparent)]
    #[diagnostic(code(zonesync::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Cannot render config: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ProfileNotFound { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// HTTP status of a controller rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => *status,
            _ => None,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_unreachable() {
            return CliError::ConnectionFailed {
                message: err.to_string(),
            };
        }
        if err.is_authorization() {
            return CliError::AuthFailed {
                message: err.to_string(),
            };
        }

        match err {
            CoreError::UpstreamRejected {
                status,
                message,
                body,
                ..
            } => CliError::ApiError {
                status,
                message,
                body,
            },
            CoreError::InvalidQuery { message } => CliError::Validation {
                field: "query".into(),
                reason: message,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Store { message } => CliError::Store { message },
            other => CliError::ApiError {
                status: None,
                body: other.upstream_body().map(str::to_owned),
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                path: zonesync_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Serialization(e) => CliError::Toml(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
