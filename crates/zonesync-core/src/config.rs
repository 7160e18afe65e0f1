// ── Runtime connection configuration ──
//
// These types describe how to reach one SmartZone controller and how the
// sync engine paces itself. They carry credentials but never touch disk;
// the CLI builds a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use zonesync_api::transport::{TlsMode, TransportConfig};
use zonesync_api::{ClientQuery, ControllerClient, CredentialKind};

use crate::error::CoreError;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(45);
pub const DEFAULT_LIVE_BUFFER: usize = 16;

/// TLS verification strategy.
///
/// There is no automatic fallback to `DangerAcceptInvalid`: it has to be
/// chosen explicitly, and every client built with it logs a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (PEM).
    CustomCa(PathBuf),
    /// Skip verification entirely.
    DangerAcceptInvalid,
}

/// Configuration for one controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API base, e.g. `https://sz.example.net:8443/wsg/api/public/v11_1`.
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How long a credential is trusted after issuance.
    pub session_ttl: Duration,
    /// Live sync tick period.
    pub poll_interval: Duration,
    /// Cookie session or service ticket.
    pub credential: CredentialKind,
    /// Restrict client listing to one WLAN id.
    pub wlan_filter: Option<String>,
    /// Queue depth per live subscription.
    pub live_buffer: usize,
}

impl ControllerConfig {
    /// Config with the standard pacing: 5 s timeout, 300 s session TTL,
    /// 45 s poll interval, cookie sessions, system trust store.
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: DEFAULT_TIMEOUT,
            session_ttl: DEFAULT_SESSION_TTL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            credential: CredentialKind::Cookie,
            wlan_filter: None,
            live_buffer: DEFAULT_LIVE_BUFFER,
        }
    }

    /// The upstream query used to list connected clients.
    pub fn client_query(&self) -> ClientQuery {
        match &self.wlan_filter {
            Some(id) => ClientQuery::wlan(id.clone()),
            None => ClientQuery::default(),
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
        }
    }

    /// Reject pacing values the live loop cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }
        if self.live_buffer == 0 {
            return Err(CoreError::Config {
                message: "live buffer must hold at least one update".into(),
            });
        }
        Ok(())
    }

    /// Build the HTTP client for this controller.
    pub fn build_client(&self) -> Result<ControllerClient, CoreError> {
        self.validate()?;
        let client = ControllerClient::new(
            self.url.clone(),
            self.username.clone(),
            self.password.clone(),
            &self.transport(),
        )?;
        Ok(client)
    }
}
