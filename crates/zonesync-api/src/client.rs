// Controller HTTP client
//
// Wraps `reqwest::Client` with SmartZone URL construction, credential
// placement, and error-body decoding. Endpoint groups (session, zones,
// clients) are implemented as inherent methods in separate files to keep
// this module focused on transport mechanics.

use std::time::Duration;

use reqwest::header::{ACCEPT, COOKIE};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credential;
use crate::error::Error;
use crate::models::ErrorBody;
use crate::transport::TransportConfig;

/// Stateless HTTP client for the SmartZone public API.
///
/// Holds the admin username/password used for ticket and session
/// creation, but never a session token: every authenticated call takes
/// the [`Credential`] to present, so callers own the session lifecycle.
#[derive(Clone)]
pub struct ControllerClient {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl ControllerClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` includes the API version prefix, e.g.
    /// `https://controller:8443/wsg/api/public/v11_1`.
    pub fn new(
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password,
            timeout: transport.timeout,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            http,
            base_url,
            username: username.into(),
            password,
            timeout: crate::transport::DEFAULT_TIMEOUT,
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &SecretString {
        &self.password
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}`, tolerating a trailing slash on the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach a credential: tickets ride in the query string, cookies in
    /// the `Cookie` header.
    pub(crate) fn authorize(
        builder: reqwest::RequestBuilder,
        credential: &Credential,
    ) -> reqwest::RequestBuilder {
        match credential {
            Credential::Ticket(_) => builder.query(&[("serviceTicket", credential.expose())]),
            Credential::Cookie(_) => builder.header(COOKIE, credential.expose()),
        }
    }

    /// Send a request and turn non-2xx answers into errors.
    pub(crate) async fn send(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Error> {
        let resp = builder
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        trace!(%status, url = %resp.url(), "controller response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(rejection(status, body))
    }

    /// Send a request and decode a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = self.send(builder).await?;
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        decode(&body)
    }

    /// Send a request whose body is irrelevant.
    pub(crate) async fn send_unit(&self, builder: reqwest::RequestBuilder) -> Result<(), Error> {
        let resp = self.send(builder).await?;
        debug!(status = %resp.status(), "request accepted");
        Ok(())
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    }
}

/// Decode a JSON body, keeping a preview of the raw text on failure.
pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}

/// Classify a non-2xx answer. The body is kept verbatim.
fn rejection(status: reqwest::StatusCode, body: String) -> Error {
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error_type)
        .unwrap_or_else(|| {
            let preview: String = body.chars().take(200).collect();
            if preview.is_empty() {
                status.canonical_reason().unwrap_or("no body").to_owned()
            } else {
                preview
            }
        });

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Unauthorized {
            status: status.as_u16(),
            message,
            body,
        };
    }

    Error::Rejected {
        status: status.as_u16(),
        message,
        error_code: parsed.error_code,
        body,
    }
}
