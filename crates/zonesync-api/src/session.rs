// Ticket and session endpoints
//
// Two independent ways to authenticate: a service ticket (`/serviceTicket`,
// used as a query parameter) and a cookie session (`/session`, used as a
// `Cookie` header). Neither is cached here.

use reqwest::header::SET_COOKIE;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use crate::auth::{Credential, cookie_pair};
use crate::client::{ControllerClient, decode};
use crate::error::Error;
use crate::models::{LoginProfile, LoginRequest, SessionInfo, TicketResponse};

/// Result of a cookie login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub cookie: Credential,
    pub profile: LoginProfile,
}

impl ControllerClient {
    fn login_body(&self) -> LoginRequest<'_> {
        LoginRequest {
            username: self.username(),
            password: self.password().expose_secret(),
        }
    }

    /// Obtain a service ticket.
    ///
    /// `POST /serviceTicket` with `{"username", "password"}`
    pub async fn create_ticket(&self) -> Result<Credential, Error> {
        let url = self.endpoint("serviceTicket")?;
        debug!("creating service ticket at {}", url);

        let resp: TicketResponse = self
            .send_json(self.http().post(url).json(&self.login_body()))
            .await?;

        let ticket = resp.service_ticket.ok_or_else(|| Error::MissingTicket {
            body: format!("controllerVersion={:?}", resp.controller_version),
        })?;
        info!(controller_version = ?resp.controller_version, "service ticket created");
        Ok(Credential::ticket(ticket))
    }

    /// Release a service ticket.
    ///
    /// `DELETE /serviceTicket?serviceTicket={ticket}`
    pub async fn delete_ticket(&self, ticket: &Credential) -> Result<(), Error> {
        let url = self.endpoint("serviceTicket")?;
        debug!("deleting service ticket");
        self.send_unit(Self::authorize(self.http().delete(url), ticket))
            .await
    }

    /// Log in and capture the session cookie.
    ///
    /// `POST /session` with `{"username", "password"}`. Only the first
    /// `name=value` pair of the first `Set-Cookie` header is kept.
    pub async fn login(&self) -> Result<LoginSession, Error> {
        let url = self.endpoint("session")?;
        debug!("logging in at {}", url);

        let resp = self
            .send(self.http().post(url).json(&self.login_body()))
            .await?;

        let cookie = resp
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(cookie_pair)
            .map(Credential::cookie)
            .ok_or(Error::MissingCookie)?;

        let body = resp.text().await.unwrap_or_default();
        let profile = if body.trim().is_empty() {
            LoginProfile::default()
        } else {
            decode(&body)?
        };

        info!(controller_version = ?profile.controller_version, "logged in to controller");
        Ok(LoginSession { cookie, profile })
    }

    /// End a cookie session.
    ///
    /// `DELETE /session`
    pub async fn logout(&self, cookie: &Credential) -> Result<(), Error> {
        let url = self.endpoint("session")?;
        debug!("logging out at {}", url);
        self.send_unit(Self::authorize(self.http().delete(url), cookie))
            .await?;
        debug!("logout complete");
        Ok(())
    }

    /// Describe the session behind a credential. Doubles as a liveness
    /// check: a dead credential yields an authorization-class error.
    ///
    /// `GET /session`
    pub async fn session_info(&self, credential: &Credential) -> Result<SessionInfo, Error> {
        let url = self.endpoint("session")?;
        debug!("fetching session info");
        self.send_json(Self::authorize(self.http().get(url), credential))
            .await
    }
}
