use secrecy::{ExposeSecret, SecretString};

/// Which kind of credential an authenticated call presents.
///
/// Marker enum (no data) -- the token itself lives in [`Credential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    /// `JSESSIONID` cookie obtained from `POST /session`, sent as a `Cookie` header.
    Cookie,
    /// Service ticket obtained from `POST /serviceTicket`, sent as the
    /// `serviceTicket` query parameter.
    Ticket,
}

/// A credential accepted by authenticated controller endpoints.
#[derive(Debug, Clone)]
pub enum Credential {
    Cookie(SecretString),
    Ticket(SecretString),
}

impl Credential {
    pub fn cookie(value: impl Into<String>) -> Self {
        Self::Cookie(SecretString::from(value.into()))
    }

    pub fn ticket(value: impl Into<String>) -> Self {
        Self::Ticket(SecretString::from(value.into()))
    }

    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::Cookie(_) => CredentialKind::Cookie,
            Self::Ticket(_) => CredentialKind::Ticket,
        }
    }

    /// The raw token. Only call this at the wire boundary.
    pub fn expose(&self) -> &str {
        match self {
            Self::Cookie(s) | Self::Ticket(s) => s.expose_secret(),
        }
    }

    /// Guess the credential kind from a raw string: SmartZone tickets start
    /// with `ST-`, anything else is treated as a cookie.
    pub fn infer(raw: &str) -> Self {
        if raw.starts_with("ST-") {
            Self::ticket(raw)
        } else {
            Self::cookie(raw)
        }
    }
}

/// Reduce a `Set-Cookie` header value to the `name=value` pair that goes
/// back out in a `Cookie` header.
pub(crate) fn cookie_pair(set_cookie: &str) -> Option<&str> {
    let pair = set_cookie.split(';').next()?.trim();
    if pair.is_empty() || !pair.contains('=') {
        return None;
    }
    Some(pair)
}
