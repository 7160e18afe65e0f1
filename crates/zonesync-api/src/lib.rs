// zonesync-api: Async Rust client for the SmartZone controller public API

pub mod auth;
pub mod client;
pub mod clients;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod zones;

pub use auth::{Credential, CredentialKind};
pub use client::ControllerClient;
pub use error::Error;
pub use models::{
    ClientList, ClientQuery, DisconnectTarget, FullTextSearch, ListPage, LoginProfile,
    QueryFilter, RawClient, SessionInfo, Zone,
};
pub use session::LoginSession;
pub use transport::{TlsMode, TransportConfig};
