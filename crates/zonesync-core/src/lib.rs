// zonesync-core: Session lifecycle, client reconciliation and live sync
// between zonesync-api and its consumers.

pub mod config;
mod convert;
pub mod engine;
pub mod error;
pub mod live;
pub mod model;
pub mod reconcile;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use engine::SyncEngine;
pub use error::CoreError;
pub use live::{LiveSync, LiveUpdate, Subscription, SyncState};
pub use model::{AuthState, ClientRecord, MacAddress};
pub use reconcile::{MergeOutcome, MergeResult, Reconciler};
pub use session::{SessionCache, SessionCredential};
pub use store::{
    BulkWrite, ClientPage, ClientStore, JsonFileStore, MemoryStore, Pagination, SortField,
    SortOrder, StoreQuery,
};

pub use zonesync_api::{
    ClientList, ClientQuery, ControllerClient, Credential, CredentialKind, DisconnectTarget, ListPage,
    LoginProfile, LoginSession, RawClient, SessionInfo, Zone,
};
