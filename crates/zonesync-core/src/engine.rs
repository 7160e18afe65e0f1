// ── Sync engine ──
//
// Entry point for consumers. Owns the controller client, the shared
// session cache and the reconciler, and routes every authenticated call
// through the cache so authorization failures evict the credential.

use std::sync::Arc;

use tracing::debug;

use zonesync_api::{
    ClientList, ControllerClient, DisconnectTarget, ListPage, RawClient, SessionInfo, Zone,
};

use crate::config::ControllerConfig;
use crate::error::CoreError;
use crate::live::{LiveSync, Subscription};
use crate::reconcile::{MergeOutcome, Reconciler};
use crate::session::SessionCache;
use crate::store::ClientStore;

/// Cheaply cloneable via `Arc<EngineInner>`.
pub struct SyncEngine<S> {
    inner: Arc<EngineInner<S>>,
}

struct EngineInner<S> {
    config: ControllerConfig,
    client: ControllerClient,
    sessions: Arc<SessionCache>,
    reconciler: Arc<Reconciler<S>>,
    live: LiveSync<S>,
}

impl<S> Clone for SyncEngine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ClientStore> SyncEngine<S> {
    /// Build the engine. Does not contact the controller.
    pub fn new(config: ControllerConfig, store: Arc<S>) -> Result<Self, CoreError> {
        let client = config.build_client()?;
        Self::with_client(config, client, store)
    }

    /// Build the engine around an existing client.
    pub fn with_client(
        config: ControllerConfig,
        client: ControllerClient,
        store: Arc<S>,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let sessions = Arc::new(SessionCache::new(
            client.clone(),
            config.credential,
            config.session_ttl,
        ));
        let reconciler = Arc::new(Reconciler::new(store));
        let live = LiveSync::new(
            client.clone(),
            Arc::clone(&sessions),
            Arc::clone(&reconciler),
            config.client_query(),
            config.poll_interval,
            config.live_buffer,
        );
        debug!(url = %config.url, kind = ?config.credential, "sync engine ready");

        Ok(Self {
            inner: Arc::new(EngineInner {
                config,
                client,
                sessions,
                reconciler,
                live,
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &ControllerClient {
        &self.inner.client
    }

    pub fn sessions(&self) -> &Arc<SessionCache> {
        &self.inner.sessions
    }

    pub fn store(&self) -> &Arc<S> {
        self.inner.reconciler.store()
    }

    // ── Controller operations ────────────────────────────────────────

    pub async fn session_info(&self) -> Result<SessionInfo, CoreError> {
        let client = &self.inner.client;
        self.inner
            .sessions
            .authenticated(|c| async move { client.session_info(&c).await })
            .await
    }

    pub async fn zones(&self) -> Result<ListPage<Zone>, CoreError> {
        let client = &self.inner.client;
        self.inner
            .sessions
            .authenticated(|c| async move { client.list_zones(&c).await })
            .await
    }

    /// Fetch the connected-client list without touching the store.
    pub async fn fetch_clients(&self) -> Result<ClientList, CoreError> {
        let client = &self.inner.client;
        let query = self.inner.config.client_query();
        self.inner
            .sessions
            .authenticated(|c| async move { client.list_clients(&c, &query).await })
            .await
    }

    /// Fetch and merge into the store.
    pub async fn sync_clients(&self) -> Result<MergeOutcome, CoreError> {
        self.inner.live.sync_once().await
    }

    /// Merge a list fetched elsewhere (e.g. with an explicit credential).
    pub async fn merge(&self, raw: Vec<RawClient>) -> Result<MergeOutcome, CoreError> {
        self.inner.reconciler.merge(raw).await
    }

    pub async fn disconnect(&self, target: &DisconnectTarget) -> Result<(), CoreError> {
        let client = &self.inner.client;
        self.inner
            .sessions
            .authenticated(|c| async move { client.disconnect_client(&c, target).await })
            .await
    }

    pub async fn bulk_disconnect(&self, targets: &[DisconnectTarget]) -> Result<(), CoreError> {
        if targets.is_empty() {
            return Err(CoreError::InvalidQuery {
                message: "bulk disconnect needs at least one client".into(),
            });
        }
        let client = &self.inner.client;
        self.inner
            .sessions
            .authenticated(|c| async move { client.bulk_disconnect(&c, targets).await })
            .await
    }

    // ── Live sync ────────────────────────────────────────────────────

    /// Start a live subscription sharing this engine's session cache.
    pub fn subscribe(&self) -> Subscription {
        self.inner.live.subscribe()
    }

    /// Release the cached session upstream.
    pub async fn shutdown(&self) {
        self.inner.sessions.close().await;
    }
}
