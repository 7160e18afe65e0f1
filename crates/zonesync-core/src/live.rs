// ── Live client sync ──
//
// One background task per subscription: on every tick, get a session,
// fetch the client list, merge it, publish the merged list. Failures are
// logged and the timer keeps running. All subscriptions share one
// `SessionCache`, so N subscribers never cause N logins.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};
use uuid::Uuid;

use zonesync_api::{ClientQuery, ControllerClient};

use crate::error::CoreError;
use crate::model::ClientRecord;
use crate::reconcile::{MergeOutcome, MergeResult, Reconciler};
use crate::session::SessionCache;
use crate::store::ClientStore;

/// Where a subscription's loop currently is.
///
/// `Published` and `Failed` persist while the loop waits for the next
/// tick; `Stopped` is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Fetching { tick: u64 },
    Published { tick: u64, clients: usize },
    Failed { tick: u64, reason: String },
    Stopped,
}

/// One published snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct LiveUpdate {
    pub connection_id: Uuid,
    pub tick: u64,
    pub at: DateTime<Utc>,
    pub result: MergeResult,
    pub clients: Vec<ClientRecord>,
}

/// Handle for one live consumer. Dropping it stops the loop.
pub struct Subscription {
    id: Uuid,
    updates: mpsc::Receiver<LiveUpdate>,
    state: watch::Receiver<SyncState>,
    cancel: CancellationToken,
    _stop_on_drop: DropGuard,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next update, or `None` once the loop has stopped.
    pub async fn recv(&mut self) -> Option<LiveUpdate> {
        self.updates.recv().await
    }

    pub fn state(&self) -> SyncState {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn state_changes(&self) -> watch::Receiver<SyncState> {
        self.state.clone()
    }

    /// Stop the loop and wait for it to exit. An in-flight tick finishes
    /// but publishes nothing.
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(connection_id = %self.id, error = %e, "live sync task ended abnormally");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

// ── LiveSync ─────────────────────────────────────────────────────────

/// Spawns and drives live subscriptions. Cheaply cloneable.
pub struct LiveSync<S> {
    inner: Arc<LiveInner<S>>,
}

struct LiveInner<S> {
    client: ControllerClient,
    sessions: Arc<SessionCache>,
    reconciler: Arc<Reconciler<S>>,
    query: ClientQuery,
    interval: Duration,
    buffer: usize,
}

impl<S> Clone for LiveSync<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ClientStore> LiveSync<S> {
    /// `interval` must be non-zero; `SyncEngine` checks it before calling.
    pub(crate) fn new(
        client: ControllerClient,
        sessions: Arc<SessionCache>,
        reconciler: Arc<Reconciler<S>>,
        query: ClientQuery,
        interval: Duration,
        buffer: usize,
    ) -> Self {
        Self {
            inner: Arc::new(LiveInner {
                client,
                sessions,
                reconciler,
                query,
                interval,
                buffer: buffer.max(1),
            }),
        }
    }

    /// Start a subscription. Tick 0 runs immediately.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn subscribe(&self) -> Subscription {
        let id = Uuid::new_v4();
        let (tx, updates) = mpsc::channel(self.inner.buffer);
        let (state_tx, state) = watch::channel(SyncState::Idle);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(sync_task(
            Arc::clone(&self.inner),
            id,
            tx,
            state_tx,
            cancel.clone(),
        ));
        info!(connection_id = %id, interval_secs = self.inner.interval.as_secs(), "live subscription started");

        Subscription {
            id,
            updates,
            state,
            _stop_on_drop: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Run one fetch-and-merge outside any subscription.
    pub async fn sync_once(&self) -> Result<MergeOutcome, CoreError> {
        run_tick(&self.inner).await
    }
}

// ── Background task ──────────────────────────────────────────────────

async fn sync_task<S: ClientStore>(
    inner: Arc<LiveInner<S>>,
    id: Uuid,
    tx: mpsc::Sender<LiveUpdate>,
    state: watch::Sender<SyncState>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(inner.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut tick: u64 = 0;

    loop {
        // The first `interval.tick()` completes immediately.
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        state.send_replace(SyncState::Fetching { tick });
        match run_tick(&inner).await {
            Ok(outcome) => {
                if cancel.is_cancelled() {
                    debug!(connection_id = %id, tick, "cancelled mid-tick, not publishing");
                    break;
                }
                let clients = outcome.clients.len();
                let update = LiveUpdate {
                    connection_id: id,
                    tick,
                    at: Utc::now(),
                    result: outcome.result,
                    clients: outcome.clients,
                };
                match tx.try_send(update) {
                    Ok(()) => debug!(connection_id = %id, tick, clients, "live update published"),
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!(connection_id = %id, tick, "subscriber is behind, update dropped");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        debug!(connection_id = %id, "subscriber gone");
                        break;
                    }
                }
                state.send_replace(SyncState::Published { tick, clients });
            }
            Err(e) => {
                warn!(connection_id = %id, tick, error = %e, "live sync tick failed");
                state.send_replace(SyncState::Failed {
                    tick,
                    reason: e.to_string(),
                });
            }
        }
        tick += 1;
    }

    state.send_replace(SyncState::Stopped);
    info!(connection_id = %id, ticks = tick, "live subscription stopped");
}

/// Session, fetch, merge. An authorization-class fetch failure evicts the
/// session (via `SessionCache::authenticated`) so the next tick logs in.
async fn run_tick<S: ClientStore>(inner: &LiveInner<S>) -> Result<MergeOutcome, CoreError> {
    let client = &inner.client;
    let query = &inner.query;
    let list = inner
        .sessions
        .authenticated(|credential| async move { client.list_clients(&credential, query).await })
        .await?;
    inner.reconciler.merge(list.clients).await
}
