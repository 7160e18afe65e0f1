// ── Session cache ──
//
// At most one live controller credential, shared by every caller. Fresh
// reads are a lock-free `ArcSwapOption` load; refreshes are serialized by
// an async mutex with a second freshness check inside, so concurrent
// callers that find the cache stale coalesce into one upstream login.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use zonesync_api::{ControllerClient, Credential, CredentialKind};

use crate::error::CoreError;

/// A credential plus the moment it was issued.
#[derive(Debug)]
pub struct SessionCredential {
    credential: Credential,
    issued_at: Instant,
}

impl SessionCredential {
    fn new(credential: Credential) -> Self {
        Self {
            credential,
            issued_at: Instant::now(),
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn age(&self) -> Duration {
        self.issued_at.elapsed()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }
}

/// Shared, time-bounded credential cache for one controller.
pub struct SessionCache {
    client: ControllerClient,
    kind: CredentialKind,
    ttl: Duration,
    current: ArcSwapOption<SessionCredential>,
    refresh: Mutex<()>,
}

impl SessionCache {
    pub fn new(client: ControllerClient, kind: CredentialKind, ttl: Duration) -> Self {
        Self {
            client,
            kind,
            ttl,
            current: ArcSwapOption::empty(),
            refresh: Mutex::new(()),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached credential if it is still inside its TTL. Never blocks.
    pub fn peek(&self) -> Option<Arc<SessionCredential>> {
        self.current.load_full().filter(|c| c.is_fresh(self.ttl))
    }

    /// Return a valid credential, logging in if the cache is empty,
    /// expired or invalidated.
    ///
    /// Concurrent callers that miss the cache wait on one login and all
    /// receive its credential. A failed login leaves the cache empty.
    pub async fn get_valid(&self) -> Result<Arc<SessionCredential>, CoreError> {
        if let Some(fresh) = self.peek() {
            return Ok(fresh);
        }

        let _guard = self.refresh.lock().await;
        if let Some(fresh) = self.peek() {
            debug!("session refreshed by a concurrent caller");
            return Ok(fresh);
        }

        self.current.store(None);
        let issued = match self.kind {
            CredentialKind::Cookie => self.client.login().await.map(|s| s.cookie),
            CredentialKind::Ticket => self.client.create_ticket().await,
        };

        match issued {
            Ok(credential) => {
                let session = Arc::new(SessionCredential::new(credential));
                self.current.store(Some(Arc::clone(&session)));
                info!(kind = ?self.kind, ttl_secs = self.ttl.as_secs(), "controller session established");
                Ok(session)
            }
            Err(e) => {
                warn!(kind = ?self.kind, error = %e, "controller login failed");
                Err(CoreError::SessionUnavailable {
                    cause: Box::new(e.into()),
                })
            }
        }
    }

    /// Force the next `get_valid` to log in.
    pub fn invalidate(&self) {
        if self.current.swap(None).is_some() {
            debug!("session invalidated");
        }
    }

    /// Invalidate only if `stale` is still the cached credential.
    ///
    /// Returns whether anything was evicted. A caller holding an old
    /// credential cannot evict one that another caller just obtained.
    pub fn invalidate_if_current(&self, stale: &Arc<SessionCredential>) -> bool {
        let previous = self.current.rcu(|cur| match cur {
            Some(c) if Arc::ptr_eq(c, stale) => None,
            other => other.clone(),
        });
        let evicted = previous.as_ref().is_some_and(|p| Arc::ptr_eq(p, stale));
        if evicted {
            debug!("stale session invalidated");
        }
        evicted
    }

    /// Run `call` with a valid credential. An authorization-class failure
    /// evicts that credential so the next call logs in again.
    pub async fn authenticated<T, F, Fut>(&self, call: F) -> Result<T, CoreError>
    where
        F: FnOnce(Credential) -> Fut,
        Fut: Future<Output = Result<T, zonesync_api::Error>>,
    {
        let session = self.get_valid().await?;
        match call(session.credential().clone()).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_authorization() {
                    warn!(error = %e, "controller refused the cached session");
                    self.invalidate_if_current(&session);
                }
                Err(e.into())
            }
        }
    }

    /// Drop the cached credential and release it upstream. Best effort:
    /// failures are logged, not returned.
    pub async fn close(&self) {
        let Some(session) = self.current.swap(None) else {
            return;
        };
        let credential = session.credential();
        let released = match credential.kind() {
            CredentialKind::Cookie => self.client.logout(credential).await,
            CredentialKind::Ticket => self.client.delete_ticket(credential).await,
        };
        match released {
            Ok(()) => debug!("controller session released"),
            Err(e) => warn!(error = %e, "could not release controller session"),
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("kind", &self.kind)
            .field("ttl", &self.ttl)
            .field("cached", &self.current.load().is_some())
            .finish_non_exhaustive()
    }
}
