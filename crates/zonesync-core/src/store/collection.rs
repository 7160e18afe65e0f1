// ── Reactive keyed collection ──
//
// Lock-free concurrent storage with O(1) lookups and push-based change
// notification via `watch` channels. Writers can apply many upserts
// silently and publish one snapshot with `flush`.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::watch;

pub(crate) type Snapshot<T> = Arc<Vec<Arc<T>>>;

/// A concurrent collection keyed by string, with a watched snapshot.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Bumped on every flush.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on flush.
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or replace the entity under `key` without publishing.
    ///
    /// `build` receives the current entity (if any) while the key's shard
    /// is locked, so read-modify-write on one key is atomic. Returns the
    /// stored entity and whether the key was new.
    pub(crate) fn upsert_silent(
        &self,
        key: String,
        build: impl FnOnce(Option<&T>) -> T,
    ) -> (Arc<T>, bool) {
        match self.by_key.entry(key) {
            Entry::Occupied(mut slot) => {
                let next = Arc::new(build(Some(slot.get().as_ref())));
                slot.insert(Arc::clone(&next));
                (next, false)
            }
            Entry::Vacant(slot) => {
                let next = Arc::new(build(None));
                slot.insert(Arc::clone(&next));
                (next, true)
            }
        }
    }

    /// Publish the current contents to subscribers.
    pub(crate) fn flush(&self) {
        let values: Vec<Arc<T>> = self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Last published snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
