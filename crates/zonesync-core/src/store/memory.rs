// ── In-memory client store ──

use tokio::sync::watch;
use tracing::debug;

use super::collection::{EntityCollection, Snapshot};
use super::{BulkWrite, ClientPage, ClientStore, StoreQuery, replace_keeping_first_seen};
use crate::error::CoreError;
use crate::model::{ClientRecord, MacAddress};

/// Lock-free in-memory store.
///
/// A bulk write applies every record, then publishes one snapshot, so
/// subscribers never observe a half-applied batch.
pub struct MemoryStore {
    clients: EntityCollection<ClientRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            clients: EntityCollection::new(),
        }
    }

    /// Seed the store from previously saved records.
    pub fn with_records(records: impl IntoIterator<Item = ClientRecord>) -> Self {
        let store = Self::new();
        store.load(records);
        store
    }

    /// Overwrite records verbatim and publish once. Keys not in `records`
    /// are left alone.
    pub(crate) fn load(&self, records: impl IntoIterator<Item = ClientRecord>) {
        for record in records {
            self.clients
                .upsert_silent(record.mac.as_str().to_owned(), |_| record);
        }
        self.clients.flush();
    }

    /// Subscribe to post-write snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<ClientRecord>> {
        self.clients.subscribe()
    }

    /// Current contents.
    pub fn snapshot(&self) -> Snapshot<ClientRecord> {
        self.clients.snapshot()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub(crate) fn apply(&self, records: Vec<ClientRecord>) -> BulkWrite {
        let mut out = BulkWrite {
            records: Vec::with_capacity(records.len()),
            ..BulkWrite::default()
        };
        for record in records {
            let key = record.mac.as_str().to_owned();
            let (stored, is_new) = self
                .clients
                .upsert_silent(key, |existing| replace_keeping_first_seen(existing, record));
            if is_new {
                out.inserted += 1;
            } else {
                out.matched += 1;
            }
            out.records.push(ClientRecord::clone(&stored));
        }
        self.clients.flush();
        debug!(
            matched = out.matched,
            inserted = out.inserted,
            version = self.clients.version(),
            "bulk upsert applied"
        );
        out
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientStore for MemoryStore {
    async fn bulk_upsert(&self, records: Vec<ClientRecord>) -> Result<BulkWrite, CoreError> {
        Ok(self.apply(records))
    }

    async fn get(&self, mac: &MacAddress) -> Result<Option<ClientRecord>, CoreError> {
        Ok(self
            .clients
            .get(mac.as_str())
            .map(|r| ClientRecord::clone(&r)))
    }

    async fn find(&self, query: &StoreQuery) -> Result<ClientPage, CoreError> {
        let compiled = query.compile()?;
        Ok(compiled.apply(&self.clients.snapshot()))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("len", &self.clients.len())
            .finish()
    }
}
