// ── Reconciliation ──
//
// Turns one upstream client list into a single bulk write: normalize,
// drop records without a hardware address, collapse duplicates (last one
// wins), then upsert by MAC. Nothing is deleted.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use zonesync_api::RawClient;

use crate::convert::client_record;
use crate::error::CoreError;
use crate::model::{ClientRecord, MacAddress};
use crate::store::ClientStore;

/// Counts from one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeResult {
    /// Records whose MAC was already stored.
    pub matched: usize,
    /// Stored records replaced by this merge.
    pub updated: usize,
    /// Records stored for the first time.
    pub inserted: usize,
    /// Upstream records without a hardware address.
    pub skipped: usize,
}

/// A merge's counts plus the records as stored.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub result: MergeResult,
    pub clients: Vec<ClientRecord>,
}

/// Merges upstream client lists into a `ClientStore`.
#[derive(Debug)]
pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S: ClientStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Normalize and upsert `raw` as one bulk store operation.
    pub async fn merge(&self, raw: Vec<RawClient>) -> Result<MergeOutcome, CoreError> {
        let now = Utc::now();
        let received = raw.len();
        let mut skipped = 0;
        let mut batch: IndexMap<MacAddress, ClientRecord> = IndexMap::with_capacity(received);

        for record in raw {
            match client_record(record, now) {
                Some(normalized) => {
                    batch.insert(normalized.mac.clone(), normalized);
                }
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            debug!(skipped, "upstream clients without a hardware address");
        }
        if batch.is_empty() {
            return Ok(MergeOutcome {
                result: MergeResult {
                    skipped,
                    ..MergeResult::default()
                },
                clients: Vec::new(),
            });
        }

        let written = self.store.bulk_upsert(batch.into_values().collect()).await?;
        // Every match is a full replace.
        let result = MergeResult {
            matched: written.matched,
            updated: written.matched,
            inserted: written.inserted,
            skipped,
        };
        info!(
            received,
            matched = result.matched,
            inserted = result.inserted,
            skipped = result.skipped,
            "client list merged"
        );

        Ok(MergeOutcome {
            result,
            clients: written.records,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::AuthState;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn raw(mac: Option<&str>, tx: u64, rx: u64, status: &str) -> RawClient {
        RawClient {
            client_mac: mac.map(str::to_owned),
            tx_bytes: Some(tx),
            rx_bytes: Some(rx),
            status: Some(status.into()),
            ..RawClient::default()
        }
    }

    fn reconciler() -> Reconciler<MemoryStore> {
        Reconciler::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn first_sighting_inserts_with_derived_fields() {
        let r = reconciler();
        let out = r
            .merge(vec![raw(Some("AA:BB:CC:11:22:33"), 1000, 500, "AUTHORIZED")])
            .await
            .unwrap();

        assert_eq!(
            out.result,
            MergeResult { matched: 0, updated: 0, inserted: 1, skipped: 0 }
        );
        let c = &out.clients[0];
        assert_eq!(c.mac.as_str(), "aa:bb:cc:11:22:33");
        assert_eq!(c.total_bytes, 1500);
        assert!(c.online);
        assert_eq!(c.status, AuthState::Authorized);
    }

    #[tokio::test]
    async fn same_record_twice_updates_only_last_seen() {
        let r = reconciler();
        let rec = raw(Some("aa:bb:cc:11:22:33"), 10, 20, "AUTHORIZED");
        let first = r.merge(vec![rec.clone()]).await.unwrap();
        let second = r.merge(vec![rec]).await.unwrap();

        assert_eq!(
            second.result,
            MergeResult { matched: 1, updated: 1, inserted: 0, skipped: 0 }
        );
        let a = &first.clients[0];
        let b = &second.clients[0];
        assert!(b.last_seen >= a.last_seen);
        assert_eq!(b.first_seen, a.first_seen);
        let mut b_aligned = b.clone();
        b_aligned.last_seen = a.last_seen;
        assert_eq!(&b_aligned, a);
    }

    #[tokio::test]
    async fn upstream_total_is_ignored() {
        let r = reconciler();
        let mut rec = raw(Some("aa:bb:cc:11:22:33"), 7, 3, "UNAUTHORIZED");
        rec.total_bytes = Some(123_456);
        let out = r.merge(vec![rec]).await.unwrap();
        assert_eq!(out.clients[0].total_bytes, 10);
        assert!(!out.clients[0].online);
    }

    #[tokio::test]
    async fn records_without_mac_are_skipped_not_fatal() {
        let r = reconciler();
        let out = r
            .merge(vec![
                raw(None, 1, 1, "AUTHORIZED"),
                raw(Some("aa:bb:cc:11:22:33"), 1, 1, "AUTHORIZED"),
                raw(Some(""), 1, 1, "AUTHORIZED"),
            ])
            .await
            .unwrap();
        assert_eq!(out.result.skipped, 2);
        assert_eq!(out.result.inserted, 1);
        assert_eq!(r.store().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_in_batch_last_one_wins() {
        let r = reconciler();
        let out = r
            .merge(vec![
                raw(Some("aa:bb:cc:11:22:33"), 1, 1, "AUTHORIZED"),
                raw(Some("AA-BB-CC-11-22-33"), 5, 5, "BLOCKED"),
            ])
            .await
            .unwrap();
        assert_eq!(out.result.inserted, 1);
        assert_eq!(out.clients.len(), 1);
        assert_eq!(out.clients[0].status, AuthState::Blocked);
        assert_eq!(out.clients[0].total_bytes, 10);
    }

    #[tokio::test]
    async fn empty_batch_touches_nothing() {
        let r = reconciler();
        let mut rx = r.store().subscribe();
        let out = r.merge(Vec::new()).await.unwrap();
        assert_eq!(out.result, MergeResult::default());
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn absent_clients_are_not_evicted() {
        let r = reconciler();
        r.merge(vec![raw(Some("aa:bb:cc:11:22:33"), 1, 1, "AUTHORIZED")])
            .await
            .unwrap();
        r.merge(vec![raw(Some("aa:bb:cc:11:22:44"), 1, 1, "AUTHORIZED")])
            .await
            .unwrap();

        let mac = MacAddress::parse("aa:bb:cc:11:22:33").unwrap();
        let kept = r.store().get(&mac).await.unwrap().unwrap();
        assert!(kept.online);
        assert_eq!(r.store().len(), 2);
    }
}
