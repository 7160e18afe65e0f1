// ── Client store ──
//
// The keyed store behind reconciliation. `ClientStore` is the seam:
// `MemoryStore` for long-running processes and tests, `JsonFileStore` for
// the CLI so the store survives between invocations.

mod collection;
pub mod file;
pub mod memory;
pub mod query;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{ClientRecord, MacAddress};

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use query::{ClientPage, Pagination, SortField, SortOrder, StoreQuery};

/// Outcome of one bulk write.
#[derive(Debug, Clone, Default)]
pub struct BulkWrite {
    /// Keys that already existed and were replaced.
    pub matched: usize,
    /// Keys that were new.
    pub inserted: usize,
    /// Records as stored, in input order.
    pub records: Vec<ClientRecord>,
}

/// Keyed storage for client records.
///
/// Writes are full-record replaces by MAC, except that an existing
/// record's `first_seen` is kept. Nothing is ever deleted.
pub trait ClientStore: Send + Sync + 'static {
    /// Insert or replace every record in one operation.
    fn bulk_upsert(
        &self,
        records: Vec<ClientRecord>,
    ) -> impl Future<Output = Result<BulkWrite, CoreError>> + Send;

    /// Look up one record by hardware address.
    fn get(
        &self,
        mac: &MacAddress,
    ) -> impl Future<Output = Result<Option<ClientRecord>, CoreError>> + Send;

    /// Filter, sort and page the stored records.
    fn find(
        &self,
        query: &StoreQuery,
    ) -> impl Future<Output = Result<ClientPage, CoreError>> + Send;
}

/// Merge rule shared by the stores: replace everything but `first_seen`.
pub(crate) fn replace_keeping_first_seen(
    existing: Option<&ClientRecord>,
    mut incoming: ClientRecord,
) -> ClientRecord {
    if let Some(old) = existing {
        incoming.first_seen = old.first_seen;
    }
    incoming
}
