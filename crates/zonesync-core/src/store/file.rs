// ── JSON-file client store ──
//
// A `MemoryStore` mirrored to a JSON array file. Several processes may
// share one file: every bulk write takes an exclusive lock on a sidecar
// `.lock` file, re-reads the records on disk, applies the batch on top and
// renames a temp file into place. Memory changes only after the rename.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{BulkWrite, ClientPage, ClientStore, MemoryStore, StoreQuery, replace_keeping_first_seen};
use crate::error::CoreError;
use crate::model::{ClientRecord, MacAddress};

fn store_error(path: &Path, what: &str, e: impl std::fmt::Display) -> CoreError {
    CoreError::Store {
        message: format!("{what} {}: {e}", path.display()),
    }
}

/// `clients.json` → `clients.json.<suffix>`
fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn parse_records(path: &Path, bytes: &[u8]) -> Result<Vec<ClientRecord>, CoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes).map_err(|e| store_error(path, "cannot parse", e))
}

fn read_records(path: &Path) -> Result<Vec<ClientRecord>, CoreError> {
    match std::fs::read(path) {
        Ok(bytes) => parse_records(path, &bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(store_error(path, "cannot read", e)),
    }
}

/// Blocks until no other writer holds the store. Released on drop.
fn lock_store(path: &Path) -> Result<File, CoreError> {
    let lock_path = sidecar(path, "lock");
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .map_err(|e| store_error(&lock_path, "cannot open", e))?;
    file.lock_exclusive()
        .map_err(|e| store_error(&lock_path, "cannot lock", e))?;
    Ok(file)
}

/// Two copies of one client: the later sighting wins, the earliest
/// `first_seen` is kept.
fn newest(a: ClientRecord, b: ClientRecord) -> ClientRecord {
    let first_seen = a.first_seen.min(b.first_seen);
    let mut keep = if b.last_seen > a.last_seen { b } else { a };
    keep.first_seen = first_seen;
    keep
}

/// Apply `incoming` over the union of the file and `cached`, then replace
/// the file. Returns the write outcome and the full stored set.
fn commit(
    path: &Path,
    cached: Vec<ClientRecord>,
    incoming: Vec<ClientRecord>,
) -> Result<(BulkWrite, Vec<ClientRecord>), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| store_error(parent, "cannot create", e))?;
    }
    let _lock = lock_store(path)?;

    let mut current: HashMap<MacAddress, ClientRecord> = HashMap::new();
    for record in read_records(path)?.into_iter().chain(cached) {
        let merged = match current.remove(&record.mac) {
            Some(seen) => newest(seen, record),
            None => record,
        };
        current.insert(merged.mac.clone(), merged);
    }

    let mut out = BulkWrite {
        records: Vec::with_capacity(incoming.len()),
        ..BulkWrite::default()
    };
    for record in incoming {
        let existing = current.get(&record.mac);
        if existing.is_some() {
            out.matched += 1;
        } else {
            out.inserted += 1;
        }
        let stored = replace_keeping_first_seen(existing, record);
        current.insert(stored.mac.clone(), stored.clone());
        out.records.push(stored);
    }

    let mut records: Vec<ClientRecord> = current.into_values().collect();
    records.sort_by(|a, b| a.mac.cmp(&b.mac));
    let json = serde_json::to_vec_pretty(&records)
        .map_err(|e| store_error(path, "cannot serialize", e))?;

    let tmp = sidecar(path, "tmp");
    std::fs::write(&tmp, json).map_err(|e| store_error(&tmp, "cannot write", e))?;
    std::fs::rename(&tmp, path).map_err(|e| store_error(path, "cannot replace", e))?;

    Ok((out, records))
}

/// File-backed store for short-lived processes.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
    write: Mutex<()>,
}

impl JsonFileStore {
    /// Load `path` if it exists; start empty otherwise.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let records = match tokio::fs::read(&path).await {
            Ok(bytes) => parse_records(&path, &bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(store_error(&path, "cannot read", e)),
        };
        info!(path = %path.display(), clients = records.len(), "opened client store");

        Ok(Self {
            memory: MemoryStore::with_records(records),
            path,
            write: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

impl ClientStore for JsonFileStore {
    async fn bulk_upsert(&self, records: Vec<ClientRecord>) -> Result<BulkWrite, CoreError> {
        let _guard = self.write.lock().await;

        let cached: Vec<ClientRecord> = self
            .memory
            .snapshot()
            .iter()
            .map(|r| ClientRecord::clone(r))
            .collect();
        let path = self.path.clone();
        let (written, stored) = tokio::task::spawn_blocking(move || commit(&path, cached, records))
            .await
            .map_err(|e| store_error(&self.path, "writer aborted for", e))??;

        debug!(
            path = %self.path.display(),
            clients = stored.len(),
            matched = written.matched,
            inserted = written.inserted,
            "client store saved"
        );
        self.memory.load(stored);
        Ok(written)
    }

    async fn get(&self, mac: &MacAddress) -> Result<Option<ClientRecord>, CoreError> {
        self.memory.get(mac).await
    }

    async fn find(&self, query: &StoreQuery) -> Result<ClientPage, CoreError> {
        self.memory.find(query).await
    }
}
