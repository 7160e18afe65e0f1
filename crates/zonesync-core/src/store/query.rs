// ── Store queries ──
//
// Filtering, sorting and pagination over stored client records. Shared
// by every `ClientStore` implementation that keeps records in memory.

use std::cmp::Ordering;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::model::{AuthState, ClientRecord};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 20;

/// Field a page is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    #[default]
    LastSeen,
    FirstSeen,
    Hostname,
    Mac,
    Ssid,
    TotalBytes,
    Rssi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A query against the local client store.
///
/// `ssid` and `status` match exactly. `mac` is a case-insensitive regex
/// over the hardware address; `search` is a case-insensitive regex over
/// hostname, MAC, IP and model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreQuery {
    pub ssid: Option<String>,
    pub status: Option<AuthState>,
    pub mac: Option<String>,
    pub search: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    /// 1-based.
    pub page: u32,
    pub limit: u32,
}

impl Default for StoreQuery {
    fn default() -> Self {
        Self {
            ssid: None,
            status: None,
            mac: None,
            search: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Pagination metadata returned with every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// One page of query results.
#[derive(Debug, Clone, Serialize)]
pub struct ClientPage {
    pub clients: Vec<ClientRecord>,
    pub pagination: Pagination,
}

// ── Compiled form ────────────────────────────────────────────────────

pub(crate) struct CompiledQuery<'q> {
    query: &'q StoreQuery,
    mac: Option<Regex>,
    search: Option<Regex>,
}

fn pattern(field: &str, raw: Option<&str>) -> Result<Option<Regex>, CoreError> {
    raw.filter(|p| !p.is_empty())
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| CoreError::InvalidQuery {
                    message: format!("{field}: {e}"),
                })
        })
        .transpose()
}

impl StoreQuery {
    pub(crate) fn compile(&self) -> Result<CompiledQuery<'_>, CoreError> {
        if self.page == 0 {
            return Err(CoreError::InvalidQuery {
                message: "page starts at 1".into(),
            });
        }
        if self.limit == 0 {
            return Err(CoreError::InvalidQuery {
                message: "limit must be at least 1".into(),
            });
        }
        Ok(CompiledQuery {
            query: self,
            mac: pattern("mac", self.mac.as_deref())?,
            search: pattern("search", self.search.as_deref())?,
        })
    }
}

impl CompiledQuery<'_> {
    fn matches(&self, c: &ClientRecord) -> bool {
        let q = self.query;
        if q.ssid.as_ref().is_some_and(|s| c.ssid.as_ref() != Some(s)) {
            return false;
        }
        if q.status.is_some_and(|s| c.status != s) {
            return false;
        }
        if self.mac.as_ref().is_some_and(|re| !re.is_match(c.mac.as_str())) {
            return false;
        }
        if let Some(re) = &self.search {
            let hit = [
                c.hostname.as_deref(),
                Some(c.mac.as_str()),
                c.ip_address.as_deref(),
                c.model_name.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|v| re.is_match(v));
            if !hit {
                return false;
            }
        }
        true
    }

    fn compare(&self, a: &ClientRecord, b: &ClientRecord) -> Ordering {
        let ord = match self.query.sort {
            SortField::LastSeen => a.last_seen.cmp(&b.last_seen),
            SortField::FirstSeen => a.first_seen.cmp(&b.first_seen),
            SortField::Hostname => a.hostname.cmp(&b.hostname),
            SortField::Mac => a.mac.cmp(&b.mac),
            SortField::Ssid => a.ssid.cmp(&b.ssid),
            SortField::TotalBytes => a.total_bytes.cmp(&b.total_bytes),
            SortField::Rssi => a.rssi.cmp(&b.rssi),
        };
        // MAC as tiebreaker keeps pages stable.
        let ord = ord.then_with(|| a.mac.cmp(&b.mac));
        match self.query.order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }

    /// Filter, sort and slice `records` into one page.
    pub(crate) fn apply(&self, records: &[Arc<ClientRecord>]) -> ClientPage {
        let mut hits: Vec<&ClientRecord> = records
            .iter()
            .map(|c| &**c)
            .filter(|c| self.matches(c))
            .collect();
        hits.sort_by(|a, b| self.compare(a, b));

        let total = hits.len() as u64;
        let limit = self.query.limit;
        let page = self.query.page;
        let skip = usize::try_from(u64::from(page - 1) * u64::from(limit)).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        ClientPage {
            clients: hits.into_iter().skip(skip).take(take).cloned().collect(),
            pagination: Pagination {
                total,
                page,
                limit,
                total_pages: total.div_ceil(u64::from(limit)),
            },
        }
    }
}
