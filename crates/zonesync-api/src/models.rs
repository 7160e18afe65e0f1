// Controller wire types
//
// Request and response shapes for the SmartZone public API. Response
// fields use `#[serde(default)]` liberally: the controller omits fields
// freely across firmware versions and mixes numbers with numeric strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Paged list envelope ──────────────────────────────────────────────

/// Standard SmartZone list envelope:
/// ```json
/// { "totalCount": 2, "hasMore": false, "firstIndex": 0, "list": [...] }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub first_index: u64,
    #[serde(default = "Vec::new")]
    pub list: Vec<T>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_type: Option<String>,
}

// ── Session & ticket ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `POST /serviceTicket` response. Older firmware names the field `ticket`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TicketResponse {
    #[serde(default, alias = "ticket")]
    pub service_ticket: Option<String>,
    #[serde(default)]
    pub controller_version: Option<String>,
}

/// Body of a successful `POST /session`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProfile {
    #[serde(default)]
    pub controller_version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `GET /session` response describing the logged-in administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    #[serde(default)]
    pub cp_id: Option<String>,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub admin_role_id: Option<String>,
    #[serde(default)]
    pub client_ip: Option<String>,
    #[serde(default)]
    pub api_versions: Vec<String>,
    #[serde(default)]
    pub partner_domain: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Zones ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Client query ─────────────────────────────────────────────────────

/// One `{type, value}` filter of a `POST /query/client` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    #[serde(rename = "type")]
    pub filter_type: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullTextSearch {
    #[serde(rename = "type")]
    pub search_type: String,
    pub value: String,
}

impl Default for FullTextSearch {
    fn default() -> Self {
        Self {
            search_type: "AND".into(),
            value: String::new(),
        }
    }
}

/// Upstream query for the connected-client list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientQuery {
    pub filters: Vec<QueryFilter>,
    pub full_text_search: FullTextSearch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ClientQuery {
    /// Restrict to clients of one WLAN.
    pub fn wlan(id: impl Into<String>) -> Self {
        Self::default().with_filter("WLAN", id)
    }

    pub fn with_filter(mut self, filter_type: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(QueryFilter {
            filter_type: filter_type.into(),
            value: value.into(),
        });
        self
    }
}

/// `POST /query/client` response. Some firmware returns the list envelope,
/// some a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ClientListResponse {
    Bare(Vec<RawClient>),
    Page(ListPage<RawClient>),
}

/// Connected clients as reported upstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientList {
    pub total_count: u64,
    pub has_more: bool,
    pub clients: Vec<RawClient>,
}

impl From<ClientListResponse> for ClientList {
    fn from(resp: ClientListResponse) -> Self {
        match resp {
            ClientListResponse::Bare(clients) => Self {
                total_count: clients.len() as u64,
                has_more: false,
                clients,
            },
            ClientListResponse::Page(page) => Self {
                total_count: page.total_count,
                has_more: page.has_more,
                clients: page.list,
            },
        }
    }
}

/// A connected client exactly as the controller reports it.
///
/// Every field is optional: the hardware address is the only thing the
/// reconciliation layer insists on, and it checks that itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClient {
    // Identity
    #[serde(default, deserialize_with = "lenient::string")]
    pub client_mac: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub device_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub os_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub os_vendor_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub model_name: Option<String>,

    // Network attachment
    #[serde(default, deserialize_with = "lenient::string")]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ipv6_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ap_mac: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ap_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ssid: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub bssid: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub vlan: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub channel: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub radio_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub zone_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub zone_version: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub control_plane_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub data_plane_name: Option<String>,

    // Authentication
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub auth_status: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub auth_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub encryption_method: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_role_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub user_role_id: Option<String>,

    // Traffic
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub tx_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::unsigned")]
    pub rx_bytes: Option<u64>,
    /// Upstream's own total, when present. Never trusted downstream.
    #[serde(default, alias = "traffic", deserialize_with = "lenient::unsigned")]
    pub total_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub uplink_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub downlink_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub tx_ratebps: Option<f64>,
    #[serde(default, rename = "medianTxMCSRate", deserialize_with = "lenient::float")]
    pub median_tx_mcs_rate: Option<f64>,
    #[serde(default, rename = "medianRxMCSRate", deserialize_with = "lenient::float")]
    pub median_rx_mcs_rate: Option<f64>,

    // Signal
    #[serde(default, deserialize_with = "lenient::int")]
    pub rssi: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub snr: Option<i64>,

    // Session, epoch milliseconds
    #[serde(default, deserialize_with = "lenient::int")]
    pub session_start_time: Option<i64>,

    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ── Disconnect ───────────────────────────────────────────────────────

/// A client to disconnect, addressed by its MAC and serving AP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectTarget {
    pub mac: String,
    pub ap_mac: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkDisconnectRequest<'a> {
    pub client_list: &'a [DisconnectTarget],
}

// ── Lenient field decoders ───────────────────────────────────────────

mod lenient {
    use super::{Deserialize, Deserializer, Value};

    pub(super) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) if !s.is_empty() => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        })
    }

    pub(super) fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn unsigned<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }

    pub(super) fn float<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        })
    }
}
