// ── Client domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::mac::MacAddress;

/// Authorization state reported by the controller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AuthState {
    Authorized,
    Unauthorized,
    Blocked,
    /// Missing or unrecognized upstream value.
    #[default]
    Unknown,
}

impl AuthState {
    /// Map the upstream `status` string; anything unexpected is `Unknown`.
    pub fn from_upstream(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok())
            .unwrap_or(Self::Unknown)
    }
}

/// A connected client as kept in the local store.
///
/// Keyed by `mac`. Numeric fields the controller omitted are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub mac: MacAddress,

    // Identity
    pub hostname: Option<String>,
    pub device_type: Option<String>,
    pub model_name: Option<String>,
    pub os_type: Option<String>,
    pub os_vendor_type: Option<String>,

    // Network attachment
    pub ip_address: Option<String>,
    pub ipv6_address: Option<String>,
    pub ap_mac: Option<MacAddress>,
    pub ap_name: Option<String>,
    pub ssid: Option<String>,
    pub bssid: Option<String>,
    pub vlan: i64,
    pub channel: i64,
    pub radio_type: Option<String>,
    pub zone_id: Option<String>,
    pub zone_version: Option<String>,
    pub control_plane_name: Option<String>,
    pub data_plane_name: Option<String>,

    // Authentication
    pub status: AuthState,
    pub auth_status: Option<String>,
    pub auth_method: Option<String>,
    pub encryption_method: Option<String>,
    pub user_role_name: Option<String>,
    pub user_role_id: Option<String>,

    // Traffic
    pub tx_bytes: u64,
    pub rx_bytes: u64,
    /// Always `tx_bytes + rx_bytes`, whatever the controller reported.
    pub total_bytes: u64,
    pub uplink_rate: f64,
    pub downlink_rate: f64,
    pub tx_rate_bps: f64,
    pub median_tx_mcs_rate: f64,
    pub median_rx_mcs_rate: f64,

    // Signal
    pub rssi: i64,
    pub snr: i64,

    // Timing
    pub session_start_time: i64,
    pub online: bool,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl ClientRecord {
    /// Display name: hostname if known, otherwise the MAC.
    pub fn display_name(&self) -> &str {
        self.hostname
            .as_deref()
            .filter(|h| !h.is_empty())
            .unwrap_or(self.mac.as_str())
    }
}
