// ── API-to-domain conversion ──
//
// Normalizes `zonesync_api::RawClient` into `ClientRecord`. Derived
// fields are always recomputed here, never taken from upstream.

use chrono::{DateTime, Utc};

use zonesync_api::RawClient;

use crate::model::{AuthState, ClientRecord, MacAddress};

/// Normalize one upstream record observed at `now`.
///
/// Returns `None` when the record has no usable hardware address.
/// `first_seen` is provisionally `now`; the store keeps the original on
/// update.
pub(crate) fn client_record(raw: RawClient, now: DateTime<Utc>) -> Option<ClientRecord> {
    let mac = MacAddress::parse(raw.client_mac.as_deref()?)?;
    let tx_bytes = raw.tx_bytes.unwrap_or(0);
    let rx_bytes = raw.rx_bytes.unwrap_or(0);
    let status = AuthState::from_upstream(raw.status.as_deref());

    Some(ClientRecord {
        mac,
        hostname: raw.hostname,
        device_type: raw.device_type,
        model_name: raw.model_name,
        os_type: raw.os_type,
        os_vendor_type: raw.os_vendor_type,
        ip_address: raw.ip_address,
        ipv6_address: raw.ipv6_address,
        ap_mac: raw.ap_mac.as_deref().and_then(MacAddress::parse),
        ap_name: raw.ap_name,
        ssid: raw.ssid,
        bssid: raw.bssid,
        vlan: raw.vlan.unwrap_or(0),
        channel: raw.channel.unwrap_or(0),
        radio_type: raw.radio_type,
        zone_id: raw.zone_id,
        zone_version: raw.zone_version,
        control_plane_name: raw.control_plane_name,
        data_plane_name: raw.data_plane_name,
        status,
        auth_status: raw.auth_status,
        auth_method: raw.auth_method,
        encryption_method: raw.encryption_method,
        user_role_name: raw.user_role_name,
        user_role_id: raw.user_role_id,
        tx_bytes,
        rx_bytes,
        total_bytes: tx_bytes.saturating_add(rx_bytes),
        uplink_rate: raw.uplink_rate.unwrap_or(0.0),
        downlink_rate: raw.downlink_rate.unwrap_or(0.0),
        tx_rate_bps: raw.tx_ratebps.unwrap_or(0.0),
        median_tx_mcs_rate: raw.median_tx_mcs_rate.unwrap_or(0.0),
        median_rx_mcs_rate: raw.median_rx_mcs_rate.unwrap_or(0.0),
        rssi: raw.rssi.unwrap_or(0),
        snr: raw.snr.unwrap_or(0),
        session_start_time: raw.session_start_time.unwrap_or(0),
        online: status == AuthState::Authorized,
        first_seen: now,
        last_seen: now,
    })
}
