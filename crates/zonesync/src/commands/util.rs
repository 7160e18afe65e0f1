//! Shared helpers for command handlers.

use zonesync_core::{Credential, DisconnectTarget, MacAddress};

use crate::cli::CredentialOpt;
use crate::error::CliError;

/// The credential passed on the command line, if any.
pub fn explicit_credential(opt: &CredentialOpt) -> Option<Credential> {
    opt.credential
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(Credential::infer)
}

/// Normalize a MAC argument or reject it.
pub fn parse_mac(field: &str, raw: &str) -> Result<MacAddress, CliError> {
    MacAddress::parse(raw).ok_or_else(|| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a MAC address"),
    })
}

pub fn disconnect_target(mac: &str, ap_mac: &str) -> Result<DisconnectTarget, CliError> {
    Ok(DisconnectTarget {
        mac: parse_mac("mac", mac)?.to_string(),
        ap_mac: parse_mac("ap-mac", ap_mac)?.to_string(),
    })
}

/// Parse `CLIENT_MAC@AP_MAC`.
pub fn parse_target(raw: &str) -> Result<DisconnectTarget, CliError> {
    let (mac, ap_mac) = raw.split_once('@').ok_or_else(|| CliError::Validation {
        field: "target".into(),
        reason: format!("expected CLIENT_MAC@AP_MAC, got '{raw}'"),
    })?;
    disconnect_target(mac, ap_mac)
}
