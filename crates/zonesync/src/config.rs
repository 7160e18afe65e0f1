//! Flag overrides on top of `zonesync-config` profiles.
//!
//! This is the single place where CLI flags cross into core config types.

use std::path::PathBuf;

use secrecy::SecretString;

use zonesync_config::{Config, ConfigError, CredentialSetting, Profile};
use zonesync_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The config file in effect: `--config` or the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(zonesync_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(zonesync_config::load_config_from(&config_file(global))?)
}

/// Apply flag overrides to a copy of `base`.
fn overlay(base: Option<&Profile>, global: &GlobalOpts) -> Profile {
    let mut profile = base.cloned().unwrap_or_default();
    if let Some(ref url) = global.controller {
        profile.controller.clone_from(url);
    }
    if global.username.is_some() {
        profile.username.clone_from(&global.username);
    }
    if global.password.is_some() {
        profile.password.clone_from(&global.password);
    }
    // A trust flag replaces the profile's trust mode instead of mixing with it.
    if global.ca_cert.is_some() || global.insecure {
        profile.ca_cert.clone_from(&global.ca_cert);
        profile.insecure = Some(global.insecure);
    }
    if global.ticket_auth {
        profile.credential = Some(CredentialSetting::Ticket);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    if global.wlan.is_some() {
        profile.wlan_filter.clone_from(&global.wlan);
    }
    if global.store.is_some() {
        profile.store_path.clone_from(&global.store);
    }
    profile
}

/// Build a `ControllerConfig` from the config file, profile, and flags.
///
/// `--controller` alone is enough; otherwise the selected profile must
/// exist.
pub fn controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load(global)?;
    let (name, profile) = match cfg.profile(global.profile.as_deref()) {
        Ok((name, base)) => (name.to_owned(), overlay(Some(base), global)),
        Err(_) if global.controller.is_some() => (
            cfg.profile_name(global.profile.as_deref()).to_owned(),
            overlay(None, global),
        ),
        Err(ConfigError::UnknownProfile { name }) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                path: config_file(global).display().to_string(),
            });
        }
        Err(_) => {
            return Err(CliError::NoConfig {
                path: config_file(global).display().to_string(),
            });
        }
    };

    let mut config = zonesync_config::profile_to_controller_config(&profile, &name, &cfg.defaults)?;

    // An explicit --password beats the env/keyring chain.
    if let Some(ref password) = global.password {
        config.password = SecretString::from(password.clone());
    }
    Ok(config)
}

/// Where the local client store lives: flag, profile, platform default.
pub fn store_path(global: &GlobalOpts) -> Result<PathBuf, CliError> {
    if let Some(ref path) = global.store {
        return Ok(path.clone());
    }
    let cfg = load(global)?;
    Ok(cfg
        .profile(global.profile.as_deref())
        .ok()
        .and_then(|(_, p)| p.store_path.clone())
        .unwrap_or_else(zonesync_config::default_store_path))
}
