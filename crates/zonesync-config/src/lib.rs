//! Configuration for the zonesync CLI.
//!
//! TOML profiles, password resolution (env + keyring + plaintext), and
//! translation to `zonesync_core::ControllerConfig`. The CLI layers its
//! flag overrides on top of what this crate produces.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zonesync_core::{ControllerConfig, CredentialKind, TlsVerification};

pub const ENV_PREFIX: &str = "ZONESYNC_";
const KEYRING_SERVICE: &str = "zonesync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Which credential the controller session uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSetting {
    #[default]
    Cookie,
    Ticket,
}

impl From<CredentialSetting> for CredentialKind {
    fn from(s: CredentialSetting) -> Self {
        match s {
            CredentialSetting::Cookie => CredentialKind::Cookie,
            CredentialSetting::Ticket => CredentialKind::Ticket,
        }
    }
}

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile name in effect: `name`, then `default_profile`, then
    /// `"default"`.
    pub fn profile_name<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        name.or(self.default_profile.as_deref()).unwrap_or("default")
    }

    /// Look up a profile, falling back to `default_profile`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = self.profile_name(name);
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Session lifetime, seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl: u64,

    /// Live sync interval, seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    #[serde(default)]
    pub credential: CredentialSetting,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            session_ttl: default_session_ttl(),
            poll_interval: default_poll_interval(),
            credential: CredentialSetting::default(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}
fn default_session_ttl() -> u64 {
    300
}
fn default_poll_interval() -> u64 {
    45
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API base URL, e.g. "https://sz.example.net:8443/wsg/api/public/v11_1".
    pub controller: String,

    /// Admin username.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to a PEM CA certificate for the controller.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification. Must be set explicitly.
    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
    pub session_ttl: Option<u64>,
    pub poll_interval: Option<u64>,

    /// Only list clients of this WLAN id.
    pub wlan_filter: Option<String>,

    pub credential: Option<CredentialSetting>,

    /// Where the local client store lives.
    pub store_path: Option<PathBuf>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "zonesync", "zonesync")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("zonesync");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default location of the local client store.
pub fn default_store_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("clients.json"),
        |dirs| dirs.data_dir().join("clients.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then `path` (if present), then `ZONESYNC_*` variables.
///
/// Nested keys use a double underscore:
/// `ZONESYNC_PROFILES__LAB__CONTROLLER=https://...`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the admin password: env var, then keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env, then ZONESYNC_PASSWORD
    let env_names = profile
        .password_env
        .iter()
        .map(String::as_str)
        .chain(std::iter::once("ZONESYNC_PASSWORD"));
    for name in env_names {
        if let Ok(pw) = std::env::var(name) {
            return Ok(SecretString::from(pw));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: "must be greater than zero".into(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Build a `ControllerConfig` from a profile plus global defaults.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("ZONESYNC_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;

    let tls = match (profile.insecure.unwrap_or(false), &profile.ca_cert) {
        (true, Some(ca_path)) => {
            return Err(ConfigError::Validation {
                field: "insecure".into(),
                reason: format!(
                    "cannot be combined with ca_cert ({}); pick one trust mode",
                    ca_path.display()
                ),
            });
        }
        (true, None) => TlsVerification::DangerAcceptInvalid,
        (false, Some(ca_path)) => TlsVerification::CustomCa(ca_path.clone()),
        (false, None) => TlsVerification::SystemDefaults,
    };

    let mut config = ControllerConfig::new(url, username, password);
    config.tls = tls;
    config.timeout = positive_secs("timeout", profile.timeout.unwrap_or(defaults.timeout))?;
    config.session_ttl = positive_secs(
        "session_ttl",
        profile.session_ttl.unwrap_or(defaults.session_ttl),
    )?;
    config.poll_interval = positive_secs(
        "poll_interval",
        profile.poll_interval.unwrap_or(defaults.poll_interval),
    )?;
    config.credential = profile.credential.unwrap_or(defaults.credential).into();
    config.wlan_filter = profile.wlan_filter.clone();
    Ok(config)
}
