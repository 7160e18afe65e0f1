// ── Domain model ──

pub mod client;
pub mod mac;

pub use client::{AuthState, ClientRecord};
pub use mac::MacAddress;
