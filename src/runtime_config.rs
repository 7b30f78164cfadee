//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the binding pipeline.
//!
//! ## Environment Variables
//!
//! ### `BRRTB_MAX_BODY_BYTES`
//!
//! Largest request payload the binder accepts, in bytes. Accepts decimal
//! (`1048576`) or hexadecimal (`0x100000`). Larger payloads are answered with
//! `413 Payload Too Large`. Unset or unparseable means no limit.
//!
//! ### `BRRTB_ECHO_REQUEST_ID`
//!
//! `true` (default) or `false`. When enabled every response written by the
//! dispatcher carries the request id header.
//!
//! ### `BRRTB_REQUEST_ID_HEADER`
//!
//! Header the request id is read from and echoed in. Default: `x-request-id`.
//!
//! ## Usage
//!
//! ```rust
//! use brrtbind::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Body limit: {:?}", config.max_body_bytes);
//! ```

use std::env;

/// Default header carrying the request id.
pub const DEFAULT_REQUEST_ID_HEADER: &str = "x-request-id";

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum payload size in bytes (`None` = unlimited)
    pub max_body_bytes: Option<usize>,
    /// Echo the request id on every written response
    pub echo_request_id: bool,
    /// Lower-cased request id header name
    pub request_id_header: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: None,
            echo_request_id: true,
            request_id_header: DEFAULT_REQUEST_ID_HEADER.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup (used by tests).
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            max_body_bytes: lookup("BRRTB_MAX_BODY_BYTES").and_then(|v| parse_size(&v)),
            echo_request_id: lookup("BRRTB_ECHO_REQUEST_ID")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.echo_request_id),
            request_id_header: lookup("BRRTB_REQUEST_ID_HEADER")
                .map(|v| v.trim().to_ascii_lowercase())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.request_id_header),
        }
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}
