//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from the profiles file.
//! Every section has defaults so a minimal config only needs `[[profiles]]`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::probe::types::{EndpointDescriptor, ProbeSettings};
use crate::scheduler::RunOptions;

/// Root configuration for the switcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SwitchConfig {
    /// Named endpoint profiles, in priority order.
    pub profiles: Vec<ProfileConfig>,

    /// Probe engine settings.
    pub probe: ProbeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One named API endpoint profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Unique profile name.
    pub name: String,

    /// API base URL (e.g. "https://api.anthropic.com").
    pub base_url: String,

    /// Auth token. May be empty for unauthenticated endpoints.
    #[serde(default)]
    pub token: String,

    /// Per-profile probe timeout override in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ProfileConfig {
    pub fn to_descriptor(&self) -> EndpointDescriptor {
        EndpointDescriptor {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            timeout_override: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Probe engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Maximum concurrent probes (1..=10).
    pub concurrency: usize,

    /// Per-endpoint timeout in seconds.
    pub timeout_secs: u64,

    /// Optional cap on total batch wall-clock time, in seconds.
    pub batch_timeout_secs: Option<u64>,

    /// Issue a connection-priming request before each measurement.
    pub warmup: bool,

    /// Statuses treated as "online but limited" rather than healthy.
    pub degraded_statuses: Vec<u16>,

    /// Retry with relaxed TLS validation on certificate failures.
    pub allow_invalid_certs: bool,

    /// Model named in the minimal probe request body.
    pub probe_model: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        let defaults = ProbeSettings::default();
        Self {
            concurrency: 5,
            timeout_secs: defaults.timeout.as_secs(),
            batch_timeout_secs: None,
            warmup: defaults.warmup,
            degraded_statuses: defaults.degraded_statuses,
            allow_invalid_certs: defaults.allow_invalid_certs,
            probe_model: defaults.probe_model,
        }
    }
}

impl ProbeConfig {
    pub fn to_run_options(&self) -> RunOptions {
        RunOptions {
            concurrency_limit: self.concurrency,
            batch_timeout: self.batch_timeout_secs.map(Duration::from_secs),
            probe: ProbeSettings {
                timeout: Duration::from_secs(self.timeout_secs),
                warmup: self.warmup,
                allow_invalid_certs: self.allow_invalid_certs,
                degraded_statuses: self.degraded_statuses.clone(),
                probe_model: self.probe_model.clone(),
            },
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
