//! Core data types for endpoint probing.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// A single endpoint to probe. Immutable for the duration of a run.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDescriptor {
    /// Profile name, unique within a batch.
    pub name: String,
    /// API base URL (e.g. "https://api.anthropic.com").
    pub base_url: String,
    /// Auth token, opaque to the engine. May be empty.
    #[serde(skip_serializing)]
    pub token: String,
    /// Per-endpoint timeout override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_override: Option<Duration>,
}

/// Failure category for a probe that received no usable response.
///
/// `RateLimited` is the one non-failure member: the endpoint answered, but
/// with a status the run treats as "online but limited".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConnectionRefused,
    DnsFailure,
    TlsFailure,
    Timeout,
    RateLimited,
    MalformedResponse,
    BatchTimeout,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::ConnectionRefused => "connection refused",
            ErrorKind::DnsFailure => "dns failure",
            ErrorKind::TlsFailure => "tls failure",
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::MalformedResponse => "malformed response",
            ErrorKind::BatchTimeout => "batch timeout",
            ErrorKind::Internal => "internal error",
        };
        f.write_str(text)
    }
}

/// Result of probing one endpoint. Exactly one is produced per descriptor
/// per batch, whatever happens on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeOutcome {
    pub name: String,
    /// True if any HTTP status was received, regardless of its class.
    pub reachable: bool,
    /// Time to first byte. Present only when `reachable` is true.
    #[serde(serialize_with = "latency_ms", rename = "latency_ms")]
    pub latency: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_detail: Option<String>,
}

impl ProbeOutcome {
    /// Outcome for an endpoint that produced no response.
    pub fn failed(name: String, kind: ErrorKind, detail: String) -> Self {
        Self {
            name,
            reachable: false,
            latency: None,
            http_status: None,
            error_kind: Some(kind),
            raw_detail: Some(detail),
        }
    }
}

fn latency_ms<S: Serializer>(latency: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
    match latency {
        Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

/// Per-run probe behavior, shared by every probe in a batch.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    /// Default per-endpoint timeout, enforced independently on the warm-up,
    /// streaming, and fallback requests.
    pub timeout: Duration,
    /// Issue a connection-priming request before the measurement.
    pub warmup: bool,
    /// Retry once with relaxed certificate validation on TLS failures.
    pub allow_invalid_certs: bool,
    /// Statuses treated as "online but limited" rather than healthy.
    pub degraded_statuses: Vec<u16>,
    /// Model named in the minimal probe request body.
    pub probe_model: String,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(8),
            warmup: false,
            allow_invalid_certs: true,
            degraded_statuses: vec![409, 429],
            probe_model: "claude-3-5-haiku-20241022".to_string(),
        }
    }
}
