//! Result aggregation and the report contract.
//!
//! # Data Flow
//! ```text
//! (index, ProbeOutcome) in completion order
//!     → aggregate() (reorder to input order, classify health)
//!     → BatchReport (one entry per descriptor)
//!     → failover.rs (best-candidate selection)
//! ```
//!
//! # Design Decisions
//! - Report order is the caller's input order; completion order is internal
//!   to the scheduler and never leaks
//! - Health classification reads the outcome alone; the configurable
//!   degraded-status table was already applied when the probe tagged
//!   `RateLimited`

pub mod failover;

pub use failover::{select_failover, FailoverDecision, FailoverReason};

use std::fmt;
use std::time::SystemTime;

use serde::Serialize;

use crate::probe::types::{EndpointDescriptor, ErrorKind, ProbeOutcome};

/// Health of one endpoint, derived from its probe outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// A response was received within the timeout.
    Healthy,
    /// Online but rate-limited or over quota.
    Degraded,
    /// No response: refused, DNS, TLS, or timed out.
    Unreachable,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            HealthState::Healthy => "healthy",
            HealthState::Degraded => "degraded",
            HealthState::Unreachable => "unreachable",
        };
        f.write_str(text)
    }
}

/// One row of the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub descriptor: EndpointDescriptor,
    pub outcome: ProbeOutcome,
    pub state: HealthState,
}

/// Complete result of one probe batch, ordered as the input was.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub results: Vec<EndpointReport>,
    pub started_at: SystemTime,
    pub completed_at: SystemTime,
}

/// Derive the health state of a single outcome.
pub fn classify(outcome: &ProbeOutcome) -> HealthState {
    if !outcome.reachable {
        return HealthState::Unreachable;
    }
    if outcome.error_kind == Some(ErrorKind::RateLimited) {
        return HealthState::Degraded;
    }
    HealthState::Healthy
}

/// Merge completion-ordered outcomes back into input order.
///
/// `outcomes` carries the original index of each descriptor; there must be
/// exactly one entry per descriptor.
pub fn aggregate(
    descriptors: Vec<EndpointDescriptor>,
    mut outcomes: Vec<(usize, ProbeOutcome)>,
    started_at: SystemTime,
) -> BatchReport {
    debug_assert_eq!(descriptors.len(), outcomes.len());
    outcomes.sort_by_key(|(index, _)| *index);

    let results = descriptors
        .into_iter()
        .zip(outcomes)
        .map(|(descriptor, (_, outcome))| {
            let state = classify(&outcome);
            EndpointReport {
                descriptor,
                outcome,
                state,
            }
        })
        .collect();

    BatchReport {
        results,
        started_at,
        completed_at: SystemTime::now(),
    }
}
