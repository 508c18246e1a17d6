//! Auto-failover candidate selection.
//!
//! # Design Decisions
//! - Never churn away from a healthy current endpoint, even when a faster
//!   alternative exists
//! - Otherwise the fastest healthy candidate wins; input order breaks ties
//! - Selection is pure: the current active profile is a parameter, not
//!   ambient state

use std::time::Duration;

use serde::Serialize;

use super::{BatchReport, EndpointReport, HealthState};

/// Why a candidate was (or was not) chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailoverReason {
    CurrentHealthy,
    FasterAlternative,
    NoHealthyCandidate,
}

/// Best-candidate decision for auto mode.
#[derive(Debug, Clone, Serialize)]
pub struct FailoverDecision {
    pub chosen: Option<String>,
    pub reason: FailoverReason,
}

/// Pick the endpoint to promote as the active profile.
pub fn select_failover(report: &BatchReport, current_active: Option<&str>) -> FailoverDecision {
    if let Some(current) = current_active {
        let current_healthy = report
            .results
            .iter()
            .any(|r| r.descriptor.name == current && r.state == HealthState::Healthy);
        if current_healthy {
            return FailoverDecision {
                chosen: Some(current.to_string()),
                reason: FailoverReason::CurrentHealthy,
            };
        }
    }

    let mut fastest: Option<&EndpointReport> = None;
    for candidate in report
        .results
        .iter()
        .filter(|r| r.state == HealthState::Healthy)
    {
        let latency = candidate.outcome.latency.unwrap_or(Duration::MAX);
        // Strictly-faster replaces, so the first of equal latencies wins.
        let better = match fastest {
            Some(best) => latency < best.outcome.latency.unwrap_or(Duration::MAX),
            None => true,
        };
        if better {
            fastest = Some(candidate);
        }
    }

    match fastest {
        Some(candidate) => FailoverDecision {
            chosen: Some(candidate.descriptor.name.clone()),
            reason: FailoverReason::FasterAlternative,
        },
        None => FailoverDecision {
            chosen: None,
            reason: FailoverReason::NoHealthyCandidate,
        },
    }
}
