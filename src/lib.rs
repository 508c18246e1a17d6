//! Concurrent API endpoint probing and failover engine.
//!
//! ```text
//! (name, base_url, token) descriptors
//!     → scheduler (bounded worker pool, progress hook)
//!     → probe (streaming-preferred measurement per endpoint)
//!     → report (input-ordered BatchReport, failover decision)
//! ```

pub mod config;
pub mod probe;
pub mod report;
pub mod scheduler;

pub use config::SwitchConfig;
pub use probe::{EndpointDescriptor, ErrorKind, ProbeOutcome, ProbeSettings};
pub use report::{
    select_failover, BatchReport, FailoverDecision, FailoverReason, HealthState,
};
pub use scheduler::{run_batch, BatchError, ProgressHook, RunOptions};
