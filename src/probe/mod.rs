//! Endpoint probing subsystem.
//!
//! # Data Flow
//! ```text
//! EndpointDescriptor
//!     → runner.rs (warm-up, streaming request, non-streaming fallback)
//!     → classify.rs (transport errors → ErrorKind)
//!     → ProbeOutcome (one per descriptor, always)
//! ```
//!
//! # Design Decisions
//! - A probe never errors for expected network failures; every failure mode
//!   is data in the outcome
//! - Streaming mode is preferred because it returns on the first byte
//!   instead of a full body
//! - TLS certificate failures are downgraded to a relaxed-validation retry;
//!   the probe detects connectivity, it does not enforce certificate policy

pub mod classify;
pub mod runner;
pub mod types;

pub use runner::Prober;
pub use types::{EndpointDescriptor, ErrorKind, ProbeOutcome, ProbeSettings};
