//! Batch scheduling subsystem.
//!
//! # Data Flow
//! ```text
//! Vec<EndpointDescriptor> (input order)
//!     → pool.rs (semaphore-bounded workers, one task per descriptor)
//!     → mpsc channel (completion order, drives the progress hook)
//!     → report::aggregate (back to input order)
//! ```
//!
//! # Design Decisions
//! - Workers share nothing but the result channel; each descriptor is
//!   exclusively owned by its probe task
//! - A probe panic degrades to an `internal` outcome for that descriptor
//!   only; a batch never aborts partway
//! - The batch timeout abandons in-flight probes rather than waiting on a
//!   hung connection

pub mod pool;

pub use pool::{run_batch, BatchError, ProgressHook, RunOptions, MAX_CONCURRENCY};
