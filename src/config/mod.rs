//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! profiles file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SwitchConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read-only here; profile CRUD and persistence live outside
//!   the engine
//! - All sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ProbeConfig;
pub use schema::ProfileConfig;
pub use schema::SwitchConfig;
