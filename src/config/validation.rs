//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Unique profile names, parseable base URLs
//! - Value ranges (timeouts > 0, concurrency within bounds)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function over SwitchConfig
//! - Runs before any probing begins

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::schema::SwitchConfig;
use crate::scheduler::MAX_CONCURRENCY;

/// One semantic violation in the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    NoProfiles,
    DuplicateProfile(String),
    InvalidBaseUrl { name: String, url: String },
    InvalidConcurrency(usize),
    ZeroTimeout,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NoProfiles => write!(f, "no profiles configured"),
            ValidationError::DuplicateProfile(name) => {
                write!(f, "duplicate profile name '{}'", name)
            }
            ValidationError::InvalidBaseUrl { name, url } => {
                write!(f, "profile '{}' has invalid base_url '{}'", name, url)
            }
            ValidationError::InvalidConcurrency(value) => write!(
                f,
                "probe.concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY, value
            ),
            ValidationError::ZeroTimeout => write!(f, "probe.timeout_secs must be positive"),
        }
    }
}

/// Validate a parsed config, collecting every violation.
pub fn validate_config(config: &SwitchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.profiles.is_empty() {
        errors.push(ValidationError::NoProfiles);
    }

    let mut seen = HashSet::new();
    for profile in &config.profiles {
        if !seen.insert(profile.name.as_str()) {
            errors.push(ValidationError::DuplicateProfile(profile.name.clone()));
        }
        if Url::parse(&profile.base_url).is_err() {
            errors.push(ValidationError::InvalidBaseUrl {
                name: profile.name.clone(),
                url: profile.base_url.clone(),
            });
        }
    }

    if config.probe.concurrency == 0 || config.probe.concurrency > MAX_CONCURRENCY {
        errors.push(ValidationError::InvalidConcurrency(config.probe.concurrency));
    }
    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
