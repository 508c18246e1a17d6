//! Profiles file loading.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::SwitchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Failure to produce a usable profiles file. Semantic violations are
/// collected, not short-circuited, so one load reports them all.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read profiles file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profiles file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid profiles file: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Load and validate the profiles file (TOML).
pub fn load_config(path: &Path) -> Result<SwitchConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SwitchConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Invalid)?;

    tracing::debug!(
        profiles = config.profiles.len(),
        path = %path.display(),
        "Profiles file loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_and_validates_a_profiles_file() {
        let path = write_temp(
            "apiswitch-loader-ok.toml",
            r#"
            [[profiles]]
            name = "main"
            base_url = "https://api.anthropic.com"
            token = "sk-test"

            [probe]
            concurrency = 2
            "#,
        );

        let config = load_config(&path).unwrap();
        assert_eq!(config.profiles[0].name, "main");
        assert_eq!(config.probe.concurrency, 2);
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = load_config(Path::new("/nonexistent/apiswitch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/apiswitch.toml"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let path = write_temp("apiswitch-loader-bad.toml", "profiles = not-toml");
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn semantic_violations_are_joined_in_one_message() {
        let path = write_temp(
            "apiswitch-loader-dup.toml",
            r#"
            [[profiles]]
            name = "twin"
            base_url = "https://a.example"

            [[profiles]]
            name = "twin"
            base_url = "not a url"
            "#,
        );

        let err = load_config(&path).unwrap_err();
        let ConfigError::Invalid(errors) = &err else {
            panic!("expected validation failure, got {err}");
        };
        assert_eq!(errors.len(), 2);
        let message = err.to_string();
        assert!(message.contains("duplicate profile name 'twin'"));
        assert!(message.contains("invalid base_url"));
    }
}
