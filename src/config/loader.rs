//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::object::Config;
use crate::config::schema::{FileConfig, DEFAULT_PROFILE};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides the profile named in the file.
pub const PROFILE_ENV: &str = "TRIPWIRE_PROFILE";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    /// Construction failed for a reason outside file handling.
    Source(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Source(msg) => write!(f, "Config source error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Pick the profile name: explicit override, then environment, then file, then default.
pub fn select_profile(file: &FileConfig, explicit: Option<&str>) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }
    if let Ok(name) = std::env::var(PROFILE_ENV) {
        if !name.trim().is_empty() {
            return name;
        }
    }
    file.profile
        .clone()
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
}

/// Validate a parsed file and resolve it into a [`Config`] for `profile`.
pub fn resolve(file: FileConfig, profile: &str) -> Result<Config, ConfigError> {
    validate_config(&file, profile).map_err(ConfigError::Validation)?;

    let mut file = file;
    let selected = file
        .profiles
        .remove(profile)
        .ok_or_else(|| ConfigError::Validation(vec![ValidationError::MissingProfile(profile.to_string())]))?;
    let reporting = selected.reporting.unwrap_or(file.reporting);

    Ok(Config::new(profile, reporting, file.exit_status, selected.notifiers))
}

/// Parse TOML text and resolve it.
pub fn parse_config(content: &str, profile: Option<&str>) -> Result<Config, ConfigError> {
    let file: FileConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    let profile = select_profile(&file, profile);
    resolve(file, &profile)
}

/// Load, validate and resolve configuration from a TOML file.
pub fn load_config(path: &Path, profile: Option<&str>) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::Severity;

    const SAMPLE: &str = r#"
        reporting = "ERROR | USER_ERROR | USER_WARNING"
        profile = "production"
        exit_status = 70

        [profiles.production]
        reporting = "ALL"

        [[profiles.production.notifiers]]
        id = "log"
        settings = { file = "/tmp/faults.log" }

        [[profiles.production.notifiers]]
        id = "abort"
        enabled = "ERROR | USER_ERROR"
        ignore_log_only = true

        [[profiles.development.notifiers]]
        id = "render"
    "#;

    #[test]
    fn test_parse_explicit_profile() {
        let config = parse_config(SAMPLE, Some("development")).unwrap();
        assert_eq!(config.profile(), "development");
        assert_eq!(config.reporting_mask(), Severity::ERROR | Severity::USER_ERROR | Severity::USER_WARNING);
        assert_eq!(config.notifier_descriptors().len(), 1);
        assert_eq!(config.exit_status(), 70);
    }

    #[test]
    fn test_profile_reporting_override() {
        let config = parse_config(SAMPLE, Some("production")).unwrap();
        assert_eq!(config.reporting_mask(), Severity::ALL);
        let ids: Vec<_> = config.notifier_descriptors().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["log", "abort"]);
        assert!(config.notifier_descriptors()[1].ignore_log_only);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("reporting = \"NOPE\"", None).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_unknown_profile() {
        let err = parse_config(SAMPLE, Some("staging")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/tripwire.toml"), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
