//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::fault::Severity;

/// Profile used when neither the file nor the environment selects one.
pub const DEFAULT_PROFILE: &str = "development";

/// Root of a configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileConfig {
    /// Severities acted upon at all.
    pub reporting: Severity,

    /// Selected profile (overridden by `TRIPWIRE_PROFILE`).
    pub profile: Option<String>,

    /// Process exit status used when a notify pass ends the process.
    pub exit_status: i32,

    /// Named notifier profiles, e.g. `development`, `production`, `cli`.
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(
            "development".to_string(),
            ProfileConfig {
                reporting: None,
                notifiers: vec![
                    NotifierDescriptor::new("render"),
                    NotifierDescriptor::new("log"),
                ],
            },
        );
        profiles.insert(
            "production".to_string(),
            ProfileConfig {
                reporting: None,
                notifiers: vec![NotifierDescriptor::new("log"), {
                    let mut abort = NotifierDescriptor::new("abort");
                    abort.enabled = Severity::ERROR
                        | Severity::USER_ERROR
                        | Severity::RECOVERABLE_ERROR
                        | Severity::FATAL;
                    abort.ignore_log_only = true;
                    abort
                }],
            },
        );
        profiles.insert(
            "cli".to_string(),
            ProfileConfig {
                reporting: None,
                notifiers: vec![NotifierDescriptor::new("render")],
            },
        );

        Self {
            reporting: Severity::ALL,
            profile: None,
            exit_status: default_exit_status(),
            profiles,
        }
    }
}

fn default_exit_status() -> i32 {
    1
}

/// Notifier list of one environment profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Overrides the root reporting mask for this profile.
    pub reporting: Option<Severity>,

    /// Notifiers in dispatch order.
    pub notifiers: Vec<NotifierDescriptor>,
}

/// One entry of the notifier list.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotifierDescriptor {
    /// Registry identity of the notifier.
    pub id: String,

    /// Severities this notifier reacts to (default: all).
    #[serde(default = "Severity::all")]
    pub enabled: Severity,

    /// Skip faults captured as log-only.
    #[serde(default)]
    pub ignore_log_only: bool,

    /// Notifier-specific settings.
    #[serde(default)]
    pub settings: toml::Table,
}

impl NotifierDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled: Severity::ALL,
            ignore_log_only: false,
            settings: toml::Table::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let config = FileConfig::default();
        assert_eq!(config.reporting, Severity::ALL);
        assert!(config.profiles.contains_key(DEFAULT_PROFILE));
        let production = &config.profiles["production"];
        let abort = production.notifiers.iter().find(|d| d.id == "abort").unwrap();
        assert!(abort.ignore_log_only);
        assert!(!abort.enabled.contains(Severity::WARNING));
    }

    #[test]
    fn test_descriptor_defaults_from_toml() {
        let descriptor: NotifierDescriptor = toml::from_str(r#"id = "log""#).unwrap();
        assert_eq!(descriptor, NotifierDescriptor::new("log"));
    }
}
