//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that the selected profile exists
//! - Reject empty or duplicate notifier identities within a profile
//! - Reject notifiers that can never fire (empty enabled mask)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: (FileConfig, profile) → Result<(), Vec<ValidationError>>
//! - Notifier identities are not checked against the registry here; unknown
//!   identities are rejected per fault during dispatch

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::FileConfig;

/// A single semantic problem in a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("profile '{0}' is not defined")]
    MissingProfile(String),

    #[error("profile '{profile}': notifier #{index} has an empty id")]
    EmptyNotifierId { profile: String, index: usize },

    #[error("profile '{profile}': notifier '{id}' is declared more than once")]
    DuplicateNotifier { profile: String, id: String },

    #[error("profile '{profile}': notifier '{id}' has an empty enabled mask")]
    EmptyEnabledMask { profile: String, id: String },
}

/// Validate `config` for the given profile selection.
pub fn validate_config(config: &FileConfig, profile: &str) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let Some(selected) = config.profiles.get(profile) else {
        return Err(vec![ValidationError::MissingProfile(profile.to_string())]);
    };

    let mut seen = HashSet::new();
    for (index, descriptor) in selected.notifiers.iter().enumerate() {
        if descriptor.id.trim().is_empty() {
            errors.push(ValidationError::EmptyNotifierId {
                profile: profile.to_string(),
                index,
            });
            continue;
        }
        if !seen.insert(descriptor.id.as_str()) {
            errors.push(ValidationError::DuplicateNotifier {
                profile: profile.to_string(),
                id: descriptor.id.clone(),
            });
        }
        if descriptor.enabled.is_empty() {
            errors.push(ValidationError::EmptyEnabledMask {
                profile: profile.to_string(),
                id: descriptor.id.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{NotifierDescriptor, ProfileConfig};
    use crate::fault::Severity;

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        for name in config.profiles.keys() {
            assert!(validate_config(&config, name).is_ok());
        }
    }

    #[test]
    fn test_missing_profile() {
        let config = FileConfig::default();
        let errors = validate_config(&config, "staging").unwrap_err();
        assert_eq!(errors, vec![ValidationError::MissingProfile("staging".into())]);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = FileConfig::default();
        let mut silent = NotifierDescriptor::new("log");
        silent.enabled = Severity::empty();
        config.profiles.insert(
            "broken".into(),
            ProfileConfig {
                reporting: None,
                notifiers: vec![
                    NotifierDescriptor::new(""),
                    NotifierDescriptor::new("render"),
                    NotifierDescriptor::new("render"),
                    silent,
                ],
            },
        );

        let errors = validate_config(&config, "broken").unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(matches!(errors[0], ValidationError::EmptyNotifierId { index: 0, .. }));
        assert!(matches!(&errors[1], ValidationError::DuplicateNotifier { id, .. } if id == "render"));
        assert!(matches!(&errors[2], ValidationError::EmptyEnabledMask { id, .. } if id == "log"));
    }
}
