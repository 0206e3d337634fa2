//! Resolved configuration consumed by the dispatch coordinator.

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;

use crate::config::schema::{FileConfig, NotifierDescriptor, DEFAULT_PROFILE};
use crate::fault::Severity;

/// Read-only view of one descriptor's settings table.
#[derive(Debug, Clone, Default)]
pub struct Settings(Arc<toml::Table>);

impl Settings {
    pub fn new(table: toml::Table) -> Self {
        Self(Arc::new(table))
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(toml::Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(toml::Value::as_bool)
    }

    /// Deserialize the whole table into a typed settings struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        toml::Value::Table(self.0.as_ref().clone()).try_into()
    }

    pub fn table(&self) -> &toml::Table {
        &self.0
    }
}

/// Environment-selected configuration.
///
/// Immutable apart from the descriptor cursor, which tracks the notifier
/// currently executing so its settings can be looked up.
#[derive(Debug)]
pub struct Config {
    profile: String,
    reporting: Severity,
    exit_status: i32,
    settings: Vec<Settings>,
    descriptors: Vec<NotifierDescriptor>,
    cursor: Mutex<Option<usize>>,
}

impl Config {
    pub fn new(
        profile: impl Into<String>,
        reporting: Severity,
        exit_status: i32,
        descriptors: Vec<NotifierDescriptor>,
    ) -> Self {
        let settings = descriptors
            .iter()
            .map(|descriptor| Settings::new(descriptor.settings.clone()))
            .collect();
        Self {
            profile: profile.into(),
            reporting,
            exit_status,
            descriptors,
            settings,
            cursor: Mutex::new(None),
        }
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn reporting_mask(&self) -> Severity {
        self.reporting
    }

    pub fn exit_status(&self) -> i32 {
        self.exit_status
    }

    /// Descriptors in dispatch order.
    pub fn notifier_descriptors(&self) -> &[NotifierDescriptor] {
        &self.descriptors
    }

    /// Move the cursor to the first descriptor named `id`.
    pub fn select_descriptor(&self, id: &str) -> bool {
        let index = self.descriptors.iter().position(|d| d.id == id);
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = index;
        index.is_some()
    }

    pub fn clear_selection(&self) {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Settings of the selected descriptor; empty when nothing is selected.
    pub fn current_descriptor_settings(&self) -> Settings {
        let cursor = *self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        cursor
            .and_then(|index| self.settings.get(index))
            .cloned()
            .unwrap_or_default()
    }

    pub fn current_descriptor(&self) -> Option<&NotifierDescriptor> {
        let cursor = *self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        cursor.and_then(|index| self.descriptors.get(index))
    }
}

impl Clone for Config {
    fn clone(&self) -> Self {
        Self::new(
            self.profile.clone(),
            self.reporting,
            self.exit_status,
            self.descriptors.clone(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        let mut file = FileConfig::default();
        let descriptors = file
            .profiles
            .remove(DEFAULT_PROFILE)
            .map(|p| p.notifiers)
            .unwrap_or_default();
        Self::new(DEFAULT_PROFILE, file.reporting, file.exit_status, descriptors)
    }
}
