//! Configuration sources handed to the dispatch coordinator.
//!
//! A source is consumed exactly once, on the first fault that needs dispatch.

use std::path::PathBuf;

use crate::config::loader::{load_config, ConfigError};
use crate::config::object::Config;

/// Produces the resolved [`Config`]. Called at most once per process.
pub trait ConfigSource: Send {
    fn load(self: Box<Self>) -> Result<Config, ConfigError>;
}

/// An already resolved configuration.
impl ConfigSource for Config {
    fn load(self: Box<Self>) -> Result<Config, ConfigError> {
        Ok(*self)
    }
}

/// TOML file on disk, resolved for an optional explicit profile.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    profile: Option<String>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

impl ConfigSource for FileSource {
    fn load(self: Box<Self>) -> Result<Config, ConfigError> {
        tracing::debug!(path = ?self.path, "Loading fault configuration");
        load_config(&self.path, self.profile.as_deref())
    }
}

/// Source backed by a closure, for configuration assembled in code.
pub struct FnSource<F>(F);

impl<F> FnSource<F>
where
    F: FnOnce() -> Result<Config, ConfigError> + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> ConfigSource for FnSource<F>
where
    F: FnOnce() -> Result<Config, ConfigError> + Send,
{
    fn load(self: Box<Self>) -> Result<Config, ConfigError> {
        (self.0)()
    }
}
