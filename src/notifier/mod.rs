//! Notifier protocol and registry.
//!
//! # Data Flow
//! ```text
//! Config descriptor { id, enabled, ignore_log_only, settings }
//!     → NotifierRegistry::create(id, NotifierContext { fault, settings, interceptor })
//!     → Box<dyn Notifier>
//!     → notify() → bool (true = end the process after this pass)
//! ```
//!
//! # Design Decisions
//! - Configuration names notifiers by identity; code registers the factories
//! - A notifier is built per fault and dropped after its `notify` call
//! - Notifiers reach end-of-process reporting through the interceptor handle

pub mod abort;
pub mod log;
pub mod registry;
pub mod render;

pub use abort::AbortNotifier;
pub use log::LogNotifier;
pub use registry::{NotifierFactory, NotifierRegistry};
pub use render::RenderNotifier;

use thiserror::Error;

use crate::config::Settings;
use crate::fault::Fault;
use crate::handler::Interceptor;

/// A component reacting to one dispatched fault.
///
/// Must not assume it is alone in the list, must not rely on the process
/// ending right after it returns `true`, and must be safe to skip.
pub trait Notifier {
    /// Handle the fault. Return `true` to end the process once the pass is over.
    fn notify(&mut self) -> bool;
}

/// Everything a notifier is built from.
#[derive(Clone)]
pub struct NotifierContext {
    id: String,
    fault: Fault,
    settings: Settings,
    interceptor: Interceptor,
}

impl NotifierContext {
    pub fn new(id: impl Into<String>, fault: Fault, settings: Settings, interceptor: Interceptor) -> Self {
        Self {
            id: id.into(),
            fault,
            settings,
            interceptor,
        }
    }

    /// Identity of the descriptor being executed.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn fault(&self) -> &Fault {
        &self.fault
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Parse the settings table, tagging errors with the notifier identity.
    pub fn parse_settings<T: serde::de::DeserializeOwned>(&self) -> Result<T, NotifierError> {
        self.settings.parse().map_err(|source| NotifierError::InvalidSettings {
            id: self.id.clone(),
            source,
        })
    }
}

/// Errors raised while turning a descriptor into a notifier.
#[derive(Debug, Error)]
pub enum NotifierError {
    /// No factory is registered under the identity.
    #[error("notifier '{id}' is not registered")]
    Unregistered { id: String },

    #[error("notifier '{id}' has invalid settings: {source}")]
    InvalidSettings {
        id: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("notifier '{id}' could not be built: {reason}")]
    Build { id: String, reason: String },
}

impl NotifierError {
    /// True when the descriptor itself was rejected, as opposed to a failed build.
    pub fn is_rejection(&self) -> bool {
        matches!(self, NotifierError::Unregistered { .. })
    }
}
