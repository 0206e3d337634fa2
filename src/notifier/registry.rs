//! Identity → factory mapping for notifiers.

use std::collections::HashMap;
use std::sync::Arc;

use super::{AbortNotifier, LogNotifier, Notifier, NotifierContext, NotifierError, RenderNotifier};

/// Builds a notifier for one fault.
pub type NotifierFactory =
    Arc<dyn Fn(NotifierContext) -> Result<Box<dyn Notifier>, NotifierError> + Send + Sync>;

#[derive(Clone, Default)]
pub struct NotifierRegistry {
    factories: HashMap<String, NotifierFactory>,
}

impl NotifierRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `render`, `log` and `abort`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(RenderNotifier::ID, |ctx| {
            Ok(Box::new(RenderNotifier::from_context(ctx)?) as Box<dyn Notifier>)
        });
        registry.register(LogNotifier::ID, |ctx| {
            Ok(Box::new(LogNotifier::from_context(ctx)?) as Box<dyn Notifier>)
        });
        registry.register(AbortNotifier::ID, |ctx| {
            Ok(Box::new(AbortNotifier::from_context(ctx)?) as Box<dyn Notifier>)
        });
        registry
    }

    /// Register (or replace) the factory for `id`.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(NotifierContext) -> Result<Box<dyn Notifier>, NotifierError> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the notifier registered under the context's identity.
    pub fn create(&self, ctx: NotifierContext) -> Result<Box<dyn Notifier>, NotifierError> {
        let factory = self.factories.get(ctx.id()).ok_or_else(|| NotifierError::Unregistered {
            id: ctx.id().to_string(),
        })?;
        factory(ctx)
    }
}

impl std::fmt::Debug for NotifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<_> = self.ids().collect();
        ids.sort_unstable();
        f.debug_struct("NotifierRegistry").field("ids", &ids).finish()
    }
}
