//! Shared utilities for the integration suites.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use tripwire::config::NotifierDescriptor;
use tripwire::notifier::NotifierError;
use tripwire::{
    Config, Fault, Interceptor, InterceptorBuilder, Notifier, NotifierContext, RecordingHost, Severity,
};

/// Ordered record of notifier activity, shared between a test and its notifiers.
#[derive(Clone, Default)]
pub struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Notifier that records `"<id>:<CODE>:<message>"` and returns a fixed value.
pub struct RecordingNotifier {
    id: String,
    fault: Fault,
    calls: Calls,
    exit: bool,
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self) -> bool {
        self.calls
            .push(format!("{}:{}:{}", self.id, self.fault.code(), self.fault.message()));
        self.exit
    }
}

pub fn recording(
    calls: &Calls,
    exit: bool,
) -> impl Fn(NotifierContext) -> Result<Box<dyn Notifier>, NotifierError> + Send + Sync + 'static {
    let calls = calls.clone();
    move |ctx: NotifierContext| {
        Ok(Box::new(RecordingNotifier {
            id: ctx.id().to_string(),
            fault: ctx.fault().clone(),
            calls: calls.clone(),
            exit,
        }) as Box<dyn Notifier>)
    }
}

/// Notifier that runs arbitrary code against its context.
pub struct FnNotifier<F> {
    ctx: NotifierContext,
    f: F,
}

impl<F> Notifier for FnNotifier<F>
where
    F: FnMut(&NotifierContext) -> bool,
{
    fn notify(&mut self) -> bool {
        (self.f)(&self.ctx)
    }
}

pub fn with_fn<F>(f: F) -> impl Fn(NotifierContext) -> Result<Box<dyn Notifier>, NotifierError> + Send + Sync + 'static
where
    F: Fn(&NotifierContext) -> bool + Clone + Send + Sync + 'static,
{
    move |ctx: NotifierContext| Ok(Box::new(FnNotifier { ctx, f: f.clone() }) as Box<dyn Notifier>)
}

pub fn descriptor(id: &str) -> NotifierDescriptor {
    NotifierDescriptor::new(id)
}

pub fn descriptor_for(id: &str, enabled: Severity, ignore_log_only: bool) -> NotifierDescriptor {
    let mut descriptor = NotifierDescriptor::new(id);
    descriptor.enabled = enabled;
    descriptor.ignore_log_only = ignore_log_only;
    descriptor
}

pub fn config(reporting: Severity, descriptors: Vec<NotifierDescriptor>) -> Config {
    Config::new("test", reporting, 3, descriptors)
}

/// Builder wired to a fresh recording host; the host handle is returned for assertions.
pub fn builder(config: Config) -> (InterceptorBuilder, RecordingHost) {
    let host = RecordingHost::new();
    let builder = Interceptor::builder().host(host.clone()).config(config);
    (builder, host)
}
