//! Process-wide fault interceptor.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::mem;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread;

use serde_json::Value;
use thiserror::Error;

use crate::config::{Config, ConfigSource};
use crate::fault::object::panic_message;
use crate::fault::{Channel, Fault, Location, RawSignal, Severity, Signal};
use crate::host::{Host, ProcessHost};
use crate::lifecycle::ShutdownGuard;
use crate::notifier::NotifierRegistry;

use super::deferred::{DeferredCallback, DeferredData, UserCallback};
use super::scope::{self, Sink};
use super::{Coordinator, SelfFaultHandler};

static INSTANCE: OnceLock<Interceptor> = OnceLock::new();

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("a fault interceptor is already installed for this process")]
    AlreadyInstalled,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Inner {
    host: Arc<dyn Host>,
    fallback: Arc<SelfFaultHandler>,
    registry: Arc<NotifierRegistry>,
    source: Mutex<Option<Box<dyn ConfigSource>>>,
    coordinator: OnceLock<Coordinator>,
    last_fault: Mutex<Option<Fault>>,
    deferred_data: Mutex<DeferredData>,
    deferred_callbacks: Mutex<Vec<DeferredCallback>>,
    user_callbacks: Mutex<Vec<UserCallback>>,
    shutdown_started: AtomicBool,
}

/// Single entry point the host calls for every fault.
///
/// A cheap-clone handle; clones share all state. Notifiers receive one to
/// contribute end-of-process data.
#[derive(Clone)]
pub struct Interceptor {
    inner: Arc<Inner>,
}

impl Interceptor {
    pub fn builder() -> InterceptorBuilder {
        InterceptorBuilder::default()
    }

    /// The interceptor installed for this process, if any.
    pub fn instance() -> Option<&'static Interceptor> {
        INSTANCE.get()
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.inner.host
    }

    /// Fault most recently passed to the pipeline.
    pub fn last_fault(&self) -> Option<Fault> {
        lock(&self.inner.last_fault).clone()
    }

    /// The coordinator, created on first use.
    pub fn coordinator(&self) -> &Coordinator {
        self.inner.coordinator.get_or_init(|| {
            let source = lock(&self.inner.source).take();
            Coordinator::new(source, Arc::clone(&self.inner.registry), Arc::clone(&self.inner.fallback))
        })
    }

    fn capture_internal(&self, signal: impl Into<Signal>) {
        match self.inner.coordinator.get() {
            Some(coordinator) => coordinator.capture_exception_internal(signal),
            None => self.inner.fallback.report_signal(signal),
        }
    }

    /// Synchronous runtime error report. Always returns `true` (handled).
    pub fn capture_runtime_error(
        &self,
        code: Severity,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> bool {
        let message = message.into();
        if scope::current() == Some(Sink::Internal) {
            return match self.inner.coordinator.get() {
                Some(coordinator) => coordinator.capture_runtime_error_internal(code, message, location),
                None => {
                    self.inner.fallback.report_signal(RawSignal::RuntimeError { code, message, location });
                    true
                }
            };
        }
        let signal = RawSignal::RuntimeError { code, message, location };
        self.capture_exception_as(signal, "", Channel::RuntimeError);
        true
    }

    /// Report a runtime error located at the caller.
    #[track_caller]
    pub fn trigger(&self, code: Severity, message: impl Into<String>) -> bool {
        let location = Location::caller();
        self.capture_runtime_error(code, message, Some(location))
    }

    /// Dispatch an exception-class fault.
    pub fn capture_exception(&self, signal: impl Into<Signal>) {
        self.capture_exception_as(signal, "", Channel::Exception);
    }

    /// Dispatch a fault for logging only; notifiers that ignore log-only faults skip it.
    pub fn log_exception(&self, signal: impl Into<Signal>, log_type: &str) {
        self.capture_exception_as(signal, log_type, Channel::Exception);
    }

    /// Full form of the capture entry point.
    ///
    /// Faults raised while the pipeline is running go to the self handler as
    /// internal faults and do not replace the last fault.
    pub fn capture_exception_as(&self, signal: impl Into<Signal>, log_type: &str, channel: Channel) {
        if scope::current() == Some(Sink::Internal) {
            self.capture_internal(signal);
            return;
        }

        let coordinator = self.coordinator();
        if coordinator.guard_active() {
            coordinator.capture_exception_internal(signal);
            return;
        }

        let fault = Fault::normalize(signal, channel, log_type);
        *lock(&self.inner.last_fault) = Some(fault.clone());
        coordinator.ensure_config();
        coordinator.handle(&fault, self);
    }

    /// Panic hook entry point.
    ///
    /// Inside a scoped region the panic is only stashed for the catch site.
    /// Otherwise it is dispatched on a helper thread: a panic raised on the
    /// hook's own stack would abort the process.
    pub fn capture_panic(&self, info: &PanicHookInfo<'_>) {
        let signal = RawSignal::Panic {
            message: panic_message(info.payload()),
            location: info.location().map(Location::from),
            thread: std::thread::current().name().map(str::to_string),
            backtrace: Some(Arc::new(Backtrace::capture())),
        };
        if scope::current().is_some() {
            scope::stash_panic(signal);
            return;
        }

        let fallback = signal.clone();
        thread::scope(|s| {
            let dispatch = thread::Builder::new()
                .name("tripwire-dispatch".to_string())
                .spawn_scoped(s, move || {
                    if let Err(panic) = scope::guarded(Sink::Pipeline, || self.capture_exception(signal)) {
                        self.capture_internal(panic);
                    }
                });
            match dispatch {
                Ok(handle) => {
                    let _ = handle.join();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to spawn panic dispatch thread");
                    self.inner.fallback.report_signal(fallback);
                }
            }
        });
    }

    /// End-of-process sequence. Runs once; later calls return immediately.
    pub fn capture_shutdown(&self) {
        if self.inner.shutdown_started.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(terminal) = self.inner.host.take_terminal_fault() {
            match self.inner.coordinator.get() {
                Some(coordinator) if coordinator.guard_active() => {
                    if let Some(last) = self.last_fault() {
                        coordinator.capture_exception_internal(last);
                    }
                    coordinator.capture_exception_internal(terminal);
                }
                _ => self.capture_exception_as(terminal, "", Channel::Shutdown),
            }
        }

        let callbacks = mem::take(&mut *lock(&self.inner.user_callbacks));
        for callback in callbacks {
            if let Err(panic) = scope::guarded(Sink::Pipeline, callback) {
                self.capture_exception(panic);
            }
        }

        self.flush_deferred();
    }

    /// Run the deferred callbacks now with everything accumulated so far.
    ///
    /// Drains both the callbacks and the data; with nothing registered it is a no-op.
    pub fn flush_deferred(&self) {
        let callbacks = mem::take(&mut *lock(&self.inner.deferred_callbacks));
        if callbacks.is_empty() {
            return;
        }
        let data = mem::take(&mut *lock(&self.inner.deferred_data));
        for callback in callbacks {
            if let Err(panic) = scope::guarded(Sink::Internal, || callback(&data)) {
                self.capture_internal(panic);
            }
        }
    }

    pub fn add_deferred_data(&self, key: impl Into<String>, value: impl Into<Value>) {
        lock(&self.inner.deferred_data).append(key, value.into());
    }

    /// Number of values currently stored under `key`.
    pub fn deferred_len(&self, key: &str) -> usize {
        lock(&self.inner.deferred_data).len_of(key)
    }

    pub fn add_deferred_callback(&self, callback: impl FnOnce(&DeferredData) + Send + 'static) {
        lock(&self.inner.deferred_callbacks).push(Box::new(callback));
    }

    pub fn add_user_callback(&self, callback: impl FnOnce() + Send + 'static) {
        lock(&self.inner.user_callbacks).push(Box::new(callback));
    }

    /// Run the program body under the interceptor, then the shutdown sequence.
    ///
    /// A panic is dispatched as an exception. An error returned by the body is
    /// only visible once it has ended, so it is handed to the host as the
    /// terminal fault picked up by the shutdown sequence.
    pub fn run<T, E>(&self, body: impl FnOnce() -> Result<T, E>) -> Option<T>
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        let value = match scope::guarded(Sink::Pipeline, body) {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                let error: Box<dyn StdError + Send + Sync> = e.into();
                self.inner.host.record_terminal(RawSignal::from(error));
                None
            }
            Err(panic) => {
                self.capture_exception(panic);
                None
            }
        };
        self.capture_shutdown();
        value
    }

    /// Run the shutdown sequence, then exit through the host.
    pub(crate) fn terminate(&self, status: i32) {
        tracing::debug!(status, "Terminating after notify pass");
        self.capture_shutdown();
        self.inner.host.exit(status);
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("registry", &self.inner.registry)
            .field("configured", &self.inner.coordinator.get().and_then(Coordinator::config).is_some())
            .field("shutdown_started", &self.inner.shutdown_started.load(Ordering::SeqCst))
            .finish()
    }
}

/// Assembles an [`Interceptor`].
pub struct InterceptorBuilder {
    host: Arc<dyn Host>,
    source: Box<dyn ConfigSource>,
    registry: NotifierRegistry,
}

impl Default for InterceptorBuilder {
    fn default() -> Self {
        Self {
            host: Arc::new(ProcessHost::new()),
            source: Box::new(Config::default()),
            registry: NotifierRegistry::with_builtins(),
        }
    }
}

impl InterceptorBuilder {
    pub fn host(mut self, host: impl Host) -> Self {
        self.host = Arc::new(host);
        self
    }

    pub fn config_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Use an already resolved config.
    pub fn config(self, config: Config) -> Self {
        self.config_source(config)
    }

    /// Replace the whole registry (the builtins included).
    pub fn registry(mut self, registry: NotifierRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register one more notifier factory.
    pub fn notifier<F>(mut self, id: impl Into<String>, factory: F) -> Self
    where
        F: Fn(crate::notifier::NotifierContext) -> Result<Box<dyn crate::notifier::Notifier>, crate::notifier::NotifierError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(id, factory);
        self
    }

    /// Build without touching the process hooks.
    pub fn build(self) -> Interceptor {
        let fallback = Arc::new(SelfFaultHandler::new(Arc::clone(&self.host)));
        Interceptor {
            inner: Arc::new(Inner {
                host: self.host,
                fallback,
                registry: Arc::new(self.registry),
                source: Mutex::new(Some(self.source)),
                coordinator: OnceLock::new(),
                last_fault: Mutex::new(None),
                deferred_data: Mutex::new(DeferredData::new()),
                deferred_callbacks: Mutex::new(Vec::new()),
                user_callbacks: Mutex::new(Vec::new()),
                shutdown_started: AtomicBool::new(false),
            }),
        }
    }

    /// Build, claim the host's hook slots and make it the process instance.
    ///
    /// The returned guard runs the shutdown sequence when dropped.
    pub fn install(self) -> Result<ShutdownGuard, InstallError> {
        let interceptor = self.build();
        INSTANCE
            .set(interceptor.clone())
            .map_err(|_| InstallError::AlreadyInstalled)?;
        interceptor.host().install(&interceptor);
        tracing::debug!("Fault interceptor installed");
        Ok(ShutdownGuard::new(interceptor))
    }
}
