//! Dispatch coordinator: config lifecycle, notify loop, reentrancy boundary.
//!
//! # State Transitions
//! ```text
//! Unconfigured ──ensure_config──► Configured   (source loaded, validated)
//!      │                               │
//!      └── load error / panic ──► NoConfig      (permanent: every fault → self handler)
//! ```
//!
//! # Design Decisions
//! - The config source is consumed once; a failed build is never retried
//! - The guard is raised while the config is built and while notifiers run;
//!   anything reaching the pipeline meanwhile is sent to the self handler
//! - Notifiers run before the unconditional termination check

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::config::{Config, ConfigError, ConfigSource};
use crate::fault::{Fault, Location, RawSignal, Severity, Signal};
use crate::notifier::{NotifierContext, NotifierError, NotifierRegistry};

use super::scope::{self, Sink};
use super::{Interceptor, SelfFaultHandler};

/// Clears the guard flag when dropped.
struct GuardFlag<'a>(&'a AtomicBool);

impl<'a> GuardFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for GuardFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Coordinator {
    source: Mutex<Option<Box<dyn ConfigSource>>>,
    config: OnceLock<Config>,
    attempted: AtomicBool,
    guard: AtomicBool,
    registry: Arc<NotifierRegistry>,
    fallback: Arc<SelfFaultHandler>,
}

impl Coordinator {
    pub(crate) fn new(
        source: Option<Box<dyn ConfigSource>>,
        registry: Arc<NotifierRegistry>,
        fallback: Arc<SelfFaultHandler>,
    ) -> Self {
        Self {
            source: Mutex::new(source),
            config: OnceLock::new(),
            attempted: AtomicBool::new(false),
            guard: AtomicBool::new(false),
            registry,
            fallback,
        }
    }

    /// Build the config on first call; later calls do nothing.
    pub fn ensure_config(&self) {
        if self.attempted.swap(true, Ordering::SeqCst) {
            return;
        }
        let _guard = GuardFlag::raise(&self.guard);
        let source = self.source.lock().unwrap_or_else(PoisonError::into_inner).take();

        let outcome = scope::guarded(Sink::Internal, move || match source {
            Some(source) => source.load(),
            None => Err(ConfigError::Source("no configuration source".to_string())),
        });

        match outcome {
            Ok(Ok(config)) => {
                tracing::debug!(
                    profile = config.profile(),
                    notifiers = config.notifier_descriptors().len(),
                    "Fault configuration loaded"
                );
                let _ = self.config.set(config);
            }
            Ok(Err(e)) => self.capture_exception_internal(RawSignal::error(e)),
            Err(panic) => self.capture_exception_internal(panic),
        }
    }

    /// The resolved config, absent before `ensure_config` or after a failed build.
    pub fn config(&self) -> Option<&Config> {
        self.config.get()
    }

    /// True while the config is being built or notifiers are running.
    pub fn guard_active(&self) -> bool {
        self.guard.load(Ordering::SeqCst)
    }

    /// Dispatch one normalized fault.
    pub fn handle(&self, fault: &Fault, interceptor: &Interceptor) {
        let Some(config) = self.config.get() else {
            self.fallback.report(fault);
            return;
        };

        let code = fault.code();
        if !code.intersects(config.reporting_mask()) {
            tracing::trace!(code = %code, "Fault filtered by reporting mask");
            return;
        }

        let exit = self.run_notifiers(fault, config, interceptor);

        if exit || code.intersects(Severity::UNRECOVERABLE) {
            interceptor.terminate(config.exit_status());
        }
    }

    /// Run every applicable notifier in declared order.
    ///
    /// Returns whether any of them asked to end the process.
    pub fn run_notifiers(&self, fault: &Fault, config: &Config, interceptor: &Interceptor) -> bool {
        let _guard = GuardFlag::raise(&self.guard);
        let mut exit = false;

        for descriptor in config.notifier_descriptors() {
            let outcome = scope::guarded(Sink::Internal, || -> Result<Option<bool>, NotifierError> {
                config.select_descriptor(&descriptor.id);

                if !descriptor.enabled.intersects(fault.code()) {
                    return Ok(None);
                }
                if fault.is_log_only() && descriptor.ignore_log_only {
                    return Ok(None);
                }

                let ctx = NotifierContext::new(
                    descriptor.id.clone(),
                    fault.clone(),
                    config.current_descriptor_settings(),
                    interceptor.clone(),
                );
                let mut notifier = self.registry.create(ctx)?;
                Ok(Some(notifier.notify()))
            });

            match outcome {
                Ok(Ok(Some(requested))) => exit |= requested,
                Ok(Ok(None)) => {}
                Ok(Err(e)) if e.is_rejection() => {
                    tracing::warn!(notifier = %descriptor.id, "Rejected notifier descriptor");
                    self.capture_exception_internal(RawSignal::error(e));
                }
                Ok(Err(e)) => {
                    self.capture_exception_internal(fault);
                    self.capture_exception_internal(RawSignal::error(e));
                }
                Err(panic) => {
                    self.capture_exception_internal(fault);
                    self.capture_exception_internal(panic);
                }
            }
        }

        config.clear_selection();
        exit
    }

    /// Runtime error raised inside the pipeline. Always handled.
    pub fn capture_runtime_error_internal(
        &self,
        code: Severity,
        message: impl Into<String>,
        location: Option<Location>,
    ) -> bool {
        self.capture_exception_internal(RawSignal::RuntimeError {
            code,
            message: message.into(),
            location,
        });
        true
    }

    /// Fault raised inside the pipeline; goes to the self handler, never back to `handle`.
    pub fn capture_exception_internal(&self, signal: impl Into<Signal>) {
        self.fallback.report_signal(signal);
    }
}
