//! Last-resort fault reporter.
//!
//! Used when the configuration could not be built, when a notifier fails, and
//! for anything raised while the pipeline is already running. It depends on
//! nothing that can fail in a way needing further handling: one fixed-format
//! line to the host's diagnostic stream, nothing else.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::fault::{Channel, Fault, Signal};
use crate::host::Host;

pub struct SelfFaultHandler {
    host: Arc<dyn Host>,
    busy: AtomicBool,
}

impl SelfFaultHandler {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self {
            host,
            busy: AtomicBool::new(false),
        }
    }

    /// Report one fault. A report raised while another is being written is dropped.
    pub fn report(&self, fault: &Fault) {
        if self.busy.swap(true, Ordering::SeqCst) {
            return;
        }
        let line = Self::format(fault);
        let host = &self.host;
        let _ = panic::catch_unwind(AssertUnwindSafe(|| host.diagnostic(&line)));
        self.busy.store(false, Ordering::SeqCst);
    }

    /// Normalize as an internal fault, then report.
    pub fn report_signal(&self, signal: impl Into<Signal>) {
        self.report(&Fault::normalize(signal, Channel::Internal, ""));
    }

    pub fn format(fault: &Fault) -> String {
        let location = fault
            .location()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown location".to_string());
        let mut line = format!(
            "[tripwire] {} fault {}: {} at {}",
            fault.channel(),
            fault.code(),
            fault.message(),
            location
        );
        if let Some(log_type) = fault.log_type() {
            line.push_str(&format!(" (log type: {})", log_type));
        }
        line
    }
}
