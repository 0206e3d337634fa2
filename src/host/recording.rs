//! In-memory host that records instead of acting.
//!
//! Exits do not end the process and diagnostics are kept as lines, so the
//! whole pipeline can be driven and observed from tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::fault::RawSignal;
use crate::handler::Interceptor;

use super::Host;

#[derive(Debug, Default)]
struct Records {
    installs: usize,
    terminal: Option<RawSignal>,
    diagnostics: Vec<String>,
    exits: Vec<i32>,
}

/// Cloneable handle; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    records: Arc<Mutex<Records>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, Records> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn installs(&self) -> usize {
        self.records().installs
    }

    /// Lines written to the diagnostic stream so far.
    pub fn diagnostics(&self) -> Vec<String> {
        self.records().diagnostics.clone()
    }

    /// Exit statuses requested so far.
    pub fn exits(&self) -> Vec<i32> {
        self.records().exits.clone()
    }

    pub fn has_terminal_fault(&self) -> bool {
        self.records().terminal.is_some()
    }
}

impl Host for RecordingHost {
    fn install(&self, _interceptor: &Interceptor) {
        self.records().installs += 1;
    }

    fn record_terminal(&self, signal: RawSignal) {
        self.records().terminal = Some(signal);
    }

    fn take_terminal_fault(&self) -> Option<RawSignal> {
        self.records().terminal.take()
    }

    fn diagnostic(&self, line: &str) {
        self.records().diagnostics.push(line.to_string());
    }

    fn exit(&self, status: i32) {
        tracing::debug!(status, "Exit requested on recording host");
        self.records().exits.push(status);
    }
}
