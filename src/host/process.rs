//! Host backed by the real process: panic hook, stderr and `process::exit`.

use std::io::Write;
use std::panic;
use std::sync::{Mutex, PoisonError};

use crate::fault::RawSignal;
use crate::handler::Interceptor;

use super::Host;

#[derive(Debug, Default)]
pub struct ProcessHost {
    terminal: Mutex<Option<RawSignal>>,
}

impl ProcessHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Host for ProcessHost {
    fn install(&self, interceptor: &Interceptor) {
        let interceptor = interceptor.clone();
        // The previous hook is dropped, not chained: default panic output is suppressed.
        let _previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| interceptor.capture_panic(info)));
    }

    fn record_terminal(&self, signal: RawSignal) {
        *self.terminal.lock().unwrap_or_else(PoisonError::into_inner) = Some(signal);
    }

    fn take_terminal_fault(&self) -> Option<RawSignal> {
        self.terminal.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn diagnostic(&self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn exit(&self, status: i32) {
        std::process::exit(status);
    }
}
