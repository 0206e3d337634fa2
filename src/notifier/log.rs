//! Structured log notifier.
//!
//! Emits one `tracing` event per fault and, when `file` is set, appends a
//! line to that file. Never asks for termination, so log-only faults are
//! always safe to route here.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use serde::Deserialize;

use crate::fault::{Fault, Severity};

use super::{Notifier, NotifierContext, NotifierError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Optional append-only log file.
    pub file: Option<PathBuf>,
}

pub struct LogNotifier {
    fault: Fault,
    settings: LogSettings,
}

impl LogNotifier {
    pub const ID: &'static str = "log";

    pub fn from_context(ctx: NotifierContext) -> Result<Self, NotifierError> {
        Ok(Self {
            settings: ctx.parse_settings()?,
            fault: ctx.fault().clone(),
        })
    }

    /// One log line, as written to the append file.
    pub fn line(fault: &Fault) -> String {
        let location = fault.location().map(ToString::to_string).unwrap_or_default();
        format!(
            "{}\t{}\t{}\t{}\t{}",
            fault.code(),
            fault.channel(),
            fault.log_type().unwrap_or("-"),
            location,
            fault.message().replace('\n', " ")
        )
    }

    fn emit(&self) {
        let fault = &self.fault;
        let code = fault.code();
        let location = fault.location().map(ToString::to_string);
        let log_type = fault.log_type();
        if code.is_error() {
            tracing::error!(code = %code, channel = %fault.channel(), ?log_type, ?location, "{}", fault.message());
        } else if code.intersects(Severity::WARNING | Severity::USER_WARNING) {
            tracing::warn!(code = %code, channel = %fault.channel(), ?log_type, ?location, "{}", fault.message());
        } else {
            tracing::info!(code = %code, channel = %fault.channel(), ?log_type, ?location, "{}", fault.message());
        }
    }

    fn append(&self, path: &PathBuf) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", Self::line(&self.fault))
    }
}

impl Notifier for LogNotifier {
    fn notify(&mut self) -> bool {
        self.emit();
        if let Some(path) = &self.settings.file {
            if let Err(e) = self.append(path) {
                tracing::warn!(path = ?path, error = %e, "Failed to append fault log");
            }
        }
        false
    }
}
