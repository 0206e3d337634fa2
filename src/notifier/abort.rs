//! Abort-with-status notifier.
//!
//! Prints a short notice and asks for the process to end after the current
//! pass. Usually declared with `ignore_log_only = true` so that faults
//! captured for logging only keep the process running.

use std::io::Write;

use serde::Deserialize;

use crate::fault::Fault;

use super::{Notifier, NotifierContext, NotifierError};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AbortSettings {
    /// Notice printed to stderr before the process ends.
    pub message: String,
    /// Append the fault summary to the notice.
    pub details: bool,
}

impl Default for AbortSettings {
    fn default() -> Self {
        Self {
            message: "process aborted after an unrecoverable fault".to_string(),
            details: false,
        }
    }
}

pub struct AbortNotifier {
    fault: Fault,
    settings: AbortSettings,
}

impl AbortNotifier {
    pub const ID: &'static str = "abort";

    pub fn from_context(ctx: NotifierContext) -> Result<Self, NotifierError> {
        Ok(Self {
            settings: ctx.parse_settings()?,
            fault: ctx.fault().clone(),
        })
    }

    pub fn notice(&self) -> String {
        if self.settings.details {
            format!("{}: {}", self.settings.message, self.fault)
        } else {
            self.settings.message.clone()
        }
    }
}

impl Notifier for AbortNotifier {
    fn notify(&mut self) -> bool {
        let _ = writeln!(std::io::stderr().lock(), "{}", self.notice());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::fault::{Channel, RawSignal, Severity};
    use crate::handler::Interceptor;
    use crate::host::RecordingHost;

    #[test]
    fn test_requests_termination() {
        let fault = Fault::normalize(
            RawSignal::RuntimeError {
                code: Severity::ERROR,
                message: "pool exhausted".into(),
                location: None,
            },
            Channel::RuntimeError,
            "",
        );
        let settings: toml::Table = toml::from_str("message = \"bye\"\ndetails = true").unwrap();
        let interceptor = Interceptor::builder().host(RecordingHost::new()).build();
        let ctx = NotifierContext::new("abort", fault, Settings::new(settings), interceptor);

        let mut notifier = AbortNotifier::from_context(ctx).unwrap();
        assert_eq!(notifier.notice(), "bye: [ERROR] pool exhausted");
        assert!(notifier.notify());
    }
}
