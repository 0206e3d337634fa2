//! Text renderer for terminals and captured output.
//!
//! Settings:
//! - `stream`: `"stderr"` (default) or `"stdout"`
//! - `deferred`: collect renderings and print them all once at process end

use std::backtrace::BacktraceStatus;
use std::io::Write;

use serde::Deserialize;
use serde_json::Value;

use crate::fault::Fault;
use crate::handler::{DeferredData, Interceptor};

use super::{Notifier, NotifierContext, NotifierError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    #[default]
    Stderr,
    Stdout,
}

impl Stream {
    fn write(self, text: &str) {
        let result = match self {
            Stream::Stderr => write!(std::io::stderr().lock(), "{}", text),
            Stream::Stdout => write!(std::io::stdout().lock(), "{}", text),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, stream = ?self, "Failed to render fault");
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub stream: Stream,
    pub deferred: bool,
}

pub struct RenderNotifier {
    fault: Fault,
    settings: RenderSettings,
    interceptor: Interceptor,
}

impl RenderNotifier {
    pub const ID: &'static str = "render";

    pub fn from_context(ctx: NotifierContext) -> Result<Self, NotifierError> {
        let settings = ctx.parse_settings()?;
        Ok(Self {
            fault: ctx.fault().clone(),
            settings,
            interceptor: ctx.interceptor().clone(),
        })
    }

    /// Text block for one fault.
    pub fn render(fault: &Fault) -> String {
        let mut out = format!("tripwire: {} [{}]\n", fault.code(), fault.channel());
        out.push_str(&format!("  message: {}\n", fault.message()));
        if let Some(location) = fault.location() {
            out.push_str(&format!("  at: {}\n", location));
        }
        if let Some(log_type) = fault.log_type() {
            out.push_str(&format!("  log type: {}\n", log_type));
        }
        if let Some(backtrace) = fault.backtrace().filter(|bt| bt.status() == BacktraceStatus::Captured) {
            out.push_str("  backtrace:\n");
            for line in backtrace.to_string().lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
        out
    }

    fn defer(&self, text: String) {
        let key = Self::ID;
        if self.interceptor.deferred_len(key) == 0 {
            let stream = self.settings.stream;
            self.interceptor.add_deferred_callback(move |data: &DeferredData| {
                for block in data.get(key) {
                    if let Value::String(text) = block {
                        stream.write(text);
                    }
                }
            });
        }
        self.interceptor.add_deferred_data(key, Value::String(text));
    }
}

impl Notifier for RenderNotifier {
    fn notify(&mut self) -> bool {
        let text = Self::render(&self.fault);
        if self.settings.deferred {
            self.defer(text);
        } else {
            self.settings.stream.write(&text);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{Channel, Location, RawSignal, Severity};
    use std::backtrace::Backtrace;
    use std::sync::Arc;

    #[test]
    fn test_render_block() {
        let fault = Fault::normalize(
            RawSignal::RuntimeError {
                code: Severity::NOTICE,
                message: "undefined index 'id'".into(),
                location: Some(Location::new("src/db.rs", 88)),
            },
            Channel::RuntimeError,
            "db",
        );
        assert_eq!(
            RenderNotifier::render(&fault),
            "tripwire: NOTICE [error]\n  message: undefined index 'id'\n  at: src/db.rs:88\n  log type: db\n"
        );
    }

    #[test]
    fn test_render_backtrace_only_when_captured() {
        let panic = |backtrace: Backtrace| {
            Fault::normalize(
                RawSignal::Panic {
                    message: "index out of bounds".into(),
                    location: None,
                    thread: Some("main".into()),
                    backtrace: Some(Arc::new(backtrace)),
                },
                Channel::Exception,
                "",
            )
        };

        let text = RenderNotifier::render(&panic(Backtrace::disabled()));
        assert_eq!(text, "tripwire: ERROR [exception]\n  message: index out of bounds\n");

        let forced = Backtrace::force_capture();
        let captured = forced.status() == BacktraceStatus::Captured;
        let text = RenderNotifier::render(&panic(forced));
        assert_eq!(text.contains("  backtrace:\n    "), captured);
    }

    #[test]
    fn test_settings_defaults() {
        let settings: RenderSettings = toml::from_str("").unwrap();
        assert_eq!(settings.stream, Stream::Stderr);
        assert!(!settings.deferred);
        let settings: RenderSettings = toml::from_str(r#"stream = "stdout""#).unwrap();
        assert_eq!(settings.stream, Stream::Stdout);
    }
}
