//! Normalized fault value and the raw signals it is built from.

use std::any::Any;
use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use super::Severity;

/// Source position of a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column: None,
        }
    }

    /// Location of the caller of the enclosing `#[track_caller]` function.
    #[track_caller]
    pub fn caller() -> Self {
        std::panic::Location::caller().into()
    }
}

impl From<&std::panic::Location<'_>> for Location {
    fn from(loc: &std::panic::Location<'_>) -> Self {
        Self {
            file: loc.file().to_string(),
            line: loc.line(),
            column: Some(loc.column()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}:{}:{}", self.file, self.line, column),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// Channel a fault arrived through. Doubles as the handler tag of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Synchronous runtime error report.
    RuntimeError,
    /// Panic or caught error.
    Exception,
    /// Terminal fault found at process end.
    Shutdown,
    /// Fault raised while the pipeline itself was running.
    Internal,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::RuntimeError => "error",
            Channel::Exception => "exception",
            Channel::Shutdown => "shutdown",
            Channel::Internal => "self",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Un-normalized failure signal, kept inside the fault for downstream formatting.
#[derive(Debug, Clone)]
pub enum RawSignal {
    RuntimeError {
        code: Severity,
        message: String,
        location: Option<Location>,
    },
    Panic {
        message: String,
        location: Option<Location>,
        thread: Option<String>,
        /// Captured by the panic hook; honours `RUST_BACKTRACE`.
        backtrace: Option<Arc<Backtrace>>,
    },
    Error(Arc<dyn StdError + Send + Sync>),
    Terminal {
        code: Severity,
        message: String,
        location: Option<Location>,
    },
}

impl RawSignal {
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        RawSignal::Error(Arc::new(err))
    }

    /// Build a panic signal from a `catch_unwind` payload.
    ///
    /// The payload carries no location; the panic hook provides one when it is installed.
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> Self {
        RawSignal::Panic {
            message: panic_message(payload),
            location: None,
            thread: std::thread::current().name().map(str::to_string),
            backtrace: None,
        }
    }

    pub fn code(&self) -> Severity {
        match self {
            RawSignal::RuntimeError { code, .. } | RawSignal::Terminal { code, .. } => *code,
            RawSignal::Panic { .. } | RawSignal::Error(_) => Severity::ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            RawSignal::RuntimeError { message, .. }
            | RawSignal::Panic { message, .. }
            | RawSignal::Terminal { message, .. } => message.clone(),
            RawSignal::Error(err) => err.to_string(),
        }
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            RawSignal::RuntimeError { location, .. }
            | RawSignal::Panic { location, .. }
            | RawSignal::Terminal { location, .. } => location.as_ref(),
            RawSignal::Error(_) => None,
        }
    }

    /// Backtrace of a panic, when one was captured.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            RawSignal::Panic { backtrace, .. } => backtrace.as_deref(),
            _ => None,
        }
    }
}

impl From<Box<dyn StdError + Send + Sync>> for RawSignal {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        RawSignal::Error(Arc::from(err))
    }
}

/// Extract the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Input accepted by the capture entry points: raw or already normalized.
#[derive(Debug, Clone)]
pub enum Signal {
    Raw(RawSignal),
    Normalized(Fault),
}

impl From<RawSignal> for Signal {
    fn from(raw: RawSignal) -> Self {
        Signal::Raw(raw)
    }
}

impl From<Fault> for Signal {
    fn from(fault: Fault) -> Self {
        Signal::Normalized(fault)
    }
}

impl From<&Fault> for Signal {
    fn from(fault: &Fault) -> Self {
        Signal::Normalized(fault.clone())
    }
}

#[derive(Debug)]
struct FaultInner {
    code: Severity,
    message: String,
    location: Option<Location>,
    channel: Channel,
    log_type: Option<String>,
    raw: RawSignal,
}

/// One normalized failure occurrence.
#[derive(Debug, Clone)]
pub struct Fault {
    inner: Arc<FaultInner>,
}

impl Fault {
    /// Normalize a signal arriving through `channel`.
    ///
    /// An empty `log_type` means a regular fault; anything else marks it log-only.
    /// A signal that is already a `Fault` is returned as is.
    pub fn normalize(signal: impl Into<Signal>, channel: Channel, log_type: &str) -> Fault {
        let raw = match signal.into() {
            Signal::Normalized(fault) => return fault,
            Signal::Raw(raw) => raw,
        };
        Fault {
            inner: Arc::new(FaultInner {
                code: raw.code(),
                message: raw.message(),
                location: raw.location().cloned(),
                channel,
                log_type: (!log_type.is_empty()).then(|| log_type.to_string()),
                raw,
            }),
        }
    }

    pub fn code(&self) -> Severity {
        self.inner.code
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn location(&self) -> Option<&Location> {
        self.inner.location.as_ref()
    }

    pub fn channel(&self) -> Channel {
        self.inner.channel
    }

    pub fn log_type(&self) -> Option<&str> {
        self.inner.log_type.as_deref()
    }

    pub fn is_log_only(&self) -> bool {
        self.inner.log_type.is_some()
    }

    pub fn raw(&self) -> &RawSignal {
        &self.inner.raw
    }

    pub fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.raw.backtrace()
    }

    /// True if both handles refer to the same normalized occurrence.
    pub fn same_as(&self, other: &Fault) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())?;
        if let Some(location) = self.location() {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}
