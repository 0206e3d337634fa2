//! Tripwire: process-wide fault interception and notification.
//!
//! Faults arrive on three channels (explicit runtime error reports, panics,
//! and the terminal fault left behind when the program body ends) and are
//! normalized into one [`Fault`] shape. A lazily built [`Config`] decides
//! which notifiers see each fault; a notifier may ask for the process to end
//! once the pass is over. Faults raised while the pipeline itself is running
//! are routed to a last-resort self handler instead of looping back.

// Fault model
pub mod fault;

// Dispatch
pub mod config;
pub mod handler;
pub mod notifier;

// Cross-cutting concerns
pub mod host;
pub mod lifecycle;
pub mod observability;

pub use config::{Config, ConfigSource, FileSource};
pub use fault::{Channel, Fault, Location, RawSignal, Severity, Signal};
pub use handler::{Interceptor, InterceptorBuilder};
pub use host::{Host, ProcessHost, RecordingHost};
pub use lifecycle::ShutdownGuard;
pub use notifier::{Notifier, NotifierContext, NotifierError, NotifierRegistry};
