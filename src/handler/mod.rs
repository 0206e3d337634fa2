//! Fault handling controllers.
//!
//! # Data Flow
//! ```text
//! host hook / API call
//!     → Interceptor (normalize once, remember last fault)
//!     → Coordinator::ensure_config (first fault only)
//!     → Coordinator::handle (reporting mask filter)
//!     → Coordinator::run_notifiers (ordered, per-notifier mask, log-only skip)
//!     → terminate (notifier request or unrecoverable severity)
//!
//! Faults raised while the pipeline runs:
//!     → scoped sink = Internal → SelfFaultHandler
//!
//! Process end (Interceptor::capture_shutdown):
//!     terminal fault from host → user callbacks → deferred callbacks(DeferredData)
//! ```
//!
//! # Design Decisions
//! - Single-threaded, reentrant: a fault may arrive while another is handled
//! - Every region running foreign code restores its sink on all exit paths
//! - The self handler is the only place a fault is recovered locally

pub mod coordinator;
pub mod deferred;
pub mod interceptor;
pub(crate) mod scope;
pub mod self_handler;

pub use coordinator::Coordinator;
pub use deferred::{DeferredCallback, DeferredData, UserCallback};
pub use interceptor::{InstallError, Interceptor, InterceptorBuilder};
pub use self_handler::SelfFaultHandler;
