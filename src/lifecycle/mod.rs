//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     InterceptorBuilder::install → host hooks claimed → ShutdownGuard
//!
//! Shutdown (shutdown.rs):
//!     guard dropped / Interceptor::run returns / notify pass terminates
//!         → terminal fault check → user callbacks → deferred callbacks
//! ```
//!
//! # Design Decisions
//! - Exactly one installation per process
//! - The shutdown sequence runs once, whichever path reaches it first
//! - Termination runs the shutdown sequence before exiting

pub mod shutdown;

pub use shutdown::ShutdownGuard;
