//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! coordinator / interceptor / log notifier
//!     → tracing events
//!     → logging.rs (subscriber installed by the binary)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is left to the binary
//! - Log level configurable via `RUST_LOG`

pub mod logging;
