//! Fault model.
//!
//! # Data Flow
//! ```text
//! runtime error (code, message, location) ─┐
//! panic (payload, location, thread) ───────┼─► RawSignal ─► Signal::Raw ─┐
//! caught error (dyn Error) ────────────────┤                             ├─► Fault::normalize ─► Fault
//! terminal fault (host slot, at exit) ─────┘      already a Fault ─► Signal::Normalized ─┘
//! ```
//!
//! # Design Decisions
//! - One normalization function; an already normalized fault passes through untouched
//! - `Fault` is immutable and cheap to clone (shared inner)
//! - Severity is a bit set so it can be matched against reporting and per-notifier masks

pub mod object;
pub mod severity;

pub use object::{Channel, Fault, Location, RawSignal, Signal};
pub use severity::Severity;
