//! Host runtime registration surface.
//!
//! # Responsibilities
//! - Claim the process hook slots (panic hook) for one interceptor
//! - Hold the terminal-fault slot inspected at process end
//! - Provide the fixed diagnostic stream used by the self fault handler
//! - Exit the process
//!
//! # Design Decisions
//! - The pipeline never touches process globals directly; everything goes through `Host`
//! - `RecordingHost` swaps exits and diagnostics for in-memory records

pub mod process;
pub mod recording;

pub use process::ProcessHost;
pub use recording::RecordingHost;

use crate::fault::RawSignal;
use crate::handler::Interceptor;

/// What the interceptor needs from the runtime it runs in.
pub trait Host: Send + Sync + 'static {
    /// Install `interceptor` as the sole fault hook. Called once, at installation.
    ///
    /// Replacing the default hook also suppresses the runtime's own fault output.
    fn install(&self, interceptor: &Interceptor);

    /// Remember a fault that no synchronous channel will report.
    fn record_terminal(&self, signal: RawSignal);

    /// Take the fault recorded by [`Host::record_terminal`], if any.
    fn take_terminal_fault(&self) -> Option<RawSignal>;

    /// Write one line to the diagnostic stream. Must not panic.
    fn diagnostic(&self, line: &str);

    /// End the process with `status`.
    fn exit(&self, status: i32);
}
