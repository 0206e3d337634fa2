//! Scoped fault sinks.
//!
//! Every region that runs foreign code on behalf of the pipeline (config
//! construction, a notifier, a user or deferred callback) pushes the sink its
//! faults must go to and pops it when the region ends, on every path. Panics
//! inside a region are caught at the region boundary; the panic hook only
//! stashes their details here so the catch site can report them once.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

use crate::fault::RawSignal;

/// Where faults raised inside a scoped region are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sink {
    /// Back through the interceptor's normal pipeline.
    Pipeline,
    /// Straight to the self fault handler.
    Internal,
}

thread_local! {
    static SINKS: RefCell<Vec<Sink>> = const { RefCell::new(Vec::new()) };
    static PENDING_PANIC: RefCell<Option<RawSignal>> = const { RefCell::new(None) };
}

/// Sink of the innermost active region on this thread.
pub(crate) fn current() -> Option<Sink> {
    SINKS.with(|sinks| sinks.borrow().last().copied())
}

/// Keep the hook's view of a panic for the region that will catch it.
pub(crate) fn stash_panic(signal: RawSignal) {
    PENDING_PANIC.with(|slot| *slot.borrow_mut() = Some(signal));
}

fn take_panic() -> Option<RawSignal> {
    PENDING_PANIC.with(|slot| slot.borrow_mut().take())
}

/// Pops its sink on drop.
pub(crate) struct SinkScope {
    sink: Sink,
}

impl SinkScope {
    pub(crate) fn enter(sink: Sink) -> Self {
        SINKS.with(|sinks| sinks.borrow_mut().push(sink));
        Self { sink }
    }
}

impl Drop for SinkScope {
    fn drop(&mut self) {
        SINKS.with(|sinks| {
            let popped = sinks.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.sink));
        });
    }
}

/// Run `f` inside a region routed to `sink`, turning a panic into a signal.
pub(crate) fn guarded<T>(sink: Sink, f: impl FnOnce() -> T) -> Result<T, RawSignal> {
    let _scope = SinkScope::enter(sink);
    take_panic();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => Err(take_panic().unwrap_or_else(|| RawSignal::from_panic_payload(&*payload))),
    }
}
