//! End-of-process coordination.

use crate::handler::Interceptor;

/// Runs the interceptor's shutdown sequence when dropped.
///
/// Keep it alive for the whole of `main`; dropping it is the process-end hook.
#[must_use = "dropping the guard runs the shutdown sequence immediately"]
pub struct ShutdownGuard {
    interceptor: Interceptor,
}

impl ShutdownGuard {
    pub(crate) fn new(interceptor: Interceptor) -> Self {
        Self { interceptor }
    }

    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.interceptor.capture_shutdown();
    }
}
