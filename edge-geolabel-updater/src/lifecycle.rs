use std::sync::atomic::{AtomicBool, Ordering};

/// Liveness and readiness of the updater as seen by health checks.
///
/// One instance is shared between the [`Scheduler`](crate::Scheduler), which
/// flips both flags on start and stop, and whatever answers the health checks.
#[derive(Debug, Default)]
pub struct LifecycleState {
    live: AtomicBool,
    ready: AtomicBool,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::Release);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
