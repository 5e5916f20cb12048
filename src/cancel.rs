use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Caller-supplied cancellation handle, checked by the planner between
/// horizon steps. Cloning shares the underlying flag, so a host can hand one
/// clone to a planning call and keep another to cancel it from elsewhere.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
