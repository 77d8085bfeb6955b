use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Receives progress ticks from long tree/diff/merge operations and can
/// request cancellation.
///
/// Implementations are polled at shard/subtree granularity, so
/// cancellation latency is bounded by one shard's processing time, not
/// the whole operation.
pub trait ProgressListener: Send + Sync {
    /// `units` of work completed since the last call.
    fn progress(&self, _units: u64) {}

    /// Returns `true` if the operation should stop at the next check.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The no-op listener.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressListener for NoopProgress {}

/// Shared no-op listener instance.
pub static NOOP_PROGRESS: NoopProgress = NoopProgress;

/// A listener backed by atomics: counts work and exposes a cancel switch.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
    completed: AtomicU64,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; observed at the next shard boundary.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Total work units reported so far.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

impl ProgressListener for CancelFlag {
    fn progress(&self, units: u64) {
        self.completed.fetch_add(units, Ordering::Relaxed);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_counts_and_cancels() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());

        flag.progress(3);
        flag.progress(2);
        assert_eq!(flag.completed(), 5);

        flag.cancel();
        assert!(flag.is_cancelled());
    }

    #[test]
    fn noop_never_cancels() {
        NOOP_PROGRESS.progress(100);
        assert!(!NOOP_PROGRESS.is_cancelled());
    }
}
