// Capacity Gate - busy/max slot accounting and the stop flag

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Tracks admitted units against a fixed number of slots.
///
/// Invariant: `0 <= busy <= max_slots`. Slots are only taken through
/// [`CapacityGate::try_admit`] and only returned by dropping the
/// [`SlotGuard`] it hands out.
#[derive(Debug)]
pub struct CapacityGate {
    max_slots: usize,
    busy: AtomicUsize,
    stopped: AtomicBool,
    stop_notify: Notify,
}

impl CapacityGate {
    pub fn new(max_slots: usize) -> Self {
        Self {
            max_slots,
            busy: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
            stop_notify: Notify::new(),
        }
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Currently occupied slots
    pub fn busy(&self) -> usize {
        self.busy.load(Ordering::SeqCst)
    }

    /// Remaining admission headroom
    pub fn ready(&self) -> usize {
        self.max_slots.saturating_sub(self.busy())
    }

    /// Set the stop flag. Returns true for the call that flipped it.
    ///
    /// In-flight units are not affected.
    pub fn try_stop(&self) -> bool {
        let flipped = !self.stopped.swap(true, Ordering::SeqCst);
        if flipped {
            self.stop_notify.notify_waiters();
        }
        flipped
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Occupy one slot, or `None` when all slots are taken
    pub fn try_admit(self: &Arc<Self>) -> Option<SlotGuard> {
        self.busy
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |busy| {
                (busy < self.max_slots).then_some(busy + 1)
            })
            .ok()
            .map(|_| SlotGuard {
                gate: Arc::clone(self),
            })
    }

    /// Sleep for `interval`, returning early once stop is requested
    pub async fn pause(&self, interval: Duration) {
        let notified = self.stop_notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_stopped() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {},
            _ = notified => {},
        }
    }

    fn release(&self) {
        let previous = self.busy.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0, "slot released more often than admitted");
    }
}

/// One occupied slot; released exactly once when dropped
#[derive(Debug)]
pub struct SlotGuard {
    gate: Arc<CapacityGate>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_new_gate_is_fully_ready() {
        let gate = CapacityGate::new(4);
        assert_eq!(gate.busy(), 0);
        assert_eq!(gate.ready(), 4);
        assert!(!gate.is_stopped());
    }

    #[test]
    fn test_admit_and_release() {
        let gate = Arc::new(CapacityGate::new(2));

        let first = gate.try_admit().expect("first slot");
        let second = gate.try_admit().expect("second slot");
        assert_eq!(gate.busy(), 2);
        assert_eq!(gate.ready(), 0);

        assert!(gate.try_admit().is_none(), "no slot beyond max");
        assert_eq!(gate.busy(), 2);

        drop(first);
        assert_eq!(gate.busy(), 1);
        assert_eq!(gate.ready(), 1);

        drop(second);
        assert_eq!(gate.busy(), 0);
        assert_eq!(gate.ready(), 2);
    }

    #[test]
    fn test_try_stop_is_idempotent() {
        let gate = CapacityGate::new(1);
        assert!(gate.try_stop());
        assert!(!gate.try_stop());
        assert!(gate.is_stopped());
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_max() {
        let gate = Arc::new(CapacityGate::new(3));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        if let Some(slot) = gate.try_admit() {
                            assert!(gate.busy() <= gate.max_slots());
                            drop(slot);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(gate.busy(), 0);
    }

    #[tokio::test]
    async fn test_pause_sleeps_full_interval() {
        let gate = CapacityGate::new(1);
        let started = Instant::now();
        gate.pause(Duration::from_millis(50)).await;
        assert!(started.elapsed() >= Duration::from_millis(45));
    }

    #[tokio::test]
    async fn test_pause_interrupted_by_stop() {
        let gate = Arc::new(CapacityGate::new(1));
        let stopper = Arc::clone(&gate);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            stopper.try_stop();
        });

        let started = Instant::now();
        gate.pause(Duration::from_secs(10)).await;
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_pause_returns_immediately_when_stopped() {
        let gate = CapacityGate::new(1);
        gate.try_stop();
        let started = Instant::now();
        gate.pause(Duration::from_secs(10)).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
