//! Modification times

use std::sync::atomic::{AtomicU64, Ordering};

static GLOBAL_TIME: AtomicU64 = AtomicU64::new(0);

/// A modification time
///
/// Every call to [TimeStamp::modified] draws a fresh value from a process wide counter, so stamps taken
/// on different objects can be compared with each other.
#[derive(Debug, Default)]
pub struct TimeStamp {
    time: AtomicU64,
}

impl TimeStamp {
    /// Create a stamp that is already marked as modified
    pub fn new() -> Self {
        let stamp = Self::default();
        stamp.modified();
        stamp
    }

    /// Mark as modified now
    pub fn modified(&self) {
        let now = GLOBAL_TIME.fetch_add(1, Ordering::Relaxed) + 1;
        self.time.store(now, Ordering::Relaxed);
    }

    /// The time of the last modification (0 if never modified)
    pub fn get(&self) -> u64 {
        self.time.load(Ordering::Relaxed)
    }

    /// Forget the last modification
    pub fn reset(&self) {
        self.time.store(0, Ordering::Relaxed);
    }
}

impl Clone for TimeStamp {
    fn clone(&self) -> Self {
        Self {
            time: AtomicU64::new(self.get()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_monotonic() {
        let a = TimeStamp::new();
        let b = TimeStamp::new();
        assert!(b.get() > a.get());
        a.modified();
        assert!(a.get() > b.get());
    }

    #[test]
    fn test_reset() {
        let a = TimeStamp::new();
        assert!(a.get() > 0);
        a.reset();
        assert_eq!(a.get(), 0);
        assert_eq!(TimeStamp::default().get(), 0);
    }
}
