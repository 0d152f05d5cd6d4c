//! Single-flight guard for job runs.

use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one run of a job at a time.
///
/// A second caller does not wait; it gets `None` and skips.
///
/// # Example
///
/// ```
/// use attendance_engine::jobs::RunGuard;
///
/// let guard = RunGuard::new();
/// let permit = guard.try_acquire().unwrap();
/// assert!(guard.try_acquire().is_none());
/// drop(permit);
/// assert!(guard.try_acquire().is_some());
/// ```
#[derive(Debug, Default)]
pub struct RunGuard {
    running: AtomicBool,
}

impl RunGuard {
    /// Creates an idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a run as started, unless one already is.
    pub fn try_acquire(&self) -> Option<RunPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit { guard: self })
    }

    /// True while a permit is held.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Held for the duration of a run; releases the guard on drop.
#[derive(Debug)]
pub struct RunPermit<'a> {
    guard: &'a RunGuard,
}

impl Drop for RunPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permit_released_on_drop() {
        let guard = RunGuard::new();
        {
            let _permit = guard.try_acquire().unwrap();
            assert!(guard.is_running());
        }
        assert!(!guard.is_running());
    }
}
