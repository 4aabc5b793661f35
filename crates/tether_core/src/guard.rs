//! Validity guard
//!
//! Wraps a handle with a one-way liveness latch. Every script-side accessor
//! goes through [`ValidityGuard::resolve_with`] instead of touching the raw
//! handle, so a destroyed object can never be read through a recycled slot.

use std::cell::Cell;

use crate::handle::Handle;
use crate::log::Severity;
use crate::native::LogCalls;

#[derive(Debug, Clone)]
pub struct ValidityGuard {
    handle: Handle,
    live: Cell<bool>,
}

impl ValidityGuard {
    pub fn new(handle: Handle) -> Self {
        Self {
            live: Cell::new(!handle.is_sentinel()),
            handle,
        }
    }

    /// A guard that was never valid.
    pub fn invalid() -> Self {
        Self::new(Handle::SENTINEL)
    }

    /// Last known liveness. Does not consult the store.
    pub fn is_latched_live(&self) -> bool {
        self.live.get()
    }

    /// Stable identity of the guarded object, valid or not.
    pub fn id(&self) -> u64 {
        self.handle.to_bits()
    }

    /// The guarded handle, without any liveness check.
    pub fn raw(&self) -> Handle {
        self.handle
    }

    /// Flip to invalid. Never reversible.
    pub fn invalidate(&self) {
        self.live.set(false);
    }

    /// Check liveness against the store without reporting anything.
    pub fn probe(&self, probe: impl FnOnce(Handle) -> bool) -> bool {
        if !self.live.get() {
            return false;
        }
        if probe(self.handle) {
            true
        } else {
            self.live.set(false);
            false
        }
    }

    /// Return the raw handle if the object is still live.
    ///
    /// Otherwise latch invalid, report through the diagnostic channel and
    /// return [`Handle::SENTINEL`].
    pub fn resolve_with<L>(&self, log: &L, probe: impl FnOnce(Handle) -> bool) -> Handle
    where
        L: LogCalls + ?Sized,
    {
        if self.probe(probe) {
            return self.handle;
        }

        tracing::debug!(handle = %self.handle, "rejected access through invalid handle");
        log.log(
            Severity::Error,
            &format!("attempt to access invalid object ({})", self.handle),
        );
        Handle::SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(Severity, String)>>);

    impl LogCalls for Recorder {
        fn log(&self, severity: Severity, message: &str) {
            self.0.borrow_mut().push((severity, message.to_string()));
        }
    }

    #[test]
    fn test_live_handle_resolves() {
        let log = Recorder::default();
        let handle = Handle::from_bits(5);
        let guard = ValidityGuard::new(handle);

        assert_eq!(guard.resolve_with(&log, |_| true), handle);
        assert!(log.0.borrow().is_empty());
    }

    #[test]
    fn test_dead_handle_reports_and_returns_sentinel() {
        let log = Recorder::default();
        let guard = ValidityGuard::new(Handle::from_bits(5));

        assert_eq!(guard.resolve_with(&log, |_| false), Handle::SENTINEL);
        let entries = log.0.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, Severity::Error);
        assert!(entries[0].1.contains("invalid object"));
    }

    #[test]
    fn test_invalid_latch_never_recovers() {
        let log = Recorder::default();
        let guard = ValidityGuard::new(Handle::from_bits(5));

        guard.resolve_with(&log, |_| false);
        // Even if the slot comes back, the guard stays invalid.
        assert_eq!(guard.resolve_with(&log, |_| true), Handle::SENTINEL);
        assert!(!guard.is_latched_live());
    }

    #[test]
    fn test_invalid_guard_skips_probe() {
        let log = Recorder::default();
        let guard = ValidityGuard::invalid();
        let mut probed = false;

        guard.resolve_with(&log, |_| {
            probed = true;
            true
        });
        assert!(!probed);
    }
}
