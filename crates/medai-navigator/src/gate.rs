//! At most one outstanding model request per form.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

/// A form's loading flag.
///
/// `try_begin` hands out a guard while the form is idle. The form stays
/// busy until the guard is dropped, whichever way the request ends.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    busy: Arc<AtomicBool>,
}

/// Proof that a request is in flight. Dropping it clears the loading flag.
#[derive(Debug)]
pub struct RequestGuard {
    busy: Arc<AtomicBool>,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the gate, or `None` if a request is already running.
    pub fn try_begin(&self) -> Option<RequestGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(RequestGuard {
                busy: Arc::clone(&self.busy),
            })
        } else {
            debug!("request ignored, form is already loading");
            None
        }
    }

    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_begin_is_refused_while_busy() {
        let gate = RequestGate::new();
        let guard = gate.try_begin();
        assert!(guard.is_some());
        assert!(gate.is_loading());
        assert!(gate.try_begin().is_none());

        drop(guard);
        assert!(!gate.is_loading());
        assert!(gate.try_begin().is_some());
    }

    /// A guard moved to a worker thread clears the flag when the thread ends.
    #[test]
    fn guard_released_from_another_thread() {
        let gate = RequestGate::new();
        let guard = gate.try_begin().unwrap();
        std::thread::spawn(move || drop(guard)).join().unwrap();
        assert!(!gate.is_loading());
    }

    /// Unwinding out of a request still leaves the form idle.
    #[test]
    fn panic_while_holding_guard_clears_flag() {
        let gate = RequestGate::new();
        let worker_gate = gate.clone();
        let result = std::thread::spawn(move || {
            let _guard = worker_gate.try_begin().unwrap();
            panic!("request blew up");
        })
        .join();
        assert!(result.is_err());
        assert!(!gate.is_loading());
    }
}
