//! Dispatch Gate
//!
//! Bounds the number of network operations in flight. Submissions beyond
//! the cap wait on a counting semaphore until a running operation finishes;
//! nothing is dropped and there is no admission timeout.

use smol::lock::{Semaphore, SemaphoreGuardArc};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default concurrency cap
pub const DEFAULT_MAX_IN_FLIGHT: usize = 6;

#[derive(Debug)]
struct GateState {
    capacity: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    admitted: AtomicUsize,
}

/// Shared admission gate; clones share the same counter
#[derive(Clone)]
pub struct DispatchGate {
    permits: Arc<Semaphore>,
    state: Arc<GateState>,
}

/// Proof of admission; releases its slot when dropped
pub struct Admission {
    state: Arc<GateState>,
    _permit: SemaphoreGuardArc,
}

impl std::fmt::Debug for DispatchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchGate")
            .field("capacity", &self.state.capacity)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

impl std::fmt::Debug for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission").finish_non_exhaustive()
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DispatchGate {
    /// Gate admitting at most `capacity` operations (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            state: Arc::new(GateState {
                capacity,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                admitted: AtomicUsize::new(0),
            }),
        }
    }

    fn admitted(&self, permit: SemaphoreGuardArc) -> Admission {
        let now = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.peak.fetch_max(now, Ordering::SeqCst);
        self.state.admitted.fetch_add(1, Ordering::SeqCst);
        tracing::trace!("gate admitted ({}/{})", now, self.state.capacity);
        Admission {
            state: self.state.clone(),
            _permit: permit,
        }
    }

    /// Wait for a free slot
    pub async fn admit(&self) -> Admission {
        let permit = self.permits.acquire_arc().await;
        self.admitted(permit)
    }

    /// Take a slot only if one is free right now
    pub fn try_admit(&self) -> Option<Admission> {
        self.permits.try_acquire_arc().map(|permit| self.admitted(permit))
    }

    /// Run `operation` once admitted; the slot is released when it finishes,
    /// whatever its outcome
    pub async fn run<F: Future>(&self, operation: F) -> F::Output {
        let _admission = self.admit().await;
        operation.await
    }

    /// Operations currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    /// Highest concurrent in-flight count observed
    pub fn peak(&self) -> usize {
        self.state.peak.load(Ordering::SeqCst)
    }

    /// Total admissions so far
    pub fn total_admitted(&self) -> usize {
        self.state.admitted.load(Ordering::SeqCst)
    }

    pub fn capacity(&self) -> usize {
        self.state.capacity
    }
}

impl Default for DispatchGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IN_FLIGHT)
    }
}
