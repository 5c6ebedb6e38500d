use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Shared pixel-access counter.
///
/// Cloning yields another handle onto the same count. Every image is tied to
/// one counter; images derived from it (rotations, crops, ...) report to the
/// same counter.
#[derive(Debug, Clone)]
pub struct AccessCounter {
    inner: Rc<CounterState>,
}

#[derive(Debug)]
struct CounterState {
    pixmem: Cell<u64>,
    since: Cell<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub pixmem: u64,
    pub elapsed_secs: f64,
}

impl AccessCounter {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CounterState {
                pixmem: Cell::new(0),
                since: Cell::new(Instant::now()),
            }),
        }
    }

    #[inline]
    pub fn add(&self, n: u64) {
        let c = &self.inner.pixmem;
        c.set(c.get().wrapping_add(n));
    }

    pub fn pixmem(&self) -> u64 {
        self.inner.pixmem.get()
    }

    /// Zeroes the count and restarts the clock.
    pub fn reset(&self) {
        self.inner.pixmem.set(0);
        self.inner.since.set(Instant::now());
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.since.get().elapsed()
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            pixmem: self.pixmem(),
            elapsed_secs: self.elapsed().as_secs_f64(),
        }
    }

    pub fn shares_state_with(&self, other: &AccessCounter) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for AccessCounter {
    fn default() -> Self {
        Self::new()
    }
}
