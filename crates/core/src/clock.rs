// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so budget/timeout logic can be driven without sleeping
//! in tests.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Source of the current time, injected into the manager and budget tracker.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// A monotonic instant, used for timeout scheduling.
    fn now_instant(&self) -> Instant;
}

/// Real wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    fn now_instant(&self) -> Instant {
        Instant::now()
    }
}

/// Controllable clock for deterministic tests.
///
/// `now_instant` always reflects the real `Instant::now()` offset by the
/// elapsed simulated milliseconds, so code under test can still use
/// `tokio::time::sleep`-based watchers against it in integration tests that
/// pair `FakeClock` with `tokio::time::pause()`.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<FakeClockInner>,
}

struct FakeClockInner {
    ms: AtomicU64,
    started: Instant,
    offset_ms: Mutex<u64>,
}

impl FakeClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            inner: Arc::new(FakeClockInner {
                ms: AtomicU64::new(start_ms),
                started: Instant::now(),
                offset_ms: Mutex::new(0),
            }),
        }
    }

    /// Advance the clock by `delta_ms` milliseconds.
    pub fn advance(&self, delta_ms: u64) {
        self.inner.ms.fetch_add(delta_ms, Ordering::SeqCst);
        *self.inner.offset_ms.lock() += delta_ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.inner.ms.load(Ordering::SeqCst)
    }

    fn now_instant(&self) -> Instant {
        let offset = *self.inner.offset_ms.lock();
        self.inner.started + std::time::Duration::from_millis(offset)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
