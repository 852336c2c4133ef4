// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Clock seam for auto-respond latency.
//!
//! The fake transport stamps every intercepted call with a deadline on a
//! [`Clock`]. With a [`FakeClock`] those deadlines are reached by advancing
//! time by hand, so tests exercising latency never wait on the wall clock.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Time source used to schedule simulated replies
pub trait Clock: Send + Sync {
    /// Milliseconds since an arbitrary, fixed origin
    fn now_millis(&self) -> u64;

    /// Wait for `duration` to pass on this clock
    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Deadline `latency` from now
    fn deadline_after(&self, latency: Duration) -> u64 {
        self.now_millis().saturating_add(millis(latency))
    }

    /// Time left until `deadline`, zero once passed
    fn until(&self, deadline: u64) -> Duration {
        Duration::from_millis(deadline.saturating_sub(self.now_millis()))
    }
}

/// Wall clock backed by `tokio::time`
#[derive(Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(millis)
            .unwrap_or_default()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Manually driven clock; clones share the same time.
///
/// Sleeping on it moves time forward by the requested amount, unless the
/// handle is [frozen](FakeClock::frozen), in which case only explicit
/// [`advance`](FakeClock::advance) or [`set`](FakeClock::set) calls do.
#[derive(Clone, Debug)]
pub struct FakeClock {
    now: Arc<AtomicU64>,
    frozen: bool,
}

impl FakeClock {
    pub fn new(start_millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_millis)),
            frozen: false,
        }
    }

    /// Handle on the same time that ignores sleeps
    pub fn frozen(&self) -> Self {
        Self {
            now: Arc::clone(&self.now),
            frozen: true,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn advance(&self, duration: Duration) {
        self.advance_ms(millis(duration));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, now_millis: u64) {
        self.now.store(now_millis, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Clock for FakeClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        if !self.frozen {
            self.advance(duration);
        }
        Box::pin(std::future::ready(()))
    }
}

/// Clock carried by options and transports
#[derive(Clone, Debug)]
pub enum ClockHandle {
    System(SystemClock),
    Fake(FakeClock),
}

impl ClockHandle {
    pub fn system() -> Self {
        Self::System(SystemClock)
    }

    /// Fake clock starting at zero
    pub fn fake() -> Self {
        Self::Fake(FakeClock::default())
    }

    /// The fake clock, for advancing time; `None` for the system clock
    pub fn as_fake(&self) -> Option<&FakeClock> {
        match self {
            Self::Fake(clock) => Some(clock),
            Self::System(_) => None,
        }
    }

    fn inner(&self) -> &dyn Clock {
        match self {
            Self::System(clock) => clock as &dyn Clock,
            Self::Fake(clock) => clock as &dyn Clock,
        }
    }
}

impl From<FakeClock> for ClockHandle {
    fn from(clock: FakeClock) -> Self {
        Self::Fake(clock)
    }
}

impl Clock for ClockHandle {
    fn now_millis(&self) -> u64 {
        self.inner().now_millis()
    }

    fn sleep(&self, duration: Duration) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        self.inner().sleep(duration)
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::system()
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
