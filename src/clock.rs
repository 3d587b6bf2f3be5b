//! Time sources
//!
//! Everything time-driven in the effects runs off two injected notions of
//! time: the frame delta handed to `Effect::update`, which drives
//! [`Interval`] timers, and a [`Clock`] for wall-clock readings (the `#time`
//! display). Neither touches a global timer, so both can be stepped by hand.

use chrono::Timelike;
use std::cell::Cell;
use std::fmt;

/// Hour and minute of the local wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallTime {
    pub hour: u32,
    pub minute: u32,
}

impl WallTime {
    pub const fn new(hour: u32, minute: u32) -> Self {
        Self { hour, minute }
    }
}

/// Hours unpadded, minutes padded: `9:05`, `23:41`
impl fmt::Display for WallTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

pub trait Clock {
    fn now(&self) -> WallTime;
}

/// Local time of the host
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> WallTime {
        let now = chrono::Local::now();
        WallTime::new(now.hour(), now.minute())
    }
}

/// A clock that only changes when told to
#[derive(Debug, Default)]
pub struct FixedClock {
    time: Cell<(u32, u32)>,
}

impl FixedClock {
    pub fn new(hour: u32, minute: u32) -> Self {
        Self {
            time: Cell::new((hour, minute)),
        }
    }

    pub fn set(&self, hour: u32, minute: u32) {
        self.time.set((hour, minute));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> WallTime {
        let (hour, minute) = self.time.get();
        WallTime::new(hour, minute)
    }
}

/// Repeating timer advanced by frame deltas.
///
/// `tick` reports how many whole periods elapsed, carrying the remainder
/// into the next call.
#[derive(Debug, Clone)]
pub struct Interval {
    period: f32,
    elapsed: f32,
}

impl Interval {
    /// `period` is in seconds and must be positive
    pub fn new(period: f32) -> Self {
        debug_assert!(period > 0.0, "Interval period must be positive");
        Self {
            period,
            elapsed: 0.0,
        }
    }

    /// Advance by `dt` seconds, returning the number of times the timer fired
    pub fn tick(&mut self, dt: f32) -> u32 {
        self.elapsed += dt.max(0.0);
        if self.elapsed < self.period {
            return 0;
        }
        let mut periods = (self.elapsed / self.period).floor();
        self.elapsed = (self.elapsed - periods * self.period).max(0.0);
        // Division rounding can leave one whole period behind
        if self.elapsed >= self.period {
            periods += 1.0;
            self.elapsed = 0.0;
        }
        periods.min(u32::MAX as f32) as u32
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
