// src/session/clock.rs

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Seconds remaining at which the one-time low-time warning fires.
pub const TIME_LOW_WARNING_SECS: u32 = 300;

/// Source of wall-clock time for attempt timestamps. Injected so tests can
/// pin and advance time deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    Running,
    /// Crossed the low-time threshold on this tick. Raised at most once per
    /// countdown.
    TimeLow,
    Expired,
}

/// 1 Hz countdown for a timed attempt. Holds seconds remaining in
/// [0, total] and never goes below zero.
#[derive(Debug, Clone)]
pub struct Countdown {
    remaining_secs: u32,
    time_low_raised: bool,
}

impl Countdown {
    pub fn new(total_secs: u32) -> Self {
        Self {
            remaining_secs: total_secs,
            time_low_raised: false,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Decrements one second. Reaching zero reports `Expired`; once expired
    /// further ticks keep reporting `Expired` without wrapping.
    pub fn tick(&mut self) -> CountdownStatus {
        if self.remaining_secs == 0 {
            return CountdownStatus::Expired;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            return CountdownStatus::Expired;
        }
        if !self.time_low_raised && self.remaining_secs <= TIME_LOW_WARNING_SECS {
            self.time_low_raised = true;
            return CountdownStatus::TimeLow;
        }
        CountdownStatus::Running
    }
}
