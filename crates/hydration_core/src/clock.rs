//! Local wall-clock source for day boundaries and entry time labels.
//!
//! # Invariants
//! - Day comparison uses the local calendar date only.
//! - `date_key` output is locale independent and compares by equality.

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::cell::Cell;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const TIME_LABEL_FORMAT: &str = "%I:%M %p";

/// Source of the current local date and time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

/// Reads the operating system local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests and scripted sessions.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.now.get()
    }
}

/// Storage form of a calendar day (`lastDate`).
pub fn date_key(day: NaiveDate) -> String {
    day.format(DATE_KEY_FORMAT).to_string()
}

/// Display label for an entry, e.g. `07:05 PM`.
pub fn time_label(at: NaiveDateTime) -> String {
    at.format(TIME_LABEL_FORMAT).to_string()
}
