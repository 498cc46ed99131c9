//! Consecutive-day streak state machine.
//!
//! A streak only ever advances on a solve. The calendar date of a solve is
//! taken at a fixed UTC offset ([`Calendar`]); comparing dates rather than
//! instants keeps "same day" and "yesterday" independent of the hour.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Maps instants to calendar dates at a fixed offset from UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    /// `None` when the offset is a full day or more away from UTC.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        let offset = FixedOffset::east_opt(minutes.checked_mul(60)?)?;
        Some(Self { offset })
    }

    #[must_use]
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    #[must_use]
    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// What a solve did to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakChange {
    /// Already solved something today; counters untouched.
    SameDay,
    /// Last solve was yesterday; the run grew by one.
    Extended,
    /// First solve ever, or the run was broken; current restarts at 1.
    Started,
}

/// Streak counters. `current <= max` and `max` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streak {
    last_solved_date: Option<NaiveDate>,
    current: u32,
    max: u32,
}

impl Streak {
    /// Rebuild persisted counters, `None` if they violate `current <= max`.
    #[must_use]
    pub const fn from_parts(
        last_solved_date: Option<NaiveDate>,
        current: u32,
        max: u32,
    ) -> Option<Self> {
        if current > max {
            return None;
        }
        Some(Self {
            last_solved_date,
            current,
            max,
        })
    }

    #[must_use]
    pub const fn last_solved_date(&self) -> Option<NaiveDate> {
        self.last_solved_date
    }

    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Advance the streak for a solve on `today`.
    pub fn record_solve(&mut self, today: NaiveDate) -> StreakChange {
        if self.last_solved_date == Some(today) {
            return StreakChange::SameDay;
        }

        let yesterday = today.checked_sub_days(Days::new(1));
        let change = if yesterday.is_some() && self.last_solved_date == yesterday {
            self.current = self.current.saturating_add(1);
            StreakChange::Extended
        } else {
            self.current = 1;
            StreakChange::Started
        };

        self.max = self.max.max(self.current);
        self.last_solved_date = Some(today);
        change
    }
}
