//! Activity views derived from completion timestamps.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::profile::UserProfile;
use super::streak::Calendar;

/// Number of problems first solved on one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub count: usize,
}

/// Per-date solve counts, ascending by date. Days without solves are omitted.
#[must_use]
pub fn daily_activity(profile: &UserProfile, calendar: &Calendar) -> Vec<DailyActivity> {
    let mut by_date: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for solved_at in profile.completed().values() {
        *by_date.entry(calendar.date_of(*solved_at)).or_default() += 1;
    }
    by_date
        .into_iter()
        .map(|(date, count)| DailyActivity { date, count })
        .collect()
}

#[must_use]
pub fn solved_on(profile: &UserProfile, date: NaiveDate, calendar: &Calendar) -> usize {
    profile
        .completed()
        .values()
        .filter(|solved_at| calendar.date_of(**solved_at) == date)
        .count()
}

/// Progress towards the daily target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoal {
    pub target: u32,
    pub solved: usize,
    pub percent: u8,
}

impl DailyGoal {
    /// `percent = min(100, round(100 * solved / target))`; a zero target counts as met.
    #[must_use]
    pub fn new(target: u32, solved: usize) -> Self {
        let percent = if target == 0 {
            100
        } else {
            let solved = u64::try_from(solved).unwrap_or(u64::MAX);
            let target = u64::from(target);
            let rounded = solved
                .saturating_mul(200)
                .saturating_add(target)
                / target.saturating_mul(2);
            u8::try_from(rounded.min(100)).unwrap_or(100)
        };
        Self {
            target,
            solved,
            percent,
        }
    }

    #[must_use]
    pub fn for_day(profile: &UserProfile, date: NaiveDate, target: u32, calendar: &Calendar) -> Self {
        Self::new(target, solved_on(profile, date, calendar))
    }

    #[must_use]
    pub fn is_met(&self) -> bool {
        self.percent >= 100
    }
}
