//! Working days a story has spent in its current state.

use chrono::{DateTime, Datelike, TimeDelta, Utc, Weekday};

use super::model::Transition;

/// Weekdays that do not count towards time in state.
pub const NON_WORKING_DAYS: [Weekday; 2] = [Weekday::Fri, Weekday::Sat];

/// Working days since the latest transition into `current_state`, up to `now`.
///
/// Returns 0 when the story never transitioned into its current state.
pub fn elapsed_working_days(
    transitions: &[Transition],
    current_state: &str,
    now: DateTime<Utc>,
) -> u32 {
    transitions
        .iter()
        .filter(|t| t.state == current_state)
        .map(|t| t.occurred_at)
        .max()
        .map_or(0, |since| working_days_between(since, now))
}

/// Count days from `since` through `until` inclusive, stepping a day at a
/// time and skipping [`NON_WORKING_DAYS`].
pub fn working_days_between(since: DateTime<Utc>, until: DateTime<Utc>) -> u32 {
    let mut cursor = since;
    let mut days = 0;

    while cursor <= until {
        if !NON_WORKING_DAYS.contains(&cursor.weekday()) {
            days += 1;
        }
        cursor += TimeDelta::days(1);
    }

    days
}
