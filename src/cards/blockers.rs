//! Blocker schedule resolution.
//!
//! Blocker descriptions are free text, but people often write when the
//! blocker lifts: "waiting on infra until 3/1", "on or after 2019-09-02".
//! This module finds such a date expression, parses it, and classifies the
//! blocker so the card can show either a `blocked` or a `scheduled` sticker.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use regex::Regex;
use tracing::debug;

use super::model::Blocker;
use crate::stickers::{Sticker, StickerCatalog};

/// Name of the sticker shown for blockers without a date.
pub const BLOCKED: &str = "blocked";
/// Name of the sticker shown for blockers lifting on a future date.
pub const SCHEDULED: &str = "scheduled";

/// Content of a scheduled sticker whose date could not be read.
const UNKNOWN_DATE: &str = "?/?";

static DATE_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(on or after|after|before|until|on)\s+(\d+/\d+(?:/\d+)?|\d+-\d+-\d+|\d+/\d+/\d+)")
        .expect("static regex pattern")
});

static SHORT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+/\d+$").expect("static regex pattern"));

static YEAR_FIRST_PADDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}[/-]\d{2}[/-]\d{2}$").expect("static regex pattern"));

/// Accepted layouts, tried in order, with whether month and day must be
/// zero-padded. Day-first dates accept one or two digits.
const DATE_LAYOUTS: [(&str, bool); 3] = [
    ("%d/%m/%Y", false),
    ("%Y/%m/%d", true),
    ("%Y-%m-%d", true),
];

/// Outcome of reading a blocker's description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockerSchedule {
    /// The blocker lifts on this future date.
    Scheduled(NaiveDate),
    /// A date expression is present but unreadable.
    ScheduledUnknown,
    /// No date expression at all.
    Blocked,
    /// The date has already passed; nothing to show.
    Suppressed,
}

impl BlockerSchedule {
    /// Classify an unresolved blocker relative to `now`.
    pub fn resolve(blocker: &Blocker, now: DateTime<Utc>) -> Self {
        let Some(caps) = DATE_EXPRESSION.captures(&blocker.description) else {
            return Self::Blocked;
        };

        match parse_scheduled_date(&caps[1], &caps[2], blocker.created_at) {
            None => {
                debug!(
                    description = %blocker.description,
                    date = &caps[2],
                    "Unrecognised date in blocker"
                );
                Self::ScheduledUnknown
            }
            Some(date) if start_of_day(date) > now => Self::Scheduled(date),
            Some(_) => Self::Suppressed,
        }
    }

    /// Sticker name this outcome projects to, if any.
    pub fn sticker_name(&self) -> Option<&'static str> {
        match self {
            Self::Scheduled(_) | Self::ScheduledUnknown => Some(SCHEDULED),
            Self::Blocked => Some(BLOCKED),
            Self::Suppressed => None,
        }
    }

    /// Build the sticker for this outcome, titled with the blocker text.
    ///
    /// Uses the catalog's template for the sticker name when configured so
    /// image and priority follow the catalog.
    pub fn to_sticker(&self, description: &str, catalog: &StickerCatalog) -> Option<Sticker> {
        let name = self.sticker_name()?;
        let sticker = catalog
            .matches(name)
            .filter(|s| s.name == name)
            .unwrap_or_else(|| Sticker::named(name))
            .with_title(description);

        Some(match self {
            Self::Scheduled(date) => sticker.with_content(date.format("%-d/%-m").to_string()),
            Self::ScheduledUnknown => sticker.with_content(UNKNOWN_DATE),
            _ => sticker,
        })
    }
}

/// Parse the date part of a blocker expression.
///
/// A short `d/m` date takes the year of `created_at`, and rolls into the
/// next year when it would otherwise land more than six months before
/// `created_at`. The `after` preposition moves the date one day later.
pub fn parse_scheduled_date(
    preposition: &str,
    date: &str,
    created_at: DateTime<Utc>,
) -> Option<NaiveDate> {
    let is_short = SHORT_DATE.is_match(date);
    let date = if is_short {
        format!("{date}/{}", created_at.year())
    } else {
        date.to_string()
    };

    // Years are always written in full.
    if !date.split(['/', '-']).any(|part| part.len() == 4) {
        return None;
    }

    let mut parsed = DATE_LAYOUTS
        .iter()
        .filter(|(_, padded)| !padded || YEAR_FIRST_PADDED.is_match(&date))
        .find_map(|(layout, _)| NaiveDate::parse_from_str(&date, layout).ok())?;

    if is_short {
        let cutoff = add_months(created_at.date_naive(), -6)?
            .and_time(created_at.time())
            .and_utc();
        if start_of_day(parsed) < cutoff {
            parsed = add_months(parsed, 12)?;
        }
    }

    if preposition == "after" {
        parsed = parsed.succ_opt()?;
    }

    Some(parsed)
}

/// Shift by whole months, carrying a day past the end of the target month
/// into the following month (31 Aug - 6 months is 3 Mar, not 28 Feb).
fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let index = date.year() * 12 + date.month0() as i32 + months;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    NaiveDate::from_ymd_opt(index.div_euclid(12), month, 1)?
        .checked_add_days(Days::new(u64::from(date.day0())))
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
