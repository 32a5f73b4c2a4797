//! Anchor date selection: the first concrete occurrence inside a window.

use chrono::{Datelike, Days, NaiveDate};

use super::grammar::{Ordinals, Recurrence};
use super::restriction::{MonthRestriction, next_month};
use crate::error::{RecurrenceError, RecurrenceResult};
use calripper_rfc::rfc::ical::core::Weekday;

/// Inclusive date range in which an anchor must fall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl GenerationWindow {
    /// ## Errors
    /// Returns `RecurrenceError::InvalidWindow` when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> RecurrenceResult<Self> {
        if start > end {
            return Err(RecurrenceError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// ## Summary
/// Returns the earliest date in `window` that matches `recurrence` and falls
/// in a month allowed by `restriction`.
///
/// A `Yearly` recurrence is always confined to its own month; `restriction`
/// is not consulted for it.
///
/// ## Errors
/// Returns `RecurrenceError::NoValidAnchor` when no such date exists, and
/// `RecurrenceError::InvalidMonth` for a yearly month outside 1-12.
pub fn select_anchor(
    window: &GenerationWindow,
    recurrence: &Recurrence,
    restriction: &MonthRestriction,
) -> RecurrenceResult<NaiveDate> {
    let candidate = match recurrence {
        Recurrence::Weekly { weekday } => weekly_anchor(window, *weekday, restriction),
        Recurrence::Monthly { weekday, ordinals } => {
            ordinal_anchor(window, *weekday, ordinals, restriction)
        }
        Recurrence::Yearly {
            weekday,
            ordinals,
            month,
        } => ordinal_anchor(window, *weekday, ordinals, &MonthRestriction::single(*month)?),
    };

    match candidate {
        Some(anchor) if window.contains(anchor) => {
            tracing::trace!(recurrence = %recurrence, %anchor, "Selected anchor");
            Ok(anchor)
        }
        _ => Err(RecurrenceError::NoValidAnchor {
            recurrence: recurrence.to_string(),
            start: window.start,
            end: window.end,
        }),
    }
}

/// First date on or after `date` falling on `weekday`.
fn next_weekday_on_or_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let target = chrono::Weekday::from(weekday).num_days_from_monday();
    let current = date.weekday().num_days_from_monday();
    let ahead = (target + 7 - current) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
}

fn weekly_anchor(
    window: &GenerationWindow,
    weekday: Weekday,
    restriction: &MonthRestriction,
) -> Option<NaiveDate> {
    let mut cursor = window.start;
    while cursor <= window.end {
        if !restriction.allows(cursor.month()) {
            cursor = restriction.next_allowed_month_start(cursor)?;
            continue;
        }
        let candidate = next_weekday_on_or_after(cursor, weekday)?;
        if restriction.allows(candidate.month()) {
            return Some(candidate);
        }
        // Crossed into a disallowed month; the next pass jumps ahead.
        cursor = candidate;
    }
    None
}

fn ordinal_anchor(
    window: &GenerationWindow,
    weekday: Weekday,
    ordinals: &Ordinals,
    restriction: &MonthRestriction,
) -> Option<NaiveDate> {
    let day = chrono::Weekday::from(weekday);
    let (mut year, mut month) = (window.start.year(), window.start.month());

    loop {
        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
        if first_of_month > window.end {
            return None;
        }

        if restriction.allows(month) {
            let found = ordinals
                .iter()
                .filter_map(|n| NaiveDate::from_weekday_of_month_opt(year, month, day, n))
                .find(|date| *date >= window.start);
            if found.is_some() {
                return found;
            }
        }

        (year, month) = next_month(year, month);
    }
}
