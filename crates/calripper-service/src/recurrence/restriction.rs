//! Month-of-year restrictions for recurring definitions.

use calripper_core::config::SeasonTable;
use chrono::{Datelike, NaiveDate};

use crate::error::{RecurrenceError, RecurrenceResult};

/// Months in which a recurrence may occur.
///
/// `Months` always holds a sorted, duplicate-free, non-empty proper subset
/// of 1-12; a list covering the whole year is `Unrestricted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthRestriction {
    Unrestricted,
    Months(Vec<u8>),
}

impl MonthRestriction {
    /// ## Summary
    /// Builds a restriction from a month list, sorting and de-duplicating it.
    ///
    /// An empty list or one covering all twelve months is `Unrestricted`.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::InvalidMonth` for values outside 1-12.
    pub fn from_months(months: impl IntoIterator<Item = u8>) -> RecurrenceResult<Self> {
        let mut months: Vec<u8> = months.into_iter().collect();
        if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(RecurrenceError::InvalidMonth(*bad));
        }
        months.sort_unstable();
        months.dedup();

        Ok(if months.is_empty() || months.len() == 12 {
            Self::Unrestricted
        } else {
            Self::Months(months)
        })
    }

    /// Restriction to a single month (1-12).
    ///
    /// ## Errors
    /// Returns `RecurrenceError::InvalidMonth` for values outside 1-12.
    pub fn single(month: u8) -> RecurrenceResult<Self> {
        Self::from_months([month])
    }

    /// Allowed months in ascending order, or `None` when unrestricted.
    #[must_use]
    pub fn allowed(&self) -> Option<&[u8]> {
        match self {
            Self::Unrestricted => None,
            Self::Months(months) => Some(months),
        }
    }

    /// Whether `month` (1-12) is allowed.
    #[must_use]
    pub fn allows(&self, month: u32) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Months(months) => months.iter().any(|m| u32::from(*m) == month),
        }
    }

    /// ## Summary
    /// First day of the nearest allowed month strictly after the month
    /// containing `date`, wrapping into following years.
    #[must_use]
    pub fn next_allowed_month_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        let (mut year, mut month) = (date.year(), date.month());
        for _ in 0..12 {
            (year, month) = next_month(year, month);
            if self.allows(month) {
                return NaiveDate::from_ymd_opt(year, month, 1);
            }
        }
        None
    }
}

/// The calendar month following `(year, month)`.
#[must_use]
pub const fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// ## Summary
/// Resolves the month restriction of a definition.
///
/// An explicit, non-empty `months` list always wins and `seasonal` is then
/// ignored entirely. Otherwise a `seasonal` name is looked up in `seasons`.
/// With neither, the recurrence is unrestricted.
///
/// ## Errors
/// Returns `RecurrenceError::InvalidMonth` for an out-of-range month and
/// `RecurrenceError::UnknownSeason` when the season has no mapping.
pub fn resolve_restriction(
    seasonal: Option<&str>,
    months: Option<&[u8]>,
    seasons: &SeasonTable,
) -> RecurrenceResult<MonthRestriction> {
    if let Some(months) = months.filter(|m| !m.is_empty()) {
        if let Some(season) = seasonal {
            tracing::debug!(season, ?months, "Explicit months override seasonal restriction");
        }
        return MonthRestriction::from_months(months.iter().copied());
    }

    match seasonal.map(str::trim).filter(|s| !s.is_empty()) {
        Some(season) => {
            let months = seasons
                .months(season)
                .ok_or_else(|| RecurrenceError::UnknownSeason(season.to_string()))?;
            MonthRestriction::from_months(months.iter().copied())
        }
        None => Ok(MonthRestriction::Unrestricted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_months_win_over_season() {
        let seasons = SeasonTable::default();
        let restriction =
            resolve_restriction(Some("summer"), Some(&[9, 5, 7, 5][..]), &seasons).expect("valid");
        assert_eq!(restriction, MonthRestriction::Months(vec![5, 7, 9]));
    }

    #[test]
    fn explicit_months_win_even_over_unknown_season() {
        let seasons = SeasonTable::default();
        let restriction =
            resolve_restriction(Some("monsoon"), Some(&[1][..]), &seasons).expect("valid");
        assert_eq!(restriction.allowed(), Some([1_u8].as_slice()));
    }

    #[test]
    fn season_lookup() {
        let seasons = SeasonTable::default();
        let restriction = resolve_restriction(Some("Summer"), None, &seasons).expect("valid");
        assert_eq!(restriction, MonthRestriction::Months(vec![6, 7, 8, 9]));
    }

    #[test]
    fn season_table_is_injectable() {
        let seasons = SeasonTable::new([("summer", vec![7, 8])]);
        let restriction = resolve_restriction(Some("summer"), None, &seasons).expect("valid");
        assert_eq!(restriction, MonthRestriction::Months(vec![7, 8]));
    }

    #[test]
    fn wrapping_season_is_sorted() {
        let seasons = SeasonTable::default();
        let restriction = resolve_restriction(Some("winter"), None, &seasons).expect("valid");
        assert_eq!(restriction, MonthRestriction::Months(vec![1, 2, 12]));
    }

    #[test]
    fn empty_months_fall_back_to_season() {
        let seasons = SeasonTable::default();
        let restriction = resolve_restriction(Some("fall"), Some(&[][..]), &seasons).expect("valid");
        assert_eq!(restriction, MonthRestriction::Months(vec![10, 11]));
    }

    #[test]
    fn unknown_season_fails() {
        let seasons = SeasonTable::default();
        assert!(matches!(
            resolve_restriction(Some("monsoon"), None, &seasons),
            Err(RecurrenceError::UnknownSeason(name)) if name == "monsoon"
        ));
    }

    #[test]
    fn nothing_given_is_unrestricted() {
        let seasons = SeasonTable::default();
        assert_eq!(
            resolve_restriction(None, None, &seasons).ok(),
            Some(MonthRestriction::Unrestricted)
        );
        assert_eq!(
            resolve_restriction(Some("  "), None, &seasons).ok(),
            Some(MonthRestriction::Unrestricted)
        );
    }

    #[test]
    fn full_year_is_unrestricted() {
        let all: Vec<u8> = (1..=12).collect();
        assert_eq!(
            MonthRestriction::from_months(all).ok(),
            Some(MonthRestriction::Unrestricted)
        );
    }

    #[test]
    fn out_of_range_month_fails() {
        assert!(matches!(
            MonthRestriction::from_months([0, 3]),
            Err(RecurrenceError::InvalidMonth(0))
        ));
        assert!(matches!(
            MonthRestriction::single(13),
            Err(RecurrenceError::InvalidMonth(13))
        ));
    }

    #[test]
    fn next_allowed_month_wraps_year() {
        let restriction = MonthRestriction::Months(vec![3, 11]);
        let date = NaiveDate::from_ymd_opt(2024, 11, 20).expect("valid date");
        assert_eq!(
            restriction.next_allowed_month_start(date),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(
            MonthRestriction::Unrestricted.next_allowed_month_start(date),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
    }
}
