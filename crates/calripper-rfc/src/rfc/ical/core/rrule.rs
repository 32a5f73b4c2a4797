//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10, §3.8.5.3).

use std::fmt;

/// Recurrence frequency (RFC 5545 §3.3.10).
///
/// Generated feeds only ever repeat on a weekly, monthly or yearly basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Returns all weekdays in order (Monday through Sunday).
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Monday => Self::Mon,
            Weekday::Tuesday => Self::Tue,
            Weekday::Wednesday => Self::Wed,
            Weekday::Thursday => Self::Thu,
            Weekday::Friday => Self::Fri,
            Weekday::Saturday => Self::Sat,
            Weekday::Sunday => Self::Sun,
        }
    }
}

/// Weekday with optional occurrence number.
///
/// Used in BYDAY rule part. Examples:
/// - `MO` - every Monday
/// - `1MO` - first Monday of the month
/// - `3TU` - third Tuesday of the month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    /// Optional occurrence number (1 to 5 for the rules generated here).
    pub ordinal: Option<u8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// Creates a weekday occurrence with an ordinal.
    ///
    /// Returns `None` for ordinals outside 1-5, which no month can hold.
    #[must_use]
    pub fn nth(ordinal: u8, weekday: Weekday) -> Option<Self> {
        (1..=5).contains(&ordinal).then_some(Self {
            ordinal: Some(ordinal),
            weekday,
        })
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
///
/// Rule parts render in the fixed order `FREQ`, `BYDAY`, `BYMONTH`; list
/// values keep the order they were supplied in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RRule {
    /// Recurrence frequency.
    pub freq: Frequency,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<WeekdayNum>,

    /// By-month list (1-12).
    pub by_month: Vec<u8>,
}

impl RRule {
    /// Creates a rule with the given frequency and no rule parts.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            by_day: Vec::new(),
            by_month: Vec::new(),
        }
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    /// Creates a yearly recurrence rule.
    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-month list.
    #[must_use]
    pub fn with_by_month(mut self, months: Vec<u8>) -> Self {
        self.by_month = months;
        self
    }
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq)?;

        if !self.by_day.is_empty() {
            let s: Vec<_> = self.by_day.iter().map(ToString::to_string).collect();
            write!(f, ";BYDAY={}", s.join(","))?;
        }

        if !self.by_month.is_empty() {
            let s: Vec<_> = self.by_month.iter().map(ToString::to_string).collect();
            write!(f, ";BYMONTH={}", s.join(","))?;
        }

        Ok(())
    }
}
