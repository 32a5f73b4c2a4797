//! iCalendar DURATION value type (RFC 5545 §3.3.6).

use std::fmt;

use crate::error::{RfcError, RfcResult};

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

/// Duration value (RFC 5545 §3.3.6).
///
/// Either week-based (`P1W`) or day/time-based (`P1DT2H30M`). Event
/// durations are never negative, so the sign form is not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    /// Number of weeks (mutually exclusive with days/hours/minutes/seconds).
    pub weeks: u32,
    /// Number of days.
    pub days: u32,
    /// Number of hours.
    pub hours: u32,
    /// Number of minutes.
    pub minutes: u32,
    /// Number of seconds.
    pub seconds: u32,
}

impl Duration {
    /// Creates a new zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Creates a duration from weeks.
    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self {
            weeks,
            ..Self::zero()
        }
    }

    /// Creates a duration from hours.
    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::zero()
        }
    }

    /// Creates a duration from minutes.
    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        Self {
            minutes,
            ..Self::zero()
        }
    }

    /// ## Summary
    /// Normalizes a number of seconds into days, hours, minutes and seconds.
    #[must_use]
    pub fn from_seconds(total: u64) -> Self {
        let part = |value: u64| u32::try_from(value).unwrap_or(u32::MAX);
        Self {
            weeks: 0,
            days: part(total / SECONDS_PER_DAY),
            hours: part(total % SECONDS_PER_DAY / SECONDS_PER_HOUR),
            minutes: part(total % SECONDS_PER_HOUR / SECONDS_PER_MINUTE),
            seconds: part(total % SECONDS_PER_MINUTE),
        }
    }

    /// ## Summary
    /// Converts a `chrono::TimeDelta` to a duration. Negative deltas clamp to zero.
    #[must_use]
    pub fn from_time_delta(delta: chrono::TimeDelta) -> Self {
        Self::from_seconds(u64::try_from(delta.num_seconds()).unwrap_or(0))
    }

    /// Returns the total duration as seconds.
    #[must_use]
    pub fn as_seconds(&self) -> u64 {
        u64::from(self.weeks) * SECONDS_PER_WEEK
            + u64::from(self.days) * SECONDS_PER_DAY
            + u64::from(self.hours) * SECONDS_PER_HOUR
            + u64::from(self.minutes) * SECONDS_PER_MINUTE
            + u64::from(self.seconds)
    }

    /// Converts to a `chrono::TimeDelta`.
    #[must_use]
    pub fn to_time_delta(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(i64::try_from(self.as_seconds()).unwrap_or(i64::MAX))
    }

    /// ## Summary
    /// Parses a DURATION value such as `PT2H`, `P1DT30M` or `P2W`.
    ///
    /// ## Errors
    /// Returns `RfcError::ParseError` if the text is not a valid
    /// non-negative RFC 5545 duration.
    pub fn parse(s: &str) -> RfcResult<Self> {
        let invalid = || RfcError::ParseError(format!("invalid duration '{s}'"));

        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix('+')
            .unwrap_or(trimmed)
            .strip_prefix('P')
            .ok_or_else(invalid)?;
        if body.is_empty() {
            return Err(invalid());
        }

        if let Some(weeks) = body.strip_suffix('W') {
            return weeks
                .parse()
                .map(Self::weeks)
                .map_err(|_err| invalid());
        }

        let (date_part, time_part) = match body.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (body, None),
        };

        let mut dur = Self::zero();

        if !date_part.is_empty() {
            let days = date_part.strip_suffix('D').ok_or_else(invalid)?;
            dur.days = days.parse().map_err(|_err| invalid())?;
        }

        if let Some(time) = time_part {
            if time.is_empty() {
                return Err(invalid());
            }
            parse_time_components(time, &mut dur).ok_or_else(invalid)?;
        }

        Ok(dur)
    }
}

/// Parses the `nHnMnS` tail of a duration, requiring designators in order.
fn parse_time_components(mut rest: &str, dur: &mut Duration) -> Option<()> {
    let mut last_rank = 0;

    while !rest.is_empty() {
        let split = rest.find(|c: char| !c.is_ascii_digit())?;
        let (digits, tail) = rest.split_at(split);
        let value: u32 = digits.parse().ok()?;

        let designator = tail.chars().next()?;
        let rank = match designator {
            'H' => 1,
            'M' => 2,
            'S' => 3,
            _ => return None,
        };
        if rank <= last_rank {
            return None;
        }
        last_rank = rank;

        match designator {
            'H' => dur.hours = value,
            'M' => dur.minutes = value,
            _ => dur.seconds = value,
        }
        rest = &tail[designator.len_utf8()..];
    }

    Some(())
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P")?;

        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }

        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            write!(f, "0D")?;
        } else {
            // days only
        }
        Ok(())
    }
}
