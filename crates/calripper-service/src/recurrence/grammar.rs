//! Schedule phrase grammar.
//!
//! Accepted phrases (whitespace-separated, case-insensitive):
//!
//! | Phrase | Result |
//! |---|---|
//! | `every <Weekday>` | weekly |
//! | `<Ordinal> <Weekday>` | monthly |
//! | `<Ordinal> and <Ordinal> <Weekday>` | monthly, two ordinals |
//! | `<Ordinal> [and <Ordinal>] <Weekday> of\|in <Month>` | yearly in that month |
//!
//! Ordinals are `1st`-`5th` or `first`-`fifth`; weekday and month names are
//! full English names.

use std::fmt;

use calripper_rfc::rfc::ical::core::Weekday;

use crate::error::{RecurrenceError, RecurrenceResult};

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Non-empty, ascending, duplicate-free set of week-of-month ordinals (1-5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordinals(Vec<u8>);

impl Ordinals {
    /// ## Summary
    /// Builds an ordinal set, sorting and de-duplicating the input.
    ///
    /// Returns `None` when the input is empty or holds a value outside 1-5.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = u8>) -> Option<Self> {
        let mut ordinals: Vec<u8> = values.into_iter().collect();
        if ordinals.is_empty() || ordinals.iter().any(|n| !(1..=5).contains(n)) {
            return None;
        }
        ordinals.sort_unstable();
        ordinals.dedup();
        Some(Self(ordinals))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }
}

/// ## Summary
/// Parsed recurrence descriptor.
///
/// Each variant carries only what its frequency needs, so consumers must
/// handle every shape explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recurrence {
    /// Every occurrence of a weekday.
    Weekly { weekday: Weekday },
    /// The given occurrences of a weekday within each month.
    Monthly { weekday: Weekday, ordinals: Ordinals },
    /// The given occurrences of a weekday within one month of each year.
    Yearly {
        weekday: Weekday,
        ordinals: Ordinals,
        month: u8,
    },
}

impl Recurrence {
    #[must_use]
    pub const fn weekday(&self) -> Weekday {
        match self {
            Self::Weekly { weekday }
            | Self::Monthly { weekday, .. }
            | Self::Yearly { weekday, .. } => *weekday,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weekly { weekday } => write!(f, "every {}", weekday_name(*weekday)),
            Self::Monthly { weekday, ordinals } => {
                write_ordinals(f, ordinals)?;
                write!(f, " {}", weekday_name(*weekday))
            }
            Self::Yearly {
                weekday,
                ordinals,
                month,
            } => {
                write_ordinals(f, ordinals)?;
                write!(f, " {} of {}", weekday_name(*weekday), month_name(*month))
            }
        }
    }
}

/// ## Summary
/// Parses a schedule phrase into a [`Recurrence`].
///
/// ## Errors
/// Returns `RecurrenceError::UnrecognizedSchedule` carrying the original
/// phrase when it does not match the grammar.
pub fn parse_schedule(phrase: &str) -> RecurrenceResult<Recurrence> {
    let unrecognized = || RecurrenceError::UnrecognizedSchedule(phrase.to_string());

    let lowered: Vec<String> = phrase
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect();
    let tokens: Vec<&str> = lowered.iter().map(String::as_str).collect();

    let recurrence = match tokens.as_slice() {
        ["every", day] => Recurrence::Weekly {
            weekday: parse_weekday(day).ok_or_else(unrecognized)?,
        },
        [ordinal, day] => Recurrence::Monthly {
            weekday: parse_weekday(day).ok_or_else(unrecognized)?,
            ordinals: parse_ordinals(&[*ordinal]).ok_or_else(unrecognized)?,
        },
        [first, "and", second, day] => Recurrence::Monthly {
            weekday: parse_weekday(day).ok_or_else(unrecognized)?,
            ordinals: parse_ordinals(&[*first, *second]).ok_or_else(unrecognized)?,
        },
        [ordinal, day, "of" | "in", month] => Recurrence::Yearly {
            weekday: parse_weekday(day).ok_or_else(unrecognized)?,
            ordinals: parse_ordinals(&[*ordinal]).ok_or_else(unrecognized)?,
            month: parse_month(month).ok_or_else(unrecognized)?,
        },
        [first, "and", second, day, "of" | "in", month] => Recurrence::Yearly {
            weekday: parse_weekday(day).ok_or_else(unrecognized)?,
            ordinals: parse_ordinals(&[*first, *second]).ok_or_else(unrecognized)?,
            month: parse_month(month).ok_or_else(unrecognized)?,
        },
        _ => return Err(unrecognized()),
    };

    tracing::trace!(phrase, recurrence = %recurrence, "Parsed schedule");
    Ok(recurrence)
}

fn parse_ordinals(words: &[&str]) -> Option<Ordinals> {
    let values: Option<Vec<u8>> = words.iter().map(|w| parse_ordinal(w)).collect();
    Ordinals::new(values?)
}

fn parse_ordinal(word: &str) -> Option<u8> {
    Some(match word {
        "1st" | "first" => 1,
        "2nd" | "second" => 2,
        "3rd" | "third" => 3,
        "4th" | "fourth" => 4,
        "5th" | "fifth" => 5,
        _ => return None,
    })
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    Weekday::all()
        .into_iter()
        .find(|day| weekday_name(*day).eq_ignore_ascii_case(word))
}

fn parse_month(word: &str) -> Option<u8> {
    MONTH_NAMES
        .iter()
        .position(|name| name.eq_ignore_ascii_case(word))
        .and_then(|index| u8::try_from(index + 1).ok())
}

/// Full English name of a weekday.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

fn month_name(month: u8) -> String {
    let Some(name) = usize::from(month)
        .checked_sub(1)
        .and_then(|index| MONTH_NAMES.get(index))
    else {
        return month.to_string();
    };
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_ascii_uppercase().to_string() + chars.as_str()
    })
}

fn write_ordinals(f: &mut fmt::Formatter<'_>, ordinals: &Ordinals) -> fmt::Result {
    let words: Vec<String> = ordinals.iter().map(ordinal_label).collect();
    f.write_str(&words.join(" and "))
}

fn ordinal_label(n: u8) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ordinals(values: &[u8]) -> Ordinals {
        Ordinals::new(values.iter().copied()).expect("valid ordinals")
    }

    #[test]
    fn every_weekday_is_weekly() {
        assert_eq!(
            parse_schedule("every Sunday").ok(),
            Some(Recurrence::Weekly {
                weekday: Weekday::Sunday
            })
        );
    }

    #[test]
    fn single_ordinal_is_monthly() {
        assert_eq!(
            parse_schedule("2nd Thursday").ok(),
            Some(Recurrence::Monthly {
                weekday: Weekday::Thursday,
                ordinals: ordinals(&[2]),
            })
        );
    }

    #[test]
    fn compound_ordinals_sorted_ascending() {
        let expected = Recurrence::Monthly {
            weekday: Weekday::Tuesday,
            ordinals: ordinals(&[1, 3]),
        };
        assert_eq!(parse_schedule("1st and 3rd Tuesday").ok(), Some(expected.clone()));
        assert_eq!(parse_schedule("3rd and 1st Tuesday").ok(), Some(expected));
    }

    #[test]
    fn duplicate_ordinals_collapse() {
        assert_eq!(
            parse_schedule("2nd and second Friday").ok(),
            Some(Recurrence::Monthly {
                weekday: Weekday::Friday,
                ordinals: ordinals(&[2]),
            })
        );
    }

    #[test]
    fn words_case_and_whitespace_are_flexible() {
        assert_eq!(
            parse_schedule("  First   and THIRD wednesday ").ok(),
            Some(Recurrence::Monthly {
                weekday: Weekday::Wednesday,
                ordinals: ordinals(&[1, 3]),
            })
        );
        assert_eq!(
            parse_schedule("EVERY saturday").ok(),
            Some(Recurrence::Weekly {
                weekday: Weekday::Saturday
            })
        );
    }

    #[test]
    fn ordinal_in_month_is_yearly() {
        assert_eq!(
            parse_schedule("4th Thursday of November").ok(),
            Some(Recurrence::Yearly {
                weekday: Weekday::Thursday,
                ordinals: ordinals(&[4]),
                month: 11,
            })
        );
        assert_eq!(
            parse_schedule("1st and 3rd Sunday in June").ok(),
            Some(Recurrence::Yearly {
                weekday: Weekday::Sunday,
                ordinals: ordinals(&[1, 3]),
                month: 6,
            })
        );
    }

    #[test]
    fn unrecognized_phrases_name_the_phrase() {
        for phrase in [
            "",
            "every",
            "every day",
            "Sunday",
            "6th Monday",
            "last Friday",
            "1st or 3rd Tuesday",
            "every other Tuesday",
            "2nd Thursday of Smarch",
            "every Sundays",
        ] {
            match parse_schedule(phrase) {
                Err(RecurrenceError::UnrecognizedSchedule(p)) => assert_eq!(p, phrase),
                other => panic!("expected rejection of {phrase:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn display_round_trips_through_parser() {
        for phrase in [
            "every Sunday",
            "2nd Thursday",
            "1st and 3rd Tuesday",
            "4th Thursday of November",
        ] {
            let recurrence = parse_schedule(phrase).expect("valid phrase");
            assert_eq!(recurrence.to_string(), phrase);
        }
    }

    #[test]
    fn ordinals_reject_out_of_range() {
        assert!(Ordinals::new([]).is_none());
        assert!(Ordinals::new([0]).is_none());
        assert!(Ordinals::new([6]).is_none());
        assert_eq!(ordinals(&[5, 1, 5]).as_slice(), &[1_u8, 5]);
    }
}
