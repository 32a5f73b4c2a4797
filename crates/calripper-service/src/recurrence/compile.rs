//! Compilation of a recurrence and its month restriction into an RRULE.

use calripper_rfc::rfc::ical::core::{RRule, Weekday, WeekdayNum};

use super::grammar::{Ordinals, Recurrence};
use super::restriction::MonthRestriction;

/// ## Summary
/// Builds the RRULE for `recurrence` limited to `restriction`.
///
/// | Recurrence | Restriction | Rule |
/// |---|---|---|
/// | weekly | none | `FREQ=WEEKLY;BYDAY=SU` |
/// | weekly | months | `FREQ=YEARLY;BYDAY=WE;BYMONTH=6,7,8,9` |
/// | monthly | none | `FREQ=MONTHLY;BYDAY=1TU,3TU` |
/// | monthly | months | `FREQ=MONTHLY;BYDAY=2WE;BYMONTH=5,6,7,8,9` |
/// | yearly | ignored | `FREQ=YEARLY;BYDAY=4TH;BYMONTH=11` |
///
/// Restricted weekly schedules switch to a yearly frequency while restricted
/// monthly ones keep theirs; both expand to the same occurrences.
#[must_use]
pub fn compile_rule(recurrence: &Recurrence, restriction: &MonthRestriction) -> RRule {
    match recurrence {
        Recurrence::Weekly { weekday } => {
            let by_day = vec![WeekdayNum::every(*weekday)];
            match restriction.allowed() {
                None => RRule::weekly().with_by_day(by_day),
                Some(months) => RRule::yearly()
                    .with_by_day(by_day)
                    .with_by_month(months.to_vec()),
            }
        }
        Recurrence::Monthly { weekday, ordinals } => {
            let rule = RRule::monthly().with_by_day(ordinal_days(*weekday, ordinals));
            match restriction.allowed() {
                None => rule,
                Some(months) => rule.with_by_month(months.to_vec()),
            }
        }
        Recurrence::Yearly {
            weekday,
            ordinals,
            month,
        } => RRule::yearly()
            .with_by_day(ordinal_days(*weekday, ordinals))
            .with_by_month(vec![*month]),
    }
}

fn ordinal_days(weekday: Weekday, ordinals: &Ordinals) -> Vec<WeekdayNum> {
    ordinals
        .iter()
        .filter_map(|n| WeekdayNum::nth(n, weekday))
        .collect()
}
