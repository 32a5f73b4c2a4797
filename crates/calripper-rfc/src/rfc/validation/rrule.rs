//! Recurrence rule validation through the `rrule` crate.

use chrono::DateTime;
use chrono_tz::Tz;
use ::rrule::{RRuleSet, Unvalidated};

use crate::error::{RfcError, RfcResult};
use crate::rfc::ical::core::RRule;

fn build_rrule_set(rule: &RRule, dtstart: DateTime<Tz>) -> RfcResult<RRuleSet> {
    let rule_text = rule.to_string();
    let parsed = rule_text
        .parse::<::rrule::RRule<Unvalidated>>()
        .map_err(|err| RfcError::ParseError(format!("{rule_text}: {err}")))?;

    let dt_start = dtstart.with_timezone(&::rrule::Tz::Tz(dtstart.timezone()));
    parsed
        .build(dt_start)
        .map_err(|err| RfcError::ValidationError(format!("{rule_text}: {err}")))
}

/// ## Summary
/// Expands up to `limit` occurrences of `rule` starting at `dtstart`.
///
/// ## Errors
/// Returns an error if the rendered rule cannot be parsed or built.
pub fn expand_rrule(rule: &RRule, dtstart: DateTime<Tz>, limit: u16) -> RfcResult<Vec<DateTime<Tz>>> {
    let rrule_set = build_rrule_set(rule, dtstart)?;
    Ok(rrule_set
        .all(limit)
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&dtstart.timezone()))
        .collect())
}

/// ## Summary
/// Checks that `rule` is a syntactically valid RRULE and that its first
/// occurrence from `dtstart` is `dtstart` itself.
///
/// ## Errors
/// Returns `RfcError::ParseError` if the rule text does not parse and
/// `RfcError::ValidationError` if it cannot be built or does not start at
/// `dtstart`.
pub fn validate_rrule(rule: &RRule, dtstart: DateTime<Tz>) -> RfcResult<()> {
    let first = expand_rrule(rule, dtstart, 1)?;
    match first.first() {
        Some(occurrence) if *occurrence == dtstart => {
            tracing::trace!(rrule = %rule, dtstart = %dtstart, "RRULE validated");
            Ok(())
        }
        Some(occurrence) => Err(RfcError::ValidationError(format!(
            "{rule} from {dtstart} first occurs at {occurrence}"
        ))),
        None => Err(RfcError::ValidationError(format!(
            "{rule} from {dtstart} has no occurrences"
        ))),
    }
}
