//! Turns recurring definitions into concrete calendar events.

use calripper_core::config::SeasonTable;
use calripper_core::constants::RECURRING_SOURCE_NAME;
use calripper_rfc::rfc::ical::core::Duration;
use calripper_rfc::rfc::validation::validate_rrule;
use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, Offset, TimeDelta, TimeZone};
use chrono_tz::Tz;
use uuid::Uuid;

use super::anchor::{GenerationWindow, select_anchor};
use super::compile::compile_rule;
use super::grammar::{Recurrence, parse_schedule};
use super::restriction::{MonthRestriction, resolve_restriction};
use crate::error::{RecurrenceError, RecurrenceResult};
use crate::model::{CalendarEvent, RecurringEventDefinition, RippedCalendar, RippedSource};

/// Stable event id for a recurring definition, derived from its name.
#[must_use]
pub fn recurring_event_id(name: &str) -> String {
    let urn = format!("urn:calripper:recurring:{name}");
    Uuid::new_v5(&Uuid::NAMESPACE_URL, urn.as_bytes()).to_string()
}

/// ## Summary
/// Builds the recurring event for one definition.
///
/// The event starts on the anchor date at the definition's local start time
/// and carries the compiled RRULE. A local time that occurs twice (DST fold)
/// resolves to the earlier instant; one skipped by a DST gap is read with
/// the offset in effect before the gap (RFC 5545 §3.3.5).
///
/// ## Errors
/// Any [`RecurrenceError`]; each one concerns this definition only.
#[tracing::instrument(skip_all, fields(name = %definition.name))]
pub fn materialize(
    definition: &RecurringEventDefinition,
    window: &GenerationWindow,
    seasons: &SeasonTable,
) -> RecurrenceResult<CalendarEvent> {
    let recurrence = parse_schedule(&definition.schedule)?;
    let restriction = effective_restriction(definition, &recurrence, seasons)?;

    let tz = parse_timezone(&definition.timezone)?;
    let start_time = parse_start_time(&definition.start_time)?;
    let duration = Duration::parse(&definition.duration)
        .map_err(|err| RecurrenceError::InvalidDuration(err.to_string()))?;

    let anchor = select_anchor(window, &recurrence, &restriction)?;
    let date = localize(tz, anchor, start_time);

    let rrule = compile_rule(&recurrence, &restriction);
    validate_rrule(&rrule, date)?;

    tracing::debug!(
        anchor = %date,
        rrule = %rrule,
        "Materialized recurring event"
    );

    Ok(CalendarEvent {
        id: recurring_event_id(&definition.name),
        summary: definition.display_name().to_string(),
        location: definition.location.clone(),
        url: definition.url.clone(),
        description: definition.description.clone(),
        date,
        duration: duration.to_time_delta(),
        rrule: Some(rrule),
        tags: definition.tags.clone(),
    })
}

fn effective_restriction(
    definition: &RecurringEventDefinition,
    recurrence: &Recurrence,
    seasons: &SeasonTable,
) -> RecurrenceResult<MonthRestriction> {
    if let Recurrence::Yearly { month, .. } = recurrence {
        let has_months = definition.months.as_ref().is_some_and(|m| !m.is_empty());
        if has_months || definition.seasonal.is_some() {
            tracing::warn!(
                seasonal = ?definition.seasonal,
                months = ?definition.months,
                "Schedule names its own month; ignoring month restriction"
            );
        }
        return MonthRestriction::single(*month);
    }

    resolve_restriction(
        definition.seasonal.as_deref(),
        definition.months.as_deref(),
        seasons,
    )
}

fn parse_timezone(name: &str) -> RecurrenceResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_err| RecurrenceError::UnknownTimezone(name.to_string()))
}

fn parse_start_time(text: &str) -> RecurrenceResult<NaiveTime> {
    let trimmed = text.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_err| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_err| RecurrenceError::InvalidStartTime(text.to_string()))
}

fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(local) | LocalResult::Ambiguous(local, _) => local,
        LocalResult::None => {
            // A day back is safely before the transition.
            let before = tz.offset_from_utc_datetime(&(naive - TimeDelta::days(1)));
            let utc = naive - TimeDelta::seconds(i64::from(before.fix().local_minus_utc()));
            tracing::debug!(%naive, timezone = tz.name(), "Local start time falls in a DST gap");
            tz.from_utc_datetime(&utc)
        }
    }
}

/// A definition that could not be materialized.
#[derive(Debug)]
pub struct DefinitionError {
    pub name: String,
    pub error: RecurrenceError,
}

/// Outcome of materializing a batch of definitions.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Events in definition order.
    pub events: Vec<CalendarEvent>,
    pub errors: Vec<DefinitionError>,
}

impl GenerationReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// ## Summary
/// Materializes every definition, recording failures instead of stopping.
#[tracing::instrument(skip_all, fields(definitions = definitions.len(), start = %window.start(), end = %window.end()))]
pub fn generate_recurring(
    definitions: &[RecurringEventDefinition],
    window: &GenerationWindow,
    seasons: &SeasonTable,
) -> GenerationReport {
    let mut report = GenerationReport::default();

    for definition in definitions {
        match materialize(definition, window, seasons) {
            Ok(event) => report.events.push(event),
            Err(error) => {
                tracing::warn!(name = %definition.name, %error, "Skipping recurring definition");
                report.errors.push(DefinitionError {
                    name: definition.name.clone(),
                    error,
                });
            }
        }
    }

    tracing::info!(
        generated = report.events.len(),
        failed = report.errors.len(),
        "Generated recurring events"
    );
    report
}

/// ## Summary
/// Wraps generated recurring events as a source with one calendar per
/// definition, so they take part in tag aggregation like scraped calendars.
///
/// Definitions that failed appear as calendars without events, carrying the
/// error text.
#[must_use]
pub fn recurring_source(
    definitions: &[RecurringEventDefinition],
    report: &GenerationReport,
) -> RippedSource {
    let calendars = definitions
        .iter()
        .map(|definition| {
            let id = recurring_event_id(&definition.name);
            RippedCalendar {
                name: definition.name.clone(),
                friendly_name: definition.display_name().to_string(),
                tags: definition.tags.clone(),
                events: report
                    .events
                    .iter()
                    .filter(|event| event.id == id)
                    .cloned()
                    .collect(),
                errors: report
                    .errors
                    .iter()
                    .filter(|failure| failure.name == definition.name)
                    .map(|failure| failure.error.to_string())
                    .collect(),
            }
        })
        .collect();

    RippedSource {
        name: RECURRING_SOURCE_NAME.to_string(),
        friendly_name: "Recurring Events".to_string(),
        tags: Vec::new(),
        calendars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn definition(name: &str, schedule: &str) -> RecurringEventDefinition {
        RecurringEventDefinition {
            name: name.to_string(),
            friendly_name: None,
            description: None,
            schedule: schedule.to_string(),
            timezone: "America/Los_Angeles".to_string(),
            duration: "PT2H".to_string(),
            start_time: "19:30".to_string(),
            location: Some("The Hall".to_string()),
            url: None,
            seasonal: None,
            months: None,
            tags: vec!["Music".to_string()],
        }
    }

    fn window_2024() -> GenerationWindow {
        GenerationWindow::new(
            NaiveDate::from_ymd_opt(2024, 1, 3).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
        )
        .expect("valid window")
    }

    #[test]
    fn materializes_weekly_event() {
        let mut def = definition("sunday-jam", "every Sunday");
        def.friendly_name = Some("Sunday Jam".to_string());

        let event = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");

        assert_eq!(event.summary, "Sunday Jam");
        assert_eq!(event.date.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 7).expect("valid date"));
        assert_eq!((event.date.hour(), event.date.minute()), (19, 30));
        assert_eq!(event.date.timezone(), chrono_tz::America::Los_Angeles);
        assert_eq!(event.duration, chrono::TimeDelta::hours(2));
        assert_eq!(
            event.rrule.as_ref().map(ToString::to_string).as_deref(),
            Some("FREQ=WEEKLY;BYDAY=SU")
        );
        assert_eq!(event.tags, vec!["Music".to_string()]);
    }

    #[test]
    fn seasonal_event_uses_yearly_rule() {
        let mut def = definition("summer-market", "every Wednesday");
        def.seasonal = Some("summer".to_string());

        let event = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");

        assert_eq!(event.date.month(), 6);
        assert_eq!(event.date.day(), 5);
        assert_eq!(
            event.rrule.as_ref().map(ToString::to_string).as_deref(),
            Some("FREQ=YEARLY;BYDAY=WE;BYMONTH=6,7,8,9")
        );
    }

    #[test]
    fn explicit_months_override_season_in_rule() {
        let mut def = definition("may-market", "every Wednesday");
        def.seasonal = Some("summer".to_string());
        def.months = Some(vec![5]);

        let event = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");

        assert_eq!(event.date.date_naive(), NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date"));
        assert_eq!(
            event.rrule.as_ref().map(ToString::to_string).as_deref(),
            Some("FREQ=YEARLY;BYDAY=WE;BYMONTH=5")
        );
    }

    #[test_log::test]
    fn yearly_schedule_ignores_definition_months() {
        let mut def = definition("thanksgiving", "4th Thursday of November");
        def.months = Some(vec![1]);

        let event = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");

        assert_eq!(event.date.date_naive(), NaiveDate::from_ymd_opt(2024, 11, 28).expect("valid date"));
        assert_eq!(
            event.rrule.as_ref().map(ToString::to_string).as_deref(),
            Some("FREQ=YEARLY;BYDAY=4TH;BYMONTH=11")
        );
    }

    #[test]
    fn event_id_is_stable_per_name() {
        let def = definition("sunday-jam", "every Sunday");
        let first = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");
        let second = materialize(&def, &window_2024(), &SeasonTable::default()).expect("valid");

        assert_eq!(first.id, second.id);
        assert_eq!(first.id, recurring_event_id("sunday-jam"));
        assert_ne!(first.id, recurring_event_id("monday-jam"));
    }

    #[test]
    fn start_time_accepts_seconds() {
        assert_eq!(
            parse_start_time("07:05:30").ok(),
            NaiveTime::from_hms_opt(7, 5, 30)
        );
        assert!(matches!(
            parse_start_time("7pm"),
            Err(RecurrenceError::InvalidStartTime(text)) if text == "7pm"
        ));
    }

    #[test]
    fn bad_inputs_fail_per_field() {
        let seasons = SeasonTable::default();

        let mut def = definition("a", "every Sunday");
        def.timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(
            materialize(&def, &window_2024(), &seasons),
            Err(RecurrenceError::UnknownTimezone(_))
        ));

        let mut def = definition("b", "every Sunday");
        def.duration = "two hours".to_string();
        assert!(matches!(
            materialize(&def, &window_2024(), &seasons),
            Err(RecurrenceError::InvalidDuration(_))
        ));

        let mut def = definition("c", "every Sunday");
        def.seasonal = Some("monsoon".to_string());
        assert!(matches!(
            materialize(&def, &window_2024(), &seasons),
            Err(RecurrenceError::UnknownSeason(_))
        ));
    }

    #[test_log::test]
    fn dst_gap_start_uses_offset_before_gap() {
        // 2024-03-10 02:30 does not exist in Los Angeles.
        let mut def = definition("gap", "every Sunday");
        def.start_time = "02:30".to_string();
        let window = GenerationWindow::new(
            NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date"),
            NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
        )
        .expect("valid window");

        let event = materialize(&def, &window, &SeasonTable::default()).expect("valid");

        assert_eq!(event.date.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date"));
        // 02:30 PST is 10:30 UTC, which reads as 03:30 PDT.
        assert_eq!(event.date.naive_utc().hour(), 10);
        assert_eq!((event.date.hour(), event.date.minute()), (3, 30));
        assert_eq!(
            event.rrule.as_ref().map(ToString::to_string).as_deref(),
            Some("FREQ=WEEKLY;BYDAY=SU")
        );
    }

    #[test]
    fn monthly_gap_definition_stays_in_batch() {
        let mut def = definition("gap", "2nd Sunday");
        def.start_time = "02:30".to_string();
        def.months = Some(vec![3]);

        let report = generate_recurring(&[def], &window_2024(), &SeasonTable::default());

        assert!(report.is_clean());
        assert_eq!(report.events.len(), 1);
        assert_eq!(
            report.events[0].date.date_naive(),
            NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date")
        );
    }

    #[test]
    fn dst_fold_takes_earlier_instant() {
        // 2024-11-03 01:30 occurs twice in Los Angeles; the first is PDT.
        let date = NaiveDate::from_ymd_opt(2024, 11, 3).expect("valid date");
        let time = NaiveTime::from_hms_opt(1, 30, 0).expect("valid time");

        let local = localize(chrono_tz::America::Los_Angeles, date, time);
        assert_eq!(local.naive_utc().hour(), 8);
    }

    #[test_log::test]
    fn batch_continues_past_failures() {
        let definitions = vec![
            definition("ok-1", "every Sunday"),
            definition("broken", "every other Sunday"),
            definition("ok-2", "2nd Thursday"),
        ];

        let report = generate_recurring(&definitions, &window_2024(), &SeasonTable::default());

        assert_eq!(report.events.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.errors[0].name, "broken");
        assert!(matches!(
            report.errors[0].error,
            RecurrenceError::UnrecognizedSchedule(_)
        ));
    }

    #[test]
    fn recurring_source_has_calendar_per_definition() {
        let definitions = vec![
            definition("ok-1", "every Sunday"),
            definition("broken", "every other Sunday"),
        ];
        let report = generate_recurring(&definitions, &window_2024(), &SeasonTable::default());

        let source = recurring_source(&definitions, &report);

        assert_eq!(source.name, RECURRING_SOURCE_NAME);
        assert_eq!(source.calendars.len(), 2);
        assert_eq!(source.calendars[0].events.len(), 1);
        assert!(source.calendars[0].errors.is_empty());
        assert!(source.calendars[1].events.is_empty());
        assert_eq!(source.calendars[1].errors.len(), 1);
        assert_eq!(source.calendars[1].tags, vec!["Music".to_string()]);
    }
}
