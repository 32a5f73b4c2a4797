//! One generation run: load sources, generate, aggregate, write.

use std::path::Path;

use calripper_core::config::Settings;
use calripper_core::error::CoreError;
use calripper_service::aggregate::aggregate_by_tag;
use calripper_service::recurrence::{GenerationWindow, generate_recurring, recurring_source};
use calripper_service::source::{load_external_calendars, load_recurring_definitions};
use chrono::{Days, NaiveDate};

use crate::error::AppResult;
use crate::output::{Manifest, write_feeds, write_manifest};

/// ## Summary
/// The window from `today` through `today + lookahead_days`.
///
/// ## Errors
/// Returns `CoreError::ConfigError` if the end date is out of range.
pub fn generation_window(today: NaiveDate, lookahead_days: u32) -> AppResult<GenerationWindow> {
    let end = today
        .checked_add_days(Days::new(u64::from(lookahead_days)))
        .ok_or_else(|| {
            CoreError::ConfigError(format!(
                "lookahead of {lookahead_days} days from {today} is out of range"
            ))
        })?;
    Ok(GenerationWindow::new(today, end)?)
}

/// ## Summary
/// Runs the whole pipeline with `settings`, treating `today` as the start
/// of the generation window.
///
/// Recurring definitions that fail are listed in the manifest and do not
/// stop the run.
///
/// ## Errors
/// Returns an error if the season table is invalid, a source file cannot be
/// loaded, or output cannot be written.
#[tracing::instrument(skip_all, fields(%today))]
pub fn run(settings: &Settings, today: NaiveDate) -> AppResult<Manifest> {
    settings.seasons.validate()?;
    let window = generation_window(today, settings.generation.lookahead_days)?;

    let definitions = load_recurring_definitions(Path::new(&settings.sources.recurring))?;
    let externals = match &settings.sources.external {
        Some(path) => load_external_calendars(Path::new(path))?,
        None => Vec::new(),
    };

    let report = generate_recurring(&definitions, &window, &settings.seasons);
    for failure in &report.errors {
        tracing::error!(name = %failure.name, error = %failure.error, "Recurring definition failed");
    }

    let recurring = recurring_source(&definitions, &report);
    let aggregates = aggregate_by_tag(std::slice::from_ref(&recurring), &externals);

    let dir = Path::new(&settings.output.dir);
    let (calendars, aggregates, errors) = write_feeds(dir, &recurring, &aggregates)?;

    let manifest = Manifest {
        window_start: window.start(),
        window_end: window.end(),
        calendars,
        aggregates,
        errors,
    };
    write_manifest(dir, &manifest)?;
    Ok(manifest)
}
