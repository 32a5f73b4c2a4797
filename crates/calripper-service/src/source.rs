//! Declarative sources: recurring definitions and external calendars read
//! from YAML documents.
//!
//! ```yaml
//! events:
//!   - name: sunday-jam
//!     schedule: every Sunday
//!     timezone: America/Los_Angeles
//!     duration: PT2H
//!     start_time: "19:30"
//!     tags: [Music]
//! ```
//!
//! External calendars live under a top-level `calendars:` list instead.

use std::collections::HashSet;
use std::path::Path;

use config::{Config, File, FileFormat};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{ServiceError, ServiceResult};
use crate::model::{ExternalCalendar, RecurringEventDefinition};

#[derive(Debug, Deserialize)]
struct RecurringDocument {
    #[serde(default)]
    events: Vec<RecurringEventDefinition>,
}

#[derive(Debug, Deserialize)]
struct ExternalDocument {
    #[serde(default)]
    calendars: Vec<ExternalCalendar>,
}

fn read_document<T, S>(source: S) -> ServiceResult<T>
where
    T: DeserializeOwned,
    S: config::Source + Send + Sync + 'static,
{
    let document = Config::builder().add_source(source).build()?;
    Ok(document.try_deserialize()?)
}

fn ensure_unique_names<'a>(
    kind: &str,
    names: impl IntoIterator<Item = &'a str>,
) -> ServiceResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ServiceError::ValidationError(format!(
                "duplicate {kind} name '{name}'"
            )));
        }
    }
    Ok(())
}

fn checked_definitions(
    document: RecurringDocument,
) -> ServiceResult<Vec<RecurringEventDefinition>> {
    ensure_unique_names(
        "recurring event",
        document.events.iter().map(|def| def.name.as_str()),
    )?;
    tracing::debug!(count = document.events.len(), "Loaded recurring definitions");
    Ok(document.events)
}

fn checked_calendars(document: ExternalDocument) -> ServiceResult<Vec<ExternalCalendar>> {
    ensure_unique_names(
        "external calendar",
        document.calendars.iter().map(|cal| cal.name.as_str()),
    )?;
    tracing::debug!(count = document.calendars.len(), "Loaded external calendars");
    Ok(document.calendars)
}

/// ## Summary
/// Loads recurring definitions from the `events:` list of a YAML file.
///
/// ## Errors
/// Returns `ServiceError::ConfigError` if the file is missing or malformed
/// and `ServiceError::ValidationError` if two definitions share a name.
pub fn load_recurring_definitions(path: &Path) -> ServiceResult<Vec<RecurringEventDefinition>> {
    tracing::debug!(path = %path.display(), "Reading recurring definitions");
    checked_definitions(read_document(File::from(path).format(FileFormat::Yaml))?)
}

/// ## Summary
/// Parses recurring definitions from YAML text.
///
/// ## Errors
/// Same as [`load_recurring_definitions`].
pub fn parse_recurring_definitions(text: &str) -> ServiceResult<Vec<RecurringEventDefinition>> {
    checked_definitions(read_document(File::from_str(text, FileFormat::Yaml))?)
}

/// ## Summary
/// Loads external calendar declarations from the `calendars:` list of a
/// YAML file. Events are not fetched; every calendar starts empty.
///
/// ## Errors
/// Returns `ServiceError::ConfigError` if the file is missing or malformed
/// and `ServiceError::ValidationError` if two calendars share a name.
pub fn load_external_calendars(path: &Path) -> ServiceResult<Vec<ExternalCalendar>> {
    tracing::debug!(path = %path.display(), "Reading external calendars");
    checked_calendars(read_document(File::from(path).format(FileFormat::Yaml))?)
}

/// Parses external calendar declarations from YAML text.
///
/// ## Errors
/// Same as [`load_external_calendars`].
pub fn parse_external_calendars(text: &str) -> ServiceResult<Vec<ExternalCalendar>> {
    checked_calendars(read_document(File::from_str(text, FileFormat::Yaml))?)
}
