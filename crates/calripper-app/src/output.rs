//! Writes rendered feeds and the run manifest to the output directory.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use calripper_core::constants::FEED_EXTENSION;
use calripper_core::util::slug::generate_slug;
use calripper_service::aggregate::AggregateCalendar;
use calripper_service::feed::{render_aggregate, render_calendar};
use calripper_service::model::RippedSource;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppResult;

pub const MANIFEST_FILE: &str = "manifest.json";

/// A feed file generated for one recurring definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEntry {
    pub name: String,
    pub friendly_name: String,
    pub file: String,
    pub tags: Vec<String>,
}

/// A feed file generated for one tag, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateEntry {
    pub name: String,
    pub tag: String,
    pub file: String,
    pub events: usize,
    pub ripped_sources: Vec<String>,
    pub external_sources: Vec<String>,
}

/// A recurring definition that produced no feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub name: String,
    pub errors: Vec<String>,
}

/// Summary of one generation run, written next to the feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub calendars: Vec<FeedEntry>,
    pub aggregates: Vec<AggregateEntry>,
    pub errors: Vec<ErrorEntry>,
}

/// Hands out unique file names within one output directory.
#[derive(Default)]
struct FileNames {
    used: HashSet<String>,
}

impl FileNames {
    fn claim(&mut self, stem: &str) -> String {
        let mut file = format!("{stem}.{FEED_EXTENSION}");
        let mut n = 1;
        while !self.used.insert(file.clone()) {
            n += 1;
            file = format!("{stem}-{n}.{FEED_EXTENSION}");
        }
        file
    }
}

fn write_file(dir: &Path, file: &str, contents: &str) -> AppResult<PathBuf> {
    let path = dir.join(file);
    fs::write(&path, contents)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(path)
}

/// ## Summary
/// Writes one feed per aggregate and one per successfully generated
/// recurring calendar into `dir`, creating it when missing.
///
/// Aggregates claim their `tag-*` names first; a recurring calendar whose
/// slug collides gets a numeric suffix.
///
/// ## Errors
/// Returns `AppError::IoError` if the directory or a file cannot be written.
pub fn write_feeds(
    dir: &Path,
    recurring: &RippedSource,
    aggregates: &[AggregateCalendar],
) -> AppResult<(Vec<FeedEntry>, Vec<AggregateEntry>, Vec<ErrorEntry>)> {
    fs::create_dir_all(dir)?;
    let mut names = FileNames::default();

    let mut aggregate_entries = Vec::with_capacity(aggregates.len());
    for aggregate in aggregates {
        let file = names.claim(&aggregate.name);
        write_file(dir, &file, &render_aggregate(aggregate))?;
        aggregate_entries.push(AggregateEntry {
            name: aggregate.name.clone(),
            tag: aggregate.tag.clone(),
            file,
            events: aggregate.events.len(),
            ripped_sources: aggregate.ripped_sources.clone(),
            external_sources: aggregate.external_sources.clone(),
        });
    }

    let mut feed_entries = Vec::new();
    let mut error_entries = Vec::new();
    for calendar in &recurring.calendars {
        if calendar.events.is_empty() {
            error_entries.push(ErrorEntry {
                name: calendar.name.clone(),
                errors: calendar.errors.clone(),
            });
            continue;
        }
        let file = names.claim(&generate_slug(&calendar.name));
        let text = render_calendar(&calendar.name, &calendar.friendly_name, &calendar.events);
        write_file(dir, &file, &text)?;
        feed_entries.push(FeedEntry {
            name: calendar.name.clone(),
            friendly_name: calendar.friendly_name.clone(),
            file,
            tags: calendar.tags.clone(),
        });
    }

    tracing::info!(
        dir = %dir.display(),
        calendars = feed_entries.len(),
        aggregates = aggregate_entries.len(),
        "Wrote feeds"
    );
    Ok((feed_entries, aggregate_entries, error_entries))
}

/// Writes `manifest` as pretty-printed JSON.
///
/// ## Errors
/// Returns `AppError::ManifestError` or `AppError::IoError` on failure.
pub fn write_manifest(dir: &Path, manifest: &Manifest) -> AppResult<PathBuf> {
    let json = serde_json::to_string_pretty(manifest)?;
    write_file(dir, MANIFEST_FILE, &json)
}
