//! Tag aggregation: merges calendars from every source into one synthesized
//! calendar per tag.

use std::collections::{BTreeSet, HashSet};

use calripper_core::constants::TAG_CALENDAR_PREFIX;
use calripper_core::util::slug::generate_slug;

use crate::model::{CalendarEvent, ExternalCalendar, RippedCalendar, RippedSource};


/// A scraped calendar paired with its effective tag set.
#[derive(Debug, Clone)]
pub struct TaggedCalendar<'a> {
    pub source: &'a RippedSource,
    pub calendar: &'a RippedCalendar,
    /// Calendar tags followed by inherited source tags, without repeats.
    pub tags: Vec<String>,
}

/// An enabled external calendar paired with its tag set.
#[derive(Debug, Clone)]
pub struct TaggedExternalCalendar<'a> {
    pub calendar: &'a ExternalCalendar,
    pub tags: Vec<String>,
}

/// ## Summary
/// A synthesized calendar holding every event whose calendar carries `tag`.
///
/// `ripped_sources` and `external_sources` list the friendly names of the
/// contributing calendars, sorted and without repeats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateCalendar {
    /// File-safe name, `tag-<slug>`.
    pub name: String,
    pub friendly_name: String,
    pub tag: String,
    pub events: Vec<CalendarEvent>,
    pub ripped_sources: Vec<String>,
    pub external_sources: Vec<String>,
}

/// Union of `own` and `inherited`, keeping first-seen order and dropping
/// blank labels. Comparison is exact.
fn merge_tags<'t>(
    own: impl IntoIterator<Item = &'t String>,
    inherited: impl IntoIterator<Item = &'t String>,
) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for tag in own.into_iter().chain(inherited) {
        if tag.trim().is_empty() || merged.contains(tag) {
            continue;
        }
        merged.push(tag.clone());
    }
    merged
}

/// Resolves the effective tags of every calendar of every source.
#[must_use]
pub fn tag_ripped_calendars(sources: &[RippedSource]) -> Vec<TaggedCalendar<'_>> {
    sources
        .iter()
        .flat_map(|source| {
            source.calendars.iter().map(move |calendar| TaggedCalendar {
                source,
                calendar,
                tags: merge_tags(&calendar.tags, &source.tags),
            })
        })
        .collect()
}

/// Tags every enabled external calendar; disabled ones are dropped here.
#[must_use]
pub fn tag_external_calendars(calendars: &[ExternalCalendar]) -> Vec<TaggedExternalCalendar<'_>> {
    calendars
        .iter()
        .filter(|calendar| {
            if calendar.disabled {
                tracing::debug!(name = %calendar.name, "Skipping disabled external calendar");
                return false;
            }
            true
        })
        .map(|calendar| TaggedExternalCalendar {
            calendar,
            tags: merge_tags(&calendar.tags, std::iter::empty()),
        })
        .collect()
}

/// Hands out `tag-<slug>` names, numbering collisions (`tag-music-2`).
#[derive(Default)]
struct NameAllocator {
    used: HashSet<String>,
}

impl NameAllocator {
    fn allocate(&mut self, tag: &str) -> String {
        let base = format!("{TAG_CALENDAR_PREFIX}{}", generate_slug(tag));
        let mut name = base.clone();
        let mut n = 1;
        while !self.used.insert(name.clone()) {
            n += 1;
            name = format!("{base}-{n}");
        }
        name
    }
}

/// ## Summary
/// Builds one aggregate calendar per distinct tag across `sources` and
/// enabled `externals`, ordered by tag.
///
/// Events are gathered in source order (scraped calendars, then external
/// ones) and de-duplicated by id, first occurrence winning. Membership uses
/// exact tag matches; provenance matches tags ignoring ASCII case.
#[must_use]
pub fn aggregate_by_tag(
    sources: &[RippedSource],
    externals: &[ExternalCalendar],
) -> Vec<AggregateCalendar> {
    let ripped = tag_ripped_calendars(sources);
    let external = tag_external_calendars(externals);

    let tags: BTreeSet<&str> = ripped
        .iter()
        .flat_map(|tagged| tagged.tags.iter())
        .chain(external.iter().flat_map(|tagged| tagged.tags.iter()))
        .map(String::as_str)
        .collect();

    let mut names = NameAllocator::default();
    let aggregates: Vec<AggregateCalendar> = tags
        .into_iter()
        .map(|tag| build_aggregate(tag, names.allocate(tag), &ripped, &external))
        .collect();

    tracing::debug!(
        aggregates = aggregates.len(),
        ripped_calendars = ripped.len(),
        external_calendars = external.len(),
        "Aggregated calendars by tag"
    );
    aggregates
}

fn build_aggregate(
    tag: &str,
    name: String,
    ripped: &[TaggedCalendar<'_>],
    external: &[TaggedExternalCalendar<'_>],
) -> AggregateCalendar {
    let carries = |tags: &[String]| tags.iter().any(|t| t == tag);
    let mentions = |tags: &[String]| tags.iter().any(|t| t.eq_ignore_ascii_case(tag));

    let mut seen: HashSet<String> = HashSet::new();
    let events: Vec<CalendarEvent> = ripped
        .iter()
        .filter(|tagged| carries(tagged.tags.as_slice()))
        .flat_map(|tagged| tagged.calendar.events.iter())
        .chain(
            external
                .iter()
                .filter(|tagged| carries(tagged.tags.as_slice()))
                .flat_map(|tagged| tagged.calendar.events.iter()),
        )
        .filter(|event| seen.insert(event.id.clone()))
        .cloned()
        .collect();

    let ripped_sources: BTreeSet<String> = ripped
        .iter()
        .filter(|tagged| mentions(tagged.tags.as_slice()))
        .map(|tagged| tagged.calendar.friendly_name.clone())
        .collect();
    let external_sources: BTreeSet<String> = external
        .iter()
        .filter(|tagged| mentions(tagged.tags.as_slice()))
        .map(|tagged| tagged.calendar.friendly_name.clone())
        .collect();

    tracing::trace!(tag, name = %name, events = events.len(), "Built aggregate calendar");

    AggregateCalendar {
        name,
        friendly_name: tag.to_string(),
        tag: tag.to_string(),
        events,
        ripped_sources: ripped_sources.into_iter().collect(),
        external_sources: external_sources.into_iter().collect(),
    }
}
