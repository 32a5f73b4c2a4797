//! Recurring definitions, scraped sources and external calendars flowing
//! through generation, tag aggregation and feed rendering together.

use calripper_core::config::SeasonTable;
use calripper_service::aggregate::aggregate_by_tag;
use calripper_service::feed::render_aggregate;
use calripper_service::model::{CalendarEvent, RippedCalendar, RippedSource};
use calripper_service::recurrence::{
    GenerationWindow, generate_recurring, recurring_event_id, recurring_source,
};
use calripper_service::source::{parse_external_calendars, parse_recurring_definitions};
use chrono::{NaiveDate, TimeDelta, TimeZone};

const RECURRING: &str = r#"
events:
  - name: open-mic
    friendly_name: Open Mic
    schedule: 1st and 3rd Tuesday
    timezone: America/Los_Angeles
    duration: PT3H
    start_time: "19:00"
    tags: [Music]
  - name: farmers-market
    friendly_name: Farmers Market
    schedule: every Saturday
    timezone: America/Los_Angeles
    duration: PT4H
    start_time: "09:00"
    seasonal: summer
    tags: [Food]
  - name: broken
    schedule: every other Friday
    timezone: America/Los_Angeles
    duration: PT1H
    start_time: "12:00"
    tags: [Music]
"#;

const EXTERNAL: &str = r#"
calendars:
  - name: symphony
    friendly_name: City Symphony
    url: https://example.org/symphony.ics
    tags: [music]
  - name: retired
    friendly_name: Retired Feed
    url: https://example.org/retired.ics
    disabled: true
    tags: [Music, Food]
"#;

fn scraped_event(id: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: format!("Show {id}"),
        location: Some("The Club".to_string()),
        url: None,
        description: None,
        date: chrono_tz::America::Los_Angeles
            .with_ymd_and_hms(2024, 2, 9, 21, 0, 0)
            .single()
            .expect("valid instant"),
        duration: TimeDelta::hours(2),
        rrule: None,
        tags: Vec::new(),
    }
}

fn scraped_sources() -> Vec<RippedSource> {
    vec![RippedSource {
        name: "the-club".to_string(),
        friendly_name: "The Club".to_string(),
        tags: vec!["Music".to_string()],
        calendars: vec![RippedCalendar {
            name: "the-club-shows".to_string(),
            friendly_name: "The Club Shows".to_string(),
            tags: Vec::new(),
            events: vec![scraped_event("club-1"), scraped_event("club-2")],
            errors: Vec::new(),
        }],
    }]
}

fn window() -> GenerationWindow {
    GenerationWindow::new(
        NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 12, 31).expect("valid date"),
    )
    .expect("valid window")
}

#[test_log::test]
fn end_to_end_aggregation() {
    let definitions = parse_recurring_definitions(RECURRING).expect("valid definitions");
    let mut externals = parse_external_calendars(EXTERNAL).expect("valid externals");
    externals[0].events.push(scraped_event("symphony-1"));
    externals[1].events.push(scraped_event("retired-1"));

    let report = generate_recurring(&definitions, &window(), &SeasonTable::default());
    assert_eq!(report.events.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].name, "broken");

    let mut sources = vec![recurring_source(&definitions, &report)];
    sources.extend(scraped_sources());

    let aggregates = aggregate_by_tag(&sources, &externals);
    let tags: Vec<&str> = aggregates.iter().map(|a| a.tag.as_str()).collect();
    assert_eq!(tags, vec!["Food", "Music", "music"]);

    let music = &aggregates[1];
    let ids: Vec<&str> = music.events.iter().map(|e| e.id.as_str()).collect();
    let open_mic = recurring_event_id("open-mic");
    assert_eq!(ids, vec![open_mic.as_str(), "club-1", "club-2"]);
    // The failed definition still shows up as a contributor.
    assert_eq!(
        music.ripped_sources,
        vec![
            "Open Mic".to_string(),
            "The Club Shows".to_string(),
            "broken".to_string()
        ]
    );
    assert_eq!(music.external_sources, vec!["City Symphony".to_string()]);

    let lower = &aggregates[2];
    assert_eq!(lower.name, "tag-music-2");
    let ids: Vec<&str> = lower.events.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["symphony-1"]);

    let food = &aggregates[0];
    assert_eq!(food.events.len(), 1);
    assert!(food.external_sources.is_empty());
    let rrule = food.events[0].rrule.as_ref().map(ToString::to_string);
    assert_eq!(rrule.as_deref(), Some("FREQ=YEARLY;BYDAY=SA;BYMONTH=6,7,8,9"));
}

#[test]
fn aggregation_is_idempotent_end_to_end() {
    let definitions = parse_recurring_definitions(RECURRING).expect("valid definitions");
    let externals = parse_external_calendars(EXTERNAL).expect("valid externals");

    let render_all = || -> Vec<String> {
        let report = generate_recurring(&definitions, &window(), &SeasonTable::default());
        let mut sources = vec![recurring_source(&definitions, &report)];
        sources.extend(scraped_sources());
        aggregate_by_tag(&sources, &externals)
            .iter()
            .map(render_aggregate)
            .collect()
    };

    let first = render_all();
    assert!(!first.is_empty());
    assert_eq!(first, render_all());
}

#[test]
fn disabled_external_never_appears() {
    let externals = parse_external_calendars(EXTERNAL).expect("valid externals");
    let aggregates = aggregate_by_tag(&scraped_sources(), &externals);

    for aggregate in &aggregates {
        assert!(!aggregate.external_sources.contains(&"Retired Feed".to_string()));
    }
    assert!(aggregates.iter().all(|a| a.tag != "Food"));
}
