//! iCalendar feed rendering for generated and aggregate calendars.

use calripper_core::constants::PRODID;
use calripper_rfc::rfc::ical::build::serialize;
use calripper_rfc::rfc::ical::core::{Component, Duration, ICalendar, Parameter, Property, Value};

use crate::aggregate::AggregateCalendar;
use crate::model::CalendarEvent;

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// ## Summary
/// Builds the VEVENT for an event.
///
/// `DTSTART` is written as local time with a `TZID` parameter; `DTSTAMP` is
/// the start instant in UTC so a feed renders identically on every run.
#[must_use]
pub fn event_component(event: &CalendarEvent) -> Component {
    let mut component = Component::event();

    component.add_property(Property::text("UID", &event.id));
    component.add_property(Property::raw(
        "DTSTAMP",
        event.date.naive_utc().format(UTC_FORMAT),
    ));
    component.add_property(
        Property::raw("DTSTART", event.date.naive_local().format(LOCAL_FORMAT))
            .with_param(Parameter::tzid(event.date.timezone().name())),
    );
    component.add_property(Property::raw(
        "DURATION",
        Duration::from_time_delta(event.duration),
    ));
    if let Some(rrule) = &event.rrule {
        component.add_property(Property::raw("RRULE", rrule));
    }
    component.add_property(Property::text("SUMMARY", &event.summary));

    if let Some(description) = &event.description {
        component.add_property(Property::text("DESCRIPTION", description));
    }
    if let Some(location) = &event.location {
        component.add_property(Property::text("LOCATION", location));
    }
    if let Some(url) = &event.url {
        component.add_property(Property::raw("URL", url));
    }
    if !event.tags.is_empty() {
        component.add_property(Property::new(
            "CATEGORIES",
            Value::TextList(event.tags.clone()),
        ));
    }

    component
}

fn calendar_document(friendly_name: &str, events: &[CalendarEvent]) -> ICalendar {
    let mut ical = ICalendar::new(PRODID);
    ical.add_property(Property::text("X-WR-CALNAME", friendly_name));
    for event in events {
        ical.add_component(event_component(event));
    }
    ical
}

/// Renders a calendar of `events` as iCalendar text.
#[must_use]
pub fn render_calendar(name: &str, friendly_name: &str, events: &[CalendarEvent]) -> String {
    tracing::trace!(name, events = events.len(), "Rendering calendar");
    serialize(&calendar_document(friendly_name, events))
}

/// ## Summary
/// Renders an aggregate calendar. The contributing calendars are listed in
/// `X-WR-CALDESC`.
#[must_use]
pub fn render_aggregate(aggregate: &AggregateCalendar) -> String {
    tracing::trace!(name = %aggregate.name, events = aggregate.events.len(), "Rendering aggregate");

    let mut ical = calendar_document(&aggregate.friendly_name, &aggregate.events);
    let contributors: Vec<&str> = aggregate
        .ripped_sources
        .iter()
        .chain(&aggregate.external_sources)
        .map(String::as_str)
        .collect();
    if !contributors.is_empty() {
        ical.add_property(Property::text(
            "X-WR-CALDESC",
            format!("Events tagged {} from {}", aggregate.tag, contributors.join(", ")),
        ));
    }
    serialize(&ical)
}
