//! iCalendar serializer (RFC 5545).
//!
//! Output is deterministic: properties are emitted in a canonical order per
//! component kind, so the same calendar always serializes to the same bytes.

use super::escape::{escape_param_value, escape_text, strip_controls};
use super::fold::fold_line;
use crate::rfc::ical::core::{Component, ComponentKind, ICalendar, Parameter, Property, Value};

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a component and its children to a string.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = String::new();

    result.push_str(&fold_line(&format!("BEGIN:{}", component.kind)));

    for prop in canonical_property_order(&component.properties, component.kind) {
        result.push_str(&serialize_property(prop));
    }

    // Children keep insertion order; callers decide event order.
    for child in &component.children {
        result.push_str(&serialize_component(child));
    }

    result.push_str(&fold_line(&format!("END:{}", component.kind)));

    result
}

/// Serializes a property to a folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();

    for param in &prop.params {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }

    line.push(':');
    line.push_str(&serialize_value(&prop.value));

    fold_line(&line)
}

fn serialize_parameter(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

fn serialize_value(value: &Value) -> String {
    match value {
        Value::Text(s) => escape_text(s),
        Value::TextList(list) => list
            .iter()
            .map(|s| escape_text(s))
            .collect::<Vec<_>>()
            .join(","),
        Value::Raw(s) => strip_controls(s),
    }
}

/// Returns properties in canonical order for deterministic output.
fn canonical_property_order(props: &[Property], kind: ComponentKind) -> Vec<&Property> {
    let order: &[&str] = match kind {
        ComponentKind::Calendar => &[
            "VERSION",
            "PRODID",
            "CALSCALE",
            "METHOD",
            "X-WR-CALNAME",
            "X-WR-CALDESC",
            "X-WR-TIMEZONE",
        ],
        ComponentKind::Event => &[
            "UID",
            "DTSTAMP",
            "DTSTART",
            "DTEND",
            "DURATION",
            "RRULE",
            "SUMMARY",
            "DESCRIPTION",
            "LOCATION",
            "URL",
            "CATEGORIES",
        ],
    };

    let mut ordered: Vec<&Property> = Vec::with_capacity(props.len());

    for &name in order {
        ordered.extend(props.iter().filter(|p| p.name.eq_ignore_ascii_case(name)));
    }

    // Anything else (including X-properties) follows in insertion order
    ordered.extend(
        props
            .iter()
            .filter(|p| !order.iter().any(|n| p.name.eq_ignore_ascii_case(n))),
    );

    ordered
}
