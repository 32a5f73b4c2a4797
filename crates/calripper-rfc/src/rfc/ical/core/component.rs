//! iCalendar component types (RFC 5545 §3.4-3.6).

use super::Property;

/// Component kind for iCalendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR wrapper component.
    Calendar,
    /// VEVENT component.
    Event,
}

impl ComponentKind {
    /// Returns the string name for this component kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An iCalendar component with its properties and nested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    /// Properties in order of insertion.
    pub properties: Vec<Property>,
    /// Nested sub-components.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates an empty component of the given kind.
    #[must_use]
    pub const fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub const fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Adds a property.
    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    /// Adds a child component.
    pub fn add_child(&mut self, child: Self) {
        self.children.push(child);
    }
}

/// A complete iCalendar document rooted at a VCALENDAR component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// ## Summary
    /// Creates a VCALENDAR with the mandatory `VERSION` and `PRODID` properties.
    #[must_use]
    pub fn new(prodid: &str) -> Self {
        let mut root = Component::new(ComponentKind::Calendar);
        root.add_property(Property::raw("VERSION", "2.0"));
        root.add_property(Property::text("PRODID", prodid));
        root.add_property(Property::raw("CALSCALE", "GREGORIAN"));
        Self { root }
    }

    /// Adds a calendar-level property.
    pub fn add_property(&mut self, prop: Property) {
        self.root.add_property(prop);
    }

    /// Adds a VEVENT (or other) component.
    pub fn add_component(&mut self, component: Component) {
        self.root.add_child(component);
    }
}
