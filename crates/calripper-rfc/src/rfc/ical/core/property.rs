//! iCalendar property and parameter types (RFC 5545 §3.1, §3.2).

/// A property parameter, e.g. `TZID=Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (uppercase).
    pub name: String,
    /// Parameter values (comma-separated when serialized).
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a single-valued parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a TZID parameter.
    #[must_use]
    pub fn tzid(tzid: impl Into<String>) -> Self {
        Self::new("TZID", tzid)
    }
}

/// Property value.
///
/// Text values are escaped on output; everything else (dates, durations,
/// recurrence rules, URIs) is written as stored minus control characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// TEXT value (RFC 5545 §3.3.11).
    Text(String),
    /// Comma-separated list of TEXT values, e.g. CATEGORIES.
    TextList(Vec<String>),
    /// Pre-formatted value written verbatim.
    Raw(String),
}

/// A content line: name, parameters and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name (uppercase).
    pub name: String,
    /// Parameters in order of insertion.
    pub params: Vec<Parameter>,
    /// Property value.
    pub value: Value,
}

impl Property {
    /// Creates a property with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value,
        }
    }

    /// Creates a TEXT property.
    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(name, Value::Text(text.into()))
    }

    /// Creates a property whose value is written verbatim.
    #[must_use]
    pub fn raw(name: impl Into<String>, value: impl ToString) -> Self {
        Self::new(name, Value::Raw(value.to_string()))
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }
}
