//! iCalendar (RFC 5545) support: value types, component model and serialization.

pub mod build;
pub mod core;
