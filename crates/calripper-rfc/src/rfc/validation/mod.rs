//! Validation of generated iCalendar values against independent implementations.

mod rrule;

pub use self::rrule::{expand_rrule, validate_rrule};
