//! iCalendar core models (RFC 5545).
//!
//! Only the subset needed to publish generated feeds is modelled:
//! recurrence rules, durations and a component/property tree that the
//! serializer renders deterministically.

mod component;
mod duration;
mod property;
mod rrule;

pub use component::{Component, ComponentKind, ICalendar};
pub use duration::Duration;
pub use property::{Parameter, Property, Value};
pub use self::rrule::{Frequency, RRule, Weekday, WeekdayNum};
