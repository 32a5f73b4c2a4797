//! Recurrence compilation and tag aggregation for generated calendar feeds.
//!
//! Recurring definitions flow through [`recurrence`] (grammar, month
//! restriction, anchor selection, RRULE compilation, materialization);
//! [`aggregate`] then merges every source's events into per-tag calendars
//! and [`feed`] renders any calendar as iCalendar text.

pub mod aggregate;
pub mod error;
pub mod feed;
pub mod model;
pub mod recurrence;
pub mod source;
