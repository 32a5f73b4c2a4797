//! Recurring event generation: phrase grammar, month restrictions, anchor
//! selection, RRULE compilation and event materialization.

mod anchor;
mod compile;
mod grammar;
mod materialize;
mod restriction;

pub use anchor::{GenerationWindow, select_anchor};
pub use compile::compile_rule;
pub use grammar::{Ordinals, Recurrence, parse_schedule, weekday_name};
pub use materialize::{
    DefinitionError, GenerationReport, generate_recurring, materialize, recurring_event_id,
    recurring_source,
};
pub use restriction::{MonthRestriction, next_month, resolve_restriction};
