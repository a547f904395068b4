//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Weekly habit plan generation prompt
pub const HABIT_PLAN: &str = include_str!("../../prompts/habit-plan.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "habit-plan" => Some(HABIT_PLAN),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
