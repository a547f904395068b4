//! Plan domain types
//!
//! A Plan is the LLM-generated week-by-week habit breakdown; a TimedPlan is
//! the same structure with a user-chosen clock time attached to every task.
//! Week order is structural (Vec order), mirroring the insertion order of
//! the JSON mapping the model produced.

use eyre::{Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One week of a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWeek {
    /// Week label as produced by the model, e.g. "week_1"
    pub label: String,
    /// Ordered task descriptions
    pub tasks: Vec<String>,
}

/// LLM-generated habit plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// The goal the plan was generated for
    pub goal: String,
    /// Requested duration in weeks
    pub duration_weeks: u32,
    /// Ordered weeks
    pub weeks: Vec<PlanWeek>,
}

/// A task with its assigned clock time (canonical "HH:MM")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedTask {
    pub task: String,
    pub time: String,
}

/// One week of a timed plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedWeek {
    pub label: String,
    pub tasks: Vec<TimedTask>,
}

/// Plan with a clock time attached to each task
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedPlan {
    pub goal: String,
    pub duration_weeks: u32,
    pub weeks: Vec<TimedWeek>,
}

/// Parse the numeric suffix of a "week_N" label
fn week_number(label: &str) -> Option<u32> {
    label.strip_prefix("week_")?.parse().ok()
}

/// Sort weeks numerically when every label matches "week_N", otherwise
/// keep the order the mapping arrived in
fn order_weeks<T>(weeks: &mut [T], label: impl Fn(&T) -> &str) {
    if weeks.iter().all(|w| week_number(label(w)).is_some()) {
        weeks.sort_by_key(|w| week_number(label(w)).unwrap_or(u32::MAX));
    }
}

impl Plan {
    /// A plan with no weeks - the "operation produced nothing usable" value
    pub fn empty(goal: impl Into<String>, duration_weeks: u32) -> Self {
        Self {
            goal: goal.into(),
            duration_weeks,
            weeks: Vec::new(),
        }
    }

    /// True when the plan carries no weeks at all
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    /// Total number of tasks across all weeks
    pub fn task_count(&self) -> usize {
        self.weeks.iter().map(|w| w.tasks.len()).sum()
    }

    /// Build a plan from a parsed JSON mapping of week label to task list
    ///
    /// Tolerant of the model's output within reason: empty task strings are
    /// dropped, but a value that is not a list of strings is an error.
    pub fn from_mapping(
        goal: impl Into<String>,
        duration_weeks: u32,
        mapping: serde_json::Map<String, Value>,
    ) -> Result<Self> {
        let mut weeks = Vec::with_capacity(mapping.len());
        for (label, value) in mapping {
            let Value::Array(items) = value else {
                bail!("Value for '{}' is not a list", label);
            };
            let mut tasks = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) if !s.trim().is_empty() => tasks.push(s.trim().to_string()),
                    Value::String(_) => {}
                    other => bail!("Task entry under '{}' is not a string: {}", label, other),
                }
            }
            weeks.push(PlanWeek { label, tasks });
        }

        order_weeks(&mut weeks, |w| w.label.as_str());

        Ok(Self {
            goal: goal.into(),
            duration_weeks,
            weeks,
        })
    }

    /// Flatten back into the week-label to task-list mapping
    pub fn to_mapping(&self) -> serde_json::Map<String, Value> {
        self.weeks
            .iter()
            .map(|w| (w.label.clone(), serde_json::json!(w.tasks)))
            .collect()
    }
}

impl TimedPlan {
    /// Build a timed plan from a parsed mapping of week label to timed tasks
    pub fn from_mapping(
        goal: impl Into<String>,
        duration_weeks: u32,
        mapping: serde_json::Map<String, Value>,
    ) -> Result<Self> {
        let mut weeks = Vec::with_capacity(mapping.len());
        for (label, value) in mapping {
            let tasks: Vec<TimedTask> = serde_json::from_value(value)
                .map_err(|e| eyre::eyre!("Value for '{}' is not a list of timed tasks: {}", label, e))?;
            weeks.push(TimedWeek { label, tasks });
        }

        order_weeks(&mut weeks, |w| w.label.as_str());

        Ok(Self {
            goal: goal.into(),
            duration_weeks,
            weeks,
        })
    }

    /// Flatten back into the week-label to timed-task-list mapping
    pub fn to_mapping(&self) -> serde_json::Map<String, Value> {
        self.weeks
            .iter()
            .map(|w| (w.label.clone(), serde_json::json!(w.tasks)))
            .collect()
    }

    /// Total number of tasks across all weeks
    pub fn task_count(&self) -> usize {
        self.weeks.iter().map(|w| w.tasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(json: &str) -> serde_json::Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_mapping_preserves_week_order() {
        let plan = Plan::from_mapping(
            "learn guitar",
            2,
            mapping(r#"{"week_1": ["A", "B"], "week_2": ["C"]}"#),
        )
        .unwrap();

        assert_eq!(plan.weeks.len(), 2);
        assert_eq!(plan.weeks[0].label, "week_1");
        assert_eq!(plan.weeks[0].tasks, vec!["A", "B"]);
        assert_eq!(plan.weeks[1].label, "week_2");
        assert_eq!(plan.weeks[1].tasks, vec!["C"]);
    }

    #[test]
    fn test_from_mapping_orders_numeric_labels() {
        // week_10 must come after week_9, not between week_1 and week_2
        let plan = Plan::from_mapping(
            "x",
            10,
            mapping(r#"{"week_10": ["J"], "week_1": ["A"], "week_9": ["I"]}"#),
        )
        .unwrap();

        let labels: Vec<&str> = plan.weeks.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["week_1", "week_9", "week_10"]);
    }

    #[test]
    fn test_from_mapping_keeps_order_for_odd_labels() {
        let plan = Plan::from_mapping("x", 2, mapping(r#"{"kickoff": ["A"], "wrap-up": ["B"]}"#)).unwrap();

        let labels: Vec<&str> = plan.weeks.iter().map(|w| w.label.as_str()).collect();
        assert_eq!(labels, vec!["kickoff", "wrap-up"]);
    }

    #[test]
    fn test_from_mapping_drops_blank_tasks() {
        let plan = Plan::from_mapping("x", 1, mapping(r#"{"week_1": ["A", "  ", ""]}"#)).unwrap();
        assert_eq!(plan.weeks[0].tasks, vec!["A"]);
    }

    #[test]
    fn test_from_mapping_rejects_non_list_value() {
        assert!(Plan::from_mapping("x", 1, mapping(r#"{"week_1": "not a list"}"#)).is_err());
    }

    #[test]
    fn test_from_mapping_rejects_non_string_task() {
        assert!(Plan::from_mapping("x", 1, mapping(r#"{"week_1": [1, 2]}"#)).is_err());
    }

    #[test]
    fn test_mapping_round_trip() {
        let source = mapping(r#"{"week_1": ["A", "B"], "week_2": ["C"]}"#);
        let plan = Plan::from_mapping("x", 2, source.clone()).unwrap();
        assert_eq!(plan.to_mapping(), source);
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::empty("goal", 3);
        assert!(plan.is_empty());
        assert_eq!(plan.duration_weeks, 3);
        assert_eq!(plan.task_count(), 0);
    }

    #[test]
    fn test_timed_plan_from_mapping() {
        let timed = TimedPlan::from_mapping(
            "x",
            1,
            mapping(r#"{"week_1": [{"task": "A", "time": "09:30"}]}"#),
        )
        .unwrap();

        assert_eq!(timed.weeks.len(), 1);
        assert_eq!(timed.weeks[0].tasks[0].task, "A");
        assert_eq!(timed.weeks[0].tasks[0].time, "09:30");
        assert_eq!(timed.task_count(), 1);
    }

    #[test]
    fn test_timed_plan_rejects_malformed_entry() {
        assert!(TimedPlan::from_mapping("x", 1, mapping(r#"{"week_1": ["just a string"]}"#)).is_err());
    }
}
