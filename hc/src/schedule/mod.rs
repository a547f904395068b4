//! Time assignment - attaching a clock time to every planned task
//!
//! The canonical time representation is 24-hour "HH:MM", fixed here at the
//! assignment boundary. Twelve-hour "hh:mm AM/PM" strings are still parsed
//! on the way in (plan files written by earlier builds used that form), but
//! everything this module emits is canonical.

use chrono::NaiveTime;
use eyre::{Result, bail};
use tracing::debug;

use crate::domain::{Plan, TimedPlan, TimedTask, TimedWeek};

/// Canonical clock-time format
pub const TIME_FORMAT: &str = "%H:%M";

/// Parse a task time string
///
/// Tries canonical 24-hour "HH:MM" first, then "hh:mm AM/PM". Returns None
/// for anything else - callers decide whether that skips a task or re-asks
/// the user.
pub fn parse_task_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, "%I:%M %p"))
        .ok()
}

/// Format a time in the canonical representation
pub fn format_task_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// User-chosen times for every task of a plan, keyed by week label
#[derive(Debug, Clone, Default)]
pub struct TimeSheet {
    entries: Vec<(String, Vec<NaiveTime>)>,
}

impl TimeSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the times for one week, in task order
    pub fn push_week(&mut self, label: impl Into<String>, times: Vec<NaiveTime>) {
        self.entries.push((label.into(), times));
    }

    /// Times recorded for a week label, if any
    pub fn week(&self, label: &str) -> Option<&[NaiveTime]> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, times)| times.as_slice())
    }
}

/// Merge a plan with the user's chosen times into a TimedPlan
///
/// Week order and per-week task order are preserved. Every task must have
/// exactly one time - a missing week or a count mismatch is an error, so a
/// half-filled sheet never reaches the calendar stage.
pub fn assign_times(plan: &Plan, sheet: &TimeSheet) -> Result<TimedPlan> {
    debug!(goal = %plan.goal, week_count = plan.weeks.len(), "assign_times: called");

    let mut weeks = Vec::with_capacity(plan.weeks.len());
    for week in &plan.weeks {
        let Some(times) = sheet.week(&week.label) else {
            bail!("No times assigned for {}", week.label);
        };
        if times.len() != week.tasks.len() {
            bail!(
                "{} has {} tasks but {} times were assigned",
                week.label,
                week.tasks.len(),
                times.len()
            );
        }

        let tasks = week
            .tasks
            .iter()
            .zip(times)
            .map(|(task, time)| TimedTask {
                task: task.clone(),
                time: format_task_time(*time),
            })
            .collect();

        weeks.push(TimedWeek {
            label: week.label.clone(),
            tasks,
        });
    }

    Ok(TimedPlan {
        goal: plan.goal.clone(),
        duration_weeks: plan.duration_weeks,
        weeks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PlanWeek;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn single_task_plan() -> Plan {
        Plan {
            goal: "x".to_string(),
            duration_weeks: 1,
            weeks: vec![PlanWeek {
                label: "week_1".to_string(),
                tasks: vec!["A".to_string()],
            }],
        }
    }

    #[test]
    fn test_parse_canonical() {
        assert_eq!(parse_task_time("09:30"), Some(time(9, 30)));
        assert_eq!(parse_task_time("23:05"), Some(time(23, 5)));
        assert_eq!(parse_task_time(" 07:00 "), Some(time(7, 0)));
    }

    #[test]
    fn test_parse_twelve_hour() {
        assert_eq!(parse_task_time("09:00 AM"), Some(time(9, 0)));
        assert_eq!(parse_task_time("9:05 PM"), Some(time(21, 5)));
        assert_eq!(parse_task_time("12:00 AM"), Some(time(0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_task_time("25:99"), None);
        assert_eq!(parse_task_time("soonish"), None);
        assert_eq!(parse_task_time(""), None);
    }

    #[test]
    fn test_canonicalization() {
        let parsed = parse_task_time("9:05 PM").unwrap();
        assert_eq!(format_task_time(parsed), "21:05");
    }

    #[test]
    fn test_assign_times_single_task() {
        let mut sheet = TimeSheet::new();
        sheet.push_week("week_1", vec![time(9, 30)]);

        let timed = assign_times(&single_task_plan(), &sheet).unwrap();

        assert_eq!(timed.weeks.len(), 1);
        assert_eq!(timed.weeks[0].label, "week_1");
        assert_eq!(
            timed.weeks[0].tasks,
            vec![TimedTask {
                task: "A".to_string(),
                time: "09:30".to_string(),
            }]
        );
    }

    #[test]
    fn test_assign_times_preserves_order() {
        let plan = Plan {
            goal: "x".to_string(),
            duration_weeks: 2,
            weeks: vec![
                PlanWeek {
                    label: "week_1".to_string(),
                    tasks: vec!["A".to_string(), "B".to_string()],
                },
                PlanWeek {
                    label: "week_2".to_string(),
                    tasks: vec!["C".to_string()],
                },
            ],
        };

        let mut sheet = TimeSheet::new();
        sheet.push_week("week_2", vec![time(18, 0)]);
        sheet.push_week("week_1", vec![time(7, 0), time(20, 15)]);

        let timed = assign_times(&plan, &sheet).unwrap();

        assert_eq!(timed.weeks[0].label, "week_1");
        assert_eq!(timed.weeks[0].tasks[0].time, "07:00");
        assert_eq!(timed.weeks[0].tasks[1].time, "20:15");
        assert_eq!(timed.weeks[1].label, "week_2");
        assert_eq!(timed.weeks[1].tasks[0].time, "18:00");
    }

    #[test]
    fn test_assign_times_missing_week_errors() {
        let sheet = TimeSheet::new();
        assert!(assign_times(&single_task_plan(), &sheet).is_err());
    }

    #[test]
    fn test_assign_times_count_mismatch_errors() {
        let mut sheet = TimeSheet::new();
        sheet.push_week("week_1", vec![time(9, 0), time(10, 0)]);
        assert!(assign_times(&single_task_plan(), &sheet).is_err());
    }
}
