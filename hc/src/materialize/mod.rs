//! Event materialization - expanding a timed plan into calendar events
//!
//! Each task becomes one 30-minute event per scheduled day of its plan
//! week. Submission is sequential and partial-failure tolerant: a task
//! whose time will not parse is skipped, a single failed insert is
//! recorded, and everything else keeps going. Nothing is rolled back.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};
use uuid::Uuid;

use gcal::{Authenticator, CalendarEvent, CalendarService, GoogleCalendarClient, InsertOutcome, TokenStore};

use crate::config::Config;
use crate::domain::TimedPlan;
use crate::schedule::parse_task_time;

/// Event length for each habit slot
const EVENT_MINUTES: i64 = 30;

/// What one materialization run did
#[derive(Debug, Clone, Default)]
pub struct MaterializeReport {
    /// Events newly created on the calendar
    pub submitted: u32,

    /// Events skipped because an identical one already existed
    pub already_present: u32,

    /// Tasks dropped entirely (unparseable time)
    pub skipped_tasks: u32,

    /// Individual event insertions that failed
    pub failed_events: u32,

    /// Human-readable notes about everything that went sideways
    pub diagnostics: Vec<String>,
}

/// Expands timed plans into calendar events and submits them
pub struct Materializer {
    service: Arc<dyn CalendarService>,
    calendar_id: String,
    timezone: String,
    days_per_week: u32,
    dedup: bool,
}

impl Materializer {
    pub fn new(
        service: Arc<dyn CalendarService>,
        calendar_id: impl Into<String>,
        timezone: impl Into<String>,
        days_per_week: u32,
        dedup: bool,
    ) -> Self {
        Self {
            service,
            calendar_id: calendar_id.into(),
            timezone: timezone.into(),
            days_per_week,
            dedup,
        }
    }

    /// Materialize every task of the plan, anchored at `start_date`
    ///
    /// `start_date` is the first day of week 1; week N covers
    /// `start_date + (N-1) weeks`. With the default five days per week a
    /// Monday start yields Monday-Friday events.
    pub async fn materialize(&self, plan: &TimedPlan, start_date: NaiveDate) -> MaterializeReport {
        debug!(goal = %plan.goal, %start_date, week_count = plan.weeks.len(), "materialize: called");
        let mut report = MaterializeReport::default();

        for (index, week) in plan.weeks.iter().enumerate() {
            for task in &week.tasks {
                let Some(time) = parse_task_time(&task.time) else {
                    warn!(task = %task.task, time = %task.time, "materialize: unparseable time, skipping task");
                    report.skipped_tasks += 1;
                    report
                        .diagnostics
                        .push(format!("Invalid time '{}' for task '{}' - skipped", task.time, task.task));
                    continue;
                };

                for day_offset in 0..self.days_per_week {
                    let day = start_date + Duration::weeks(index as i64) + Duration::days(day_offset as i64);
                    let start = day.and_time(time);

                    let mut event =
                        CalendarEvent::with_duration(task.task.clone(), start, EVENT_MINUTES, self.timezone.clone());
                    if self.dedup {
                        event = event.with_id(event_id(&plan.goal, &week.label, &task.task, day_offset));
                    }

                    match self.service.insert_event(&self.calendar_id, &event).await {
                        Ok(InsertOutcome::Created(_)) => report.submitted += 1,
                        Ok(InsertOutcome::AlreadyExists) => {
                            debug!(task = %task.task, %day, "materialize: event already on calendar");
                            report.already_present += 1;
                        }
                        Err(e) => {
                            warn!(task = %task.task, %day, error = %e, "materialize: insert failed");
                            report.failed_events += 1;
                            report
                                .diagnostics
                                .push(format!("Failed to insert '{}' on {}: {}", task.task, day, e));
                        }
                    }
                }
            }
        }

        report
    }
}

/// Stable id for one (goal, week, task, weekday) slot
///
/// UUIDv5 over the slot key, hex-encoded - accepted verbatim by the
/// calendar API, and identical across runs so re-materializing the same
/// plan cannot duplicate events.
fn event_id(goal: &str, week_label: &str, task: &str, day_offset: u32) -> String {
    let key = format!("{}|{}|{}|{}", goal, week_label, task, day_offset);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes()).simple().to_string()
}

/// Build a Google-Calendar-backed materializer from configuration
pub fn google_materializer(config: &Config, calendar_id: Option<String>) -> Materializer {
    let store = TokenStore::new(config.calendar.token_path());
    let service = Arc::new(GoogleCalendarClient::new(Authenticator::new(store)));

    Materializer::new(
        service,
        calendar_id.unwrap_or_else(|| config.calendar.calendar_id.clone()),
        config.calendar.timezone.clone(),
        config.schedule.days_per_week,
        config.calendar.dedup,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TimedTask, TimedWeek};
    use async_trait::async_trait;
    use gcal::CalendarError;
    use std::sync::Mutex;

    /// Records inserts; reports AlreadyExists when an id repeats
    struct RecordingCalendar {
        events: Mutex<Vec<CalendarEvent>>,
    }

    impl RecordingCalendar {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<CalendarEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CalendarService for RecordingCalendar {
        async fn insert_event(&self, _calendar_id: &str, event: &CalendarEvent) -> Result<InsertOutcome, CalendarError> {
            let mut events = self.events.lock().unwrap();
            if let Some(ref id) = event.id {
                if events.iter().any(|e| e.id.as_deref() == Some(id.as_str())) {
                    return Ok(InsertOutcome::AlreadyExists);
                }
            }
            events.push(event.clone());
            Ok(InsertOutcome::Created(format!("evt-{}", events.len())))
        }
    }

    /// Always refuses - for failure-path tests
    struct RefusingCalendar;

    #[async_trait]
    impl CalendarService for RefusingCalendar {
        async fn insert_event(&self, _calendar_id: &str, _event: &CalendarEvent) -> Result<InsertOutcome, CalendarError> {
            Err(CalendarError::Api {
                status: 500,
                message: "backend unavailable".to_string(),
            })
        }
    }

    fn timed_plan(tasks: Vec<(&str, &str)>) -> TimedPlan {
        TimedPlan {
            goal: "run a 10k".to_string(),
            duration_weeks: 1,
            weeks: vec![TimedWeek {
                label: "week_1".to_string(),
                tasks: tasks
                    .into_iter()
                    .map(|(task, time)| TimedTask {
                        task: task.to_string(),
                        time: time.to_string(),
                    })
                    .collect(),
            }],
        }
    }

    fn monday() -> NaiveDate {
        // A known Monday
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn materializer(service: Arc<dyn CalendarService>) -> Materializer {
        Materializer::new(service, "primary", "Asia/Kolkata", 5, true)
    }

    #[tokio::test]
    async fn test_one_task_becomes_five_weekday_events() {
        let calendar = RecordingCalendar::new();
        let report = materializer(calendar.clone())
            .materialize(&timed_plan(vec![("A", "09:00 AM")]), monday())
            .await;

        assert_eq!(report.submitted, 5);
        assert_eq!(report.skipped_tasks, 0);
        assert_eq!(report.failed_events, 0);

        let events = calendar.events();
        assert_eq!(events.len(), 5);
        for (offset, event) in events.iter().enumerate() {
            let expected_day = monday() + Duration::days(offset as i64);
            assert_eq!(event.summary, "A");
            assert_eq!(event.start.date(), expected_day);
            assert_eq!(event.start.time(), chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap());
            assert_eq!(event.end.time(), chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap());
            assert_eq!(event.timezone, "Asia/Kolkata");
        }
        // Monday through Friday of the same week
        assert_eq!(events[4].start.date(), NaiveDate::from_ymd_opt(2025, 6, 6).unwrap());
    }

    #[tokio::test]
    async fn test_unparseable_time_skips_only_that_task() {
        let calendar = RecordingCalendar::new();
        let report = materializer(calendar.clone())
            .materialize(&timed_plan(vec![("Broken", "25:99"), ("Fine", "07:30")]), monday())
            .await;

        assert_eq!(report.skipped_tasks, 1);
        assert_eq!(report.submitted, 5);
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].contains("Broken"));

        let events = calendar.events();
        assert!(events.iter().all(|e| e.summary == "Fine"));
    }

    #[tokio::test]
    async fn test_second_week_shifts_by_seven_days() {
        let calendar = RecordingCalendar::new();
        let plan = TimedPlan {
            goal: "x".to_string(),
            duration_weeks: 2,
            weeks: vec![
                TimedWeek {
                    label: "week_1".to_string(),
                    tasks: vec![TimedTask {
                        task: "A".to_string(),
                        time: "08:00".to_string(),
                    }],
                },
                TimedWeek {
                    label: "week_2".to_string(),
                    tasks: vec![TimedTask {
                        task: "B".to_string(),
                        time: "08:00".to_string(),
                    }],
                },
            ],
        };

        materializer(calendar.clone()).materialize(&plan, monday()).await;

        let events = calendar.events();
        assert_eq!(events.len(), 10);
        let first_b = events.iter().find(|e| e.summary == "B").unwrap();
        assert_eq!(first_b.start.date(), NaiveDate::from_ymd_opt(2025, 6, 9).unwrap());
    }

    #[tokio::test]
    async fn test_rerun_does_not_duplicate_events() {
        let calendar = RecordingCalendar::new();
        let m = materializer(calendar.clone());
        let plan = timed_plan(vec![("A", "09:00")]);

        let first = m.materialize(&plan, monday()).await;
        assert_eq!(first.submitted, 5);

        let second = m.materialize(&plan, monday()).await;
        assert_eq!(second.submitted, 0);
        assert_eq!(second.already_present, 5);
        assert_eq!(calendar.events().len(), 5);
    }

    #[tokio::test]
    async fn test_insert_failures_are_recorded_not_fatal() {
        let report = materializer(Arc::new(RefusingCalendar))
            .materialize(&timed_plan(vec![("A", "09:00")]), monday())
            .await;

        assert_eq!(report.submitted, 0);
        assert_eq!(report.failed_events, 5);
        assert_eq!(report.diagnostics.len(), 5);
    }

    #[test]
    fn test_event_ids_stable_and_distinct() {
        let a0 = event_id("goal", "week_1", "A", 0);
        let a0_again = event_id("goal", "week_1", "A", 0);
        let a1 = event_id("goal", "week_1", "A", 1);
        let b0 = event_id("goal", "week_1", "B", 0);

        assert_eq!(a0, a0_again);
        assert_ne!(a0, a1);
        assert_ne!(a0, b0);
        // Calendar API id charset: lowercase hex fits base32hex
        assert!(a0.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(a0.len(), 32);
    }
}
