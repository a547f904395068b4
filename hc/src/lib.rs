//! habitcoach - goal-to-calendar habit planner
//!
//! habitcoach asks for a goal and a duration, has an LLM break it into a
//! week-by-week habit plan, lets the user attach a clock time to every
//! task, and pushes the result into Google Calendar as recurring weekday
//! events.
//!
//! # Core Concepts
//!
//! - **Absorbed failures**: plan generation never errors - a bad reply
//!   yields an empty plan plus diagnostics, and the session continues
//! - **Canonical times**: "HH:MM" 24-hour, fixed at the assignment boundary
//! - **Idempotent pushes**: deterministic event ids make re-materializing a
//!   plan a no-op instead of a duplicate pile
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait and Anthropic/OpenAI implementations
//! - [`planner`] - prompt -> completion -> JSON extraction -> Plan
//! - [`schedule`] - time assignment onto planned tasks
//! - [`materialize`] - expanding timed plans into calendar events
//! - [`store`] - flat-file plan persistence
//! - [`shell`] - the interactive wizard
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod materialize;
pub mod planner;
pub mod prompts;
pub mod schedule;
pub mod shell;
pub mod store;

// Re-export commonly used types
pub use config::{CalendarConfig, Config, LlmConfig, ScheduleConfig, StartPolicy, StorageConfig};
pub use domain::{Plan, PlanWeek, Session, Stage, TimedPlan, TimedTask, TimedWeek};
pub use llm::{
    AnthropicClient, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, OpenAIClient, TokenUsage,
    create_client,
};
pub use materialize::{MaterializeReport, Materializer, google_materializer};
pub use planner::{PlanGenerator, PlanOutcome, extract_json, strip_code_fences};
pub use prompts::{PromptContext, PromptLoader};
pub use schedule::{TIME_FORMAT, TimeSheet, assign_times, format_task_time, parse_task_time};
pub use shell::Wizard;
pub use store::{PlanStore, slugify};
