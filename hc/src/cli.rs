//! CLI command definitions and subcommands

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// habitcoach - turn a goal into a week-wise habit plan and calendar schedule
#[derive(Parser)]
#[command(
    name = "habitcoach",
    about = "Turn a goal into a week-wise habit plan and calendar schedule",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute; defaults to the interactive wizard
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive wizard: goal -> plan -> times -> calendar
    Run,

    /// Generate a habit plan and save it
    Plan {
        /// The goal to plan for
        #[arg(short, long)]
        goal: String,

        /// Duration in weeks
        #[arg(short, long)]
        weeks: u32,
    },

    /// Assign clock times to a saved plan
    Times {
        /// Plan file produced by `plan`
        plan_file: PathBuf,
    },

    /// Push a timed plan into the calendar
    Push {
        /// Timed plan file produced by `times`
        timed_file: PathBuf,

        /// First day of week 1 (YYYY-MM-DD); defaults per config
        #[arg(short, long)]
        start_date: Option<NaiveDate>,

        /// Target calendar, overriding config
        #[arg(long)]
        calendar_id: Option<String>,
    },

    /// Print a saved plan or timed plan
    Show {
        /// Plan file to display
        plan_file: PathBuf,
    },

    /// Authorize calendar access and store the token
    Auth,
}
