//! Interactive wizard shell
//!
//! Walks the user through the whole session: goal and duration in, plan
//! out, clock times per task, optional push to the calendar. Ctrl-C or
//! Ctrl-D at any prompt ends the session cleanly.

use chrono::NaiveDate;
use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::config::Config;
use crate::domain::{Plan, Session, TimedPlan};
use crate::materialize::{self, MaterializeReport};
use crate::planner::PlanGenerator;
use crate::schedule::{self, TimeSheet, parse_task_time};
use crate::store::PlanStore;

/// Read one trimmed line; None means the user bailed out (Ctrl-C/Ctrl-D)
pub fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Option<String>> {
    match rl.readline(prompt) {
        Ok(line) => {
            let input = line.trim().to_string();
            if !input.is_empty() {
                let _ = rl.add_history_entry(&input);
            }
            Ok(Some(input))
        }
        Err(ReadlineError::Interrupted) => {
            println!("^C");
            Ok(None)
        }
        Err(ReadlineError::Eof) => {
            println!();
            Ok(None)
        }
        Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
    }
}

/// Ask for a time per task, week by week; None means the user bailed out
pub fn prompt_times(rl: &mut DefaultEditor, plan: &Plan) -> Result<Option<TimeSheet>> {
    println!();
    println!("{}", "Assign a time to each task (24-hour HH:MM)".bright_cyan().bold());

    let mut sheet = TimeSheet::new();
    for week in &plan.weeks {
        println!("{}", display_label(&week.label).bright_yellow());

        let mut times = Vec::with_capacity(week.tasks.len());
        for task in &week.tasks {
            loop {
                let Some(input) = read_line(rl, &format!("  {} at: ", task))? else {
                    return Ok(None);
                };
                match parse_task_time(&input) {
                    Some(time) => {
                        times.push(time);
                        break;
                    }
                    None => println!("{}", format!("  Invalid time '{}' - use 24-hour HH:MM", input).red()),
                }
            }
        }
        sheet.push_week(week.label.clone(), times);
    }

    Ok(Some(sheet))
}

/// Render a plan the way the original step-by-step flow shows it
pub fn print_plan(plan: &Plan) {
    println!();
    println!("{}", "Weekly Habit Plan".bright_cyan().bold());
    for week in &plan.weeks {
        println!("{}", display_label(&week.label).bright_yellow());
        for task in &week.tasks {
            println!("  - {}", task);
        }
    }
    println!();
}

/// Render a timed plan
pub fn print_timed_plan(plan: &TimedPlan) {
    println!();
    println!("{}", "Habit Plan with Times".bright_cyan().bold());
    for week in &plan.weeks {
        println!("{}", display_label(&week.label).bright_yellow());
        for task in &week.tasks {
            println!("  {} - {}", task.time.bold(), task.task);
        }
    }
    println!();
}

/// Render a materialization report
pub fn print_report(report: &MaterializeReport) {
    for diagnostic in &report.diagnostics {
        println!("{}", diagnostic.red());
    }

    let summary = format!(
        "{} events created, {} already present, {} tasks skipped, {} failures",
        report.submitted, report.already_present, report.skipped_tasks, report.failed_events
    );
    if report.failed_events == 0 && report.skipped_tasks == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}

/// "week_1" -> "Week 1"
pub(crate) fn display_label(label: &str) -> String {
    let spaced = label.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}

/// The interactive session, start to finish
pub struct Wizard {
    generator: PlanGenerator,
    store: PlanStore,
    config: Config,
}

impl Wizard {
    pub fn new(generator: PlanGenerator, store: PlanStore, config: Config) -> Self {
        Self {
            generator,
            store,
            config,
        }
    }

    /// Run the wizard main flow
    pub async fn run(&self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        let Some(goal) = self.prompt_goal(&mut rl)? else {
            return Ok(());
        };
        let Some(weeks) = self.prompt_weeks(&mut rl)? else {
            return Ok(());
        };

        println!();
        println!("{}", "Generating habit plan...".dimmed());
        let outcome = self.generator.generate(&goal, weeks).await;
        for diagnostic in &outcome.diagnostics {
            println!("{}", diagnostic.red());
        }
        if outcome.plan.is_empty() {
            println!("{}", "No usable plan was generated. Try a different goal.".yellow());
            return Ok(());
        }

        let plan = outcome.plan;
        let mut session = Session::new();
        session.set_plan(plan.clone());

        print_plan(&plan);
        let path = self.store.save_plan(&plan)?;
        println!("{} {}", "Plan saved to".green(), path.display());

        if !self.confirm(&mut rl, "Assign task timings now? [Y/n] ", true)? {
            println!("Goodbye!");
            return Ok(());
        }

        let Some(sheet) = prompt_times(&mut rl, &plan)? else {
            return Ok(());
        };
        let timed = schedule::assign_times(&plan, &sheet)?;
        session.set_timed(timed.clone());
        debug!(stage = ?session.stage(), "run: times assigned");

        print_timed_plan(&timed);
        let timed_path = self.store.save_timed(&timed)?;
        println!("{} {}", "Timed plan saved to".green(), timed_path.display());

        if !self.confirm(&mut rl, "Push to Google Calendar? [y/N] ", false)? {
            println!("Goodbye!");
            return Ok(());
        }

        let Some(start_date) = self.prompt_start_date(&mut rl)? else {
            return Ok(());
        };

        println!("{}", "Creating calendar events...".dimmed());
        let materializer = materialize::google_materializer(&self.config, None);
        let report = materializer.materialize(&timed, start_date).await;
        print_report(&report);

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "habitcoach".bright_cyan().bold());
        println!("Turn a goal into a weekly habit plan, then onto your calendar.");
        println!();
    }

    fn prompt_goal(&self, rl: &mut DefaultEditor) -> Result<Option<String>> {
        loop {
            let Some(input) = read_line(rl, "Enter your goal: ")? else {
                return Ok(None);
            };
            if !input.is_empty() {
                return Ok(Some(input));
            }
        }
    }

    fn prompt_weeks(&self, rl: &mut DefaultEditor) -> Result<Option<u32>> {
        loop {
            let Some(input) = read_line(rl, "Duration in weeks: ")? else {
                return Ok(None);
            };
            match input.parse::<u32>() {
                Ok(weeks) if weeks >= 1 => return Ok(Some(weeks)),
                _ => println!("{}", "Enter a positive whole number of weeks.".red()),
            }
        }
    }

    fn confirm(&self, rl: &mut DefaultEditor, prompt: &str, default: bool) -> Result<bool> {
        loop {
            let Some(input) = read_line(rl, prompt)? else {
                return Ok(false);
            };
            match input.to_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => println!("{}", "Please answer y or n.".red()),
            }
        }
    }

    fn prompt_start_date(&self, rl: &mut DefaultEditor) -> Result<Option<NaiveDate>> {
        let default = self
            .config
            .schedule
            .default_start_date(chrono::Local::now().date_naive());

        loop {
            let prompt = format!("First day of week 1 [{}]: ", default);
            let Some(input) = read_line(rl, &prompt)? else {
                return Ok(None);
            };
            if input.is_empty() {
                return Ok(Some(default));
            }
            match input.parse::<NaiveDate>() {
                Ok(date) => return Ok(Some(date)),
                Err(_) => println!("{}", format!("Invalid date '{}' - use YYYY-MM-DD", input).red()),
            }
        }
    }
}
