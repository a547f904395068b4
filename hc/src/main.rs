//! habitcoach - goal-to-calendar habit planner
//!
//! CLI entry point: parse arguments, set up logging, load config, dispatch.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, bail};
use tracing::{debug, info};

use habitcoach::cli::{Cli, Command};
use habitcoach::config::Config;
use habitcoach::llm::create_client;
use habitcoach::materialize::google_materializer;
use habitcoach::planner::PlanGenerator;
use habitcoach::prompts::PromptLoader;
use habitcoach::schedule::assign_times;
use habitcoach::shell::{self, Wizard};
use habitcoach::store::PlanStore;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("habitcoach")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // Log to file so the interactive prompts stay clean
    let log_file = fs::File::create(log_dir.join("habitcoach.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or(Command::Run) {
        Command::Run => cmd_run(&config).await,
        Command::Plan { goal, weeks } => cmd_plan(&config, &goal, weeks).await,
        Command::Times { plan_file } => cmd_times(&config, &plan_file),
        Command::Push {
            timed_file,
            start_date,
            calendar_id,
        } => cmd_push(&config, &timed_file, start_date, calendar_id).await,
        Command::Show { plan_file } => cmd_show(&config, &plan_file),
        Command::Auth => cmd_auth(&config).await,
    }
}

/// Full interactive wizard
async fn cmd_run(config: &Config) -> Result<()> {
    debug!("cmd_run: called");
    config.validate()?;

    let llm = create_client(&config.llm)?;
    let generator = PlanGenerator::new(llm, PromptLoader::new("."), config.llm.max_tokens);
    let store = PlanStore::new(config.storage.plans_dir.clone());

    Wizard::new(generator, store, config.clone()).run().await
}

/// Batch plan generation
async fn cmd_plan(config: &Config, goal: &str, weeks: u32) -> Result<()> {
    debug!(%goal, %weeks, "cmd_plan: called");
    config.validate()?;

    let llm = create_client(&config.llm)?;
    let generator = PlanGenerator::new(llm, PromptLoader::new("."), config.llm.max_tokens);

    let outcome = generator.generate(goal, weeks).await;
    for diagnostic in &outcome.diagnostics {
        eprintln!("{}", diagnostic.red());
    }
    if outcome.plan.is_empty() {
        bail!("Plan generation produced nothing usable");
    }

    shell::print_plan(&outcome.plan);
    let path = PlanStore::new(config.storage.plans_dir.clone()).save_plan(&outcome.plan)?;
    println!("{} {}", "Plan saved to".green(), path.display());
    Ok(())
}

/// Assign times to a saved plan
fn cmd_times(config: &Config, plan_file: &Path) -> Result<()> {
    debug!(plan_file = %plan_file.display(), "cmd_times: called");
    let store = PlanStore::new(config.storage.plans_dir.clone());
    let plan = store.load_plan(plan_file)?;

    shell::print_plan(&plan);

    let mut rl = rustyline::DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
    let Some(sheet) = shell::prompt_times(&mut rl, &plan)? else {
        return Ok(());
    };

    let timed = assign_times(&plan, &sheet)?;
    shell::print_timed_plan(&timed);
    let path = store.save_timed(&timed)?;
    println!("{} {}", "Timed plan saved to".green(), path.display());
    Ok(())
}

/// Push a timed plan into the calendar
async fn cmd_push(
    config: &Config,
    timed_file: &Path,
    start_date: Option<NaiveDate>,
    calendar_id: Option<String>,
) -> Result<()> {
    debug!(timed_file = %timed_file.display(), ?start_date, "cmd_push: called");
    let store = PlanStore::new(config.storage.plans_dir.clone());
    let timed = store.load_timed(timed_file)?;

    let start = start_date.unwrap_or_else(|| config.schedule.default_start_date(chrono::Local::now().date_naive()));

    println!("Pushing '{}' starting {}...", timed.goal, start);
    let report = google_materializer(config, calendar_id).materialize(&timed, start).await;
    shell::print_report(&report);

    if report.submitted + report.already_present == 0 && report.failed_events > 0 {
        bail!("No events could be created");
    }
    Ok(())
}

/// Print a saved plan or timed plan
fn cmd_show(config: &Config, plan_file: &Path) -> Result<()> {
    debug!(plan_file = %plan_file.display(), "cmd_show: called");
    let store = PlanStore::new(config.storage.plans_dir.clone());

    match store.load_plan(plan_file) {
        Ok(plan) => {
            shell::print_plan(&plan);
            Ok(())
        }
        Err(_) => {
            let timed = store
                .load_timed(plan_file)
                .context(format!("{} is neither a plan nor a timed plan file", plan_file.display()))?;
            shell::print_timed_plan(&timed);
            Ok(())
        }
    }
}

/// Interactive calendar authorization
async fn cmd_auth(config: &Config) -> Result<()> {
    debug!("cmd_auth: called");
    let oauth = config.calendar.oauth_config()?;
    let store = gcal::TokenStore::new(config.calendar.token_path());
    let auth = gcal::Authenticator::with_oauth(store, oauth);

    println!("Open this URL in your browser and grant calendar access:");
    println!();
    println!("  {}", auth.auth_url()?);
    println!();
    println!("After approving you will be redirected to a localhost URL.");
    println!("Copy the `code` query parameter from that URL and paste it below.");

    let mut rl = rustyline::DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
    let Some(code) = shell::read_line(&mut rl, "Authorization code: ")? else {
        return Ok(());
    };
    if code.is_empty() {
        bail!("No authorization code provided");
    }

    auth.exchange_code(&code).await?;
    println!("{}", "Calendar access authorized and token saved.".green());
    Ok(())
}
