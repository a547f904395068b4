//! Plan file persistence
//!
//! Flat JSON dumps, one file per goal, in a configurable directory. The
//! envelope is `{goal_description, duration_weeks, plan}` for both the
//! plain and the timed plan so a file is self-describing regardless of
//! which stage wrote it last.

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Plan, TimedPlan};

/// Reduce a goal string to a filesystem-safe slug
///
/// Lowercased, alphanumerics kept, every other run of characters collapsed
/// to a single underscore.
pub fn slugify(goal: &str) -> String {
    let mut slug = String::with_capacity(goal.len());
    let mut last_was_sep = true;
    for c in goal.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("goal");
    }
    slug
}

/// On-disk envelope shared by plan and timed-plan files
#[derive(Serialize, Deserialize)]
struct PlanDocument {
    goal_description: String,
    duration_weeks: u32,
    plan: serde_json::Map<String, serde_json::Value>,
}

/// Saves and loads plan files in one directory
pub struct PlanStore {
    dir: PathBuf,
}

impl PlanStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a plan for this goal is saved at
    pub fn plan_path(&self, goal: &str) -> PathBuf {
        self.dir.join(format!("habit_plan_{}.json", slugify(goal)))
    }

    /// Path a timed plan for this goal is saved at
    pub fn timed_path(&self, goal: &str) -> PathBuf {
        self.dir.join(format!("habit_plan_{}_timed.json", slugify(goal)))
    }

    /// Write the plan to its derived path, returning that path
    pub fn save_plan(&self, plan: &Plan) -> Result<PathBuf> {
        let path = self.plan_path(&plan.goal);
        self.write_document(&path, &plan.goal, plan.duration_weeks, plan.to_mapping())?;
        info!(path = %path.display(), "Saved plan");
        Ok(path)
    }

    /// Write the timed plan to its derived path, returning that path
    pub fn save_timed(&self, plan: &TimedPlan) -> Result<PathBuf> {
        let path = self.timed_path(&plan.goal);
        self.write_document(&path, &plan.goal, plan.duration_weeks, plan.to_mapping())?;
        info!(path = %path.display(), "Saved timed plan");
        Ok(path)
    }

    /// Load a plan file
    pub fn load_plan(&self, path: &Path) -> Result<Plan> {
        debug!(path = %path.display(), "load_plan: called");
        let doc = self.read_document(path)?;
        Plan::from_mapping(doc.goal_description, doc.duration_weeks, doc.plan)
            .context(format!("Malformed plan file {}", path.display()))
    }

    /// Load a timed plan file
    pub fn load_timed(&self, path: &Path) -> Result<TimedPlan> {
        debug!(path = %path.display(), "load_timed: called");
        let doc = self.read_document(path)?;
        TimedPlan::from_mapping(doc.goal_description, doc.duration_weeks, doc.plan)
            .context(format!("Malformed timed plan file {}", path.display()))
    }

    fn write_document(
        &self,
        path: &Path,
        goal: &str,
        duration_weeks: u32,
        plan: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        fs::create_dir_all(&self.dir).context(format!("Failed to create {}", self.dir.display()))?;

        let doc = PlanDocument {
            goal_description: goal.to_string(),
            duration_weeks,
            plan,
        };
        let json = serde_json::to_string_pretty(&doc)?;
        fs::write(path, json).context(format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn read_document(&self, path: &Path) -> Result<PlanDocument> {
        let content = fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PlanWeek, TimedTask, TimedWeek};
    use tempfile::TempDir;

    fn sample_plan() -> Plan {
        Plan {
            goal: "Run a 10k!".to_string(),
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
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Run a 10k!"), "run_a_10k");
        assert_eq!(slugify("  learn   Rust  "), "learn_rust");
        assert_eq!(slugify("déjà vu"), "d_j_vu");
        assert_eq!(slugify("!!!"), "goal");
    }

    #[test]
    fn test_plan_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::new(dir.path());

        let plan = sample_plan();
        let path = store.save_plan(&plan).unwrap();
        assert!(path.ends_with("habit_plan_run_a_10k.json"));

        let loaded = store.load_plan(&path).unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn test_plan_file_envelope() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::new(dir.path());
        let path = store.save_plan(&sample_plan()).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["goal_description"], "Run a 10k!");
        assert_eq!(raw["duration_weeks"], 2);
        assert_eq!(raw["plan"]["week_1"][0], "A");
    }

    #[test]
    fn test_timed_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::new(dir.path());

        let timed = TimedPlan {
            goal: "Run a 10k!".to_string(),
            duration_weeks: 1,
            weeks: vec![TimedWeek {
                label: "week_1".to_string(),
                tasks: vec![TimedTask {
                    task: "A".to_string(),
                    time: "09:30".to_string(),
                }],
            }],
        };

        let path = store.save_timed(&timed).unwrap();
        assert!(path.ends_with("habit_plan_run_a_10k_timed.json"));

        let loaded = store.load_timed(&path).unwrap();
        assert_eq!(loaded, timed);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let store = PlanStore::new(dir.path());
        assert!(store.load_plan(&dir.path().join("nope.json")).is_err());
    }
}
