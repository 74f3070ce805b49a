//! The plan itself: an ordered list of numbered steps with completion flags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a plan.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlanStep {
    /// 1-based position in the plan.
    pub id: i64,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// A session's plan.
///
/// Rendering via [`Display`](fmt::Display) is what the model sees:
///
/// ```text
/// Current Plan:
/// [x] 1. Research destinations
/// [ ] 2. Book flights
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlanState {
    steps: Vec<PlanStep>,
}

impl PlanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Replace the plan with `steps`, numbered from 1, all incomplete.
    pub fn create<I, S>(&mut self, steps: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps
            .into_iter()
            .zip(1..)
            .map(|(description, id)| PlanStep {
                id,
                description: description.into(),
                completed: false,
            })
            .collect();
        self.to_string()
    }

    /// Mark step `step_id` complete and return the rendered plan, or
    /// `"Step {step_id} not found."` if no step has that id.
    pub fn mark_step_complete(&mut self, step_id: i64) -> String {
        match self.steps.iter_mut().find(|s| s.id == step_id) {
            Some(step) => {
                step.completed = true;
                self.to_string()
            }
            None => format!("Step {step_id} not found."),
        }
    }

    pub fn show_progress(&self) -> String {
        self.to_string()
    }

    /// Whether a plan exists and every step is complete.
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.completed)
    }
}

impl fmt::Display for PlanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("No plan created yet.");
        }
        f.write_str("Current Plan:")?;
        for step in &self.steps {
            let status = if step.completed { "[x]" } else { "[ ]" };
            write!(f, "\n{status} {}. {}", step.id, step.description)?;
        }
        Ok(())
    }
}
