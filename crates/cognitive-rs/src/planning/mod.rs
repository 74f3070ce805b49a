//! Per-session planning for tool-using agents.
//!
//! The model manages a step list through three tools: `plan_create`,
//! `plan_mark_step_complete` and `plan_show_progress`. The plan lives on the
//! [`Session`], created the first time a tool touches it.
//!
//! [`Planning`] bundles everything a host needs:
//!
//! ```ignore
//! let planning = Planning::new();
//! let tools = planning.toolset().merge(other_tools);
//! let compactor = planning.history_processor();
//!
//! Runner::new(&model, &tools, RunnerConfig::default())
//!     .with_compactor(&compactor)
//!     .run(&session, history)
//!     .await?;
//!
//! let plan = Planning::context(&session)?;
//! println!("{}", plan.lock().unwrap());
//! ```

pub mod state;
pub mod tools;

pub use state::{PlanState, PlanStep};
pub use tools::{PlanCreate, PlanMarkStepComplete, PlanShowProgress};

use crate::agent::session::{Session, SessionError};
use crate::history::{HistoryCompactor, WatchedTools};
use crate::tools::core::ToolSet;
use std::sync::{Arc, Mutex};

/// Session slot key for the plan.
pub const PLAN_SLOT: &str = "planning.plan";

/// Instruction block appended to the `plan_create` description.
pub const PLANNING_INSTRUCTIONS: &str = "\
Planning System Instructions:
1. Before processing any request, you MUST call 'plan_create' to generate a step-by-step plan.
2. Execute the plan step by step.
3. After completing each step, you MUST call 'plan_mark_step_complete' to mark it as done.
4. You can check your progress using 'plan_show_progress'.
5. Follow the plan strictly.";

/// Entry point to the planning capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct Planning;

impl Planning {
    pub fn new() -> Self {
        Self
    }

    /// The three plan tools.
    pub fn toolset(&self) -> ToolSet {
        ToolSet::new()
            .with(PlanCreate)
            .with(PlanMarkStepComplete)
            .with(PlanShowProgress)
    }

    /// A compactor watching the three plan tool names.
    pub fn history_processor(&self) -> HistoryCompactor {
        HistoryCompactor::new(WatchedTools::planning())
    }

    /// The session's plan, created empty on first access.
    pub fn context(session: &Session) -> Result<Arc<Mutex<PlanState>>, SessionError> {
        session.get_or_init(PLAN_SLOT, || Mutex::new(PlanState::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolset_registers_the_plan_tools() {
        let tools = Planning::new().toolset();
        assert_eq!(
            tools.names(),
            vec!["plan_create", "plan_mark_step_complete", "plan_show_progress"]
        );
    }

    #[test]
    fn history_processor_watches_exactly_the_toolset() {
        let planning = Planning::new();
        let compactor = planning.history_processor();
        assert!(compactor.check_registered(&planning.toolset()).is_empty());
        assert_eq!(compactor.watched().len(), 3);
    }

    #[test]
    fn context_is_created_once_per_session() {
        let session = Session::new();
        let first = Planning::context(&session).unwrap();
        first.lock().unwrap().create(["A"]);
        let second = Planning::context(&session).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().unwrap().steps().len(), 1);
    }

    #[test]
    fn context_rejects_foreign_slot_value() {
        let session = Session::new();
        session.insert(PLAN_SLOT, "something else");
        assert!(matches!(
            Planning::context(&session),
            Err(SessionError::TypeMismatch { key: PLAN_SLOT, .. })
        ));
    }
}
