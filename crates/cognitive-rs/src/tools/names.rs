//! Canonical tool name constants.
//!
//! The tool definitions and the history compactor's watched set both read
//! these constants. Compaction compares names by exact string equality, so a
//! rename here moves both sides together.

pub const PLAN_CREATE: &str = "plan_create";
pub const PLAN_MARK_STEP_COMPLETE: &str = "plan_mark_step_complete";
pub const PLAN_SHOW_PROGRESS: &str = "plan_show_progress";
pub const SKILL_LOAD: &str = "skill_load";

/// The planning tools, in registration order.
pub const PLANNING_TOOLS: [&str; 3] = [PLAN_CREATE, PLAN_MARK_STEP_COMPLETE, PLAN_SHOW_PROGRESS];
