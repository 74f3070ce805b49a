//! The three plan tools: `plan_create`, `plan_mark_step_complete`,
//! `plan_show_progress`.
//!
//! Each tool locks the session's [`PlanState`](super::PlanState) for the
//! duration of one operation. Bad arguments come back as text; a corrupt
//! session slot is a [`ToolError::Fatal`].

use super::{PLANNING_INSTRUCTIONS, Planning};
use crate::ToolDef;
use crate::tools::core::{Tool, ToolContext, ToolError, ToolFuture, parse_tool_args};
use crate::tools::names;
use crate::tools::spec::ToolSpec;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

#[derive(Deserialize, JsonSchema)]
struct PlanCreateArgs {
    /// Step descriptions, in execution order.
    steps: Vec<String>,
}

#[derive(Deserialize, JsonSchema)]
struct PlanMarkStepCompleteArgs {
    /// Id of the step to mark complete (1-based).
    step_id: i64,
}

#[derive(Deserialize, JsonSchema)]
struct PlanShowProgressArgs {}

/// Run `op` against the session's plan.
fn with_plan<T>(
    ctx: &ToolContext<'_>,
    op: impl FnOnce(&mut super::PlanState) -> T,
) -> Result<T, ToolError> {
    let plan = Planning::context(ctx.session)?;
    let mut plan = plan.lock().unwrap_or_else(|e| e.into_inner());
    Ok(op(&mut plan))
}

// ── plan_create ────────────────────────────────────────────────────

/// Replace the session's plan with a new list of steps.
pub struct PlanCreate;

impl Tool for PlanCreate {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(names::PLAN_CREATE)
            .purpose("Create a new plan with the given steps. Use this to initialize the plan")
            .when_to_use("At the start of every request, before doing any other work")
            .when_not_to_use(
                "To record progress on an existing plan; use plan_mark_step_complete instead",
            )
            .parameters_for::<PlanCreateArgs>()
            .example(
                r#"plan_create(steps=["Research", "Draft", "Review"])"#,
                "The new plan with every step unchecked",
            )
            .output_format("'Current Plan:' followed by one '[ ] N. step' line per step")
            .note(PLANNING_INSTRUCTIONS)
            .to_tool_def()
    }

    fn execute<'a>(&'a self, ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
        Box::pin(async move {
            let args: PlanCreateArgs = match parse_tool_args(arguments) {
                Ok(a) => a,
                Err(e) => return Ok(e),
            };
            debug!("Creating plan with {} step(s)", args.steps.len());
            with_plan(&ctx, |plan| plan.create(args.steps))
        })
    }
}

// ── plan_mark_step_complete ────────────────────────────────────────

/// Mark one step of the session's plan complete.
pub struct PlanMarkStepComplete;

impl Tool for PlanMarkStepComplete {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(names::PLAN_MARK_STEP_COMPLETE)
            .purpose("Mark a step as complete by its ID")
            .when_to_use("Right after finishing a step of the current plan")
            .when_not_to_use("Before the step's work is actually done")
            .parameters_for::<PlanMarkStepCompleteArgs>()
            .example(
                "plan_mark_step_complete(step_id=1)",
                "The plan with step 1 checked",
            )
            .output_format("The updated plan, or 'Step N not found.'")
            .to_tool_def()
    }

    fn execute<'a>(&'a self, ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
        Box::pin(async move {
            let args: PlanMarkStepCompleteArgs = match parse_tool_args(arguments) {
                Ok(a) => a,
                Err(e) => return Ok(e),
            };
            with_plan(&ctx, |plan| plan.mark_step_complete(args.step_id))
        })
    }
}

// ── plan_show_progress ─────────────────────────────────────────────

/// Render the session's plan.
pub struct PlanShowProgress;

impl Tool for PlanShowProgress {
    fn definition(&self) -> ToolDef {
        ToolSpec::builder(names::PLAN_SHOW_PROGRESS)
            .purpose("Show the current progress of the plan")
            .when_to_use("To check which steps remain before choosing what to do next")
            .when_not_to_use("To change the plan; use plan_create or plan_mark_step_complete")
            .parameters_for::<PlanShowProgressArgs>()
            .output_format("The plan with [x] / [ ] markers, or 'No plan created yet.'")
            .to_tool_def()
    }

    fn execute<'a>(&'a self, ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
        Box::pin(async move {
            if let Err(e) = parse_tool_args::<PlanShowProgressArgs>(arguments) {
                return Ok(e);
            }
            with_plan(&ctx, |plan| plan.show_progress())
        })
    }
}
