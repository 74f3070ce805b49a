//! Tool abstractions for LLM function-calling agents.
//!
//! Every agent capability is a [`Tool`] trait implementor. Tools are
//! collected into a [`ToolSet`] which handles dispatch, validation,
//! truncation, and timeouts.
//!
//! # Defining tools
//!
//! - **[`FnTool`]** — closure-based, auto-parses arguments. Best for stateless tools.
//! - **`impl Tool`** — full struct with manual [`Tool::definition()`] and
//!   [`Tool::execute()`]. Needed for tools that read per-session state
//!   through the [`ToolContext`].
//!
//! # Submodules
//!
//! - [`core`] — [`Tool`] trait, [`ToolSet`], [`FnTool`], [`ToolError`].
//! - [`spec`] — [`ToolSpec`](spec::ToolSpec) builder for structured tool
//!   descriptions with `when_to_use` / `when_not_to_use` guidance.
//! - [`names`] — the tool name constants shared by the planning tools,
//!   the skill tool and the history compactor.

pub mod core;
pub mod names;
pub mod spec;

pub use core::{FnTool, Tool, ToolContext, ToolError, ToolFuture, ToolSet};
pub use core::{
    DEFAULT_MAX_RESULT_BYTES, parse_tool_args, truncate_result, validate_tool_arguments,
};
pub use spec::ToolSpec;
