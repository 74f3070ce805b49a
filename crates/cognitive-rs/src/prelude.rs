//! Convenience re-exports for common `cognitive-rs` types.
//!
//! ```ignore
//! use cognitive_rs::prelude::*;
//! ```
//!
//! Pulls in message types, the planning and skill capabilities, the history
//! compactor, the tool runtime and the runner. Lower-level pieces (the scan
//! and rebuild passes, skill frontmatter errors) stay in their modules.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{Message, MessageKind, Part, ToolCall, ToolDef, ToolReturn, json_schema_for};

// ── Agent runtime ───────────────────────────────────────────────────
pub use crate::agent::{
    EventHandler, FnEventHandler, FnHistoryProcessor, FnModel, HistoryDump, HistoryProcessor,
    LoggingHandler, Model, ModelFuture, NoopHandler, RunError, RunEvent, RunResult, Runner,
    RunnerConfig, Session, SessionError,
};

// ── Capabilities ────────────────────────────────────────────────────
pub use crate::history::{HistoryCompactor, WatchedTools};
pub use crate::planning::{PlanState, Planning};
pub use crate::skills::Skills;

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{
    FnTool, Tool, ToolContext, ToolError, ToolFuture, ToolSet, ToolSpec, parse_tool_args,
};
