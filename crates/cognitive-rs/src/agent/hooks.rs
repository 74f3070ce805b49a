//! History hooks run before every model call.
//!
//! A [`HistoryProcessor`] receives the full conversation history and returns
//! the history the model should see for the upcoming call. The
//! [`Runner`](super::runner::Runner) applies its processors in registration
//! order to a copy of the stored history, so a processor can drop or reshape
//! messages without losing anything from the run's own record.
//!
//! | Processor | Use case |
//! |-----------|----------|
//! | [`HistoryCompactor`](crate::history::HistoryCompactor) | Drop superseded plan tool calls |
//! | [`HistoryDump`] | Log a readable dump of what the model is about to see |
//! | [`FnHistoryProcessor`] | Quick closures |

use crate::{Message, MessageKind, Part};
use std::fmt::Write as _;
use tracing::{debug, info};

// ── HistoryProcessor trait ─────────────────────────────────────────

/// Transforms the history before a model call.
///
/// Implementations must be pure with respect to the history: the same input
/// gives the same output, and nothing outside the returned vector changes.
///
/// # Example
///
/// ```ignore
/// struct KeepLast(usize);
///
/// impl HistoryProcessor for KeepLast {
///     fn name(&self) -> &str { "keep_last" }
///
///     fn process(&self, mut history: Vec<Message>) -> Vec<Message> {
///         let cut = history.len().saturating_sub(self.0);
///         history.split_off(cut)
///     }
/// }
/// ```
pub trait HistoryProcessor: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Return the history the model should see.
    fn process(&self, history: Vec<Message>) -> Vec<Message>;
}

/// Apply `processors` in order.
pub fn apply_processors(
    processors: &[&dyn HistoryProcessor],
    mut history: Vec<Message>,
) -> Vec<Message> {
    for processor in processors {
        let before = history.len();
        history = processor.process(history);
        debug!(
            "History processor {}: {} -> {} message(s)",
            processor.name(),
            before,
            history.len()
        );
    }
    history
}

// ── FnHistoryProcessor ─────────────────────────────────────────────

/// A history processor backed by a closure.
///
/// ```ignore
/// let drop_empty = FnHistoryProcessor::new("drop_empty", |history| {
///     history.into_iter().filter(|m| !m.parts.is_empty()).collect()
/// });
/// ```
pub struct FnHistoryProcessor<F>
where
    F: Fn(Vec<Message>) -> Vec<Message> + Send + Sync,
{
    name: String,
    f: F,
}

impl<F> FnHistoryProcessor<F>
where
    F: Fn(Vec<Message>) -> Vec<Message> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> HistoryProcessor for FnHistoryProcessor<F>
where
    F: Fn(Vec<Message>) -> Vec<Message> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, history: Vec<Message>) -> Vec<Message> {
        (self.f)(history)
    }
}

// ── HistoryDump ────────────────────────────────────────────────────

/// Logs a readable dump of the history at INFO level and passes it through
/// unchanged. Register it after a compactor to see what the model receives.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryDump;

impl HistoryProcessor for HistoryDump {
    fn name(&self) -> &str {
        "history_dump"
    }

    fn process(&self, history: Vec<Message>) -> Vec<Message> {
        info!("{}", render_history(&history));
        history
    }
}

fn role_label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Request => "USER (or Tool Return)",
        MessageKind::Response => "MODEL",
    }
}

fn id_label(id: Option<&String>) -> &str {
    id.map(String::as_str).unwrap_or("None")
}

/// Render `history` as a human-readable dump.
///
/// ```text
/// ==================== HISTORY DUMP (2 messages) ====================
///
/// [0] USER (or Tool Return) (timestamp: 2025-01-01 12:00:00 UTC):
///   User Prompt: Start
///
/// [1] MODEL (timestamp: 2025-01-01 12:00:00 UTC):
///   Tool Call: plan_create({"steps":["A"]}) [ID: c1]
/// ============================================================
/// ```
pub fn render_history(history: &[Message]) -> String {
    let bar = "=".repeat(20);
    let mut out = format!("{bar} HISTORY DUMP ({} messages) {bar}\n", history.len());
    for (i, message) in history.iter().enumerate() {
        let _ = writeln!(
            out,
            "\n[{i}] {} (timestamp: {}):",
            role_label(message.kind),
            message.timestamp
        );
        for part in &message.parts {
            let _ = match part {
                Part::UserPrompt { content, .. } => writeln!(out, "  User Prompt: {content}"),
                Part::Text { content, .. } => writeln!(out, "  Text: {content}"),
                Part::ToolCall(call) => writeln!(
                    out,
                    "  Tool Call: {}({}) [ID: {}]",
                    call.tool_name,
                    call.args_json(),
                    id_label(call.tool_call_id.as_ref())
                ),
                Part::ToolReturn(ret) => writeln!(
                    out,
                    "  Tool Return: {} [ID: {}]\n    Result: {}",
                    ret.tool_name,
                    id_label(ret.tool_call_id.as_ref()),
                    ret.content_text()
                ),
                Part::Unknown(raw) => writeln!(out, "  Unknown Part: {raw}"),
            };
        }
    }
    out.push_str(&"=".repeat(60));
    out
}
