//! [`HistoryCompactor`]: the scan + rebuild pass packaged as a history hook.

use super::rebuild::{rebuild, rebuild_borrowed};
use super::scan::{WatchedTools, stale_call_ids};
use crate::Message;
use crate::agent::hooks::HistoryProcessor;
use crate::tools::core::ToolSet;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::debug;

/// Removes superseded calls of watched tools (and their returns) from a
/// history, keeping only the most recent call of each watched name.
///
/// The pass is pure and idempotent: compacting its own output removes
/// nothing further.
///
/// # Example
///
/// ```
/// use cognitive_rs::history::HistoryCompactor;
/// use cognitive_rs::{Message, Part};
/// use serde_json::json;
///
/// let history = vec![
///     Message::response(vec![Part::tool_call("plan_show_progress", json!({}), "s1")]),
///     Message::request(vec![Part::tool_return("plan_show_progress", "...", "s1")]),
///     Message::response(vec![Part::tool_call("plan_show_progress", json!({}), "s2")]),
/// ];
///
/// let compacted = HistoryCompactor::default().compact(history);
/// assert_eq!(compacted.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HistoryCompactor {
    watched: WatchedTools,
}

impl HistoryCompactor {
    pub fn new(watched: WatchedTools) -> Self {
        Self { watched }
    }

    /// The tool names this compactor watches.
    pub fn watched(&self) -> &WatchedTools {
        &self.watched
    }

    /// Call ids that a compaction of `history` would remove.
    pub fn stale_ids(&self, history: &[Message]) -> HashSet<String> {
        stale_call_ids(history, &self.watched)
    }

    /// Compact an owned history.
    pub fn compact(&self, history: Vec<Message>) -> Vec<Message> {
        let stale = self.stale_ids(&history);
        let before = history.len();
        let compacted = rebuild(history, &stale);
        debug!(
            "History compaction: {} stale call(s), {} -> {} message(s)",
            stale.len(),
            before,
            compacted.len()
        );
        compacted
    }

    /// Compact a borrowed history. Untouched messages come back borrowed.
    pub fn compact_borrowed<'a>(&self, history: &'a [Message]) -> Vec<Cow<'a, Message>> {
        let stale = self.stale_ids(history);
        rebuild_borrowed(history, &stale)
    }

    /// Watched names that `tools` does not register.
    ///
    /// Compaction matches tool names by exact string equality, so a watched
    /// name with no registered tool means the dispatcher and this compactor
    /// have drifted apart and the renamed tool is no longer compacted.
    pub fn check_registered<'a>(&'a self, tools: &ToolSet) -> Vec<&'a str> {
        self.watched
            .names()
            .into_iter()
            .filter(|name| !tools.contains(name))
            .collect()
    }
}

impl HistoryProcessor for HistoryCompactor {
    fn name(&self) -> &str {
        "history_compactor"
    }

    fn process(&self, history: Vec<Message>) -> Vec<Message> {
        self.compact(history)
    }
}
