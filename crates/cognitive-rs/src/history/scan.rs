//! Backward redundancy scan: which tool calls have been superseded?
//!
//! Walks the history newest-first. The first call seen for each watched tool
//! name is the live one; every older call of that name is stale and its id
//! goes into the removal set. Identity is the tool name alone: two
//! `plan_create` calls with different arguments still supersede each other.

use super::parts::message_parts;
use crate::tools::names;
use crate::{Message, Part};
use std::collections::HashSet;

/// The set of tool names whose older calls are compacted away.
///
/// Names are compared with exact string equality against
/// [`ToolCall::tool_name`](crate::ToolCall::tool_name). The default set is
/// the three planning tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedTools {
    names: HashSet<String>,
}

impl Default for WatchedTools {
    fn default() -> Self {
        Self::planning()
    }
}

impl WatchedTools {
    /// An empty set. Nothing is ever compacted.
    pub fn none() -> Self {
        Self {
            names: HashSet::new(),
        }
    }

    /// `plan_create`, `plan_mark_step_complete` and `plan_show_progress`.
    pub fn planning() -> Self {
        names::PLANNING_TOOLS.iter().copied().collect()
    }

    /// Add a watched tool name (builder pattern).
    pub fn watch(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Watched names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for WatchedTools {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Collect the call ids of every watched tool call that a later call of the
/// same name supersedes.
///
/// Only `ToolCall` parts are inspected; returns are removed later by id.
/// Calls without an id (absent or empty) are never reported.
pub fn stale_call_ids<'a, I>(history: I, watched: &WatchedTools) -> HashSet<String>
where
    I: IntoIterator<Item = &'a Message>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut found: HashSet<&'a str> = HashSet::new();
    let mut stale: HashSet<String> = HashSet::new();

    for (_, parts) in message_parts(history).rev() {
        for part in parts.iter().rev() {
            match part {
                Part::ToolCall(call) if watched.contains(&call.tool_name) => {
                    if found.insert(call.tool_name.as_str()) {
                        continue;
                    }
                    if let Some(id) = call.call_id() {
                        stale.insert(id.to_string());
                    }
                }
                Part::ToolCall(_)
                | Part::ToolReturn(_)
                | Part::UserPrompt { .. }
                | Part::Text { .. }
                | Part::Unknown(_) => {}
            }
        }
    }

    stale
}
