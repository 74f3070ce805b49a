//! Forward rebuild: drop stale call/return parts, keep everything else.
//!
//! Per message, exactly one of three things happens:
//!
//! - every part survives → the original message is reused as-is,
//! - some parts survive → a copy with the same kind and timestamp carries them,
//! - nothing survives → the message is dropped.
//!
//! Surviving messages keep their relative order. Content is never merged
//! across messages.

use super::parts::message_parts;
use crate::{Message, Part};
use std::borrow::Cow;
use std::collections::HashSet;

/// What the rebuild does with one message.
#[derive(Debug)]
enum Filtered {
    Dropped,
    Unchanged,
    Reduced(Vec<Part>),
}

fn is_stale(part: &Part, stale: &HashSet<String>) -> bool {
    match part {
        Part::ToolCall(call) => call.call_id().is_some_and(|id| stale.contains(id)),
        Part::ToolReturn(ret) => ret.call_id().is_some_and(|id| stale.contains(id)),
        Part::UserPrompt { .. } | Part::Text { .. } | Part::Unknown(_) => false,
    }
}

fn filter_parts(parts: &[Part], stale: &HashSet<String>) -> Filtered {
    let kept: Vec<&Part> = parts.iter().filter(|p| !is_stale(p, stale)).collect();
    if kept.is_empty() {
        Filtered::Dropped
    } else if kept.len() == parts.len() {
        Filtered::Unchanged
    } else {
        Filtered::Reduced(kept.into_iter().cloned().collect())
    }
}

/// Rebuild an owned history without the stale parts.
///
/// Unchanged messages are moved through untouched.
pub fn rebuild(history: Vec<Message>, stale: &HashSet<String>) -> Vec<Message> {
    if stale.is_empty() {
        // Only messages that were already empty can disappear.
        return history.into_iter().filter(|m| !m.parts.is_empty()).collect();
    }

    let outcomes: Vec<Filtered> = message_parts(&history)
        .map(|(_, parts)| filter_parts(parts, stale))
        .collect();

    history
        .into_iter()
        .zip(outcomes)
        .filter_map(|(message, outcome)| match outcome {
            Filtered::Dropped => None,
            Filtered::Unchanged => Some(message),
            Filtered::Reduced(parts) => Some(message.with_parts(parts)),
        })
        .collect()
}

/// Rebuild a borrowed history without the stale parts.
///
/// Unchanged messages come back as `Cow::Borrowed`, so callers can tell
/// which messages were rebuilt and which are the originals.
pub fn rebuild_borrowed<'a>(
    history: &'a [Message],
    stale: &HashSet<String>,
) -> Vec<Cow<'a, Message>> {
    message_parts(history)
        .filter_map(|(message, parts)| match filter_parts(parts, stale) {
            Filtered::Dropped => None,
            Filtered::Unchanged => Some(Cow::Borrowed(message)),
            Filtered::Reduced(parts) => Some(Cow::Owned(message.with_parts(parts))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stale(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drops_messages_left_empty() {
        let history = vec![
            Message::user("start"),
            Message::response(vec![Part::tool_call("plan_create", json!({}), "c1")]),
            Message::request(vec![Part::tool_return("plan_create", "ok", "c1")]),
        ];
        let out = rebuild(history, &stale(&["c1"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].parts, vec![Part::user_prompt("start")]);
    }

    #[test]
    fn partial_removal_keeps_remaining_parts_in_order() {
        let original = Message::response(vec![
            Part::text("thinking"),
            Part::tool_call("plan_show_progress", json!({}), "s1"),
            Part::Unknown(json!({"part_kind": "thinking", "content": "hmm"})),
        ]);
        let out = rebuild(vec![original.clone()], &stale(&["s1"]));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, original.kind);
        assert_eq!(out[0].timestamp, original.timestamp);
        assert_eq!(
            out[0].parts,
            vec![
                Part::text("thinking"),
                Part::Unknown(json!({"part_kind": "thinking", "content": "hmm"})),
            ]
        );
    }

    #[test]
    fn borrowed_reuses_untouched_messages() {
        let history = vec![
            Message::user("start"),
            Message::response(vec![
                Part::text("thinking"),
                Part::tool_call("plan_show_progress", json!({}), "s1"),
            ]),
        ];
        let out = rebuild_borrowed(&history, &stale(&["s1"]));
        assert_eq!(out.len(), 2);
        match &out[0] {
            Cow::Borrowed(m) => assert!(std::ptr::eq(*m, &history[0])),
            Cow::Owned(_) => panic!("untouched message should be borrowed"),
        }
        assert!(matches!(out[1], Cow::Owned(_)));
        assert_eq!(out[1].parts, vec![Part::text("thinking")]);
    }

    #[test]
    fn non_stale_calls_and_returns_survive() {
        let history = vec![
            Message::response(vec![Part::tool_call("plan_create", json!({}), "c2")]),
            Message::request(vec![Part::tool_return("plan_create", "ok", "c2")]),
        ];
        let out = rebuild(history.clone(), &stale(&["c1"]));
        assert_eq!(out, history);
    }

    #[test]
    fn relative_order_is_preserved() {
        let history: Vec<Message> = (0..6)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("u{i}"))
                } else {
                    Message::response(vec![Part::tool_call("plan_show_progress", json!({}), format!("s{i}"))])
                }
            })
            .collect();
        let out = rebuild(history, &stale(&["s1", "s3"]));
        let texts: Vec<String> = out
            .iter()
            .map(|m| match &m.parts[0] {
                Part::UserPrompt { content, .. } => content.clone(),
                Part::ToolCall(c) => c.tool_call_id.clone().unwrap_or_default(),
                other => panic!("unexpected part {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["u0", "u2", "u4", "s5"]);
    }

    #[test]
    fn empty_stale_set_only_drops_already_empty_messages() {
        let history = vec![Message::user("a"), Message::request(vec![])];
        assert_eq!(rebuild(history.clone(), &HashSet::new()).len(), 1);
        assert_eq!(rebuild_borrowed(&history, &HashSet::new()).len(), 1);
    }
}
