//! History compaction for tool-using conversations.
//!
//! Some tools are called repeatedly and only their latest call matters: a
//! second `plan_create` replaces the first plan, and yesterday's
//! `plan_show_progress` output is wrong today. Leaving the old pairs in the
//! transcript wastes context and can mislead the model. This module removes
//! them in one pure, O(n) pass that runs before every model call:
//!
//! 1. **[`parts`]** — [`message_parts`] enumerates `(message, parts)` pairs,
//!    forwards or reversed.
//! 2. **[`scan`]** — [`stale_call_ids`] walks the history backwards and
//!    collects the ids of every watched call superseded by a later call of
//!    the same name.
//! 3. **[`rebuild`]** — [`rebuild()`](rebuild::rebuild) walks forwards and
//!    drops each call *and* return carrying a stale id, dropping messages
//!    left empty and reusing messages left untouched.
//!
//! [`HistoryCompactor`] packages the pass as a
//! [`HistoryProcessor`](crate::agent::hooks::HistoryProcessor) for the
//! [`Runner`](crate::agent::runner::Runner).

pub mod compactor;
pub mod parts;
pub mod rebuild;
pub mod scan;

pub use compactor::HistoryCompactor;
pub use parts::{MessageParts, message_parts};
pub use scan::{WatchedTools, stale_call_ids};
