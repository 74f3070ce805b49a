//! Events and handlers for the [`Runner`](super::runner::Runner).
//!
//! The runner reports progress through [`RunEvent`] variants covering one
//! run from round start through history processing and tool execution to
//! completion. Callers implement [`EventHandler`] to observe them.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget runs |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | Custom `impl EventHandler` | Full control |

use tracing::{debug, info, trace};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the runner during a run.
#[derive(Debug, Clone, Copy)]
pub enum RunEvent<'a> {
    /// A new round is starting.
    RoundStart { round: u32, max_rounds: u32 },
    /// The history processors ran; `before` stored messages became `after`
    /// messages sent to the model.
    HistoryProcessed { before: usize, after: usize },
    /// The model returned text (may be alongside tool calls).
    Text(&'a str),
    /// A single tool is about to be executed.
    ToolExecuting {
        name: &'a str,
        call_id: Option<&'a str>,
        arguments: &'a str,
    },
    /// A single tool finished executing.
    ToolResult {
        name: &'a str,
        call_id: Option<&'a str>,
        result: &'a str,
    },
    /// The model answered without tool calls.
    Finished { rounds_used: u32 },
    /// The run hit the round limit without finishing.
    RoundLimitReached { max_rounds: u32 },
}

/// Handler for runner events.
///
/// # Example
///
/// ```ignore
/// struct PrintText;
///
/// impl EventHandler for PrintText {
///     fn on_event(&self, event: &RunEvent<'_>) {
///         if let RunEvent::Text(text) = event {
///             println!("{text}");
///         }
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    /// Called for each event during the run.
    fn on_event(&self, event: &RunEvent<'_>) {
        let _ = event;
    }
}

/// An event handler that ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let RunEvent::ToolResult { name, .. } = event {
///         println!("{name} done");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&RunEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&RunEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&RunEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &RunEvent<'_>) {
        (self.0)(event)
    }
}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &RunEvent<'_>) {
        match event {
            RunEvent::RoundStart { round, max_rounds } => {
                info!("[round {round}/{max_rounds}]");
            }
            RunEvent::HistoryProcessed { before, after } => {
                if before != after {
                    debug!("History processed: {before} -> {after} message(s)");
                }
            }
            RunEvent::Text(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "Model text: {preview}{}",
                    if text.chars().count() > 200 { "..." } else { "" }
                );
            }
            RunEvent::ToolExecuting { name, call_id, .. } => {
                debug!("Executing tool: {name} [{}]", call_id.unwrap_or("-"));
            }
            RunEvent::ToolResult { name, result, .. } => {
                debug!("Tool {name} result: {} bytes", result.len());
                trace!("Tool {name} result: {result}");
            }
            RunEvent::Finished { rounds_used } => {
                info!("Agent finished after {rounds_used} round(s)");
            }
            RunEvent::RoundLimitReached { max_rounds } => {
                info!("Agent hit round limit ({max_rounds})");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn fn_event_handler_receives_events() {
        let seen = Mutex::new(Vec::new());
        let handler = FnEventHandler::new(|event: &RunEvent<'_>| {
            seen.lock().unwrap().push(format!("{event:?}"));
        });
        handler.on_event(&RunEvent::RoundStart {
            round: 1,
            max_rounds: 3,
        });
        handler.on_event(&RunEvent::Finished { rounds_used: 1 });
        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("RoundStart"));
    }

    #[test]
    fn logging_and_noop_accept_every_event() {
        let events = [
            RunEvent::RoundStart {
                round: 1,
                max_rounds: 2,
            },
            RunEvent::HistoryProcessed {
                before: 17,
                after: 8,
            },
            RunEvent::Text("hello"),
            RunEvent::ToolExecuting {
                name: "plan_show_progress",
                call_id: Some("c1"),
                arguments: "{}",
            },
            RunEvent::ToolResult {
                name: "plan_show_progress",
                call_id: None,
                result: "No plan created yet.",
            },
            RunEvent::Finished { rounds_used: 1 },
            RunEvent::RoundLimitReached { max_rounds: 2 },
        ];
        for event in &events {
            LoggingHandler.on_event(event);
            NoopHandler.on_event(event);
        }
    }
}
