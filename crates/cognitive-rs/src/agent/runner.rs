//! The agentic tool-use loop.
//!
//! The [`Runner`] sends the (processed) history plus tool definitions to a
//! [`Model`], executes any returned tool calls via the [`ToolSet`], appends
//! the results, and repeats until the model answers without tool calls or
//! the round limit is reached.
//!
//! History processors only shape what the model sees for one call. The
//! runner's stored history, returned in [`RunResult::history`], always keeps
//! every message.

use super::config::RunnerConfig;
use super::events::{EventHandler, NoopHandler, RunEvent};
use super::hooks::{HistoryProcessor, apply_processors};
use super::session::Session;
use crate::history::HistoryCompactor;
use crate::tools::core::{ToolContext, ToolError, ToolSet};
use crate::{Message, MessageKind, Part, ToolCall, ToolDef, ToolReturn};
use futures::future::BoxFuture;
use tracing::{info, warn};

// ── Model ──────────────────────────────────────────────────────────

/// Boxed future returned by [`Model::complete`].
pub type ModelFuture<'a> = BoxFuture<'a, Result<Message, String>>;

/// The language model behind a run.
///
/// Implementations turn a history and the available tool definitions into
/// the next `Response` message.
pub trait Model: Send + Sync {
    fn complete<'a>(&'a self, history: &'a [Message], tools: &'a [ToolDef]) -> ModelFuture<'a>;
}

/// Type-erased handler for [`FnModel`].
type ModelHandler = Box<dyn Fn(&[Message], &[ToolDef]) -> Result<Message, String> + Send + Sync>;

/// A model backed by a synchronous closure. Useful for scripted runs and tests.
///
/// ```ignore
/// let model = FnModel::new(|history, _tools| {
///     Ok(Message::text(format!("{} message(s) so far", history.len())))
/// });
/// ```
pub struct FnModel {
    handler: ModelHandler,
}

impl FnModel {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Message], &[ToolDef]) -> Result<Message, String> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(f),
        }
    }
}

impl Model for FnModel {
    fn complete<'a>(&'a self, history: &'a [Message], tools: &'a [ToolDef]) -> ModelFuture<'a> {
        let result = (self.handler)(history, tools);
        Box::pin(async move { result })
    }
}

// ── Results ────────────────────────────────────────────────────────

/// A run that could not complete.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("model error: {0}")]
    Model(String),
    #[error(transparent)]
    Tool(#[from] ToolError),
}

/// Outcome of a finished or round-limited run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Every message of the run, unprocessed.
    pub history: Vec<Message>,
    /// Number of model calls made.
    pub rounds_used: u32,
    /// Whether the model answered without tool calls before the round limit.
    pub finished: bool,
}

impl RunResult {
    /// Text of the last model response.
    pub fn text(&self) -> String {
        self.history
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Response)
            .map(Message::text_content)
            .unwrap_or_default()
    }
}

// ── Runner ─────────────────────────────────────────────────────────

/// Drives one session's conversation.
///
/// ```ignore
/// let planning = Planning::new();
/// let tools = planning.toolset();
/// let compactor = planning.history_processor();
///
/// let result = Runner::new(&model, &tools, RunnerConfig::default())
///     .with_compactor(&compactor)
///     .with_event_handler(&LoggingHandler)
///     .run(&session, vec![Message::user("Plan a trip")])
///     .await?;
/// ```
///
/// `Runner<'a>` borrows the model, tools, processors and handler; bind them
/// to `let` bindings before building the runner.
pub struct Runner<'a> {
    model: &'a dyn Model,
    tools: &'a ToolSet,
    processors: Vec<&'a dyn HistoryProcessor>,
    event_handler: &'a dyn EventHandler,
    config: RunnerConfig,
}

impl<'a> Runner<'a> {
    pub fn new(model: &'a dyn Model, tools: &'a ToolSet, config: RunnerConfig) -> Self {
        Self {
            model,
            tools,
            processors: Vec::new(),
            event_handler: &NoopHandler,
            config,
        }
    }

    /// Append a history processor. Processors run in registration order.
    pub fn with_processor(mut self, processor: &'a dyn HistoryProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    /// Append a compactor, warning about watched names this runner's tool
    /// set does not register.
    pub fn with_compactor(self, compactor: &'a HistoryCompactor) -> Self {
        for name in compactor.check_registered(self.tools) {
            warn!("Compactor watches '{name}' but no tool with that name is registered");
        }
        self.with_processor(compactor)
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run the loop, starting from `history`.
    pub async fn run(&self, session: &Session, mut history: Vec<Message>) -> Result<RunResult, RunError> {
        let defs = self.tools.definitions();
        let max_rounds = self.config.max_rounds;
        let mut rounds_used = 0;
        let mut finished = false;

        info!(
            "Run started: session={}, tools={}, processors={}",
            session.id(),
            defs.len(),
            self.processors.len()
        );

        for round in 0..max_rounds {
            rounds_used = round + 1;
            self.event_handler.on_event(&RunEvent::RoundStart {
                round: rounds_used,
                max_rounds,
            });

            let processed = apply_processors(&self.processors, history.clone());
            self.event_handler.on_event(&RunEvent::HistoryProcessed {
                before: history.len(),
                after: processed.len(),
            });

            let response = self
                .model
                .complete(&processed, &defs)
                .await
                .map_err(RunError::Model)?;

            let text = response.text_content();
            if !text.is_empty() {
                self.event_handler.on_event(&RunEvent::Text(&text));
            }

            let calls: Vec<ToolCall> = response.tool_calls().cloned().collect();
            history.push(response);

            if calls.is_empty() {
                finished = true;
                self.event_handler.on_event(&RunEvent::Finished { rounds_used });
                break;
            }

            let returns = self.execute_calls(session, &calls).await?;
            history.push(Message::request(returns));
        }

        if !finished {
            self.event_handler
                .on_event(&RunEvent::RoundLimitReached { max_rounds });
        }

        Ok(RunResult {
            history,
            rounds_used,
            finished,
        })
    }

    /// Execute `calls` and return one `ToolReturn` part per call, in call order.
    async fn execute_calls(&self, session: &Session, calls: &[ToolCall]) -> Result<Vec<Part>, RunError> {
        let args: Vec<String> = calls.iter().map(ToolCall::args_json).collect();

        for (call, arguments) in calls.iter().zip(&args) {
            self.event_handler.on_event(&RunEvent::ToolExecuting {
                name: &call.tool_name,
                call_id: call.call_id(),
                arguments,
            });
        }

        let results: Vec<Result<String, ToolError>> = if self.config.parallel_tool_calls && calls.len() > 1 {
            let futures: Vec<_> = calls
                .iter()
                .zip(&args)
                .map(|(call, arguments)| {
                    let ctx = ToolContext::new(session).with_call_id(call.call_id());
                    self.tools.execute(ctx, &call.tool_name, arguments)
                })
                .collect();
            futures::future::join_all(futures).await
        } else {
            let mut results = Vec::with_capacity(calls.len());
            for (call, arguments) in calls.iter().zip(&args) {
                let ctx = ToolContext::new(session).with_call_id(call.call_id());
                let result = self.tools.execute(ctx, &call.tool_name, arguments).await;
                let failed = result.is_err();
                results.push(result);
                if failed {
                    break;
                }
            }
            results
        };

        let mut parts = Vec::with_capacity(calls.len());
        for (call, result) in calls.iter().zip(results) {
            let content = result?;
            self.event_handler.on_event(&RunEvent::ToolResult {
                name: &call.tool_name,
                call_id: call.call_id(),
                result: &content,
            });
            parts.push(Part::ToolReturn(ToolReturn::new(
                call.tool_name.clone(),
                content,
                call.tool_call_id.clone(),
            )));
        }
        Ok(parts)
    }
}
