//! Tool abstraction for LLM function-calling agents.
//!
//! The [`Tool`] trait defines the interface that every tool must implement:
//! a static API definition (name, description, JSON schema) and an async
//! `execute` method. Tools are collected into a [`ToolSet`] which handles
//! dispatch, definition export, argument validation and result truncation.
//!
//! Tools report everything the model should see as `Ok(text)`, including
//! recoverable failures such as bad arguments or a missing step. `Err` is
//! reserved for [`ToolError`]s that must abort the run.

use crate::ToolDef;
use crate::agent::session::{Session, SessionError};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use tracing::{debug, info, trace};

/// Maximum size (in bytes) for tool output before truncation.
pub const DEFAULT_MAX_RESULT_BYTES: usize = 30_000;

/// Boxed future returned by [`Tool::execute`].
pub type ToolFuture<'a> = BoxFuture<'a, Result<String, ToolError>>;

/// A failure that must not be handed to the model as ordinary text.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// Per-session state is corrupt; the run cannot continue.
    #[error("fatal: {0}")]
    Fatal(#[from] SessionError),
}

/// What a tool sees of the run that invoked it.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// The session whose state the tool reads and mutates.
    pub session: &'a Session,
    /// Id of the tool call being executed, if the model supplied one.
    pub call_id: Option<&'a str>,
}

impl<'a> ToolContext<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            call_id: None,
        }
    }

    pub fn with_call_id(mut self, call_id: Option<&'a str>) -> Self {
        self.call_id = call_id;
        self
    }
}

// ── Tool trait ─────────────────────────────────────────────────────

/// A tool that an LLM agent can invoke via function-calling.
///
/// # Example
///
/// ```ignore
/// struct ShowProgress;
///
/// impl Tool for ShowProgress {
///     fn definition(&self) -> ToolDef { /* ... */ }
///
///     fn execute<'a>(&'a self, ctx: ToolContext<'a>, _arguments: &'a str) -> ToolFuture<'a> {
///         Box::pin(async move {
///             let plan = Planning::context(ctx.session)?;
///             let plan = plan.lock().unwrap_or_else(|e| e.into_inner());
///             Ok(plan.show_progress())
///         })
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The tool definition sent to the model.
    fn definition(&self) -> ToolDef;

    /// Execute the tool with the given raw JSON arguments string.
    ///
    /// Errors the model can act on are returned as `Ok("Error: ...")`
    /// strings; the runner passes them back as a tool return regardless.
    fn execute<'a>(&'a self, ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a>;

    /// The tool's name, taken from the definition.
    fn name(&self) -> String {
        self.definition().function.name.clone()
    }
}

// ── ToolSet ────────────────────────────────────────────────────────

/// Default timeout for tool execution (60 seconds).
pub const DEFAULT_TOOL_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(60);

/// A collection of tools that can be dispatched by name.
///
/// # Example
///
/// ```ignore
/// let tools = Planning::new()
///     .toolset()
///     .merge(skills.toolset())
///     .with(add_tool)
///     .with_arg_validation(true);
///
/// let defs = tools.definitions();
/// ```
pub struct ToolSet {
    tools: BTreeMap<String, Box<dyn Tool>>,
    max_result_bytes: usize,
    /// Whether to validate tool arguments against JSON Schema before execution.
    validate_args: bool,
    /// Default timeout for tool execution. `None` disables timeouts.
    default_timeout: Option<std::time::Duration>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("max_result_bytes", &self.max_result_bytes)
            .finish()
    }
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            max_result_bytes: DEFAULT_MAX_RESULT_BYTES,
            validate_args: false,
            default_timeout: None,
        }
    }

    /// Set the maximum result size in bytes before truncation.
    pub fn with_max_result_bytes(mut self, max: usize) -> Self {
        self.max_result_bytes = max;
        self
    }

    /// Enable JSON Schema argument validation before tool execution.
    pub fn with_arg_validation(mut self, enabled: bool) -> Self {
        self.validate_args = enabled;
        self
    }

    /// Set a default timeout for tool execution. Pass `None` to disable.
    pub fn with_default_timeout(mut self, timeout: Option<std::time::Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.register_boxed(Box::new(tool));
    }

    fn register_boxed(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name.clone(), tool).is_some() {
            debug!("Tool '{name}' re-registered, replacing the previous definition");
        }
    }

    /// Register a tool (builder pattern).
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.register(tool);
        self
    }

    /// Conditionally register a tool (builder pattern).
    pub fn with_if(self, condition: bool, tool: impl Tool + 'static) -> Self {
        if condition { self.with(tool) } else { self }
    }

    /// Move every tool from `other` into this set. Tools in `other` win on
    /// name clashes; this set's limits and validation settings are kept.
    pub fn merge(mut self, other: ToolSet) -> Self {
        for (_, tool) in other.tools {
            self.register_boxed(tool);
        }
        self
    }

    /// Return all tool definitions, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDef> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Whether a tool with this exact name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call by name, with optional validation, timing, and
    /// truncation.
    ///
    /// Unknown tools, invalid arguments and timeouts come back as `Ok`
    /// error strings so the model can self-correct. Only a tool's own
    /// [`ToolError`] is propagated.
    pub async fn execute(
        &self,
        ctx: ToolContext<'_>,
        name: &str,
        arguments: &str,
    ) -> Result<String, ToolError> {
        let tool = match self.tools.get(name) {
            Some(t) => t,
            None => return Ok(format!("Error: unknown tool '{name}'")),
        };

        if self.validate_args
            && let Some(error) = validate_tool_arguments(tool.as_ref(), arguments)
        {
            return Ok(error);
        }

        log_tool_call(name, arguments);
        let start = std::time::Instant::now();

        let result = if let Some(timeout_duration) = self.default_timeout {
            match tokio::time::timeout(timeout_duration, tool.execute(ctx, arguments)).await {
                Ok(r) => r?,
                Err(_) => {
                    info!(
                        "Tool {name} timed out after {:.1}s",
                        timeout_duration.as_secs_f64(),
                    );
                    format!(
                        "Error: tool '{name}' timed out after {:.0} seconds.",
                        timeout_duration.as_secs_f64(),
                    )
                }
            }
        } else {
            tool.execute(ctx, arguments).await?
        };

        let elapsed = start.elapsed();
        debug!(
            "Tool {name} completed in {:.0}ms ({} bytes)",
            elapsed.as_secs_f64() * 1000.0,
            result.len()
        );
        trace!("Tool {name} result: {result}");

        Ok(truncate_result(result, self.max_result_bytes))
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::new()
    }
}

// ── FnTool ────────────────────────────────────────────────────────

/// Type-erased async handler for [`FnTool`].
type ErasedToolHandler = Box<dyn Fn(String) -> BoxFuture<'static, String> + Send + Sync>;

/// A closure-based tool that auto-parses arguments and delegates to a handler.
///
/// Use [`FnTool`] for stateless tools. Tools that need per-session state
/// (like the plan tools) implement [`Tool`] directly and read it from the
/// [`ToolContext`].
///
/// # Example
///
/// ```ignore
/// #[derive(Deserialize, JsonSchema)]
/// struct AddArgs {
///     a: i64,
///     b: i64,
/// }
///
/// let add = FnTool::new(
///     ToolDef::new("add", "Add two integers", json_schema_for::<AddArgs>()),
///     |args: AddArgs| async move { (args.a + args.b).to_string() },
/// );
/// ```
pub struct FnTool {
    def: ToolDef,
    handler: ErasedToolHandler,
}

impl FnTool {
    /// Create a new closure-based tool.
    ///
    /// The handler receives parsed arguments of type `A` (auto-deserialized
    /// from the raw JSON string). Parse errors are formatted for the model.
    pub fn new<A, F, Fut>(def: ToolDef, handler: F) -> Self
    where
        A: serde::de::DeserializeOwned + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = String> + Send + 'static,
    {
        let erased = move |raw: String| -> BoxFuture<'static, String> {
            match parse_tool_args::<A>(&raw) {
                Ok(args) => Box::pin(handler(args)),
                Err(e) => Box::pin(async move { e }),
            }
        };

        Self {
            def,
            handler: Box::new(erased),
        }
    }
}

impl Tool for FnTool {
    fn definition(&self) -> ToolDef {
        self.def.clone()
    }

    fn execute<'a>(&'a self, _ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
        let fut = (self.handler)(arguments.to_string());
        Box::pin(async move { Ok(fut.await) })
    }
}

impl fmt::Debug for FnTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.def.function.name)
            .finish()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Validate tool arguments against the tool's declared JSON Schema.
///
/// Returns `None` if valid, or `Some(error_string)` if validation fails.
pub fn validate_tool_arguments(tool: &dyn Tool, arguments: &str) -> Option<String> {
    let args_value: serde_json::Value = match serde_json::from_str(arguments) {
        Ok(v) => v,
        Err(e) => {
            return Some(format!(
                "Error: invalid JSON arguments for tool '{}': {e}. \
                 Please provide valid JSON matching the tool's parameter schema.",
                tool.name()
            ));
        }
    };

    let schema = tool.definition().function.parameters;

    let validator = match jsonschema::validator_for(&schema) {
        Ok(v) => v,
        Err(_) => return None, // If schema itself is invalid, skip validation.
    };

    let errors: Vec<String> = validator
        .iter_errors(&args_value)
        .map(|e| format!("  - {}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        None
    } else {
        Some(format!(
            "Error: argument validation failed for tool '{}':\n{}\n\
             Please fix the arguments and try again.",
            tool.name(),
            errors.join("\n")
        ))
    }
}

/// Log a tool call at INFO level with a truncated preview of arguments.
pub fn log_tool_call(name: &str, arguments: &str) {
    let args_preview: String = arguments.chars().take(120).collect();
    info!(
        "[tool] {}({args_preview}{})",
        name,
        if arguments.chars().count() > 120 { "..." } else { "" }
    );
    trace!("[tool] {name} arguments: {arguments}");
}

/// Truncate a string to at most `max` bytes (on a char boundary),
/// appending a notice if trimmed.
pub fn truncate_result(s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let head = s.get(..s.floor_char_boundary(max)).unwrap_or_default();
    format!("{head}...\n[truncated: {} bytes total]", s.len())
}

/// Parse raw JSON arguments into a typed struct.
///
/// Returns a formatted error string suitable for returning directly as the
/// tool result; the model will see the error and self-correct. Empty
/// arguments parse as `{}`.
pub fn parse_tool_args<T: serde::de::DeserializeOwned>(arguments: &str) -> Result<T, String> {
    let arguments = if arguments.trim().is_empty() { "{}" } else { arguments };
    serde_json::from_str(arguments).map_err(|e| {
        format!(
            "Error: invalid tool arguments: {e}. \
             Please provide valid JSON matching the tool's parameter schema."
        )
    })
}

// ── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    struct EchoTool;

    #[derive(Deserialize, JsonSchema)]
    struct EchoArgs {
        text: String,
    }

    impl Tool for EchoTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new("echo", "Echo the input", crate::json_schema_for::<EchoArgs>())
        }

        fn execute<'a>(&'a self, _ctx: ToolContext<'a>, arguments: &'a str) -> ToolFuture<'a> {
            Box::pin(async move {
                Ok(match parse_tool_args::<EchoArgs>(arguments) {
                    Ok(args) => args.text,
                    Err(e) => e,
                })
            })
        }
    }

    struct SessionIdTool;

    impl Tool for SessionIdTool {
        fn definition(&self) -> ToolDef {
            ToolDef::new("session_id", "Report the session id", serde_json::json!({"type": "object"}))
        }

        fn execute<'a>(&'a self, ctx: ToolContext<'a>, _arguments: &'a str) -> ToolFuture<'a> {
            Box::pin(async move {
                Ok(format!("{} / {}", ctx.session.id(), ctx.call_id.unwrap_or("-")))
            })
        }
    }

    #[test]
    fn tool_name_from_definition() {
        assert_eq!(EchoTool.name(), "echo");
    }

    #[test]
    fn toolset_register_and_definitions_sorted() {
        let set = ToolSet::new().with(SessionIdTool).with(EchoTool);
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["echo", "session_id"]);
        let defs = set.definitions();
        assert_eq!(defs[0].function.name, "echo");
        assert!(set.contains("echo"));
        assert!(!set.contains("ech"));
    }

    #[test]
    fn merge_moves_tools_across() {
        let set = ToolSet::new()
            .with(EchoTool)
            .merge(ToolSet::new().with(SessionIdTool));
        assert_eq!(set.names(), vec!["echo", "session_id"]);
    }

    #[test]
    fn with_if_false_skips_tool() {
        assert!(ToolSet::new().with_if(false, EchoTool).is_empty());
        assert_eq!(ToolSet::new().with_if(true, EchoTool).len(), 1);
    }

    #[tokio::test]
    async fn toolset_execute_known_tool() {
        let session = Session::new();
        let set = ToolSet::new().with(EchoTool);
        let result = set
            .execute(ToolContext::new(&session), "echo", r#"{"text": "hello"}"#)
            .await
            .unwrap();
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn toolset_passes_context_through() {
        let session = Session::with_id("ses-test");
        let set = ToolSet::new().with(SessionIdTool);
        let ctx = ToolContext::new(&session).with_call_id(Some("call_7"));
        let result = set.execute(ctx, "session_id", "{}").await.unwrap();
        assert_eq!(result, "ses-test / call_7");
    }

    #[tokio::test]
    async fn toolset_execute_unknown_tool() {
        let session = Session::new();
        let set = ToolSet::new().with(EchoTool);
        let result = set
            .execute(ToolContext::new(&session), "nonexistent", "{}")
            .await
            .unwrap();
        assert!(result.contains("unknown tool"));
    }

    #[tokio::test]
    async fn toolset_validates_arguments_when_enabled() {
        let session = Session::new();
        let set = ToolSet::new().with_arg_validation(true).with(EchoTool);
        let result = set
            .execute(ToolContext::new(&session), "echo", r#"{"text": 5}"#)
            .await
            .unwrap();
        assert!(result.starts_with("Error: argument validation failed"));
    }

    #[tokio::test]
    async fn toolset_truncates_long_results() {
        let session = Session::new();
        let set = ToolSet::new().with_max_result_bytes(50).with(EchoTool);
        let args = serde_json::json!({"text": "a".repeat(200)}).to_string();
        let result = set
            .execute(ToolContext::new(&session), "echo", &args)
            .await
            .unwrap();
        assert!(result.contains("[truncated: 200 bytes total]"));
    }

    #[tokio::test]
    async fn fn_tool_parses_typed_arguments() {
        #[derive(Deserialize, JsonSchema)]
        struct AddArgs {
            a: i64,
            b: i64,
        }
        let tool = FnTool::new(
            ToolDef::new("add", "Add", crate::json_schema_for::<AddArgs>()),
            |args: AddArgs| async move { (args.a + args.b).to_string() },
        );
        let session = Session::new();
        let ok = tool.execute(ToolContext::new(&session), r#"{"a": 3, "b": 5}"#).await.unwrap();
        assert_eq!(ok, "8");
        let bad = tool.execute(ToolContext::new(&session), r#"{"a": 3}"#).await.unwrap();
        assert!(bad.starts_with("Error: invalid tool arguments"));
    }

    #[test]
    fn truncate_short_unchanged() {
        assert_eq!(truncate_result("hello".into(), 100), "hello");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "é".repeat(10); // 20 bytes
        let result = truncate_result(s, 5);
        assert!(result.starts_with("éé..."));
        assert!(result.contains("[truncated: 20 bytes total]"));
    }

    #[test]
    fn parse_tool_args_treats_empty_as_object() {
        #[derive(Deserialize)]
        struct NoArgs {}
        assert!(parse_tool_args::<NoArgs>("").is_ok());
        assert!(parse_tool_args::<NoArgs>("not json").is_err());
    }
}
