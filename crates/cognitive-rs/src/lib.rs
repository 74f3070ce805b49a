//! Planning and skill toolsets for tool-using LLM agents.
//!
//! `cognitive-rs` gives an agent two "cognitive" capabilities and keeps the
//! conversation transcript lean while it uses them:
//!
//! - **Planning** — a per-session step list the model creates, ticks off and
//!   inspects through three tools (`plan_create`, `plan_mark_step_complete`,
//!   `plan_show_progress`). See [`planning`].
//! - **Skills** — curated markdown documents with YAML frontmatter, served to
//!   the model on demand through a single `skill_load` tool. See [`skills`].
//! - **History compaction** — plan tools are called over and over, and every
//!   old call/return pair is dead weight once a newer one exists. The
//!   [`HistoryCompactor`](history::HistoryCompactor) drops superseded pairs
//!   before each model call while preserving every other part and the strict
//!   message order. See [`history`].
//!
//! The [`Runner`](agent::runner::Runner) is a small host loop that wires it
//! together: history processors run before every model call, tool calls are
//! dispatched through a [`ToolSet`](tools::core::ToolSet), and per-session
//! state lives on an explicit [`Session`](agent::session::Session).
//!
//! # Getting started
//!
//! ```ignore
//! use cognitive_rs::prelude::*;
//!
//! let planning = Planning::new();
//! let tools = planning.toolset().merge(my_tools);
//! let compactor = planning.history_processor();
//!
//! let session = Session::new();
//! let result = Runner::new(&model, &tools, RunnerConfig::default())
//!     .with_compactor(&compactor)
//!     .with_event_handler(&LoggingHandler)
//!     .run(&session, vec![Message::user("Calculate (3 + 5) * 12. Create a plan first.")])
//!     .await?;
//!
//! println!("{}", result.text());
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`history`] | Part enumerator, redundancy scanner, rebuilder, [`HistoryCompactor`](history::HistoryCompactor) |
//! | [`planning`] | [`PlanState`](planning::PlanState), plan tools, [`Planning`](planning::Planning) facade |
//! | [`skills`] | Skill registry and the `skill_load` tool |
//! | [`tools`] | [`Tool`](tools::core::Tool) trait, [`ToolSet`](tools::core::ToolSet), [`FnTool`](tools::core::FnTool), [`ToolSpec`](tools::spec::ToolSpec) |
//! | [`agent`] | [`Runner`](agent::runner::Runner) host loop, sessions, events, history hooks |

pub mod agent;
pub mod history;
pub mod planning;
pub mod prelude;
pub mod skills;
pub mod tools;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;

// Re-export schemars for downstream crates.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. This is the bridge between strong Rust types
/// and the `serde_json::Value` that function-calling APIs expect.
///
/// # Example
///
/// ```
/// use cognitive_rs::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct MarkArgs {
///     step_id: u32,
/// }
///
/// let schema = json_schema_for::<MarkArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"step_id".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}

// ── Message types ──────────────────────────────────────────────────

/// Direction of a message: sent to the model, or produced by it.
///
/// Tool returns travel in `Request` messages, tool calls in `Response`
/// messages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Request,
    Response,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::Request => write!(f, "request"),
            MessageKind::Response => write!(f, "response"),
        }
    }
}

/// One turn of the conversation: an ordered list of [`Part`]s.
///
/// Messages are treated as immutable once appended to a history. History
/// processors build filtered copies with [`Message::with_parts`] rather than
/// editing a message in place.
///
/// Fields this crate does not model (`instructions`, `usage`, `model_name`
/// and so on) land in `extra` and are written back unchanged.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub parts: Vec<Part>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Message {
    pub fn request(parts: Vec<Part>) -> Self {
        Self {
            kind: MessageKind::Request,
            timestamp: Utc::now(),
            parts,
            extra: Map::new(),
        }
    }

    pub fn response(parts: Vec<Part>) -> Self {
        Self {
            kind: MessageKind::Response,
            timestamp: Utc::now(),
            parts,
            extra: Map::new(),
        }
    }

    /// A request carrying a single user prompt.
    pub fn user(content: impl Into<String>) -> Self {
        Self::request(vec![Part::user_prompt(content)])
    }

    /// A response carrying a single text part.
    pub fn text(content: impl Into<String>) -> Self {
        Self::response(vec![Part::text(content)])
    }

    /// Override the timestamp (builder pattern).
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// A copy of this message with the same kind, timestamp and extra
    /// fields but a different part list.
    pub fn with_parts(&self, parts: Vec<Part>) -> Self {
        Self {
            kind: self.kind,
            timestamp: self.timestamp,
            parts,
            extra: self.extra.clone(),
        }
    }

    /// Tool calls in this message, in order.
    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.parts.iter().filter_map(|p| match p {
            Part::ToolCall(call) => Some(call),
            _ => None,
        })
    }

    /// Whether this message requests any tool execution.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls().next().is_some()
    }

    /// Concatenated `Text` parts, newline-separated.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ── Part types ─────────────────────────────────────────────────────

/// A typed unit within a [`Message`].
///
/// Serialized with a `part_kind` tag. Objects with a missing or unrecognised
/// tag deserialize to [`Part::Unknown`] and serialize back unchanged, so
/// transcripts produced by newer runtimes survive a round trip through this
/// crate. Known parts keep their unmodelled fields (`timestamp`, `metadata`,
/// ...) in `extra`.
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    UserPrompt {
        content: String,
        extra: Map<String, Value>,
    },
    Text {
        content: String,
        extra: Map<String, Value>,
    },
    ToolCall(ToolCall),
    ToolReturn(ToolReturn),
    Unknown(Value),
}

/// A tool invocation requested by the model.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ToolCall {
    pub tool_name: String,
    #[serde(default)]
    pub args: Value,
    /// Per-invocation identifier shared with the matching [`ToolReturn`].
    /// Some runtimes omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The result of a tool invocation, sent back to the model.
///
/// `content` is whatever the tool produced: plain text from this crate's
/// tools, or any JSON value from other runtimes.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ToolReturn {
    pub tool_name: String,
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ToolCall {
    pub fn new(tool_name: impl Into<String>, args: Value, tool_call_id: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
            tool_call_id: Some(tool_call_id.into()),
            extra: Map::new(),
        }
    }

    /// The call id, if present and non-empty.
    pub fn call_id(&self) -> Option<&str> {
        non_empty(self.tool_call_id.as_deref())
    }

    /// Arguments as a JSON string, as handed to [`Tool::execute`](tools::core::Tool::execute).
    pub fn args_json(&self) -> String {
        match &self.args {
            Value::Null => "{}".to_string(),
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

impl ToolReturn {
    pub fn new(
        tool_name: impl Into<String>,
        content: impl Into<Value>,
        tool_call_id: Option<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            content: content.into(),
            tool_call_id,
            extra: Map::new(),
        }
    }

    /// The call id, if present and non-empty.
    pub fn call_id(&self) -> Option<&str> {
        non_empty(self.tool_call_id.as_deref())
    }

    /// The content as text: strings as-is, anything else as compact JSON.
    pub fn content_text(&self) -> Cow<'_, str> {
        match &self.content {
            Value::String(text) => Cow::Borrowed(text),
            other => Cow::Owned(other.to_string()),
        }
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}

impl Part {
    pub fn user_prompt(content: impl Into<String>) -> Self {
        Part::UserPrompt {
            content: content.into(),
            extra: Map::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Part::Text {
            content: content.into(),
            extra: Map::new(),
        }
    }

    pub fn tool_call(
        tool_name: impl Into<String>,
        args: Value,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Part::ToolCall(ToolCall::new(tool_name, args, tool_call_id))
    }

    pub fn tool_return(
        tool_name: impl Into<String>,
        content: impl Into<Value>,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Part::ToolReturn(ToolReturn::new(
            tool_name,
            content,
            Some(tool_call_id.into()),
        ))
    }
}

// ── Part serialization ─────────────────────────────────────────────

const PART_KIND: &str = "part_kind";

/// Field layout shared by `user-prompt` and `text` parts.
#[derive(Deserialize)]
struct ContentPart {
    content: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn content_fields(content: &str, extra: &Map<String, Value>) -> Map<String, Value> {
    let mut fields = extra.clone();
    fields.insert("content".into(), Value::String(content.to_string()));
    fields
}

fn object_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, serde_json::Error> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        other => Err(serde::ser::Error::custom(format!("expected a JSON object, got {other}"))),
    }
}

fn ser_error<S: Serializer>(e: serde_json::Error) -> S::Error {
    <S::Error as serde::ser::Error>::custom(e)
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (kind, mut fields) = match self {
            Part::UserPrompt { content, extra } => ("user-prompt", content_fields(content, extra)),
            Part::Text { content, extra } => ("text", content_fields(content, extra)),
            Part::ToolCall(call) => ("tool-call", object_fields(call).map_err(ser_error::<S>)?),
            Part::ToolReturn(ret) => ("tool-return", object_fields(ret).map_err(ser_error::<S>)?),
            Part::Unknown(raw) => return raw.serialize(serializer),
        };
        fields.insert(PART_KIND.into(), Value::String(kind.into()));
        fields.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let Value::Object(mut fields) = raw else {
            return Ok(Part::Unknown(raw));
        };
        let kind = match fields.get(PART_KIND).and_then(Value::as_str) {
            Some(kind @ ("user-prompt" | "text" | "tool-call" | "tool-return")) => kind.to_string(),
            _ => return Ok(Part::Unknown(Value::Object(fields))),
        };
        fields.remove(PART_KIND);
        let fields = Value::Object(fields);

        let part = match kind.as_str() {
            "user-prompt" => serde_json::from_value(fields)
                .map(|ContentPart { content, extra }| Part::UserPrompt { content, extra }),
            "text" => serde_json::from_value(fields)
                .map(|ContentPart { content, extra }| Part::Text { content, extra }),
            "tool-call" => serde_json::from_value(fields).map(Part::ToolCall),
            _ => serde_json::from_value(fields).map(Part::ToolReturn),
        };
        part.map_err(|e| D::Error::custom(format!("invalid {kind} part: {e}")))
    }
}

// ── Tool definition types ──────────────────────────────────────────

/// The type of a tool definition. Currently always `Function`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ToolType {
    #[serde(rename = "function")]
    Function,
}

/// Tool definition handed to the model (OpenAI function-calling format).
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ToolDef {
    #[serde(rename = "type")]
    pub tool_type: ToolType,
    pub function: FunctionDef,
}

impl ToolDef {
    /// Create a function-calling tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            tool_type: ToolType::Function,
            function: FunctionDef {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
