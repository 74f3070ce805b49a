//! Planning agent example: a scripted model works through a plan while the
//! compactor keeps superseded plan calls out of its context.
//!
//! Demonstrates:
//! - `Planning::toolset()` merged with a custom `FnTool` built from `ToolSpec`
//! - `Planning::history_processor()` plus the `HistoryDump` viewer
//! - Observing the loop with `FnEventHandler`
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --example planning_agent
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use cognitive_rs::prelude::*;
use cognitive_rs::schemars;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

// ── Typed argument structs ──────────────────────────────────────────

/// Arguments for the `word_count` tool.
#[derive(Deserialize, JsonSchema)]
struct WordCountArgs {
    /// Text to count words in.
    text: String,
}

fn word_count_tool() -> FnTool {
    let def = ToolSpec::builder("word_count")
        .purpose("Count the words in a piece of text")
        .when_to_use("When the user asks how long a text is")
        .when_not_to_use("When the length in characters or bytes is wanted")
        .parameters_for::<WordCountArgs>()
        .example("word_count(text='a b c')", "3")
        .output_format("A single integer")
        .to_tool_def();

    FnTool::new(def, |args: WordCountArgs| async move {
        args.text.split_whitespace().count().to_string()
    })
}

// ── Scripted model ──────────────────────────────────────────────────

/// Stands in for a real LLM: plan, count, tick steps off, answer.
fn scripted_model() -> FnModel {
    let turn = AtomicUsize::new(0);
    FnModel::new(move |history, _tools| {
        let call = |name: &str, args: serde_json::Value, id: &str| {
            Message::response(vec![Part::tool_call(name, args, id)])
        };
        Ok(match turn.fetch_add(1, Ordering::SeqCst) {
            0 => call(
                "plan_create",
                json!({"steps": ["Count the words", "Report the result"]}),
                "c1",
            ),
            1 => Message::response(vec![
                Part::tool_call("word_count", json!({"text": "the quick brown fox"}), "c2"),
                Part::tool_call("plan_mark_step_complete", json!({"step_id": 1}), "c3"),
            ]),
            2 => call("plan_mark_step_complete", json!({"step_id": 2}), "c4"),
            3 => call("plan_show_progress", json!({}), "c5"),
            _ => Message::text(format!(
                "The text has 4 words. (I saw {} message(s) this turn.)",
                history.len()
            )),
        })
    })
}

// ── Main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let planning = Planning::new();
    let tools = planning.toolset().with(word_count_tool());
    let compactor = planning.history_processor();
    let model = scripted_model();
    let session = Session::new();

    let handler = FnEventHandler::new(|event: &RunEvent<'_>| match event {
        RunEvent::HistoryProcessed { before, after } if before != after => {
            eprintln!("[compactor] {before} -> {after} messages");
        }
        RunEvent::ToolResult { name, result, .. } => {
            eprintln!("[tool] {name} -> {} bytes", result.len());
        }
        _ => {}
    });

    let result = Runner::new(&model, &tools, RunnerConfig::default().with_max_rounds(10))
        .with_compactor(&compactor)
        .with_processor(&HistoryDump)
        .with_event_handler(&handler)
        .run(&session, vec![Message::user("How many words are in 'the quick brown fox'?")])
        .await
        .map_err(|e| e.to_string())?;

    println!("{}", result.text());
    println!("rounds used: {}", result.rounds_used);

    let plan = Planning::context(&session).map_err(|e| e.to_string())?;
    let plan = plan.lock().map_err(|e| e.to_string())?;
    println!("{}", plan.show_progress());

    Ok(())
}
