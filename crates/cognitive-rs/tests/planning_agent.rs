//! Integration tests for the planning agent flow.
//!
//! A scripted model drives the runner through the plan tools while the
//! compactor trims the history it sees before every call.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cognitive_rs::prelude::*;
use serde::Deserialize;
use serde_json::json;

/// Parts of every tool call the model was shown.
fn visible_call_ids(history: &[Message]) -> Vec<String> {
    history
        .iter()
        .flat_map(|m| m.tool_calls())
        .filter_map(|c| c.call_id().map(str::to_string))
        .collect()
}

/// The single tool return in the last message.
fn last_return(history: &[Message]) -> &ToolReturn {
    match history.last().map(|m| m.parts.as_slice()) {
        Some([Part::ToolReturn(ret)]) => ret,
        other => panic!("expected a single tool return, got {other:?}"),
    }
}

fn call(name: &str, args: serde_json::Value, id: &str) -> Message {
    Message::response(vec![Part::tool_call(name, args, id)])
}

#[tokio::test]
async fn planning_agent_flow() {
    let calls = Arc::new(AtomicUsize::new(0));
    let model = {
        let calls = calls.clone();
        FnModel::new(move |history, tools| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            match n {
                1 => {
                    assert_eq!(tools.len(), 3);
                    Ok(call("plan_create", json!({"steps": ["Step 1", "Step 2"]}), "call_1"))
                }
                2 => {
                    let ret = last_return(history);
                    assert_eq!(ret.tool_name, "plan_create");
                    assert_eq!(ret.content_text(), "Current Plan:\n[ ] 1. Step 1\n[ ] 2. Step 2");
                    Ok(call("plan_show_progress", json!({}), "call_2"))
                }
                3 => {
                    let ret = last_return(history);
                    assert_eq!(ret.tool_name, "plan_show_progress");
                    assert!(ret.content_text().contains("[ ] 1. Step 1"));
                    Ok(call("plan_mark_step_complete", json!({"step_id": 1}), "call_3"))
                }
                4 => {
                    let ret = last_return(history);
                    assert_eq!(ret.tool_name, "plan_mark_step_complete");
                    assert!(ret.content_text().contains("[x] 1"));
                    Ok(call("plan_show_progress", json!({}), "call_4"))
                }
                5 => {
                    let ids = visible_call_ids(history);
                    assert!(ids.contains(&"call_4".to_string()), "latest show_progress kept");
                    assert!(!ids.contains(&"call_2".to_string()), "older show_progress dropped");
                    assert_eq!(ids, vec!["call_1", "call_3", "call_4"]);
                    Ok(Message::text("All done"))
                }
                _ => Ok(Message::text("Unexpected call")),
            }
        })
    };

    let planning = Planning::new();
    let tools = planning.toolset();
    let compactor = planning.history_processor();
    let session = Session::new();

    let result = Runner::new(&model, &tools, RunnerConfig::default())
        .with_compactor(&compactor)
        .with_event_handler(&LoggingHandler)
        .run(&session, vec![Message::user("Please do the task")])
        .await
        .expect("run should succeed");

    assert_eq!(result.text(), "All done");
    assert!(result.finished);
    assert_eq!(result.rounds_used, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 5);

    // The stored history keeps everything; compaction only shapes model input.
    assert_eq!(result.history.len(), 10);
    assert_eq!(
        visible_call_ids(&result.history),
        vec!["call_1", "call_2", "call_3", "call_4"]
    );

    let plan = Planning::context(&session).unwrap();
    let plan = plan.lock().unwrap();
    assert_eq!(plan.show_progress(), "Current Plan:\n[x] 1. Step 1\n[ ] 2. Step 2");
}

#[derive(Deserialize, schemars::JsonSchema)]
struct BinaryArgs {
    a: i64,
    b: i64,
}

fn arithmetic_tools() -> ToolSet {
    ToolSet::new()
        .with(FnTool::new(
            ToolDef::new("add", "Add two integers", json_schema_for::<BinaryArgs>()),
            |args: BinaryArgs| async move { (args.a + args.b).to_string() },
        ))
        .with(FnTool::new(
            ToolDef::new("mul", "Multiply two integers", json_schema_for::<BinaryArgs>()),
            |args: BinaryArgs| async move { (args.a * args.b).to_string() },
        ))
}

#[tokio::test]
async fn planning_with_other_tools_in_parallel() {
    let model = {
        let calls = AtomicUsize::new(0);
        FnModel::new(move |history, _| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(match n {
                1 => Message::response(vec![
                    Part::text("Planning first."),
                    Part::tool_call(
                        "plan_create",
                        json!({"steps": ["Add 3 and 5", "Multiply by 12"]}),
                        "p1",
                    ),
                ]),
                2 => Message::response(vec![
                    Part::tool_call("add", json!({"a": 3, "b": 5}), "a1"),
                    Part::tool_call("plan_mark_step_complete", json!({"step_id": 1}), "m1"),
                ]),
                3 => Message::response(vec![
                    Part::tool_call("mul", json!({"a": 8, "b": 12}), "x1"),
                    Part::tool_call("plan_mark_step_complete", json!({"step_id": 2}), "m2"),
                ]),
                _ => {
                    // m1 was superseded by m2; the arithmetic calls are untouched.
                    let ids = visible_call_ids(history);
                    assert_eq!(ids, vec!["p1", "a1", "x1", "m2"]);
                    Message::text("The answer is 96.")
                }
            })
        })
    };

    let planning = Planning::new();
    let tools = planning.toolset().merge(arithmetic_tools());
    let compactor = planning.history_processor();
    let session = Session::new();

    let result = Runner::new(
        &model,
        &tools,
        RunnerConfig::default().with_parallel_tool_calls(true),
    )
    .with_compactor(&compactor)
    .with_processor(&HistoryDump)
    .run(&session, vec![Message::user("Calculate (3 + 5) * 12. Create a plan first.")])
    .await
    .unwrap();

    assert_eq!(result.text(), "The answer is 96.");
    assert_eq!(
        result.history[4].parts,
        vec![
            Part::tool_return("add", "8", "a1"),
            Part::tool_return(
                "plan_mark_step_complete",
                "Current Plan:\n[x] 1. Add 3 and 5\n[ ] 2. Multiply by 12",
                "m1"
            ),
        ]
    );
    assert!(Planning::context(&session).unwrap().lock().unwrap().is_complete());
}

#[tokio::test]
async fn history_round_trips_through_json() {
    let model = {
        let calls = AtomicUsize::new(0);
        FnModel::new(move |_, _| {
            Ok(match calls.fetch_add(1, Ordering::SeqCst) {
                0 => call("plan_show_progress", json!({}), "s1"),
                1 => call("plan_show_progress", json!({}), "s2"),
                _ => Message::text("done"),
            })
        })
    };
    let tools = Planning::new().toolset();
    let result = Runner::new(&model, &tools, RunnerConfig::default())
        .run(&Session::new(), vec![Message::user("go")])
        .await
        .unwrap();

    let json = serde_json::to_string(&result.history).unwrap();
    let restored: Vec<Message> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, result.history);

    let compacted = HistoryCompactor::default().compact(restored);
    assert_eq!(visible_call_ids(&compacted), vec!["s2"]);
    assert_eq!(compacted.len(), 4);
}

#[test]
fn foreign_transcript_fields_survive_compaction() {
    let raw = json!([
        {
            "kind": "request",
            "timestamp": "2025-01-01T00:00:00Z",
            "instructions": "Be brief.",
            "parts": [
                {"part_kind": "user-prompt", "content": "go", "timestamp": "2025-01-01T00:00:00Z"}
            ]
        },
        {
            "kind": "response",
            "timestamp": "2025-01-01T00:00:01Z",
            "model_name": "test-model",
            "usage": {"input_tokens": 10, "output_tokens": 3},
            "parts": [
                {"part_kind": "text", "content": "Checking.", "id": null},
                {"part_kind": "tool-call", "tool_name": "plan_show_progress", "args": {}, "tool_call_id": "s1"},
                {"part_kind": "tool-call", "tool_name": "lookup", "args": {"q": "x"}, "tool_call_id": "l1"}
            ]
        },
        {
            "kind": "request",
            "timestamp": "2025-01-01T00:00:02Z",
            "parts": [
                {"part_kind": "tool-return", "tool_name": "plan_show_progress", "content": "No plan created yet.",
                 "tool_call_id": "s1", "timestamp": "2025-01-01T00:00:02Z"},
                {"part_kind": "tool-return", "tool_name": "lookup", "content": {"hits": [1, 2]},
                 "tool_call_id": "l1", "metadata": {"a": 1}, "timestamp": "2025-01-01T00:00:02Z"}
            ]
        },
        {
            "kind": "response",
            "timestamp": "2025-01-01T00:00:03Z",
            "parts": [
                {"part_kind": "tool-call", "tool_name": "plan_show_progress", "args": "{}", "tool_call_id": "s2"}
            ]
        }
    ]);

    let history: Vec<Message> = serde_json::from_value(raw.clone()).unwrap();
    assert_eq!(serde_json::to_value(&history).unwrap(), raw);

    let compacted = HistoryCompactor::default().compact(history);
    let out = serde_json::to_value(&compacted).unwrap();

    // Only the superseded plan_show_progress pair is gone; every other field
    // is written back as it was read.
    let mut expected = raw;
    expected[1]["parts"].as_array_mut().unwrap().remove(1);
    expected[2]["parts"].as_array_mut().unwrap().remove(0);
    assert_eq!(out, expected);

    assert_eq!(out[0]["instructions"], "Be brief.");
    assert_eq!(out[1]["usage"]["input_tokens"], 10);
    assert_eq!(out[2]["parts"][0]["content"], json!({"hits": [1, 2]}));
    assert_eq!(out[2]["parts"][0]["metadata"], json!({"a": 1}));
}
