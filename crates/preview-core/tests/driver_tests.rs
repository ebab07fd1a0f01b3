//! Driver-level tests under a paused tokio clock.
//!
//! The clock auto-advances whenever every task is parked, which makes the
//! debounce windows and the gated round-trip ordering fully deterministic.

use preview_core::prelude::*;
use preview_core::Settlement;
use preview_test_utils::{
    tagged_result, ScriptedEvaluationClient, SIMPLE_VIEW, VIEW_WITH_LIMIT_PARAM,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("preview_core=debug")
        .with_test_writer()
        .try_init();
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_triggers_one_cycle() {
    init_tracing();
    let client = Arc::new(ScriptedEvaluationClient::new());
    client.respond_ok(json!({"ok": true}));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client.clone());
    session.source_changed("selector: {entityKind: A}\ndata: {v: 1}");
    session.source_changed("selector: {entityKind: B}\ndata: {v: 1}");
    session.source_changed("selector: {entityKind: C}\ndata: {v: 1}");

    let mut state = session.state();
    let settled = state
        .wait_for(|s| s.phase == SessionPhase::Settled(Settlement::Success))
        .await
        .unwrap();
    assert_eq!(settled.sequence, 1);
    drop(settled);

    assert_eq!(client.call_count(), 1);
    let wire = serde_json::to_value(&client.calls()[0]).unwrap();
    assert_eq!(wire.pointer("/view/selector/entityKind"), Some(&json!("C")));
}

#[tokio::test(start_paused = true)]
async fn stale_response_never_overwrites_newer() {
    let client = Arc::new(ScriptedEvaluationClient::new());
    let first_gate = client.respond_gated(tagged_result("first"));
    let second_gate = client.respond_gated(tagged_result("second"));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client.clone());
    let mut state = session.state();

    session.source_changed("selector: {entityKind: A}\ndata: {v: 1}");
    state
        .wait_for(|s| s.sequence == 1 && s.evaluating)
        .await
        .unwrap();

    session.source_changed("selector: {entityKind: B}\ndata: {v: 1}");
    state
        .wait_for(|s| s.sequence == 2 && s.evaluating)
        .await
        .unwrap();

    // The newer request resolves first and settles the session.
    second_gate.release();
    let settled = state
        .wait_for(|s| s.phase == SessionPhase::Settled(Settlement::Success))
        .await
        .unwrap();
    assert_eq!(
        settled.last_good.as_ref().unwrap().payload,
        json!({"tag": "second"})
    );
    drop(settled);

    // The superseded request resolves late; nothing may change.
    first_gate.release();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let current = state.borrow();
    assert_eq!(
        current.last_good.as_ref().unwrap().payload,
        json!({"tag": "second"})
    );
    assert!(current.active_error.is_none());
    assert_eq!(current.sequence, 2);
}

#[tokio::test(start_paused = true)]
async fn parameter_edits_coalesce_and_filter() {
    let client = Arc::new(ScriptedEvaluationClient::new());
    client.respond_ok(json!({"rows": []}));
    client.respond_ok(json!({"rows": [[1]]}));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client.clone());
    let mut state = session.state();

    session.source_changed(VIEW_WITH_LIMIT_PARAM);
    state
        .wait_for(|s| s.phase == SessionPhase::Settled(Settlement::Success))
        .await
        .unwrap();

    // Two rapid edits: one declared parameter, one unknown to the schema.
    session.parameter_changed("limit", "10");
    session.parameter_changed("ghost", "boo");
    state
        .wait_for(|s| s.sequence == 2 && s.phase == SessionPhase::Settled(Settlement::Success))
        .await
        .unwrap();

    assert_eq!(client.call_count(), 2);
    let wire = serde_json::to_value(&client.calls()[1]).unwrap();
    assert_eq!(wire.pointer("/parameters/limit"), Some(&json!("10")));
    assert!(wire.pointer("/parameters/ghost").is_none());
}

#[tokio::test(start_paused = true)]
async fn transport_failure_keeps_last_good_visible() {
    let client = Arc::new(ScriptedEvaluationClient::new());
    client.respond_ok(json!({"rows": [[1]]}));
    client.respond_err(PreviewError::Transport("connection reset".to_string()));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client.clone());
    let mut state = session.state();

    session.source_changed(SIMPLE_VIEW);
    state
        .wait_for(|s| s.last_good.is_some())
        .await
        .unwrap();

    session.source_changed("selector: {entityKind: Y}\ndata: {v: 2}");
    let settled = state
        .wait_for(|s| s.phase == SessionPhase::Settled(Settlement::Error))
        .await
        .unwrap();

    assert_eq!(
        settled.last_good.as_ref().unwrap().payload,
        json!({"rows": [[1]]})
    );
    assert!(matches!(
        settled.active_error,
        Some(PreviewError::Transport(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn fast_round_trip_never_shows_spinner() {
    let client = Arc::new(ScriptedEvaluationClient::new());
    client.respond_ok(json!(1));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client);
    let mut state = session.state();

    session.source_changed(SIMPLE_VIEW);
    state
        .wait_for(|s| s.phase == SessionPhase::Settled(Settlement::Success))
        .await
        .unwrap();

    // Drain the indicator window; the short-lived "evaluating" never shows.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!*session.indicator().borrow());
}

#[tokio::test(start_paused = true)]
async fn slow_round_trip_shows_then_hides_spinner() {
    let client = Arc::new(ScriptedEvaluationClient::new());
    let gate = client.respond_gated(tagged_result("slow"));

    let session = SessionHandle::spawn(DocumentKind::View, SessionConfig::new(), client);
    let mut indicator = session.indicator();

    session.source_changed(SIMPLE_VIEW);
    indicator.wait_for(|on| *on).await.unwrap();

    gate.release();
    indicator.wait_for(|on| !*on).await.unwrap();
}
