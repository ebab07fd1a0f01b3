//! Testing utilities for the entity-preview workspace
//!
//! Shared fixtures and a scriptable evaluation client. Responses can be
//! gated on an external release so tests control the order in which
//! concurrent round trips resolve.

#![allow(missing_docs)]

use preview_core::driver::EvaluationClient;
use preview_core::error::PreviewError;
use preview_core::request::PreviewRequest;
use preview_core::session::PreviewResult;
use serde_json::{json, Value as JsonValue};
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// A minimal valid view source.
pub const SIMPLE_VIEW: &str = "selector: {entityKind: X}\ndata: {v: 1}";

/// A view source declaring one string parameter named `limit`.
pub const VIEW_WITH_LIMIT_PARAM: &str = "selector: {entityKind: X}\n\
data: {v: 1}\n\
parameters:\n  properties:\n    limit:\n      type: string\n";

/// A minimal valid dashboard source.
pub const SIMPLE_DASHBOARD: &str = "view: saved-view\nlayout: {rows: 1}";

pub fn ok_result(payload: JsonValue) -> Result<PreviewResult, PreviewError> {
    Ok(PreviewResult::new(payload))
}

pub fn tagged_result(tag: &str) -> Result<PreviewResult, PreviewError> {
    ok_result(json!({ "tag": tag }))
}

struct PlannedResponse {
    gate: Option<oneshot::Receiver<()>>,
    outcome: Result<PreviewResult, PreviewError>,
}

/// Releases one gated response when dropped or explicitly released.
pub struct ResponseGate(oneshot::Sender<()>);

impl ResponseGate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

/// Evaluation client that replays pre-planned responses in call order.
///
/// Every received request is recorded for assertions. Calls past the end of
/// the script fail with a transport error so tests notice unplanned traffic.
#[derive(Default)]
pub struct ScriptedEvaluationClient {
    planned: Mutex<VecDeque<PlannedResponse>>,
    calls: Mutex<Vec<PreviewRequest>>,
}

impl ScriptedEvaluationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan the next response.
    pub fn respond(&self, outcome: Result<PreviewResult, PreviewError>) {
        self.planned
            .lock()
            .unwrap()
            .push_back(PlannedResponse { gate: None, outcome });
    }

    pub fn respond_ok(&self, payload: JsonValue) {
        self.respond(Ok(PreviewResult::new(payload)));
    }

    pub fn respond_err(&self, error: PreviewError) {
        self.respond(Err(error));
    }

    /// Plan a response that resolves only once the returned gate is released.
    pub fn respond_gated(&self, outcome: Result<PreviewResult, PreviewError>) -> ResponseGate {
        let (release_tx, release_rx) = oneshot::channel();
        self.planned.lock().unwrap().push_back(PlannedResponse {
            gate: Some(release_rx),
            outcome,
        });
        ResponseGate(release_tx)
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<PreviewRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl EvaluationClient for ScriptedEvaluationClient {
    async fn evaluate(&self, request: PreviewRequest) -> Result<PreviewResult, PreviewError> {
        let planned = {
            let mut planned = self.planned.lock().unwrap();
            self.calls.lock().unwrap().push(request);
            planned.pop_front()
        };

        let Some(planned) = planned else {
            return Err(PreviewError::Transport(
                "no scripted response left".to_string(),
            ));
        };
        if let Some(gate) = planned.gate {
            // A dropped gate still releases; tests only care about ordering.
            let _ = gate.await;
        }
        planned.outcome
    }
}
