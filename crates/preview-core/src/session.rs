//! Preview session orchestration
//!
//! Sequences parse -> build -> evaluate -> reconcile for one open preview
//! panel. The session owns its parameter store and a monotonic sequence
//! counter; an evaluation response is applied only while its sequence still
//! matches, so the presenter always reflects the most recently issued
//! request and never an earlier one that happened to resolve later.
//!
//! This type is the synchronous core. The async plumbing (debounce windows,
//! client dispatch, state publication) lives in [`crate::driver`].

use crate::document::{Document, DocumentKind};
use crate::error::{ParseError, PreviewError};
use crate::params::ParameterStore;
use crate::request::PreviewRequest;
use crate::schema::ParameterSchema;
use crate::state::{validate_transition, SessionPhase, Settlement};
use serde_json::Value as JsonValue;

/// Successful evaluation output.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResult {
    /// Raw payload returned by the evaluation service
    pub payload: JsonValue,
    /// Non-fatal validation messages, one list per validation entry
    pub validation: Vec<Vec<String>>,
}

impl PreviewResult {
    /// Result with no validation warnings.
    #[inline]
    #[must_use]
    pub fn new(payload: JsonValue) -> Self {
        Self {
            payload,
            validation: Vec::new(),
        }
    }

    /// Attach validation warnings.
    #[inline]
    #[must_use]
    pub fn with_validation(mut self, validation: Vec<Vec<String>>) -> Self {
        self.validation = validation;
        self
    }

    /// True when the service attached validation warnings.
    #[inline]
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.validation.iter().any(|messages| !messages.is_empty())
    }
}

/// Observable state of one session.
///
/// `last_good` is sticky: only a newer successful evaluation replaces it;
/// failures of any kind leave it untouched so the panel never flickers back
/// to empty while the draft is transiently broken.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Most recent successful result
    pub last_good: Option<PreviewResult>,
    /// Error from the latest settled cycle, if it failed
    pub active_error: Option<PreviewError>,
    /// True while an authoritative request is in flight
    pub evaluating: bool,
    /// Sequence number of the latest issued cycle
    pub sequence: u64,
    /// Current phase
    pub phase: SessionPhase,
}

/// An evaluation the caller must dispatch to the client.
///
/// Report the outcome back through [`PreviewSession::apply_evaluation`]
/// with the same sequence number.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvaluation {
    /// Sequence the response will be checked against
    pub sequence: u64,
    /// The request to send
    pub request: PreviewRequest,
}

/// What a trigger cycle decided.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Blank source: nothing to evaluate, previous result untouched
    Skipped,
    /// Draft rejected before any round trip; error recorded in state
    Rejected(ParseError),
    /// Request built; dispatch it and report back with the same sequence
    Dispatch(PendingEvaluation),
}

/// Whether a completion was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response matched the current sequence and was applied
    Current,
    /// The response was superseded while in flight and discarded unapplied
    Stale,
}

/// State machine for one open preview panel.
///
/// Exclusively owned; torn down with its editing context. Every trigger
/// (debounced source or parameter change) runs one cycle and bumps the
/// sequence counter, so at most one in-flight request is ever authoritative.
#[derive(Debug)]
pub struct PreviewSession {
    kind: DocumentKind,
    store: ParameterStore,
    schema: ParameterSchema,
    source: String,
    document: Option<Document>,
    state: SessionState,
}

impl PreviewSession {
    /// Create a dormant session for one document kind.
    #[must_use]
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            store: ParameterStore::new(),
            schema: ParameterSchema::default(),
            source: String::new(),
            document: None,
            state: SessionState::default(),
        }
    }

    /// Kind of document this session previews.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// Observable state snapshot.
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Parameter schema derived from the latest successfully parsed draft.
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Latest successfully parsed draft, if any.
    #[inline]
    #[must_use]
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Record a parameter edit without running a cycle.
    ///
    /// Triggering sits with the caller so that rapid edits can be coalesced
    /// into a single [`Self::apply_parameters`] call.
    pub fn set_parameter(&mut self, name: impl Into<String>, raw: &str) {
        self.store.set_value(name, raw);
    }

    /// Names the user has entered that the current schema does not declare.
    #[must_use]
    pub fn unknown_parameters(&self) -> Vec<String> {
        self.store.unknown_parameters(&self.schema)
    }

    /// Run a cycle for debounced source text.
    pub fn apply_source(&mut self, source: &str) -> CycleOutcome {
        self.source = source.to_string();
        self.run_cycle()
    }

    /// Run a cycle after debounced parameter edits, reusing the last source.
    pub fn apply_parameters(&mut self) -> CycleOutcome {
        self.run_cycle()
    }

    /// Apply an evaluation completion.
    ///
    /// A response whose sequence no longer matches was superseded while in
    /// flight and is discarded without touching any state.
    pub fn apply_evaluation(
        &mut self,
        sequence: u64,
        outcome: Result<PreviewResult, PreviewError>,
    ) -> Applied {
        if sequence != self.state.sequence {
            tracing::debug!(
                stale = sequence,
                current = self.state.sequence,
                "discarding stale evaluation response"
            );
            return Applied::Stale;
        }

        self.state.evaluating = false;
        match outcome {
            Ok(result) => {
                tracing::debug!(sequence, warnings = result.validation.len(), "evaluation applied");
                self.state.last_good = Some(result);
                self.state.active_error = None;
                self.enter(SessionPhase::Settled(Settlement::Success));
            }
            Err(error) => {
                tracing::debug!(sequence, %error, "evaluation failed");
                self.state.active_error = Some(error);
                self.enter(SessionPhase::Settled(Settlement::Error));
            }
        }
        Applied::Current
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        self.state.sequence += 1;
        self.enter(SessionPhase::Parsing);
        tracing::debug!(sequence = self.state.sequence, kind = %self.kind, "preview cycle started");

        match Document::parse(self.kind, &self.source) {
            Ok(None) => {
                self.document = None;
                self.schema = ParameterSchema::default();
                self.state.active_error = None;
                self.state.evaluating = false;
                self.enter(SessionPhase::Idle);
                CycleOutcome::Skipped
            }
            Err(error) => {
                // Previous schema kept; the parameter form keeps rendering
                // while the draft is broken.
                self.state.active_error = Some(PreviewError::Parse(error.clone()));
                self.state.evaluating = false;
                self.enter(SessionPhase::Settled(Settlement::Error));
                tracing::debug!(sequence = self.state.sequence, %error, "draft rejected before dispatch");
                CycleOutcome::Rejected(error)
            }
            Ok(Some(document)) => {
                self.schema = ParameterSchema::extract(&document);
                self.enter(SessionPhase::BuildingRequest);

                let filtered = self.store.reconcile(&self.schema);
                let request = PreviewRequest::build(&document, filtered);
                self.document = Some(document);

                self.state.evaluating = true;
                self.enter(SessionPhase::Evaluating);
                tracing::debug!(sequence = self.state.sequence, "evaluation dispatched");
                CycleOutcome::Dispatch(PendingEvaluation {
                    sequence: self.state.sequence,
                    request,
                })
            }
        }
    }

    fn enter(&mut self, phase: SessionPhase) {
        debug_assert!(
            validate_transition(self.state.phase, phase).is_ok(),
            "illegal phase transition: {:?} -> {:?}",
            self.state.phase,
            phase
        );
        self.state.phase = phase;
    }
}
