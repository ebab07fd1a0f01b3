//! Async session driver
//!
//! Runs a [`PreviewSession`] inside its own event loop: raw edits arrive
//! over a channel, pass through per-concern debounce windows, and
//! evaluation round trips run on their own tasks so the loop never blocks.
//! The loop is the single consumer of every session event, so state is
//! mutated without locks.
//!
//! In-flight requests are never cancelled at the transport layer;
//! supersession is handled entirely by the sequence check in
//! [`PreviewSession::apply_evaluation`]. Dropping the [`SessionHandle`]
//! tears the loop down, and any still-pending completions become no-ops.

use crate::debounce::Debouncer;
use crate::document::DocumentKind;
use crate::error::PreviewError;
use crate::request::PreviewRequest;
use crate::session::{CycleOutcome, PreviewResult, PreviewSession, SessionState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Client seam to the remote evaluation service.
#[async_trait::async_trait]
pub trait EvaluationClient: Send + Sync {
    /// Execute one preview request against the service.
    async fn evaluate(&self, request: PreviewRequest) -> Result<PreviewResult, PreviewError>;
}

/// Debounce windows for one session.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Quiet period applied to raw source edits
    pub source_quiet: Duration,
    /// Quiet period applied to parameter edits
    pub parameter_quiet: Duration,
    /// Quiet period applied to the evaluating indicator, so fast round
    /// trips never flash a spinner
    pub indicator_quiet: Duration,
}

impl SessionConfig {
    /// Default windows: 500 ms for edits, 250 ms for the indicator.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a source-edit quiet period.
    #[inline]
    #[must_use]
    pub fn with_source_quiet(mut self, quiet: Duration) -> Self {
        self.source_quiet = quiet;
        self
    }

    /// With a parameter-edit quiet period.
    #[inline]
    #[must_use]
    pub fn with_parameter_quiet(mut self, quiet: Duration) -> Self {
        self.parameter_quiet = quiet;
        self
    }

    /// With an indicator quiet period.
    #[inline]
    #[must_use]
    pub fn with_indicator_quiet(mut self, quiet: Duration) -> Self {
        self.indicator_quiet = quiet;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_quiet: Duration::from_millis(500),
            parameter_quiet: Duration::from_millis(500),
            indicator_quiet: Duration::from_millis(250),
        }
    }
}

enum SessionEvent {
    SourceChanged(String),
    ParameterChanged { name: String, value: String },
}

type Completion = (u64, Result<PreviewResult, PreviewError>);

/// Handle to a running session driver.
///
/// One handle per open preview panel; dropping it tears the session down.
#[derive(Debug)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
    state: watch::Receiver<SessionState>,
    indicator: watch::Receiver<bool>,
}

impl SessionHandle {
    /// Spawn a driver for one open preview panel.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(
        kind: DocumentKind,
        config: SessionConfig,
        client: Arc<dyn EvaluationClient>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(SessionState::default());
        let (indicator_tx, indicator_rx) = watch::channel(false);

        let driver = SessionDriver {
            session: PreviewSession::new(kind),
            client,
            state: state_tx,
            indicator: indicator_tx,
        };
        tokio::spawn(driver.run(config, event_rx));

        Self {
            events: event_tx,
            state: state_rx,
            indicator: indicator_rx,
        }
    }

    /// Feed a raw source edit from the editing surface.
    pub fn source_changed(&self, source: impl Into<String>) {
        let _ = self
            .events
            .send(SessionEvent::SourceChanged(source.into()));
    }

    /// Feed a raw parameter edit from the form.
    pub fn parameter_changed(&self, name: impl Into<String>, value: impl Into<String>) {
        let _ = self.events.send(SessionEvent::ParameterChanged {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Observable session state for the presenter.
    #[must_use]
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Debounced evaluating indicator for the presenter's spinner.
    #[must_use]
    pub fn indicator(&self) -> watch::Receiver<bool> {
        self.indicator.clone()
    }
}

struct SessionDriver {
    session: PreviewSession,
    client: Arc<dyn EvaluationClient>,
    state: watch::Sender<SessionState>,
    indicator: watch::Sender<bool>,
}

impl SessionDriver {
    async fn run(mut self, config: SessionConfig, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
        let (source_window, mut source_rx) = Debouncer::new(config.source_quiet);
        let (param_window, mut param_rx) = Debouncer::new(config.parameter_quiet);
        let (indicator_window, mut indicator_rx) = Debouncer::new(config.indicator_quiet);
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completion>();

        tracing::info!(kind = %self.session.kind(), "preview session opened");

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::SourceChanged(source)) => {
                        source_window.observe(source);
                    }
                    Some(SessionEvent::ParameterChanged { name, value }) => {
                        self.session.set_parameter(name, &value);
                        param_window.observe(());
                    }
                    // Handle dropped: the owning editing context is closed.
                    None => break,
                },
                Some(source) = source_rx.recv() => {
                    let outcome = self.session.apply_source(&source);
                    self.settle_cycle(outcome, &done_tx, &indicator_window);
                }
                Some(()) = param_rx.recv() => {
                    let outcome = self.session.apply_parameters();
                    self.settle_cycle(outcome, &done_tx, &indicator_window);
                }
                Some((sequence, outcome)) = done_rx.recv() => {
                    self.session.apply_evaluation(sequence, outcome);
                    indicator_window.observe(self.session.state().evaluating);
                    self.publish();
                }
                Some(evaluating) = indicator_rx.recv() => {
                    let _ = self.indicator.send(evaluating);
                }
            }
        }

        tracing::info!(kind = %self.session.kind(), "preview session closed");
    }

    /// Dispatch the cycle's request, if any, and publish the new state.
    fn settle_cycle(
        &mut self,
        outcome: CycleOutcome,
        done: &mpsc::UnboundedSender<Completion>,
        indicator_window: &Debouncer<bool>,
    ) {
        if let CycleOutcome::Dispatch(pending) = outcome {
            let client = Arc::clone(&self.client);
            let done = done.clone();
            tokio::spawn(async move {
                let result = client.evaluate(pending.request).await;
                // The driver may already be gone; completions are no-ops then.
                let _ = done.send((pending.sequence, result));
            });
        }
        indicator_window.observe(self.session.state().evaluating);
        self.publish();
    }

    fn publish(&self) {
        let _ = self.state.send(self.session.state().clone());
    }
}
