//! Delay-and-coalesce primitive
//!
//! Collapses a rapid stream of values into the most recent one after a
//! quiet period. Used three times per session: raw source edits, the merged
//! parameter values, and the evaluating indicator.

use std::time::Duration;
use tokio::sync::mpsc;

/// Handle feeding one debounce window.
///
/// Each `observe` supersedes any pending emission; only the newest value in
/// a quiet window ever reaches the receiver. Independent instances never
/// interact. Dropping the handle flushes a pending value and ends the
/// output sequence.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn a debounce window with the given quiet period.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(quiet_period: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_window(quiet_period, input_rx, output_tx));

        (Self { input: input_tx }, output_rx)
    }

    /// Feed a value into the window, superseding any pending emission.
    pub fn observe(&self, value: T) {
        // Send fails only after the window task ended; nothing to do then.
        let _ = self.input.send(value);
    }
}

async fn run_window<T>(
    quiet_period: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    output: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;

    loop {
        match pending.take() {
            None => match input.recv().await {
                Some(value) => pending = Some(value),
                None => break,
            },
            Some(value) => {
                let sleep = tokio::time::sleep(quiet_period);
                tokio::pin!(sleep);

                tokio::select! {
                    newer = input.recv() => match newer {
                        // Newer value wins; the window restarts around it.
                        Some(newer) => pending = Some(newer),
                        None => {
                            let _ = output.send(value);
                            break;
                        }
                    },
                    () = &mut sleep => {
                        let _ = output.send(value);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn emits_last_value_of_a_burst() {
        let (debouncer, mut output) = Debouncer::new(QUIET);

        debouncer.observe(1);
        debouncer.observe(2);
        debouncer.observe(3);

        assert_eq!(output.recv().await, Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn separate_windows_emit_separately() {
        let (debouncer, mut output) = Debouncer::new(QUIET);

        debouncer.observe("first");
        assert_eq!(output.recv().await, Some("first"));

        debouncer.observe("second");
        assert_eq!(output.recv().await, Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_value_restarts_the_window() {
        let (debouncer, mut output) = Debouncer::new(QUIET);

        debouncer.observe(1);
        // Part-way through the window a newer value lands.
        tokio::time::sleep(Duration::from_millis(300)).await;
        debouncer.observe(2);

        // The first value never surfaces.
        assert_eq!(output.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn instances_do_not_interact() {
        let (text, mut text_out) = Debouncer::new(QUIET);
        let (params, mut params_out) = Debouncer::new(Duration::from_millis(250));

        text.observe("a");
        params.observe("p");

        assert_eq!(params_out.recv().await, Some("p"));
        assert_eq!(text_out.recv().await, Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_flushes_pending_value() {
        let (debouncer, mut output) = Debouncer::new(QUIET);

        debouncer.observe(7);
        drop(debouncer);

        assert_eq!(output.recv().await, Some(7));
        assert_eq!(output.recv().await, None);
    }
}
