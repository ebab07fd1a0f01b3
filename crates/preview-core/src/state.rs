//! Session phase machine
//!
//! `Idle -> Parsing -> BuildingRequest -> Evaluating -> Settled`, with every
//! phase able to re-enter `Parsing` when new input arrives. `Idle` and
//! `Settled` are the only phases a session can be dormant in.

/// Outcome recorded by a settled cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Settlement {
    /// The cycle produced a fresh result
    Success,
    /// The cycle ended in a parse, transport, or API error
    Error,
}

/// Phase of one preview session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// No document yet; nothing pending
    #[default]
    Idle,
    /// Turning raw source into a draft
    Parsing,
    /// Merging draft and parameters into a request
    BuildingRequest,
    /// An authoritative request is in flight
    Evaluating,
    /// The latest cycle finished
    Settled(Settlement),
}

impl SessionPhase {
    /// True when the session can sit in this phase with no work pending.
    #[inline]
    #[must_use]
    pub fn is_dormant(self) -> bool {
        matches!(self, Self::Idle | Self::Settled(_))
    }
}

/// Illegal phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal phase transition: {from:?} -> {to:?}")]
pub struct IllegalTransition {
    /// Phase the session was in
    pub from: SessionPhase,
    /// Phase that was requested
    pub to: SessionPhase,
}

/// Validates a phase transition.
pub fn validate_transition(from: SessionPhase, to: SessionPhase) -> Result<(), IllegalTransition> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(IllegalTransition { from, to })
    }
}

/// Phases reachable from `from`.
#[must_use]
pub fn allowed_transitions(from: SessionPhase) -> Vec<SessionPhase> {
    use SessionPhase::*;
    match from {
        Idle => vec![Parsing],
        // Parsing settles an error, drops to Idle on blank input, moves on
        // to request building, or restarts when newer input lands.
        Parsing => vec![
            Parsing,
            Idle,
            BuildingRequest,
            Settled(Settlement::Error),
        ],
        BuildingRequest => vec![Parsing, Evaluating],
        Evaluating => vec![
            Parsing,
            Settled(Settlement::Success),
            Settled(Settlement::Error),
        ],
        Settled(_) => vec![Parsing],
    }
}

fn allowed(from: SessionPhase, to: SessionPhase) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}
