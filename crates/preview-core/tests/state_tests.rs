use preview_core::{allowed_transitions, validate_transition, SessionPhase, Settlement};
use proptest::prelude::*;

const PHASES: [SessionPhase; 6] = [
    SessionPhase::Idle,
    SessionPhase::Parsing,
    SessionPhase::BuildingRequest,
    SessionPhase::Evaluating,
    SessionPhase::Settled(Settlement::Success),
    SessionPhase::Settled(Settlement::Error),
];

#[test]
fn idle_only_reaches_parsing() {
    assert!(validate_transition(SessionPhase::Idle, SessionPhase::Parsing).is_ok());
    assert!(validate_transition(SessionPhase::Idle, SessionPhase::Evaluating).is_err());
    assert!(
        validate_transition(SessionPhase::Idle, SessionPhase::Settled(Settlement::Success))
            .is_err()
    );
}

#[test]
fn evaluating_settles_or_restarts() {
    assert!(validate_transition(
        SessionPhase::Evaluating,
        SessionPhase::Settled(Settlement::Success)
    )
    .is_ok());
    assert!(validate_transition(
        SessionPhase::Evaluating,
        SessionPhase::Settled(Settlement::Error)
    )
    .is_ok());
    assert!(validate_transition(SessionPhase::Evaluating, SessionPhase::Parsing).is_ok());
    assert!(validate_transition(SessionPhase::Evaluating, SessionPhase::Idle).is_err());
}

proptest! {
    #[test]
    fn prop_validate_matches_allowed(from_idx in 0usize..PHASES.len(), to_idx in 0usize..PHASES.len()) {
        let from = PHASES[from_idx];
        let to = PHASES[to_idx];

        let result = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if result.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_parsing_reachable_from_everywhere(from_idx in 0usize..PHASES.len()) {
        prop_assert!(validate_transition(PHASES[from_idx], SessionPhase::Parsing).is_ok());
    }
}
