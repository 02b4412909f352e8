//! Unit tests for session model types: state, stage, epoch and timer config.

use courtroom_drill::models::session::{
    SessionEpoch, SessionState, Stage, TimerConfig, MIN_DURATION_SECONDS,
};
use courtroom_drill::AppError;

// ─── SessionState ────────────────────────────────────────────────────

#[test]
fn legal_transitions() {
    assert!(SessionState::Idle.can_transition_to(SessionState::Running));
    assert!(SessionState::Running.can_transition_to(SessionState::Paused));
    assert!(SessionState::Paused.can_transition_to(SessionState::Running));
    assert!(SessionState::Running.can_transition_to(SessionState::Ended));
    for state in [
        SessionState::Idle,
        SessionState::Running,
        SessionState::Paused,
        SessionState::Ended,
    ] {
        assert!(state.can_transition_to(SessionState::Idle), "{state} -> idle");
    }
}

#[test]
fn illegal_transitions() {
    assert!(!SessionState::Ended.can_transition_to(SessionState::Running));
    assert!(!SessionState::Idle.can_transition_to(SessionState::Paused));
    assert!(!SessionState::Paused.can_transition_to(SessionState::Ended));
    assert!(!SessionState::Idle.can_transition_to(SessionState::Ended));
}

#[test]
fn only_running_is_editable() {
    assert!(SessionState::Running.is_editable());
    assert!(!SessionState::Idle.is_editable());
    assert!(!SessionState::Paused.is_editable());
    assert!(!SessionState::Ended.is_editable());
}

#[test]
fn clock_visible_while_running_or_paused() {
    assert!(SessionState::Running.clock_visible());
    assert!(SessionState::Paused.clock_visible());
    assert!(!SessionState::Idle.clock_visible());
    assert!(!SessionState::Ended.clock_visible());
}

#[test]
fn state_display_is_lowercase() {
    assert_eq!(SessionState::Paused.to_string(), "paused");
    assert_eq!(SessionState::default(), SessionState::Idle);
}

// ─── Stage ───────────────────────────────────────────────────────────

#[test]
fn stage_numbers_and_labels() {
    assert_eq!(Stage::Normal.number(), 1);
    assert_eq!(Stage::Urgent.number(), 2);
    assert_eq!(Stage::Court.number(), 3);
    assert_eq!(Stage::Urgent.label(), "Stage2");
}

#[test]
fn stages_are_ordered() {
    assert!(Stage::Normal < Stage::Urgent);
    assert!(Stage::Urgent < Stage::Court);
}

// ─── SessionEpoch ────────────────────────────────────────────────────

#[test]
fn epoch_next_increments() {
    let epoch = SessionEpoch::new(7);
    assert_eq!(epoch.next().value(), 8);
    assert_ne!(epoch, epoch.next());
}

#[test]
fn epoch_next_wraps() {
    assert_eq!(SessionEpoch::new(u64::MAX).next().value(), 0);
}

// ─── TimerConfig ─────────────────────────────────────────────────────

#[test]
fn duration_floor_is_inclusive_with_no_ceiling() {
    for duration_seconds in [MIN_DURATION_SECONDS, 1200, 1500, 86_400] {
        assert!(TimerConfig { duration_seconds }.validate().is_ok(), "{duration_seconds}");
    }
}

#[test]
fn duration_below_floor_rejected() {
    for duration_seconds in [0, 4] {
        let err = TimerConfig { duration_seconds }
            .validate()
            .expect_err("below floor");
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }
}
