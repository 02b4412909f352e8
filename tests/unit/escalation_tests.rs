//! Unit tests for reason classification and the message timeline.

use courtroom_drill::config::{EscalationConfig, ScriptedMessage};
use courtroom_drill::escalation::{MessageTimeline, TimelineSignal};
use courtroom_drill::inspector::Findings;
use courtroom_drill::models::escalation::{ReasonCategory, Severity};
use courtroom_drill::models::session::SessionEpoch;

fn scripted(at_seconds: u64, reason: &str) -> ScriptedMessage {
    ScriptedMessage {
        at_seconds,
        reason: reason.to_owned(),
        sender: "Boss".to_owned(),
        text: format!("about {reason}"),
    }
}

fn config(messages: Vec<ScriptedMessage>) -> EscalationConfig {
    EscalationConfig {
        urgent_after_seconds: 3,
        critical_after_seconds: 6,
        messages,
    }
}

fn all_open() -> Findings {
    Findings {
        has_image_without_alt: true,
        has_unvalidated_input: true,
        lacks_password_field: true,
        has_insecure_form: true,
    }
}

fn running(messages: Vec<ScriptedMessage>) -> (MessageTimeline, SessionEpoch) {
    let epoch = SessionEpoch::new(1);
    let mut timeline = MessageTimeline::new(&config(messages));
    timeline.reset(epoch);
    timeline.set_disabled(false);
    (timeline, epoch)
}

fn advance_n(
    timeline: &mut MessageTimeline,
    epoch: SessionEpoch,
    findings: &Findings,
    n: u64,
) -> Vec<TimelineSignal> {
    (0..n)
        .flat_map(|_| timeline.advance(epoch, findings))
        .collect()
}

// ─── classification ──────────────────────────────────────────────────

#[test]
fn reasons_classify_case_insensitively() {
    assert_eq!(
        ReasonCategory::from_reason("Missing ALT text"),
        ReasonCategory::Accessibility
    );
    assert_eq!(
        ReasonCategory::from_reason("INPUT VALIDATION"),
        ReasonCategory::Validation
    );
    assert_eq!(
        ReasonCategory::from_reason("user Login broken"),
        ReasonCategory::Authentication
    );
    assert_eq!(
        ReasonCategory::from_reason("insecure form"),
        ReasonCategory::Security
    );
    assert_eq!(
        ReasonCategory::from_reason("status update"),
        ReasonCategory::Generic
    );
    assert_eq!(ReasonCategory::from_reason(""), ReasonCategory::Generic);
}

#[test]
fn bare_login_is_generic() {
    assert_eq!(ReasonCategory::from_reason("login"), ReasonCategory::Generic);
    assert_eq!(
        ReasonCategory::from_reason("login page slow"),
        ReasonCategory::Generic
    );
    assert_eq!(
        ReasonCategory::from_reason("User Login"),
        ReasonCategory::Authentication
    );
}

#[test]
fn severities_are_ordered() {
    assert!(Severity::Advisory < Severity::Urgent);
    assert!(Severity::Urgent < Severity::Critical);
}

// ─── timeline ────────────────────────────────────────────────────────

#[test]
fn new_timeline_is_disabled() {
    let epoch = SessionEpoch::new(1);
    let mut timeline = MessageTimeline::new(&config(vec![scripted(1, "missing alt")]));
    timeline.reset(epoch);

    assert!(timeline.advance(epoch, &all_open()).is_empty());
    assert_eq!(timeline.elapsed_seconds(), 0);
}

#[test]
fn messages_post_at_their_second() {
    let (mut timeline, epoch) = running(vec![scripted(2, "missing alt"), scripted(1, "user login")]);

    let first = timeline.advance(epoch, &all_open());
    assert!(
        matches!(first.as_slice(), [TimelineSignal::Posted(m)] if m.reason == "user login" && m.id == 1),
        "script is sorted by time: {first:?}"
    );

    let second = timeline.advance(epoch, &all_open());
    assert!(
        matches!(second.as_slice(), [TimelineSignal::Posted(m)] if m.id == 2 && m.posted_at == 2)
    );
    assert_eq!(timeline.pending(), 2);
}

#[test]
fn ignored_message_escalates_then_triggers_court() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    let signals = advance_n(&mut timeline, epoch, &all_open(), 7);

    let urgent_at = signals
        .iter()
        .position(|s| matches!(s, TimelineSignal::Urgent))
        .expect("urgent raised");
    let court_at = signals
        .iter()
        .position(|s| matches!(s, TimelineSignal::CourtTrigger { .. }))
        .expect("court raised");
    assert!(urgent_at < court_at, "urgent always precedes critical");

    assert!(matches!(
        signals.last(),
        Some(TimelineSignal::CourtTrigger { category: ReasonCategory::Accessibility, .. })
    ));
    assert!(timeline.has_triggered());
    assert_eq!(timeline.messages()[0].severity, Severity::Critical);
}

#[test]
fn urgent_signal_raised_once_per_epoch() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt"), scripted(2, "user login")]);
    let signals = advance_n(&mut timeline, epoch, &all_open(), 5);

    let urgent_count = signals
        .iter()
        .filter(|s| matches!(s, TimelineSignal::Urgent))
        .count();
    assert_eq!(urgent_count, 1);
}

#[test]
fn timeline_inert_after_trigger() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt"), scripted(20, "user login")]);
    advance_n(&mut timeline, epoch, &all_open(), 7);
    assert!(timeline.has_triggered());

    assert!(advance_n(&mut timeline, epoch, &all_open(), 30).is_empty());
    assert_eq!(timeline.messages().len(), 1);
}

#[test]
fn fixing_workspace_addresses_message() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    timeline.advance(epoch, &all_open());

    let fixed = Findings {
        has_image_without_alt: false,
        ..all_open()
    };
    let signals = timeline.advance(epoch, &fixed);
    assert_eq!(signals, vec![TimelineSignal::Addressed { id: 1 }]);

    assert!(advance_n(&mut timeline, epoch, &fixed, 10).is_empty());
    assert!(!timeline.has_triggered());
    assert_eq!(timeline.pending(), 0);
}

#[test]
fn generic_message_needs_acknowledgement() {
    let (mut timeline, epoch) = running(vec![scripted(1, "status update")]);
    timeline.advance(epoch, &Findings::default());
    timeline.advance(epoch, &Findings::default());
    assert_eq!(timeline.pending(), 1, "clean workspace does not close generic messages");

    assert!(timeline.acknowledge(1));
    assert!(!timeline.acknowledge(1), "second acknowledgement is a no-op");
    assert!(advance_n(&mut timeline, epoch, &Findings::default(), 10).is_empty());
}

#[test]
fn acknowledge_ignores_non_generic_and_unknown() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    timeline.advance(epoch, &all_open());

    assert!(!timeline.acknowledge(1));
    assert!(!timeline.acknowledge(42));
}

#[test]
fn disabled_timeline_freezes_deadlines() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    advance_n(&mut timeline, epoch, &all_open(), 3);

    timeline.set_disabled(true);
    assert!(advance_n(&mut timeline, epoch, &all_open(), 100).is_empty());
    assert_eq!(timeline.elapsed_seconds(), 3);
    assert!(!timeline.acknowledge(1));

    timeline.set_disabled(false);
    let signals = timeline.advance(epoch, &all_open());
    assert!(
        matches!(
            signals.as_slice(),
            [TimelineSignal::Escalated { id: 1, event }, TimelineSignal::Urgent]
                if event.severity == Severity::Urgent
                    && event.reason_category == ReasonCategory::Accessibility
        )
    );
}

#[test]
fn stale_epoch_does_not_advance() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    assert!(timeline.advance(epoch.next(), &all_open()).is_empty());
    assert_eq!(timeline.elapsed_seconds(), 0);
}

#[test]
fn reset_clears_messages_and_trigger() {
    let (mut timeline, epoch) = running(vec![scripted(1, "missing alt")]);
    advance_n(&mut timeline, epoch, &all_open(), 7);

    let next = epoch.next();
    timeline.reset(next);
    assert!(timeline.messages().is_empty());
    assert!(!timeline.has_triggered());
    assert_eq!(timeline.elapsed_seconds(), 0);

    let signals = timeline.advance(next, &all_open());
    assert!(matches!(signals.as_slice(), [TimelineSignal::Posted(m)] if m.id == 1));
}
