//! Unit tests for console line parsing and status rendering.

use std::io;
use std::path::PathBuf;

use courtroom_drill::config::GlobalConfig;
use courtroom_drill::console::{parse_line, render_status, write_parse_error, ConsoleCommand};
use courtroom_drill::models::escalation::{Message, ReasonCategory, Severity};
use courtroom_drill::models::session::{SessionState, Stage};
use courtroom_drill::orchestrator::{SessionEvent, SessionMachine};

fn parse(line: &str) -> ConsoleCommand {
    parse_line(line).expect("parses").expect("not blank")
}

#[test]
fn simple_commands_parse() {
    assert_eq!(parse("start"), ConsoleCommand::Start);
    assert_eq!(parse("  pause "), ConsoleCommand::Pause);
    assert_eq!(parse("reset"), ConsoleCommand::Reset);
    assert_eq!(parse("restart"), ConsoleCommand::Restart);
    assert_eq!(parse("save"), ConsoleCommand::Save);
    assert_eq!(parse("show"), ConsoleCommand::Show);
    assert_eq!(parse("status"), ConsoleCommand::Status);
    assert_eq!(parse("quit"), ConsoleCommand::Quit);
}

#[test]
fn commands_with_arguments_parse() {
    assert_eq!(parse("time 90"), ConsoleCommand::Time { seconds: 90 });
    assert_eq!(parse("ack 5"), ConsoleCommand::Ack { id: 5 });
    assert_eq!(
        parse("load ./page.html"),
        ConsoleCommand::Load {
            path: PathBuf::from("./page.html")
        }
    );
    assert_eq!(parse("records"), ConsoleCommand::Records { limit: 5 });
    assert_eq!(parse("records 2"), ConsoleCommand::Records { limit: 2 });
}

#[test]
fn set_takes_rest_of_line() {
    let ConsoleCommand::Set { text } = parse(r#"set <img src="a.png" alt="Logo"> --not-a-flag"#)
    else {
        panic!("expected set");
    };
    assert_eq!(text, r#"<img src="a.png" alt="Logo"> --not-a-flag"#);
}

#[test]
fn set_keeps_spacing_as_typed() {
    assert_eq!(
        parse("set   <p>a    b</p>\\n    <p>c</p>  "),
        ConsoleCommand::Set {
            text: "  <p>a    b</p>\\n    <p>c</p>  ".into()
        }
    );
    assert_eq!(
        parse("  set\t<p>tab</p>"),
        ConsoleCommand::Set {
            text: "<p>tab</p>".into()
        }
    );
}

#[test]
fn blank_line_is_none() {
    assert!(parse_line("").expect("ok").is_none());
    assert!(parse_line("   \t").expect("ok").is_none());
}

#[test]
fn bad_input_is_rejected() {
    assert!(parse_line("launch").is_err());
    assert!(parse_line("time soon").is_err());
    assert!(parse_line("time -3").is_err());
    assert!(parse_line("set").is_err());
    assert!(parse_line("set    ").is_err());
}

struct ClosedPipe;

impl io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn parse_error_renders_offending_word() {
    let err = parse_line("launch").expect_err("unknown command");
    let mut out = Vec::new();
    write_parse_error(&mut out, &err).expect("write");

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.contains("launch"), "{text}");
}

#[test]
fn parse_error_write_failure_is_returned() {
    let err = parse_line("launch").expect_err("unknown command");
    let failure = write_parse_error(&mut ClosedPipe, &err).expect_err("pipe closed");
    assert_eq!(failure.kind(), io::ErrorKind::BrokenPipe);
}

#[test]
fn idle_status_shows_configured_time() {
    let mut machine = SessionMachine::new(&GlobalConfig::default());
    machine.apply(SessionEvent::ConfigureDuration(75), "");

    let text = render_status(&machine.snapshot());
    assert_eq!(text, "Stage 1 | idle | 01:15 (press start; time is 75s)");
}

#[test]
fn running_status_lists_messages() {
    let mut snapshot = SessionMachine::new(&GlobalConfig::default()).snapshot();
    snapshot.state = SessionState::Running;
    snapshot.stage = Stage::Urgent;
    snapshot.clock_visible = true;
    snapshot.remaining_seconds = 125;
    snapshot.messages = vec![
        Message {
            id: 1,
            reason: "missing alt".into(),
            category: ReasonCategory::Accessibility,
            sender: "Boss".into(),
            text: "Add alt text.".into(),
            severity: Severity::Urgent,
            posted_at: 10,
            addressed: false,
        },
        Message {
            id: 2,
            reason: "status update".into(),
            category: ReasonCategory::Generic,
            sender: "Boss".into(),
            text: "Status?".into(),
            severity: Severity::Advisory,
            posted_at: 40,
            addressed: true,
        },
    ];

    let text = render_status(&snapshot);
    assert_eq!(
        text,
        "Stage 2 | running | 02:05\n  #1 [URGENT] Boss: Add alt text.\n  #2 [done] Boss: Status?"
    );
}
