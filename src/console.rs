//! Line-oriented terminal front end.
//!
//! Each input line is parsed with clap into a [`ConsoleCommand`] and then
//! executed against a [`SessionHandle`] and the shared document.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::escalation::Severity;
use crate::orchestrator::{SessionHandle, SessionSnapshot};
use crate::persistence::record_repo::RecordRepo;
use crate::workspace::{SharedDocument, Workspace};
use crate::{AppError, Result};

/// One parsed input line.
#[derive(Debug, Parser)]
#[command(no_binary_name = true, name = "drill", disable_version_flag = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    command: ConsoleCommand,
}

/// Commands understood by the terminal front end.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConsoleCommand {
    /// Set the countdown length in seconds (before starting).
    Time {
        /// Countdown length.
        seconds: u64,
    },
    /// Start the session.
    Start,
    /// Pause or resume.
    Pause,
    /// Put the starting template back in the workspace.
    Reset,
    /// Abandon the session and return to the ready screen.
    Restart,
    /// Save the workspace.
    Save,
    /// Acknowledge a message.
    Ack {
        /// Message number.
        id: u32,
    },
    /// Print the workspace.
    Show,
    /// Print clock, stage and messages.
    Status,
    /// Replace the workspace text with the rest of the line; `\n` starts a new line.
    Set {
        /// New document text, spacing kept as typed.
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Replace the workspace text with a file's contents.
    Load {
        /// File to read.
        path: PathBuf,
    },
    /// List recently saved records.
    Records {
        /// How many to show.
        #[arg(default_value_t = 5)]
        limit: u32,
    },
    /// Leave.
    Quit,
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// `set` takes everything after the single separator following the command
/// word verbatim; all other commands are split on whitespace.
///
/// # Errors
///
/// Returns the clap error (including help output) for unknown commands.
pub fn parse_line(line: &str) -> std::result::Result<Option<ConsoleCommand>, clap::Error> {
    let line = line.trim_start();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    if word.is_empty() {
        return Ok(None);
    }
    if word == "set" && !rest.trim().is_empty() {
        return Ok(Some(ConsoleCommand::Set {
            text: rest.to_owned(),
        }));
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    ConsoleLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Write a parse failure, or the help clap produced, to `out`.
///
/// # Errors
///
/// Returns the underlying write error.
pub fn write_parse_error(out: &mut impl std::io::Write, err: &clap::Error) -> std::io::Result<()> {
    std::io::Write::write_all(out, err.render().to_string().as_bytes())
}

/// What the caller should do after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print this.
    Text(String),
    /// Nothing to print.
    Nothing,
    /// Stop reading input.
    Quit,
}

/// Executes console commands.
pub struct Console {
    session: SessionHandle,
    document: SharedDocument,
    records: Option<RecordRepo>,
}

impl Console {
    /// Construct a console. `records` enables the `records` command.
    #[must_use]
    pub fn new(session: SessionHandle, document: SharedDocument, records: Option<RecordRepo>) -> Self {
        Self {
            session,
            document,
            records,
        }
    }

    /// Run one command.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ReadOnly` for edits while the session is not
    /// running, `AppError::Io` for unreadable files, `AppError::Db` if the
    /// record listing fails, and `AppError::Closed` if the session runtime
    /// has stopped.
    pub async fn execute(&self, command: ConsoleCommand) -> Result<Reply> {
        match command {
            ConsoleCommand::Time { seconds } => self.session.configure_duration(seconds).await?,
            ConsoleCommand::Start => self.session.start().await?,
            ConsoleCommand::Pause => self.session.toggle_pause().await?,
            ConsoleCommand::Reset => self.session.reset().await?,
            ConsoleCommand::Restart => self.session.restart().await?,
            ConsoleCommand::Save => {
                if !self.session.snapshot().editable {
                    return Ok(Reply::Text("Save is available while the session is running.".into()));
                }
                self.session.save().await?;
            }
            ConsoleCommand::Ack { id } => self.session.acknowledge(id).await?,
            ConsoleCommand::Show => return Ok(Reply::Text(self.document.text())),
            ConsoleCommand::Status => return Ok(Reply::Text(render_status(&self.session.snapshot()))),
            ConsoleCommand::Set { text } => {
                self.document.edit(&text.replace("\\n", "\n"))?;
            }
            ConsoleCommand::Load { path } => {
                let text = tokio::fs::read_to_string(&path).await.map_err(|err| {
                    AppError::Io(format!("cannot read {}: {err}", path.display()))
                })?;
                self.document.edit(&text)?;
            }
            ConsoleCommand::Records { limit } => return self.list_records(limit).await,
            ConsoleCommand::Quit => return Ok(Reply::Quit),
        }
        Ok(Reply::Nothing)
    }

    async fn list_records(&self, limit: u32) -> Result<Reply> {
        let Some(repo) = &self.records else {
            return Ok(Reply::Text("Records are kept by the remote store.".into()));
        };
        let records = repo.list_recent(limit).await?;
        if records.is_empty() {
            return Ok(Reply::Text("No saved records yet.".into()));
        }

        let mut out = String::new();
        for record in records {
            let _ = writeln!(
                out,
                "{}  {}  {}  {} bytes",
                record.created_at.format("%Y-%m-%d %H:%M:%S"),
                record.user_identifier,
                record.stage_label,
                record.document_content.len()
            );
        }
        Ok(Reply::Text(out.trim_end().to_owned()))
    }
}

/// Human-readable clock, stage and inbox summary.
#[must_use]
pub fn render_status(snapshot: &SessionSnapshot) -> String {
    let mut out = format!(
        "Stage {} | {} | {}",
        snapshot.stage.number(),
        snapshot.state,
        format_clock(snapshot.remaining_seconds)
    );
    if !snapshot.clock_visible {
        let _ = write!(out, " (press start; time is {}s)", snapshot.duration_seconds);
        return out;
    }

    for message in &snapshot.messages {
        let status = if message.addressed {
            "done".to_owned()
        } else if message.severity == Severity::Advisory {
            "open".to_owned()
        } else {
            message.severity.to_string().to_uppercase()
        };
        let _ = write!(
            out,
            "\n  #{} [{status}] {}: {}",
            message.id, message.sender, message.text
        );
    }
    out
}

fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
