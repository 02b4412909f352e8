#![forbid(unsafe_code)]

//! `courtroom-drill`: terminal host for the timed workspace drill.
//!
//! Bootstraps configuration and logging, opens the configured record store,
//! starts the session runtime and reads console commands from stdin.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use courtroom_drill::config::{GlobalConfig, PersistenceBackend};
use courtroom_drill::console::{parse_line, write_parse_error, Console, Reply};
use courtroom_drill::notify::ConsoleNotifier;
use courtroom_drill::orchestrator::{Collaborators, SessionRuntime};
use courtroom_drill::persistence::db;
use courtroom_drill::persistence::http::HttpRecordStore;
use courtroom_drill::persistence::record_repo::RecordRepo;
use courtroom_drill::persistence::RecordStore;
use courtroom_drill::workspace::SharedDocument;
use courtroom_drill::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "courtroom-drill", about = "Timed workspace drill", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Countdown length to pre-fill, in seconds.
    #[arg(long)]
    duration: Option<u64>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("courtroom-drill bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default(),
    };
    info!(backend = ?config.persistence.backend, "configuration loaded");

    // ── Open record store ───────────────────────────────
    let (store, records): (Arc<dyn RecordStore>, Option<RecordRepo>) =
        match config.persistence.backend {
            PersistenceBackend::Sqlite => {
                let pool = Arc::new(db::connect(&config.persistence.db_path).await?);
                info!(path = %config.persistence.db_path.display(), "database connected");
                let repo = RecordRepo::new(pool);
                let store: Arc<dyn RecordStore> = Arc::new(repo.clone());
                (store, Some(repo))
            }
            PersistenceBackend::Http => {
                let store = HttpRecordStore::new(&config.persistence.endpoint)?;
                info!(endpoint = store.endpoint(), "remote record store configured");
                let store: Arc<dyn RecordStore> = Arc::new(store);
                (store, None)
            }
        };

    // ── Start session runtime ───────────────────────────
    let ct = CancellationToken::new();
    let document = SharedDocument::default();
    let collaborators = Collaborators {
        workspace: Arc::new(document.clone()),
        notifier: Arc::new(ConsoleNotifier),
        store,
    };
    let (session, runtime_handle) = SessionRuntime::spawn(&config, collaborators, ct.clone());

    if let Some(seconds) = args.duration {
        session.configure_duration(seconds).await?;
    }

    let console = Console::new(session, document, records);
    println!("Type `help` for commands. `time <seconds>` then `start` to begin.");

    // ── Read commands until quit or shutdown ────────────
    tokio::select! {
        result = read_commands(&console) => {
            if let Err(err) = result {
                error!(%err, "console input failed");
            }
        }
        () = shutdown_signal() => info!("shutdown signal received"),
    }

    ct.cancel();
    drop(console);
    if let Err(err) = runtime_handle.await {
        error!(%err, "session runtime task failed");
    }
    info!("courtroom-drill shut down");

    Ok(())
}

async fn read_commands(console: &Console) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                let mut out = std::io::stdout().lock();
                if let Err(print_err) = write_parse_error(&mut out, &err) {
                    warn!(%print_err, "failed to print console usage");
                }
                continue;
            }
        };

        match console.execute(command).await {
            Ok(Reply::Text(text)) => println!("{text}"),
            Ok(Reply::Nothing) => {}
            Ok(Reply::Quit) => break,
            Err(err @ AppError::Closed(_)) => return Err(err),
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
