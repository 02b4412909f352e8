#![forbid(unsafe_code)]

//! Timed workspace drill: a learner fixes a page while workplace messages
//! escalate toward a court summons.

pub mod config;
pub mod console;
pub mod errors;
pub mod escalation;
pub mod inspector;
pub mod models;
pub mod notify;
pub mod orchestrator;
pub mod persistence;
pub mod timer;
pub mod workspace;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
