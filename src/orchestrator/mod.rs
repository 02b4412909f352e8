//! Session orchestration.
//!
//! Covers the session state machine, the epoch-tagged background tickers
//! that drive it, and the async runtime that hosts it.

pub mod machine;
pub mod runtime;
pub mod ticker;

pub use machine::{Effect, SessionEvent, SessionMachine, SessionSnapshot};
pub use runtime::{Collaborators, SessionHandle, SessionRuntime};
