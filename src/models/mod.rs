//! Domain model module declarations.

pub mod escalation;
pub mod record;
pub mod session;
