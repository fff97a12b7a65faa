//! Participant-facing token checks.

pub mod gate;
pub mod matcher;

pub use gate::{AuthGate, AuthResult};
pub use matcher::ConstantTimeMatcher;
