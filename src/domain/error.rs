//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the decay-matching rules.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown particle: {0}")]
    UnknownParticle(String),

    #[error("particle {name} already registered with code {existing}, refusing {requested}")]
    ConflictingParticle {
        name: String,
        existing: i32,
        requested: i32,
    },

    #[error("invalid decay descriptor '{input}': {message}")]
    InvalidDescriptor { input: String, message: String },
}
