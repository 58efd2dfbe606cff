//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Party count must be at least 1")]
    EmptyRound,

    #[error("Party records must cover indices 0..{expected} exactly once (found index {found} at position {position})")]
    NonContiguousParties {
        expected: usize,
        found: usize,
        position: usize,
    },

    #[error("Invalid modulus {0}: must be at least 2")]
    InvalidModulus(u64),

    #[error("Invalid maximum party count: {0}")]
    InvalidMaxPartyCount(usize),

    #[error("Sweep cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
