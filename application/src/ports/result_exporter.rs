//! Result exporter port
//!
//! Hands the ordered `(q, m_max)` sequence to the plotting collaborator.

use avp_sweep_domain::SweepResult;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write results to {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Failed to serialize results: {0}")]
    Serialize(String),
}

/// Writes a sweep result somewhere a plotting tool can read it
pub trait ResultExporter: Send + Sync {
    fn export(&self, result: &SweepResult) -> Result<(), ExportError>;
}
