//! Port for structured round logging.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port records every executed round
//! in a machine-readable format (JSONL).

use avp_sweep_domain::Round;

/// Port for logging executed rounds to a structured log.
///
/// The `log_round` method is synchronous and non-fallible; logging failures
/// must not disturb the sweep.
pub trait RoundLogger: Send + Sync {
    fn log_round(&self, modulus: u64, round: &Round);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoRoundLogger;

impl RoundLogger for NoRoundLogger {
    fn log_round(&self, _modulus: u64, _round: &Round) {}
}
