//! Round parameters - coordination policy for one round.
//!
//! These are application-layer concerns: what marks success, how long to wait
//! for the parties and how to clean up after them. What the external programs
//! are and where they live is an infrastructure concern.

use avp_sweep_domain::DEFAULT_SUCCESS_MARKER;
use std::time::Duration;

/// How the coordinator waits for the parties of a round before tallying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementPolicy {
    /// Sleep for a fixed window, then tally regardless.
    FixedDelay { delay: Duration },
    /// Wait for every party process to exit, bounded by `timeout`.
    CompletionBarrier { timeout: Duration },
    /// Poll for every party's vote artifact, bounded by `timeout`.
    ArtifactPolling { timeout: Duration, interval: Duration },
}

impl SettlementPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FixedDelay { .. } => "fixed",
            Self::CompletionBarrier { .. } => "barrier",
            Self::ArtifactPolling { .. } => "poll",
        }
    }
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self::CompletionBarrier {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Coordination parameters for every round of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundParams {
    /// Substring of the tally report that means unanimous yes
    pub success_marker: String,
    /// Settlement wait policy
    pub settlement: SettlementPolicy,
    /// Also kill stray vote processes by name before each round
    pub reap_stale_by_name: bool,
}

impl Default for RoundParams {
    fn default() -> Self {
        Self {
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            settlement: SettlementPolicy::default(),
            reap_stale_by_name: false,
        }
    }
}

impl RoundParams {
    // ==================== Builder Methods ====================

    pub fn with_success_marker(mut self, marker: impl Into<String>) -> Self {
        self.success_marker = marker.into();
        self
    }

    pub fn with_settlement(mut self, settlement: SettlementPolicy) -> Self {
        self.settlement = settlement;
        self
    }

    pub fn with_reap_stale_by_name(mut self, enabled: bool) -> Self {
        self.reap_stale_by_name = enabled;
        self
    }
}
