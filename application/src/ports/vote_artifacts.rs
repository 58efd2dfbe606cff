//! Vote artifact port
//!
//! Every party persists its vote under a name derived from its index. Probing
//! for those artifacts is the completion signal of the polling settlement.

/// Checks whether a party's persisted vote exists
pub trait VoteArtifactProbe: Send + Sync {
    fn is_present(&self, index: usize) -> bool;

    /// Indices in `0..party_count` whose artifact is still missing
    fn missing(&self, party_count: usize) -> Vec<usize> {
        (0..party_count).filter(|&i| !self.is_present(i)).collect()
    }
}
