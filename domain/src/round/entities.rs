//! Round entities.

use super::outcome::TallyOutcome;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Last observed state of one party process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartyStatus {
    /// Spawned and not known to have exited when the round was recorded
    Running,
    /// Exited with the given code (`None` when killed by a signal)
    Exited { code: Option<i32> },
    /// The launcher could not start it
    SpawnFailed { reason: String },
    /// Never launched because an earlier party failed to spawn
    NotLaunched,
}

impl PartyStatus {
    pub fn is_clean_exit(&self) -> bool {
        matches!(self, Self::Exited { code: Some(0) })
    }
}

/// One party slot of a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRecord {
    /// Party index `i` in `0..m`
    pub index: usize,
    /// Party count `m` of the protocol instance
    pub total_parties: usize,
    pub status: PartyStatus,
}

impl PartyRecord {
    pub fn new(index: usize, total_parties: usize, status: PartyStatus) -> Self {
        Self {
            index,
            total_parties,
            status,
        }
    }
}

/// One trial of the protocol for a fixed party count.
///
/// Party records always cover the contiguous range `0..party_count`, one record
/// per index, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    party_count: usize,
    parties: Vec<PartyRecord>,
    outcome: TallyOutcome,
}

impl Round {
    /// Assemble a round, checking that the records cover `0..party_count`.
    pub fn new(
        party_count: usize,
        parties: Vec<PartyRecord>,
        outcome: TallyOutcome,
    ) -> Result<Self, DomainError> {
        if party_count == 0 {
            return Err(DomainError::EmptyRound);
        }

        if parties.len() != party_count {
            return Err(DomainError::NonContiguousParties {
                expected: party_count,
                found: parties.len(),
                position: parties.len().min(party_count),
            });
        }

        for (position, record) in parties.iter().enumerate() {
            if record.index != position || record.total_parties != party_count {
                return Err(DomainError::NonContiguousParties {
                    expected: party_count,
                    found: record.index,
                    position,
                });
            }
        }

        Ok(Self {
            party_count,
            parties,
            outcome,
        })
    }

    pub fn party_count(&self) -> usize {
        self.party_count
    }

    pub fn parties(&self) -> &[PartyRecord] {
        &self.parties
    }

    pub fn outcome(&self) -> &TallyOutcome {
        &self.outcome
    }

    pub fn into_outcome(self) -> TallyOutcome {
        self.outcome
    }

    /// Number of parties that exited with status 0
    pub fn clean_exits(&self) -> usize {
        self.parties
            .iter()
            .filter(|p| p.status.is_clean_exit())
            .count()
    }
}
