//! Sweep configuration value object.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Immutable parameters of one threshold search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfiguration {
    /// Protocol modulus `q`
    modulus: u64,
    /// Largest party count to try
    max_party_count: usize,
}

impl SweepConfiguration {
    pub fn new(modulus: u64, max_party_count: usize) -> Result<Self, DomainError> {
        if modulus < 2 {
            return Err(DomainError::InvalidModulus(modulus));
        }
        if max_party_count == 0 {
            return Err(DomainError::InvalidMaxPartyCount(max_party_count));
        }
        Ok(Self {
            modulus,
            max_party_count,
        })
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    pub fn max_party_count(&self) -> usize {
        self.max_party_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_configuration() {
        let config = SweepConfiguration::new(315521, 100).unwrap();
        assert_eq!(config.modulus(), 315521);
        assert_eq!(config.max_party_count(), 100);
    }

    #[test]
    fn test_rejects_degenerate_modulus() {
        assert_eq!(
            SweepConfiguration::new(1, 10),
            Err(DomainError::InvalidModulus(1))
        );
    }

    #[test]
    fn test_rejects_zero_parties() {
        assert_eq!(
            SweepConfiguration::new(257, 0),
            Err(DomainError::InvalidMaxPartyCount(0))
        );
    }
}
