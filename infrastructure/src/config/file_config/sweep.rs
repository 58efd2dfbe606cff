//! Sweep configuration from TOML (`[sweep]` section)

use avp_sweep_domain::{DEFAULT_SUCCESS_MARKER, DomainError, SearchStrategy, SweepConfiguration};
use serde::{Deserialize, Serialize};

/// Moduli to sweep and the party-count range of each search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSweepConfig {
    /// Moduli `q`, searched in this order
    pub moduli: Vec<u64>,
    pub max_party_count: usize,
    pub success_marker: String,
    pub strategy: SearchStrategy,
}

impl Default for FileSweepConfig {
    fn default() -> Self {
        Self {
            moduli: vec![315521],
            max_party_count: 100,
            success_marker: DEFAULT_SUCCESS_MARKER.to_string(),
            strategy: SearchStrategy::default(),
        }
    }
}

impl FileSweepConfig {
    /// One configuration per modulus, in order
    pub fn configurations(&self) -> Result<Vec<SweepConfiguration>, DomainError> {
        self.moduli
            .iter()
            .map(|&q| SweepConfiguration::new(q, self.max_party_count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;
    use super::*;

    #[test]
    fn test_sweep_section() {
        let toml_str = r#"
[sweep]
moduli = [19457, 100609, 708481]
strategy = "exhaustive"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.strategy, SearchStrategy::Exhaustive);
        assert_eq!(config.sweep.max_party_count, 100);

        let configurations = config.sweep.configurations().unwrap();
        let moduli: Vec<_> = configurations.iter().map(|c| c.modulus()).collect();
        assert_eq!(moduli, vec![19457, 100609, 708481]);
    }

    #[test]
    fn test_degenerate_modulus_rejected() {
        let sweep = FileSweepConfig {
            moduli: vec![257, 1],
            ..Default::default()
        };
        assert_eq!(sweep.configurations(), Err(DomainError::InvalidModulus(1)));
    }
}
