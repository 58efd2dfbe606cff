//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod protocol;
mod settlement;
mod sweep;

pub use output::{FileOutputConfig, FileOutputFormat};
pub use protocol::FileProtocolConfig;
pub use settlement::{FileSettlementConfig, FileSettlementPolicy};
pub use sweep::FileSweepConfig;

use avp_sweep_application::RoundParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("sweep.moduli cannot be empty")]
    NoModuli,

    #[error("sweep.moduli: modulus {0} must be at least 2")]
    InvalidModulus(u64),

    #[error("sweep.max_party_count cannot be 0")]
    ZeroMaxPartyCount,

    #[error("sweep.success_marker cannot be empty")]
    EmptySuccessMarker,

    #[error("{0}.program cannot be empty")]
    EmptyProgram(&'static str),

    #[error("{0} cannot be 0")]
    ZeroDuration(&'static str),
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// External programs
    pub protocol: FileProtocolConfig,
    /// Moduli and search range
    pub sweep: FileSweepConfig,
    /// How each round waits for its parties
    pub settlement: FileSettlementConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, stopping at the first problem.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.sweep.moduli.is_empty() {
            return Err(ConfigValidationError::NoModuli);
        }
        if let Some(&q) = self.sweep.moduli.iter().find(|&&q| q < 2) {
            return Err(ConfigValidationError::InvalidModulus(q));
        }
        if self.sweep.max_party_count == 0 {
            return Err(ConfigValidationError::ZeroMaxPartyCount);
        }
        if self.sweep.success_marker.is_empty() {
            return Err(ConfigValidationError::EmptySuccessMarker);
        }

        for (field, spec) in self.protocol.programs() {
            if spec.program.trim().is_empty() {
                return Err(ConfigValidationError::EmptyProgram(field));
            }
        }

        let durations = [
            ("protocol.utility_timeout_secs", self.protocol.utility_timeout_secs),
            ("settlement.delay_secs", self.settlement.delay_secs),
            ("settlement.timeout_secs", self.settlement.timeout_secs),
            ("settlement.poll_interval_ms", self.settlement.poll_interval_ms),
        ];
        if let Some(&(field, _)) = durations.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigValidationError::ZeroDuration(field));
        }

        Ok(())
    }

    /// Coordination parameters shared by every round
    pub fn round_params(&self) -> RoundParams {
        RoundParams::default()
            .with_success_marker(self.sweep.success_marker.clone())
            .with_settlement(self.settlement.to_policy())
            .with_reap_stale_by_name(self.settlement.reap_stale_by_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avp_sweep_application::SettlementPolicy;
    use avp_sweep_domain::{OutputFormat, SearchStrategy};
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[protocol]
modulus_env = "Q"
utility_timeout_secs = 60
tally = { program = "avptally", args = ["--verbose"] }

[sweep]
moduli = [19457, 100609]
max_party_count = 40
success_marker = "ALL VOTED YES"
strategy = "linear"

[settlement]
policy = "fixed"
delay_secs = 30
reap_stale_by_name = true

[output]
format = "json"
color = false
round_log = "rounds.jsonl"
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.protocol.modulus_env, "Q");
        assert_eq!(config.protocol.tally.args, vec!["--verbose"]);
        assert_eq!(config.sweep.moduli, vec![19457, 100609]);
        assert_eq!(config.sweep.max_party_count, 40);
        assert_eq!(config.sweep.strategy, SearchStrategy::Linear);
        assert_eq!(config.settlement.policy, FileSettlementPolicy::Fixed);
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
        assert!(config.validate().is_ok());

        let params = config.round_params();
        assert!(params.reap_stale_by_name);
        assert_eq!(
            params.settlement,
            SettlementPolicy::FixedDelay {
                delay: Duration::from_secs(30)
            }
        );
    }

    #[test]
    fn test_deserialize_partial_config() {
        let toml_str = r#"
[sweep]
max_party_count = 20
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sweep.max_party_count, 20);
        // Defaults should apply
        assert_eq!(config.sweep.moduli, vec![315521]);
        assert_eq!(config.settlement.policy, FileSettlementPolicy::Barrier);
        assert!(config.output.color);
    }

    #[test]
    fn test_default_config() {
        let config = FileConfig::default();
        assert_eq!(config.protocol.vote.program, "avpvote");
        assert_eq!(config.sweep.success_marker, "ALL VOTED YES");
        assert!(!config.settlement.reap_stale_by_name);
        assert!(config.output.format.is_none());
        assert_eq!(config.round_params(), RoundParams::default());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FileConfig::default();
        config.sweep.moduli.clear();
        assert_eq!(config.validate(), Err(ConfigValidationError::NoModuli));

        let mut config = FileConfig::default();
        config.sweep.moduli = vec![19457, 0];
        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidModulus(0)));

        let mut config = FileConfig::default();
        config.sweep.max_party_count = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroMaxPartyCount));

        let mut config = FileConfig::default();
        config.sweep.success_marker.clear();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptySuccessMarker));

        let mut config = FileConfig::default();
        config.protocol.initialize.program = " ".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::EmptyProgram("protocol.initialize"))
        );

        let mut config = FileConfig::default();
        config.settlement.poll_interval_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroDuration("settlement.poll_interval_ms"))
        );
    }
}
