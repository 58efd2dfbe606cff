//! Settlement configuration from TOML (`[settlement]` section)

use crate::artifacts::{DEFAULT_ARTIFACT_DIR, DEFAULT_ARTIFACT_PREFIX, DirectoryVoteArtifacts};
use avp_sweep_application::SettlementPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which settlement policy to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSettlementPolicy {
    /// Sleep `delay_secs`, then tally
    Fixed,
    /// Wait for every party to exit, at most `timeout_secs`
    #[default]
    Barrier,
    /// Poll for vote artifacts every `poll_interval_ms`, at most `timeout_secs`
    Poll,
}

impl fmt::Display for FileSettlementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fixed => "fixed",
            Self::Barrier => "barrier",
            Self::Poll => "poll",
        })
    }
}

impl FromStr for FileSettlementPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(Self::Fixed),
            "barrier" => Ok(Self::Barrier),
            "poll" => Ok(Self::Poll),
            other => Err(format!("unknown settlement policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettlementConfig {
    pub policy: FileSettlementPolicy,
    pub delay_secs: u64,
    pub timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub artifact_dir: PathBuf,
    pub artifact_prefix: String,
    /// Also kill stray vote processes by name before each round
    pub reap_stale_by_name: bool,
}

impl Default for FileSettlementConfig {
    fn default() -> Self {
        Self {
            policy: FileSettlementPolicy::default(),
            delay_secs: 30,
            timeout_secs: 30,
            poll_interval_ms: 200,
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            artifact_prefix: DEFAULT_ARTIFACT_PREFIX.to_string(),
            reap_stale_by_name: false,
        }
    }
}

impl FileSettlementConfig {
    pub fn to_policy(&self) -> SettlementPolicy {
        match self.policy {
            FileSettlementPolicy::Fixed => SettlementPolicy::FixedDelay {
                delay: Duration::from_secs(self.delay_secs),
            },
            FileSettlementPolicy::Barrier => SettlementPolicy::CompletionBarrier {
                timeout: Duration::from_secs(self.timeout_secs),
            },
            FileSettlementPolicy::Poll => SettlementPolicy::ArtifactPolling {
                timeout: Duration::from_secs(self.timeout_secs),
                interval: Duration::from_millis(self.poll_interval_ms),
            },
        }
    }

    pub fn artifact_probe(&self) -> DirectoryVoteArtifacts {
        DirectoryVoteArtifacts::new(&self.artifact_dir, &self.artifact_prefix)
    }
}
