//! Protocol configuration from TOML (`[protocol]` section)

use crate::process::{DEFAULT_MODULUS_ENV, ProgramSpec, ProtocolCommands};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the external programs live and how they are invoked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProtocolConfig {
    /// Working directory for every program (current directory if unset)
    pub working_dir: Option<PathBuf>,
    /// Environment variable carrying the modulus `q`
    pub modulus_env: String,
    /// Upper bound for reset / initialize / tally
    pub utility_timeout_secs: u64,
    pub reset: ProgramSpec,
    pub initialize: ProgramSpec,
    pub vote: ProgramSpec,
    pub tally: ProgramSpec,
}

impl Default for FileProtocolConfig {
    fn default() -> Self {
        let commands = ProtocolCommands::default();
        Self {
            working_dir: None,
            modulus_env: DEFAULT_MODULUS_ENV.to_string(),
            utility_timeout_secs: 120,
            reset: commands.reset,
            initialize: commands.initialize,
            vote: commands.vote,
            tally: commands.tally,
        }
    }
}

impl FileProtocolConfig {
    pub fn commands(&self) -> ProtocolCommands {
        ProtocolCommands {
            reset: self.reset.clone(),
            initialize: self.initialize.clone(),
            vote: self.vote.clone(),
            tally: self.tally.clone(),
        }
    }

    pub(super) fn programs(&self) -> [(&'static str, &ProgramSpec); 4] {
        [
            ("protocol.reset", &self.reset),
            ("protocol.initialize", &self.initialize),
            ("protocol.vote", &self.vote),
            ("protocol.tally", &self.tally),
        ]
    }
}
