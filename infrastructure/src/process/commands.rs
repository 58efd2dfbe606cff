//! Command lines of the external protocol programs

use avp_sweep_application::UtilityStep;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One external program plus the arguments placed before the per-call ones
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl ProgramSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Executable name without its directory (what `pkill -x` matches)
    pub fn process_name(&self) -> &str {
        Path::new(&self.program)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.program)
    }
}

/// The four programs making up the protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolCommands {
    pub reset: ProgramSpec,
    pub initialize: ProgramSpec,
    pub vote: ProgramSpec,
    pub tally: ProgramSpec,
}

impl Default for ProtocolCommands {
    fn default() -> Self {
        Self {
            reset: ProgramSpec::new("avpclean"),
            initialize: ProgramSpec::new("avpinit"),
            vote: ProgramSpec::new("avpvote"),
            tally: ProgramSpec::new("avptally"),
        }
    }
}

impl ProtocolCommands {
    pub fn utility(&self, step: UtilityStep) -> &ProgramSpec {
        match step {
            UtilityStep::Reset => &self.reset,
            UtilityStep::Initialize => &self.initialize,
            UtilityStep::Tally => &self.tally,
        }
    }

    pub fn all(&self) -> [&ProgramSpec; 4] {
        [&self.reset, &self.initialize, &self.vote, &self.tally]
    }
}
