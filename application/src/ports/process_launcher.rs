//! Process launcher port
//!
//! Defines how the application layer talks to the external protocol programs:
//! the four utility/party programs are reached only through their command-line
//! contract.
//!
//! | Step | Invocation |
//! |------|------------|
//! | reset | no arguments |
//! | initialize | no arguments |
//! | vote | `i 0 m` |
//! | tally | stdin: `m` |

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while running external programs
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LaunchError {
    #[error("Failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("I/O error while talking to {program}: {reason}")]
    Io { program: String, reason: String },

    #[error("{program} did not finish within {seconds}s")]
    Timeout { program: String, seconds: u64 },
}

/// Blocking utility invocations of the external protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UtilityStep {
    /// Clear persisted vote/protocol state
    Reset,
    /// Establish round parameters
    Initialize,
    /// Aggregate the persisted votes
    Tally,
}

impl UtilityStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Initialize => "initialize",
            Self::Tally => "tally",
        }
    }
}

impl fmt::Display for UtilityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Captured result of a blocking utility run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CapturedOutput {
    pub stdout: String,
    /// Exit code (`None` when terminated by a signal)
    pub exit_code: Option<i32>,
}

impl CapturedOutput {
    pub fn new(stdout: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// How a party process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartyExit {
    /// Exit code (`None` when terminated by a signal)
    pub code: Option<i32>,
}

impl PartyExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A spawned party process owned by the coordinator.
///
/// The owner is responsible for terminating it; dropping the handle must not
/// leave the process running.
#[async_trait]
pub trait PartyProcess: Send + Sync {
    /// Party index `i`
    fn index(&self) -> usize;

    /// Wait for the process to exit. Cancel-safe.
    async fn wait(&mut self) -> Result<PartyExit, LaunchError>;

    /// Non-blocking exit check
    fn try_wait(&mut self) -> Result<Option<PartyExit>, LaunchError>;

    /// Force-terminate the process. Idempotent; never fails.
    async fn terminate(&mut self);
}

/// Launcher for the external protocol programs
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the vote program with `(index, 0, total)`. Does not wait for it.
    async fn start_party(
        &self,
        index: usize,
        total: usize,
    ) -> Result<Box<dyn PartyProcess>, LaunchError>;

    /// Best-effort termination of every process named `name`.
    ///
    /// Idempotent; succeeds silently when nothing matches.
    async fn kill_all(&self, name: &str);

    /// Run a utility to completion and capture its standard output.
    ///
    /// `stdin`, when given, is written to the program's input channel.
    async fn run_sync(
        &self,
        step: UtilityStep,
        stdin: Option<&str>,
    ) -> Result<CapturedOutput, LaunchError>;

    /// Process name of the vote program, used for name-based cleanup
    fn party_process_name(&self) -> &str;
}
