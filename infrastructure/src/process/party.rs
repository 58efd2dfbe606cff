//! Owned handle on a spawned vote process

use async_trait::async_trait;
use avp_sweep_application::{LaunchError, PartyExit, PartyProcess};
use std::process::ExitStatus;
use tokio::process::Child;
use tracing::{debug, warn};

/// A running (or finished) vote process.
///
/// The child is spawned with `kill_on_drop`, so dropping the handle also
/// stops the process.
pub struct ChildParty {
    index: usize,
    program: String,
    child: Child,
    exit: Option<PartyExit>,
}

impl ChildParty {
    pub(crate) fn new(index: usize, program: impl Into<String>, child: Child) -> Self {
        Self {
            index,
            program: program.into(),
            child,
            exit: None,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    fn io_error(&self, e: std::io::Error) -> LaunchError {
        LaunchError::Io {
            program: self.program.clone(),
            reason: e.to_string(),
        }
    }

    fn record(&mut self, status: ExitStatus) -> PartyExit {
        let exit = PartyExit {
            code: status.code(),
        };
        self.exit = Some(exit);
        exit
    }
}

#[async_trait]
impl PartyProcess for ChildParty {
    fn index(&self) -> usize {
        self.index
    }

    async fn wait(&mut self) -> Result<PartyExit, LaunchError> {
        if let Some(exit) = self.exit {
            return Ok(exit);
        }
        match self.child.wait().await {
            Ok(status) => Ok(self.record(status)),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn try_wait(&mut self) -> Result<Option<PartyExit>, LaunchError> {
        if let Some(exit) = self.exit {
            return Ok(Some(exit));
        }
        match self.child.try_wait() {
            Ok(Some(status)) => Ok(Some(self.record(status))),
            Ok(None) => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    async fn terminate(&mut self) {
        if matches!(self.try_wait(), Ok(Some(_))) {
            return;
        }
        if let Err(e) = self.child.kill().await {
            warn!("Could not terminate party {}: {}", self.index, e);
            return;
        }
        debug!("Terminated party {}", self.index);
        self.exit = Some(PartyExit { code: None });
    }
}
