//! Tokio-based launcher for the external protocol programs
//!
//! Every program gets the same working directory and environment, including
//! the modulus variable that tells the protocol which `q` to use.

use super::commands::{ProgramSpec, ProtocolCommands};
use super::party::ChildParty;
use async_trait::async_trait;
use avp_sweep_application::{
    CapturedOutput, LaunchError, PartyProcess, ProcessLauncher, UtilityStep,
};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Default upper bound for reset / initialize / tally
pub const DEFAULT_UTILITY_TIMEOUT: Duration = Duration::from_secs(120);

/// Default environment variable carrying the modulus
pub const DEFAULT_MODULUS_ENV: &str = "AVP_MODULUS";

/// [`ProcessLauncher`] backed by `tokio::process`
pub struct TokioProcessLauncher {
    commands: ProtocolCommands,
    working_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
    utility_timeout: Duration,
}

impl TokioProcessLauncher {
    pub fn new(commands: ProtocolCommands) -> Self {
        Self {
            commands,
            working_dir: None,
            env: Vec::new(),
            utility_timeout: DEFAULT_UTILITY_TIMEOUT,
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Export `q` to every program under `variable`
    pub fn with_modulus(self, variable: impl Into<String>, modulus: u64) -> Self {
        self.with_env(variable, modulus.to_string())
    }

    pub fn with_utility_timeout(mut self, timeout: Duration) -> Self {
        self.utility_timeout = timeout;
        self
    }

    pub fn commands(&self) -> &ProtocolCommands {
        &self.commands
    }

    /// Check that every configured program can be found before the first round.
    pub fn preflight(&self) -> Result<(), LaunchError> {
        let cwd = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| LaunchError::Io {
                program: "working directory".to_string(),
                reason: e.to_string(),
            })?,
        };

        for spec in self.commands.all() {
            which::which_in(&spec.program, std::env::var_os("PATH"), &cwd).map_err(|e| {
                LaunchError::Spawn {
                    program: spec.program.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        Ok(())
    }

    fn command(&self, spec: &ProgramSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        // Own process group: a terminal Ctrl-C reaches only the harness,
        // which then stops between rounds.
        #[cfg(unix)]
        cmd.process_group(0);

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

#[async_trait]
impl ProcessLauncher for TokioProcessLauncher {
    async fn start_party(
        &self,
        index: usize,
        total: usize,
    ) -> Result<Box<dyn PartyProcess>, LaunchError> {
        let spec = &self.commands.vote;
        let mut cmd = self.command(spec);
        cmd.arg(index.to_string())
            .arg("0")
            .arg(total.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| LaunchError::Spawn {
            program: spec.program.clone(),
            reason: e.to_string(),
        })?;
        trace!("Spawned party {} of {} (pid {:?})", index, total, child.id());

        Ok(Box::new(ChildParty::new(index, spec.program.clone(), child)))
    }

    async fn kill_all(&self, name: &str) {
        #[cfg(windows)]
        let mut cmd = {
            let mut c = Command::new("taskkill");
            c.args(["/F", "/IM", &format!("{}.exe", name)]);
            c
        };
        #[cfg(not(windows))]
        let mut cmd = {
            let mut c = Command::new("pkill");
            c.args(["-x", name]);
            c
        };

        // Nothing matching is the normal case; only report tool failures.
        match cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => debug!("Name-based cleanup of {} finished: {}", name, status),
            Err(e) => warn!("Name-based cleanup of {} could not run: {}", name, e),
        }
    }

    async fn run_sync(
        &self,
        step: UtilityStep,
        stdin: Option<&str>,
    ) -> Result<CapturedOutput, LaunchError> {
        let spec = self.commands.utility(step);
        let program = spec.program.clone();

        let mut cmd = self.command(spec);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

        debug!("Running {}: {} {:?}", step, program, spec.args);
        let mut child = cmd.spawn().map_err(|e| LaunchError::Spawn {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            // The program may exit without reading; its report still counts.
            if let Err(e) = pipe.write_all(input.as_bytes()).await {
                warn!("Could not write stdin of {}: {}", program, e);
            }
            drop(pipe);
        }

        let output = tokio::time::timeout(self.utility_timeout, child.wait_with_output())
            .await
            .map_err(|_| LaunchError::Timeout {
                program: program.clone(),
                seconds: self.utility_timeout.as_secs(),
            })?
            .map_err(|e| LaunchError::Io {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", step, stderr.trim());
        }

        Ok(CapturedOutput::new(
            String::from_utf8_lossy(&output.stdout),
            output.status.code(),
        ))
    }

    fn party_process_name(&self) -> &str {
        self.commands.vote.process_name()
    }
}
