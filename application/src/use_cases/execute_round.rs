//! Execute Round use case
//!
//! Runs one trial of the external protocol for a fixed party count:
//!
//! 1. terminate the parties left over from the previous round
//! 2. reset, then initialize the external protocol state
//! 3. launch parties `0..m` without waiting for them
//! 4. wait for settlement according to the [`SettlementPolicy`]
//! 5. tally, feeding `m` on stdin, and classify the report
//!
//! The coordinator owns every party it spawns. Handles stay alive until the
//! start of the next round (or [`RoundCoordinator::shutdown`]) and only those
//! handles are terminated; name-based cleanup is an opt-in extra.

use crate::config::{RoundParams, SettlementPolicy};
use crate::ports::process_launcher::{
    LaunchError, PartyExit, PartyProcess, ProcessLauncher, UtilityStep,
};
use crate::ports::vote_artifacts::VoteArtifactProbe;
use crate::use_cases::find_max_safe::RoundExecutor;
use async_trait::async_trait;
use avp_sweep_domain::{
    DomainError, IndeterminateReason, PartyRecord, PartyStatus, Round, TallyOutcome,
};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Errors that abort a round (and with it the sweep)
#[derive(Error, Debug)]
pub enum RoundError {
    #[error("Party count must be at least 1")]
    InvalidPartyCount,

    #[error("{step} could not run: {source}")]
    Tooling {
        step: UtilityStep,
        #[source]
        source: LaunchError,
    },

    #[error("{step} exited with status {code:?}")]
    ToolingExit {
        step: UtilityStep,
        code: Option<i32>,
    },

    #[error("Artifact polling needs a vote artifact probe")]
    MissingArtifactProbe,

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Sweep cancelled")]
    Cancelled,
}

impl RoundError {
    /// Whether the external tooling itself failed to run
    pub fn is_tooling_failure(&self) -> bool {
        matches!(self, Self::Tooling { .. } | Self::ToolingExit { .. })
    }
}

/// Handle on the protocol state persisted by the external programs.
///
/// The coordinator never sees that state; it can only clear it and set up the
/// next round.
pub struct ProtocolState<L: ProcessLauncher + 'static> {
    launcher: Arc<L>,
}

impl<L: ProcessLauncher + 'static> ProtocolState<L> {
    pub fn new(launcher: Arc<L>) -> Self {
        Self { launcher }
    }

    /// Clear persisted votes and protocol parameters
    pub async fn reset(&self) -> Result<(), RoundError> {
        self.run_step(UtilityStep::Reset).await
    }

    /// Establish parameters for the upcoming round
    pub async fn initialize(&self) -> Result<(), RoundError> {
        self.run_step(UtilityStep::Initialize).await
    }

    async fn run_step(&self, step: UtilityStep) -> Result<(), RoundError> {
        let output = self
            .launcher
            .run_sync(step, None)
            .await
            .map_err(|source| RoundError::Tooling { step, source })?;

        if !output.success() {
            return Err(RoundError::ToolingExit {
                step,
                code: output.exit_code,
            });
        }
        debug!("{} completed", step);
        Ok(())
    }
}

enum Settlement {
    Settled,
    TimedOut { pending: Vec<usize> },
}

/// Coordinates single rounds against the external protocol
pub struct RoundCoordinator<L: ProcessLauncher + 'static> {
    launcher: Arc<L>,
    state: ProtocolState<L>,
    params: RoundParams,
    artifacts: Option<Arc<dyn VoteArtifactProbe>>,
    retained: Vec<Box<dyn PartyProcess>>,
}

impl<L: ProcessLauncher + 'static> RoundCoordinator<L> {
    pub fn new(launcher: Arc<L>, params: RoundParams) -> Self {
        Self {
            state: ProtocolState::new(Arc::clone(&launcher)),
            launcher,
            params,
            artifacts: None,
            retained: Vec::new(),
        }
    }

    /// Attach the probe used by [`SettlementPolicy::ArtifactPolling`]
    pub fn with_artifact_probe(mut self, probe: Arc<dyn VoteArtifactProbe>) -> Self {
        self.artifacts = Some(probe);
        self
    }

    pub fn params(&self) -> &RoundParams {
        &self.params
    }

    /// Number of party handles still owned from the last round
    pub fn retained_parties(&self) -> usize {
        self.retained.len()
    }

    /// Terminate every party this coordinator still owns.
    ///
    /// Idempotent: with nothing retained (and name-based reaping off) it does
    /// nothing at all.
    pub async fn kill_all_parties(&mut self) {
        let owned = self.retained.len();
        for mut party in self.retained.drain(..) {
            party.terminate().await;
        }
        if owned > 0 {
            debug!("Terminated {} parties from the previous round", owned);
        }

        if self.params.reap_stale_by_name {
            let name = self.launcher.party_process_name().to_string();
            self.launcher.kill_all(&name).await;
        }
    }

    /// Terminate everything still owned; call once the search is over.
    pub async fn shutdown(&mut self) {
        self.kill_all_parties().await;
    }

    /// Run one round with `party_count` parties.
    pub async fn run_round(&mut self, party_count: usize) -> Result<Round, RoundError> {
        if party_count == 0 {
            return Err(RoundError::InvalidPartyCount);
        }
        if matches!(self.params.settlement, SettlementPolicy::ArtifactPolling { .. })
            && self.artifacts.is_none()
        {
            return Err(RoundError::MissingArtifactProbe);
        }

        info!("Round with m = {} parties", party_count);

        self.kill_all_parties().await;
        self.state.reset().await?;
        self.state.initialize().await?;

        let (mut parties, spawn_failure) = self.launch_parties(party_count).await;

        let outcome = match spawn_failure {
            Some((index, reason)) => {
                let outcome = TallyOutcome::aborted(IndeterminateReason::SpawnFailure {
                    index,
                    reason: reason.clone(),
                });
                let records = Self::party_records(party_count, &mut parties, Some((index, reason)));
                self.retained = parties;
                return Ok(Round::new(party_count, records, outcome)?);
            }
            None => match self.settle(party_count, &mut parties).await {
                Settlement::Settled => match self.tally(party_count).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        self.retained = parties;
                        return Err(e);
                    }
                },
                Settlement::TimedOut { pending } => {
                    warn!(
                        "Settlement window closed with {} of {} parties pending",
                        pending.len(),
                        party_count
                    );
                    TallyOutcome::aborted(IndeterminateReason::SettlementTimeout { pending })
                }
            },
        };

        let records = Self::party_records(party_count, &mut parties, None);
        self.retained = parties;

        info!("Round m = {} classified as {}", party_count, outcome.label());
        Ok(Round::new(party_count, records, outcome)?)
    }

    /// Launch parties in index order; stop at the first spawn failure.
    async fn launch_parties(
        &self,
        party_count: usize,
    ) -> (Vec<Box<dyn PartyProcess>>, Option<(usize, String)>) {
        let mut parties = Vec::with_capacity(party_count);

        for index in 0..party_count {
            match self.launcher.start_party(index, party_count).await {
                Ok(party) => parties.push(party),
                Err(e) => {
                    warn!("Party {} failed to spawn: {}", index, e);
                    return (parties, Some((index, e.to_string())));
                }
            }
        }

        debug!("Launched {} parties", parties.len());
        (parties, None)
    }

    async fn settle(
        &self,
        party_count: usize,
        parties: &mut [Box<dyn PartyProcess>],
    ) -> Settlement {
        match self.params.settlement {
            SettlementPolicy::FixedDelay { delay } => {
                debug!("Settling for a fixed {:?}", delay);
                tokio::time::sleep(delay).await;
                Settlement::Settled
            }
            SettlementPolicy::CompletionBarrier { timeout } => {
                let waited =
                    tokio::time::timeout(timeout, join_all(parties.iter_mut().map(|p| p.wait())))
                        .await;
                match waited {
                    Ok(exits) => {
                        for (index, exit) in exits.into_iter().enumerate() {
                            if let Err(e) = exit {
                                warn!("Could not observe party {}: {}", index, e);
                            }
                        }
                        Settlement::Settled
                    }
                    Err(_) => Settlement::TimedOut {
                        pending: parties
                            .iter_mut()
                            .filter_map(|p| {
                                (!matches!(p.try_wait(), Ok(Some(_)))).then(|| p.index())
                            })
                            .collect(),
                    },
                }
            }
            SettlementPolicy::ArtifactPolling { timeout, interval } => {
                // run_round checks the probe is attached before launching
                let Some(probe) = self.artifacts.as_ref() else {
                    return Settlement::TimedOut {
                        pending: (0..party_count).collect(),
                    };
                };
                let deadline = Instant::now() + timeout;
                loop {
                    let missing = probe.missing(party_count);
                    if missing.is_empty() {
                        return Settlement::Settled;
                    }
                    let now = Instant::now();
                    if now >= deadline {
                        return Settlement::TimedOut { pending: missing };
                    }
                    tokio::time::sleep(interval.min(deadline - now)).await;
                }
            }
        }
    }

    async fn tally(&self, party_count: usize) -> Result<TallyOutcome, RoundError> {
        let step = UtilityStep::Tally;
        let input = format!("{}\n", party_count);
        let output = self
            .launcher
            .run_sync(step, Some(&input))
            .await
            .map_err(|source| RoundError::Tooling { step, source })?;

        if !output.success() {
            // A missing vote makes the tally exit non-zero; the report still counts.
            debug!("tally exited with status {:?}", output.exit_code);
        }

        Ok(TallyOutcome::classify(
            output.stdout,
            &self.params.success_marker,
        ))
    }

    fn party_records(
        party_count: usize,
        parties: &mut [Box<dyn PartyProcess>],
        spawn_failure: Option<(usize, String)>,
    ) -> Vec<PartyRecord> {
        let mut records: Vec<PartyRecord> = parties
            .iter_mut()
            .map(|party| {
                let status = match party.try_wait() {
                    Ok(Some(PartyExit { code })) => PartyStatus::Exited { code },
                    Ok(None) => PartyStatus::Running,
                    Err(e) => {
                        warn!("Could not query party {}: {}", party.index(), e);
                        PartyStatus::Running
                    }
                };
                PartyRecord::new(party.index(), party_count, status)
            })
            .collect();

        if let Some((index, reason)) = spawn_failure {
            records.push(PartyRecord::new(
                index,
                party_count,
                PartyStatus::SpawnFailed { reason },
            ));
        }

        for index in records.len()..party_count {
            records.push(PartyRecord::new(index, party_count, PartyStatus::NotLaunched));
        }

        records
    }
}

#[async_trait]
impl<L: ProcessLauncher + 'static> RoundExecutor for RoundCoordinator<L> {
    async fn execute_round(&mut self, party_count: usize) -> Result<Round, RoundError> {
        self.run_round(party_count).await
    }

    async fn shutdown(&mut self) {
        RoundCoordinator::shutdown(self).await;
    }
}
