//! Run Sweep use case
//!
//! Runs one threshold search per configuration, in input order, and records
//! every boundary into an append-only [`SweepResult`].

use crate::ports::progress::{NoProgress, SweepProgressNotifier};
use crate::use_cases::execute_round::RoundError;
use crate::use_cases::find_max_safe::{FindMaxSafeInput, FindMaxSafeUseCase, RoundExecutor};
use avp_sweep_domain::{SearchReport, SearchStrategy, SearchVerdict, SweepConfiguration, SweepResult};
use thiserror::Error;
use tracing::info;

/// Errors that can occur during a sweep
#[derive(Error, Debug)]
pub enum RunSweepError {
    #[error("No sweep configurations given")]
    NoConfigurations,

    #[error("Search for q = {modulus} failed: {source}")]
    Search {
        modulus: u64,
        #[source]
        source: RoundError,
        /// Boundaries of the configurations that finished before this one
        completed: SweepResult,
    },
}

impl RunSweepError {
    /// Whether the external tooling itself failed to run
    pub fn is_tooling_failure(&self) -> bool {
        matches!(self, Self::Search { source, .. } if source.is_tooling_failure())
    }

    /// Boundaries measured before the sweep stopped
    pub fn completed(&self) -> Option<&SweepResult> {
        match self {
            Self::Search { completed, .. } => Some(completed),
            Self::NoConfigurations => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Search {
                source: RoundError::Cancelled,
                ..
            }
        )
    }
}

/// Input for the RunSweep use case
#[derive(Debug, Clone)]
pub struct RunSweepInput {
    /// Configurations in the order they are searched
    pub configurations: Vec<SweepConfiguration>,
    pub strategy: SearchStrategy,
}

impl RunSweepInput {
    pub fn new(configurations: Vec<SweepConfiguration>) -> Self {
        Self {
            configurations,
            strategy: SearchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Everything a sweep produced
#[derive(Debug, Clone)]
pub struct RunSweepOutput {
    /// Ordered `(q, m_max)` pairs for the plotting collaborator
    pub result: SweepResult,
    /// Full search report per configuration, same order
    pub reports: Vec<(SweepConfiguration, SearchReport)>,
}

impl RunSweepOutput {
    /// Worst verdict across all configurations
    pub fn verdict(&self) -> SearchVerdict {
        self.reports
            .iter()
            .map(|(_, report)| report.verdict())
            .max()
            .unwrap_or(SearchVerdict::BoundaryFound)
    }
}

/// Use case for sweeping several configurations
pub struct RunSweepUseCase {
    search: FindMaxSafeUseCase,
}

impl RunSweepUseCase {
    pub fn new(search: FindMaxSafeUseCase) -> Self {
        Self { search }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute<F, E>(
        &self,
        input: RunSweepInput,
        executor_for: F,
    ) -> Result<RunSweepOutput, RunSweepError>
    where
        F: FnMut(&SweepConfiguration) -> E,
        E: RoundExecutor,
    {
        self.execute_with_progress(input, executor_for, &NoProgress)
            .await
    }

    /// Execute the use case with progress callbacks.
    ///
    /// `executor_for` builds a fresh executor per configuration; it is shut
    /// down once that configuration's search ends, whatever the outcome.
    pub async fn execute_with_progress<F, E>(
        &self,
        input: RunSweepInput,
        mut executor_for: F,
        progress: &dyn SweepProgressNotifier,
    ) -> Result<RunSweepOutput, RunSweepError>
    where
        F: FnMut(&SweepConfiguration) -> E,
        E: RoundExecutor,
    {
        if input.configurations.is_empty() {
            return Err(RunSweepError::NoConfigurations);
        }

        info!("Sweeping {} configurations", input.configurations.len());

        let mut result = SweepResult::new();
        let mut reports = Vec::with_capacity(input.configurations.len());

        for config in input.configurations {
            let mut executor = executor_for(&config);
            let search_input = FindMaxSafeInput::new(config).with_strategy(input.strategy);

            let searched = self
                .search
                .execute_with_progress(&mut executor, search_input, progress)
                .await;
            executor.shutdown().await;

            let report = match searched {
                Ok(report) => report,
                Err(source) => {
                    return Err(RunSweepError::Search {
                        modulus: config.modulus(),
                        source,
                        completed: result,
                    });
                }
            };

            info!("q = {} -> m_max = {}", config.modulus(), report.max_safe);
            result.record(config.modulus(), report.max_safe);
            reports.push((config, report));
        }

        Ok(RunSweepOutput { result, reports })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::execute_round::test_support::FakeLauncher;
    use crate::use_cases::find_max_safe::test_support::ScriptedExecutor;
    use crate::ports::process_launcher::UtilityStep;
    use crate::use_cases::execute_round::RoundCoordinator;
    use crate::config::RoundParams;
    use std::collections::HashMap;
    use std::sync::Arc;

    const REFERENCE_TABLE: [(u64, usize); 3] = [(19457, 16), (100609, 37), (708481, 99)];

    fn configurations(max: usize) -> Vec<SweepConfiguration> {
        REFERENCE_TABLE
            .iter()
            .map(|&(q, _)| SweepConfiguration::new(q, max).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_reproduces_reference_table_in_order() {
        let boundaries: HashMap<u64, usize> = REFERENCE_TABLE.into_iter().collect();
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());

        let output = use_case
            .execute(RunSweepInput::new(configurations(100)), |config| {
                ScriptedExecutor::new(boundaries[&config.modulus()])
            })
            .await
            .unwrap();

        assert_eq!(output.result.pairs(), REFERENCE_TABLE.to_vec());
        assert_eq!(output.reports.len(), 3);
        assert_eq!(output.verdict(), SearchVerdict::BoundaryFound);
    }

    #[tokio::test]
    async fn test_order_follows_input_not_modulus() {
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());
        let input = RunSweepInput::new(vec![
            SweepConfiguration::new(708481, 5).unwrap(),
            SweepConfiguration::new(257, 5).unwrap(),
        ]);

        let output = use_case
            .execute(input, |config| {
                ScriptedExecutor::new(if config.modulus() == 257 { 2 } else { 100 })
            })
            .await
            .unwrap();

        assert_eq!(output.result.pairs(), vec![(708481, 5), (257, 2)]);
        assert_eq!(output.verdict(), SearchVerdict::NoBoundaryWithinRange);
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());
        let result = use_case
            .execute(RunSweepInput::new(vec![]), |_| ScriptedExecutor::new(1))
            .await;
        assert!(matches!(result, Err(RunSweepError::NoConfigurations)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tooling_failure_aborts_sweep() {
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());

        let result = use_case
            .execute(RunSweepInput::new(configurations(10)), |_| {
                let mut launcher = FakeLauncher::new(5);
                launcher.failing_step = Some(UtilityStep::Tally);
                RoundCoordinator::new(Arc::new(launcher), RoundParams::default())
            })
            .await;

        let err = result.unwrap_err();
        assert!(err.is_tooling_failure());
        assert!(matches!(err, RunSweepError::Search { modulus: 19457, .. }));
    }

    /// Fails its first round for one modulus, otherwise behaves like `inner`
    struct FailsFor {
        fail: bool,
        inner: ScriptedExecutor,
    }

    #[async_trait::async_trait]
    impl RoundExecutor for FailsFor {
        async fn execute_round(
            &mut self,
            party_count: usize,
        ) -> Result<avp_sweep_domain::Round, RoundError> {
            if self.fail {
                return Err(RoundError::Cancelled);
            }
            self.inner.execute_round(party_count).await
        }
    }

    #[tokio::test]
    async fn test_failed_sweep_keeps_completed_boundaries() {
        let boundaries: HashMap<u64, usize> = REFERENCE_TABLE.into_iter().collect();
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());

        let err = use_case
            .execute(RunSweepInput::new(configurations(100)), |config| FailsFor {
                fail: config.modulus() == 708481,
                inner: ScriptedExecutor::new(boundaries[&config.modulus()]),
            })
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(
            err.completed().unwrap().pairs(),
            vec![(19457, 16), (100609, 37)]
        );
        assert!(RunSweepError::NoConfigurations.completed().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_executor_shut_down_after_each_search() {
        let launchers: Arc<std::sync::Mutex<Vec<Arc<FakeLauncher>>>> = Arc::default();
        let use_case = RunSweepUseCase::new(FindMaxSafeUseCase::new());
        let params = RoundParams::default().with_settlement(
            crate::config::SettlementPolicy::CompletionBarrier {
                timeout: std::time::Duration::from_secs(1),
            },
        );

        let registry = Arc::clone(&launchers);
        let output = use_case
            .execute(RunSweepInput::new(configurations(5)), move |_| {
                let launcher = Arc::new(FakeLauncher::new(5).hanging_parties());
                registry.lock().unwrap().push(Arc::clone(&launcher));
                RoundCoordinator::new(launcher, params.clone())
            })
            .await
            .unwrap();

        // Hanging parties time out at m = 1, and shutdown reaps that single party.
        assert_eq!(output.result.pairs(), vec![(19457, 0), (100609, 0), (708481, 0)]);
        for launcher in launchers.lock().unwrap().iter() {
            assert_eq!(launcher.terminations(), 1);
        }
    }
}
