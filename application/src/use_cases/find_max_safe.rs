//! Find Max Safe use case
//!
//! Walks `m = 1 ..= max_party_count` and reports the largest `m` whose round
//! is `AllYes`.
//!
//! With [`SearchStrategy::Linear`] the walk stops at the first failure: once
//! the protocol fails at some `m` it is assumed to fail for every larger `m`,
//! so larger values are never tried. [`SearchStrategy::Exhaustive`] runs the
//! whole range and reports where that assumption does not hold.

use crate::ports::progress::{NoProgress, SweepProgressNotifier};
use crate::ports::round_logger::{NoRoundLogger, RoundLogger};
use crate::use_cases::execute_round::RoundError;
use async_trait::async_trait;
use avp_sweep_domain::{Round, SearchReport, SearchStrategy, SweepConfiguration};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Something that can run one round for a given party count.
///
/// [`RoundCoordinator`](crate::use_cases::execute_round::RoundCoordinator) is
/// the real implementation; tests substitute scripted executors.
#[async_trait]
pub trait RoundExecutor: Send {
    async fn execute_round(&mut self, party_count: usize) -> Result<Round, RoundError>;

    /// Release whatever the executor still holds once the search is over
    async fn shutdown(&mut self) {}
}

/// Input for the FindMaxSafe use case
#[derive(Debug, Clone, Copy)]
pub struct FindMaxSafeInput {
    pub config: SweepConfiguration,
    pub strategy: SearchStrategy,
}

impl FindMaxSafeInput {
    pub fn new(config: SweepConfiguration) -> Self {
        Self {
            config,
            strategy: SearchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Use case for finding the boundary party count of one configuration
pub struct FindMaxSafeUseCase {
    logger: Arc<dyn RoundLogger>,
    cancellation: CancellationToken,
}

impl Default for FindMaxSafeUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl FindMaxSafeUseCase {
    pub fn new() -> Self {
        Self {
            logger: Arc::new(NoRoundLogger),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn RoundLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Stop once `token` is cancelled; a round in flight at that point is discarded
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute<E: RoundExecutor + ?Sized>(
        &self,
        executor: &mut E,
        input: FindMaxSafeInput,
    ) -> Result<SearchReport, RoundError> {
        self.execute_with_progress(executor, input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress<E: RoundExecutor + ?Sized>(
        &self,
        executor: &mut E,
        input: FindMaxSafeInput,
        progress: &dyn SweepProgressNotifier,
    ) -> Result<SearchReport, RoundError> {
        let config = input.config;
        let max_party_count = config.max_party_count();

        info!(
            "Searching q = {} up to m = {} ({} strategy)",
            config.modulus(),
            max_party_count,
            input.strategy
        );
        progress.on_search_start(&config);

        let mut rounds = Vec::new();

        for party_count in 1..=max_party_count {
            if self.cancellation.is_cancelled() {
                warn!("Search cancelled before m = {}", party_count);
                return Err(RoundError::Cancelled);
            }

            progress.on_round_start(party_count);
            let round = executor.execute_round(party_count).await?;
            // An interrupt during the round may have killed parties; its tally says nothing
            if self.cancellation.is_cancelled() {
                warn!("Search cancelled during m = {}, round discarded", party_count);
                return Err(RoundError::Cancelled);
            }
            self.logger.log_round(config.modulus(), &round);
            progress.on_round_complete(&round);

            let passed = round.outcome().is_all_yes();
            rounds.push((party_count, round.into_outcome()));

            if !passed {
                info!(
                    "Protocol broke at m = {}, max safe m = {}",
                    party_count,
                    party_count - 1
                );
                if input.strategy.stops_at_first_failure() {
                    break;
                }
            }
        }

        let report = SearchReport::from_rounds(input.strategy, max_party_count, rounds);

        if !report.monotonicity_violations.is_empty() {
            warn!(
                "Non-monotonic outcomes above m = {}: {:?}",
                report.max_safe + 1,
                report.monotonicity_violations
            );
        }

        progress.on_search_complete(&config, &report);
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use avp_sweep_domain::{PartyRecord, PartyStatus, TallyOutcome};

    /// Executor that passes every `m <= boundary` and vetoes above it
    pub struct ScriptedExecutor {
        pub boundary: usize,
        /// Party counts above the boundary that pass anyway
        pub passes_anyway: Vec<usize>,
        pub invoked: Vec<usize>,
        pub shut_down: bool,
    }

    impl ScriptedExecutor {
        pub fn new(boundary: usize) -> Self {
            Self {
                boundary,
                passes_anyway: Vec::new(),
                invoked: Vec::new(),
                shut_down: false,
            }
        }
    }

    pub fn round_with(party_count: usize, outcome: TallyOutcome) -> Round {
        let parties = (0..party_count)
            .map(|i| PartyRecord::new(i, party_count, PartyStatus::Exited { code: Some(0) }))
            .collect();
        Round::new(party_count, parties, outcome).unwrap()
    }

    #[async_trait]
    impl RoundExecutor for ScriptedExecutor {
        async fn execute_round(&mut self, party_count: usize) -> Result<Round, RoundError> {
            self.invoked.push(party_count);
            let outcome =
                if party_count <= self.boundary || self.passes_anyway.contains(&party_count) {
                    TallyOutcome::AllYes {
                        report: "Result: ALL VOTED YES (0)".to_string(),
                    }
                } else {
                    TallyOutcome::Vetoed {
                        report: "Result: SOMEONE VETOED (1)".to_string(),
                    }
                };
            Ok(round_with(party_count, outcome))
        }

        async fn shutdown(&mut self) {
            self.shut_down = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{self, ScriptedExecutor};
    use super::*;
    use crate::use_cases::execute_round::RoundCoordinator;
    use crate::use_cases::execute_round::test_support::FakeLauncher;
    use crate::config::RoundParams;
    use avp_sweep_domain::{SearchVerdict, TallyOutcome};
    use std::sync::Mutex;

    fn input(q: u64, max: usize) -> FindMaxSafeInput {
        FindMaxSafeInput::new(SweepConfiguration::new(q, max).unwrap())
    }

    #[tokio::test]
    async fn test_stops_at_first_failure() {
        let mut executor = ScriptedExecutor::new(16);

        let report = FindMaxSafeUseCase::new()
            .execute(&mut executor, input(19457, 100))
            .await
            .unwrap();

        assert_eq!(report.max_safe, 16);
        assert_eq!(report.first_failure.as_ref().unwrap().party_count, 17);
        assert_eq!(executor.invoked, (1..=17).collect::<Vec<_>>());
        assert!(executor.invoked.iter().all(|&m| m <= 17));
        assert_eq!(report.verdict(), SearchVerdict::BoundaryFound);
    }

    #[tokio::test]
    async fn test_linear_search_assumes_monotonicity() {
        // A pass above the first failure is never observed by the linear walk.
        let mut executor = ScriptedExecutor::new(4);
        executor.passes_anyway = vec![6];

        let report = FindMaxSafeUseCase::new()
            .execute(&mut executor, input(257, 10))
            .await
            .unwrap();

        assert_eq!(report.max_safe, 4);
        assert!(report.monotonicity_violations.is_empty());
        assert_eq!(executor.invoked.last(), Some(&5));
    }

    #[tokio::test]
    async fn test_exhaustive_search_reports_violations() {
        let mut executor = ScriptedExecutor::new(4);
        executor.passes_anyway = vec![6];

        let report = FindMaxSafeUseCase::new()
            .execute(
                &mut executor,
                input(257, 8).with_strategy(SearchStrategy::Exhaustive),
            )
            .await
            .unwrap();

        assert_eq!(report.max_safe, 4);
        assert_eq!(report.rounds_executed, 8);
        assert_eq!(report.monotonicity_violations, vec![6]);
        assert_eq!(report.verdict(), SearchVerdict::NonMonotonic);
    }

    #[tokio::test]
    async fn test_full_range_success() {
        let mut executor = ScriptedExecutor::new(100);

        let report = FindMaxSafeUseCase::new()
            .execute(&mut executor, input(708481, 12))
            .await
            .unwrap();

        assert_eq!(report.max_safe, 12);
        assert!(report.first_failure.is_none());
        assert_eq!(report.verdict(), SearchVerdict::NoBoundaryWithinRange);
    }

    #[tokio::test]
    async fn test_cancelled_before_first_round() {
        let token = CancellationToken::new();
        token.cancel();
        let mut executor = ScriptedExecutor::new(16);

        let result = FindMaxSafeUseCase::new()
            .with_cancellation(token)
            .execute(&mut executor, input(19457, 100))
            .await;

        assert!(matches!(result, Err(RoundError::Cancelled)));
        assert!(executor.invoked.is_empty());
    }

    /// Interrupt arrives while round `at` runs; the killed parties make the
    /// tally report an unreadable vote.
    struct InterruptedExecutor {
        at: usize,
        token: CancellationToken,
        invoked: Vec<usize>,
    }

    #[async_trait]
    impl RoundExecutor for InterruptedExecutor {
        async fn execute_round(&mut self, party_count: usize) -> Result<Round, RoundError> {
            self.invoked.push(party_count);
            let outcome = if party_count == self.at {
                self.token.cancel();
                TallyOutcome::classify("Could not read party 0's vote\n", "ALL VOTED YES")
            } else {
                TallyOutcome::AllYes {
                    report: "Result: ALL VOTED YES (0)".to_string(),
                }
            };
            Ok(test_support::round_with(party_count, outcome))
        }
    }

    #[tokio::test]
    async fn test_interrupted_round_is_not_a_boundary() {
        let token = CancellationToken::new();
        let logger = Arc::new(RecordingLogger::default());
        let mut executor = InterruptedExecutor {
            at: 3,
            token: token.clone(),
            invoked: Vec::new(),
        };

        let result = FindMaxSafeUseCase::new()
            .with_cancellation(token)
            .with_logger(logger.clone())
            .execute(&mut executor, input(19457, 100))
            .await;

        assert!(matches!(result, Err(RoundError::Cancelled)));
        assert_eq!(executor.invoked, vec![1, 2, 3]);
        assert_eq!(
            *logger.rounds.lock().unwrap(),
            vec![(19457, 1), (19457, 2)]
        );
    }

    #[derive(Default)]
    struct RecordingLogger {
        rounds: Mutex<Vec<(u64, usize)>>,
    }

    impl RoundLogger for RecordingLogger {
        fn log_round(&self, modulus: u64, round: &Round) {
            self.rounds
                .lock()
                .unwrap()
                .push((modulus, round.party_count()));
        }
    }

    #[tokio::test]
    async fn test_every_round_is_logged() {
        let logger = Arc::new(RecordingLogger::default());
        let mut executor = ScriptedExecutor::new(2);

        FindMaxSafeUseCase::new()
            .with_logger(logger.clone())
            .execute(&mut executor, input(1153, 10))
            .await
            .unwrap();

        assert_eq!(
            *logger.rounds.lock().unwrap(),
            vec![(1153, 1), (1153, 2), (1153, 3)]
        );
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl SweepProgressNotifier for RecordingProgress {
        fn on_search_start(&self, config: &SweepConfiguration) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start q={}", config.modulus()));
        }
        fn on_round_start(&self, party_count: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("round {}", party_count));
        }
        fn on_round_complete(&self, round: &Round) {
            self.events
                .lock()
                .unwrap()
                .push(format!("done {} {}", round.party_count(), round.outcome().label()));
        }
        fn on_search_complete(&self, _config: &SweepConfiguration, report: &SearchReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("max {}", report.max_safe));
        }
    }

    #[tokio::test]
    async fn test_progress_events() {
        let progress = RecordingProgress::default();
        let mut executor = ScriptedExecutor::new(1);

        FindMaxSafeUseCase::new()
            .execute_with_progress(&mut executor, input(257, 5), &progress)
            .await
            .unwrap();

        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "start q=257",
                "round 1",
                "done 1 all-yes",
                "round 2",
                "done 2 vetoed",
                "max 1",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_over_coordinator() {
        let launcher = Arc::new(FakeLauncher::new(3));
        let mut coordinator = RoundCoordinator::new(Arc::clone(&launcher), RoundParams::default());

        let report = FindMaxSafeUseCase::new()
            .execute(&mut coordinator, input(315521, 10))
            .await
            .unwrap();

        assert_eq!(report.max_safe, 3);
        let tallies: Vec<_> = launcher
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("tally"))
            .collect();
        assert_eq!(tallies, vec!["tally <1", "tally <2", "tally <3", "tally <4"]);
    }
}
