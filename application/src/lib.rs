//! Application layer for avp-sweep
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{RoundParams, SettlementPolicy};
pub use ports::{
    process_launcher::{
        CapturedOutput, LaunchError, PartyExit, PartyProcess, ProcessLauncher, UtilityStep,
    },
    progress::{NoProgress, SweepProgressNotifier},
    result_exporter::{ExportError, ResultExporter},
    round_logger::{NoRoundLogger, RoundLogger},
    vote_artifacts::VoteArtifactProbe,
};
pub use use_cases::execute_round::{ProtocolState, RoundCoordinator, RoundError};
pub use use_cases::find_max_safe::{FindMaxSafeInput, FindMaxSafeUseCase, RoundExecutor};
pub use use_cases::run_sweep::{RunSweepError, RunSweepInput, RunSweepOutput, RunSweepUseCase};
