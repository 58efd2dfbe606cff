//! Infrastructure layer for avp-sweep
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod artifacts;
pub mod config;
pub mod export;
pub mod logging;
pub mod process;

// Re-export commonly used types
pub use artifacts::DirectoryVoteArtifacts;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileOutputConfig, FileOutputFormat,
    FileProtocolConfig, FileSettlementConfig, FileSettlementPolicy, FileSweepConfig,
};
pub use export::{ExportFormat, FileResultExporter};
pub use logging::JsonlRoundLogger;
pub use process::{ChildParty, ProgramSpec, ProtocolCommands, TokioProcessLauncher};
