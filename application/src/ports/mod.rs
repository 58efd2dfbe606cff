//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod process_launcher;
pub mod progress;
pub mod result_exporter;
pub mod round_logger;
pub mod vote_artifacts;
