//! Application-level configuration.
//!
//! - [`RoundParams`] - how a single round is coordinated (marker, settlement, cleanup)
//! - [`SettlementPolicy`] - how the coordinator waits for the parties

pub mod round_params;

pub use round_params::{RoundParams, SettlementPolicy};
