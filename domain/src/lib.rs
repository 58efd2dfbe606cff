//! Domain layer for avp-sweep
//!
//! This crate contains the core types of the threshold search: what a round is,
//! how a tally report is classified, and what a sweep produces. It has no
//! dependencies on process management, configuration files or presentation.
//!
//! # Core Concepts
//!
//! ## Round
//!
//! One trial of the external AVP protocol for a fixed party count `m`:
//! reset the protocol state, launch parties `0..m-1`, wait for them to settle,
//! tally. The tally report is classified into a [`TallyOutcome`].
//!
//! ## Sweep
//!
//! For one modulus `q`, rounds are run for increasing `m` until the protocol
//! stops producing a unanimous `AllYes`. The largest safe `m` is `m_max`, and
//! the ordered `(q, m_max)` pairs form a [`SweepResult`].

pub mod config;
pub mod core;
pub mod round;
pub mod sweep;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::error::DomainError;
pub use round::{
    entities::{PartyRecord, PartyStatus, Round},
    outcome::{IndeterminateReason, TallyOutcome},
    tally::{DEFAULT_SUCCESS_MARKER, TallyDiagnostics},
};
pub use sweep::{
    bound::{error_bound, predicted_max_safe},
    config::SweepConfiguration,
    result::{BoundaryPoint, SweepResult},
    search::{FailurePoint, SearchReport, SearchStrategy, SearchVerdict},
};
