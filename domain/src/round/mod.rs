//! Round domain
//!
//! A round is one trial of the external protocol for a fixed party count.
//!
//! - [`entities::Round`] - party records plus the classified outcome
//! - [`outcome::TallyOutcome`] - `AllYes`, `Vetoed` or `Indeterminate`
//! - [`tally`] - scanning the tally report for the success marker and diagnostics

pub mod entities;
pub mod outcome;
pub mod tally;

pub use entities::{PartyRecord, PartyStatus, Round};
pub use outcome::{IndeterminateReason, TallyOutcome};
pub use tally::{DEFAULT_SUCCESS_MARKER, TallyDiagnostics};
