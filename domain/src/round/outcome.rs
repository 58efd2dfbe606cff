//! Round outcome classification.

use super::tally::{TallyDiagnostics, contains_marker};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a round produced no usable verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndeterminateReason {
    /// A party process could not be launched; launching stopped at `index`.
    SpawnFailure { index: usize, reason: String },
    /// The settlement window closed while these parties were still pending.
    SettlementTimeout { pending: Vec<usize> },
    /// The tally printed nothing.
    EmptyTally,
    /// The tally could not read this party's persisted vote.
    UnreadableVote { party: usize },
}

impl fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailure { index, reason } => {
                write!(f, "party {} failed to spawn: {}", index, reason)
            }
            Self::SettlementTimeout { pending } => {
                write!(f, "{} parties did not settle in time", pending.len())
            }
            Self::EmptyTally => write!(f, "tally produced no output"),
            Self::UnreadableVote { party } => write!(f, "tally could not read party {}'s vote", party),
        }
    }
}

/// Classified result of one round.
///
/// Every variant carries the raw tally report (empty when the tally never ran)
/// for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TallyOutcome {
    /// The success marker was present: unanimous yes.
    AllYes { report: String },
    /// The report is well-formed but lacks the success marker.
    Vetoed { report: String },
    /// No verdict could be read from this round.
    Indeterminate {
        reason: IndeterminateReason,
        report: String,
    },
}

impl TallyOutcome {
    /// Classify a tally report against the success marker.
    ///
    /// Order: blank report, marker, unreadable vote, veto.
    pub fn classify(report: impl Into<String>, marker: &str) -> Self {
        let report = report.into();

        if report.trim().is_empty() {
            return Self::indeterminate(IndeterminateReason::EmptyTally, report);
        }

        if contains_marker(&report, marker) {
            return Self::AllYes { report };
        }

        if let Some(party) = TallyDiagnostics::parse(&report).unreadable_party {
            return Self::indeterminate(IndeterminateReason::UnreadableVote { party }, report);
        }

        Self::Vetoed { report }
    }

    /// An outcome for a round whose tally never ran.
    pub fn aborted(reason: IndeterminateReason) -> Self {
        Self::indeterminate(reason, String::new())
    }

    fn indeterminate(reason: IndeterminateReason, report: String) -> Self {
        Self::Indeterminate { reason, report }
    }

    pub fn is_all_yes(&self) -> bool {
        matches!(self, Self::AllYes { .. })
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Indeterminate { .. })
    }

    /// Raw tally report
    pub fn report(&self) -> &str {
        match self {
            Self::AllYes { report } | Self::Vetoed { report } | Self::Indeterminate { report, .. } => {
                report
            }
        }
    }

    /// Diagnostics scanned from the report
    pub fn diagnostics(&self) -> TallyDiagnostics {
        TallyDiagnostics::parse(self.report())
    }

    /// Short label for console and log output
    pub fn label(&self) -> &'static str {
        match self {
            Self::AllYes { .. } => "all-yes",
            Self::Vetoed { .. } => "vetoed",
            Self::Indeterminate { .. } => "indeterminate",
        }
    }
}

impl fmt::Display for TallyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllYes { .. } => write!(f, "ALL VOTED YES"),
            Self::Vetoed { .. } => write!(f, "vetoed"),
            Self::Indeterminate { reason, .. } => write!(f, "indeterminate ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::tally::DEFAULT_SUCCESS_MARKER;

    #[test]
    fn test_marker_present_is_all_yes() {
        let outcome = TallyOutcome::classify("Result: ALL VOTED YES (0)\n", DEFAULT_SUCCESS_MARKER);
        assert!(outcome.is_all_yes());
        assert_eq!(outcome.label(), "all-yes");
    }

    #[test]
    fn test_marker_absent_is_vetoed() {
        let outcome = TallyOutcome::classify("Result: SOMEONE VETOED (1)\n", DEFAULT_SUCCESS_MARKER);
        assert!(matches!(outcome, TallyOutcome::Vetoed { .. }));
        assert_eq!(outcome.report(), "Result: SOMEONE VETOED (1)\n");
    }

    #[test]
    fn test_blank_report_is_indeterminate() {
        let outcome = TallyOutcome::classify("  \n", DEFAULT_SUCCESS_MARKER);
        assert_eq!(
            outcome,
            TallyOutcome::Indeterminate {
                reason: IndeterminateReason::EmptyTally,
                report: "  \n".to_string(),
            }
        );
    }

    #[test]
    fn test_unreadable_vote_is_indeterminate() {
        let outcome = TallyOutcome::classify(
            "Enter number of parties: Error: Could not read party 4's vote.\n",
            DEFAULT_SUCCESS_MARKER,
        );
        assert!(matches!(
            outcome,
            TallyOutcome::Indeterminate {
                reason: IndeterminateReason::UnreadableVote { party: 4 },
                ..
            }
        ));
    }

    #[test]
    fn test_custom_marker() {
        let outcome = TallyOutcome::classify("verdict: UNANIMOUS", "UNANIMOUS");
        assert!(outcome.is_all_yes());
        let outcome = TallyOutcome::classify("Result: ALL VOTED YES (0)", "UNANIMOUS");
        assert!(!outcome.is_all_yes());
    }

    #[test]
    fn test_aborted_has_empty_report() {
        let outcome = TallyOutcome::aborted(IndeterminateReason::SettlementTimeout {
            pending: vec![2, 5],
        });
        assert!(outcome.is_indeterminate());
        assert!(outcome.report().is_empty());
        assert_eq!(
            outcome.to_string(),
            "indeterminate (2 parties did not settle in time)"
        );
    }

    #[test]
    fn test_serialize_tagged() {
        let outcome = TallyOutcome::Vetoed {
            report: "x".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "vetoed");
    }
}
