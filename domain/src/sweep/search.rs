//! Threshold search strategy and report.
//!
//! Both strategies walk `m = 1, 2, …` in order. `Linear` stops at the first
//! outcome that is not `AllYes` and assumes every larger `m` fails too.
//! `Exhaustive` keeps going to the maximum and reports every `m` above the
//! first failure that still passes, which is where that assumption breaks.

use crate::round::outcome::TallyOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the party-count range is walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Stop at the first failure (monotonicity assumed)
    #[default]
    Linear,
    /// Run every party count and check monotonicity
    Exhaustive,
}

impl SearchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exhaustive => "exhaustive",
        }
    }

    /// Whether the walk ends at the first failure
    pub fn stops_at_first_failure(&self) -> bool {
        matches!(self, Self::Linear)
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "exhaustive" => Ok(Self::Exhaustive),
            other => Err(format!("unknown search strategy: {}", other)),
        }
    }
}

/// First party count whose round was not `AllYes`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailurePoint {
    pub party_count: usize,
    pub outcome: TallyOutcome,
}

/// Overall verdict of a search, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchVerdict {
    /// The protocol broke inside the range
    BoundaryFound,
    /// Every tested party count passed
    NoBoundaryWithinRange,
    /// Some party count above the first failure passed again
    NonMonotonic,
}

impl SearchVerdict {
    /// Process exit code for this verdict
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::BoundaryFound => 0,
            Self::NoBoundaryWithinRange => 3,
            Self::NonMonotonic => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BoundaryFound => "boundary found",
            Self::NoBoundaryWithinRange => "no boundary within range",
            Self::NonMonotonic => "non-monotonic",
        }
    }
}

/// Result of one threshold search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub strategy: SearchStrategy,
    pub max_party_count: usize,
    /// Largest `m` below the first failure (`max_party_count` if none failed)
    pub max_safe: usize,
    pub first_failure: Option<FailurePoint>,
    pub rounds_executed: usize,
    /// Party counts above the first failure that were `AllYes`
    pub monotonicity_violations: Vec<usize>,
}

impl SearchReport {
    /// Build a report from the outcomes of a walk, in ascending `m` order.
    pub fn from_rounds(
        strategy: SearchStrategy,
        max_party_count: usize,
        rounds: Vec<(usize, TallyOutcome)>,
    ) -> Self {
        let rounds_executed = rounds.len();
        let mut first_failure: Option<FailurePoint> = None;
        let mut monotonicity_violations = Vec::new();

        for (party_count, outcome) in rounds {
            match (&first_failure, outcome.is_all_yes()) {
                (None, false) => {
                    first_failure = Some(FailurePoint {
                        party_count,
                        outcome,
                    });
                }
                (Some(_), true) => monotonicity_violations.push(party_count),
                _ => {}
            }
        }

        let max_safe = first_failure
            .as_ref()
            .map(|f| f.party_count - 1)
            .unwrap_or(max_party_count);

        Self {
            strategy,
            max_party_count,
            max_safe,
            first_failure,
            rounds_executed,
            monotonicity_violations,
        }
    }

    pub fn verdict(&self) -> SearchVerdict {
        if !self.monotonicity_violations.is_empty() {
            SearchVerdict::NonMonotonic
        } else if self.first_failure.is_some() {
            SearchVerdict::BoundaryFound
        } else {
            SearchVerdict::NoBoundaryWithinRange
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yes() -> TallyOutcome {
        TallyOutcome::AllYes {
            report: "ALL VOTED YES".into(),
        }
    }

    fn veto() -> TallyOutcome {
        TallyOutcome::Vetoed {
            report: "SOMEONE VETOED".into(),
        }
    }

    #[test]
    fn test_boundary_below_first_failure() {
        let rounds = vec![(1, yes()), (2, yes()), (3, veto())];
        let report = SearchReport::from_rounds(SearchStrategy::Linear, 10, rounds);
        assert_eq!(report.max_safe, 2);
        assert_eq!(report.rounds_executed, 3);
        assert_eq!(report.first_failure.as_ref().unwrap().party_count, 3);
        assert_eq!(report.verdict(), SearchVerdict::BoundaryFound);
    }

    #[test]
    fn test_failure_at_one_gives_zero() {
        let report = SearchReport::from_rounds(SearchStrategy::Linear, 5, vec![(1, veto())]);
        assert_eq!(report.max_safe, 0);
    }

    #[test]
    fn test_no_failure_reports_full_range() {
        let rounds = vec![(1, yes()), (2, yes())];
        let report = SearchReport::from_rounds(SearchStrategy::Linear, 2, rounds);
        assert_eq!(report.max_safe, 2);
        assert!(report.first_failure.is_none());
        assert_eq!(report.verdict(), SearchVerdict::NoBoundaryWithinRange);
    }

    #[test]
    fn test_pass_after_failure_is_violation() {
        let rounds = vec![(1, yes()), (2, veto()), (3, yes()), (4, veto()), (5, yes())];
        let report = SearchReport::from_rounds(SearchStrategy::Exhaustive, 5, rounds);
        assert_eq!(report.max_safe, 1);
        assert_eq!(report.monotonicity_violations, vec![3, 5]);
        assert_eq!(report.verdict(), SearchVerdict::NonMonotonic);
    }

    #[test]
    fn test_verdict_ordering_and_exit_codes() {
        assert!(SearchVerdict::BoundaryFound < SearchVerdict::NoBoundaryWithinRange);
        assert!(SearchVerdict::NoBoundaryWithinRange < SearchVerdict::NonMonotonic);
        assert_eq!(SearchVerdict::BoundaryFound.exit_code(), 0);
        assert_eq!(SearchVerdict::NoBoundaryWithinRange.exit_code(), 3);
        assert_eq!(SearchVerdict::NonMonotonic.exit_code(), 5);
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Linear".parse::<SearchStrategy>(), Ok(SearchStrategy::Linear));
        assert_eq!(
            "exhaustive".parse::<SearchStrategy>(),
            Ok(SearchStrategy::Exhaustive)
        );
        assert!("binary".parse::<SearchStrategy>().is_err());
    }
}
