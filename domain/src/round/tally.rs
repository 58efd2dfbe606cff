//! Tally report scanning.
//!
//! The tally program prints a human-readable report. Only one thing in it is
//! contractual, the success marker. Two further lines are scanned when present:
//!
//! ```text
//! Result: 1893 vs. 78880
//! Error: Could not read party 3's vote.
//! ```
//!
//! The first carries the infinity norm of the decoded sum against its decision
//! bound (the number right before and right after `vs.`), the second means a
//! party never persisted a vote.

use serde::{Deserialize, Serialize};

/// Literal substring the tally prints when every party voted yes.
pub const DEFAULT_SUCCESS_MARKER: &str = "ALL VOTED YES";

const NORM_SEPARATOR: &str = " vs. ";
const UNREADABLE_PREFIX: &str = "Could not read party ";

/// Optional details extracted from a tally report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyDiagnostics {
    /// Infinity norm of the decoded polynomial sum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub norm: Option<u64>,
    /// Decision bound the norm was compared against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bound: Option<u64>,
    /// Party whose vote the tally could not read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unreadable_party: Option<usize>,
}

impl TallyDiagnostics {
    /// Scan a tally report. Unknown lines are ignored.
    pub fn parse(report: &str) -> Self {
        let mut diagnostics = Self::default();

        for line in report.lines().map(str::trim) {
            if diagnostics.norm.is_none()
                && let Some((norm, bound)) = parse_norm_line(line)
            {
                diagnostics.norm = Some(norm);
                diagnostics.bound = Some(bound);
            }

            if diagnostics.unreadable_party.is_none() {
                diagnostics.unreadable_party = parse_unreadable_line(line);
            }
        }

        diagnostics
    }

    /// Norm headroom as a fraction of the bound (`norm / bound`).
    pub fn norm_ratio(&self) -> Option<f64> {
        match (self.norm, self.bound) {
            (Some(norm), Some(bound)) if bound > 0 => Some(norm as f64 / bound as f64),
            _ => None,
        }
    }
}

/// Check a report for the success marker.
pub fn contains_marker(report: &str, marker: &str) -> bool {
    !marker.is_empty() && report.contains(marker)
}

fn parse_norm_line(line: &str) -> Option<(u64, u64)> {
    let (left, right) = line.split_once(NORM_SEPARATOR)?;
    let norm = left.split_whitespace().next_back()?.parse().ok()?;
    let bound = right.split_whitespace().next()?.parse().ok()?;
    Some((norm, bound))
}

fn parse_unreadable_line(line: &str) -> Option<usize> {
    let start = line.find(UNREADABLE_PREFIX)? + UNREADABLE_PREFIX.len();
    let digits: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
