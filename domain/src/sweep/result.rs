//! Sweep result: the `(q, m_max)` sequence handed to plotting.

use serde::{Deserialize, Serialize};

/// Boundary measured for one modulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    /// Protocol modulus `q`
    pub q: u64,
    /// Largest party count with a unanimous `AllYes`
    pub m_max: usize,
}

/// Append-only, ordered sequence of boundary points.
///
/// Points are kept in the order the sweeps ran. No aggregation, smoothing or
/// validation is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SweepResult {
    points: Vec<BoundaryPoint>,
}

impl SweepResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the boundary of the next configuration.
    pub fn record(&mut self, q: u64, m_max: usize) {
        self.points.push(BoundaryPoint { q, m_max });
    }

    pub fn points(&self) -> &[BoundaryPoint] {
        &self.points
    }

    /// Pairs in recording order
    pub fn pairs(&self) -> Vec<(u64, usize)> {
        self.points.iter().map(|p| (p.q, p.m_max)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
