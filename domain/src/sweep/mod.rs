//! Sweep domain
//!
//! - [`config::SweepConfiguration`] - modulus and maximum party count of one search
//! - [`search`] - search strategy and the report a search produces
//! - [`result::SweepResult`] - ordered `(q, m_max)` pairs across configurations
//! - [`bound`] - closed-form estimate of the boundary for a modulus

pub mod bound;
pub mod config;
pub mod result;
pub mod search;

pub use bound::{error_bound, predicted_max_safe};
pub use config::SweepConfiguration;
pub use result::{BoundaryPoint, SweepResult};
pub use search::{FailurePoint, SearchReport, SearchStrategy, SearchVerdict};
