//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for sweep reports
///
/// This is a domain concept representing how the final `(q, m_max)` report
/// should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table of boundaries plus a text chart (default)
    #[default]
    Table,
    /// JSON output
    Json,
    /// CSV output (`q,m_max`), ready for a plotting tool
    Csv,
}
