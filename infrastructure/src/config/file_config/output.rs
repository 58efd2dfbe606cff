//! Output configuration from TOML (`[output]` section)

use avp_sweep_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use avp_sweep_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Export file for the `(q, m_max)` sequence
    pub results_path: Option<PathBuf>,
    /// JSONL log of every executed round
    pub round_log: Option<PathBuf>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            results_path: None,
            round_log: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "csv"
results_path = "out/sweep.json"
"#;
        let config: super::super::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Csv));
        assert_eq!(
            config.output.results_path,
            Some(PathBuf::from("out/sweep.json"))
        );
        assert!(config.output.color);
    }
}
