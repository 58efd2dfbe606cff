//! File exporter for sweep results.
//!
//! The format follows the file extension: `.json` writes a JSON document,
//! anything else writes CSV with a `q,m_max` header.

use avp_sweep_application::{ExportError, ResultExporter};
use avp_sweep_domain::SweepResult;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// On-disk encoding of an exported result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Writes the `(q, m_max)` sequence to a file
pub struct FileResultExporter {
    path: PathBuf,
    format: ExportFormat,
}

impl FileResultExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = ExportFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> ExportFormat {
        self.format
    }

    fn render(&self, result: &SweepResult) -> Result<String, ExportError> {
        match self.format {
            ExportFormat::Csv => {
                let mut csv = String::from("q,m_max\n");
                for point in result.points() {
                    let _ = writeln!(csv, "{},{}", point.q, point.m_max);
                }
                Ok(csv)
            }
            ExportFormat::Json => {
                let document = serde_json::json!({
                    "recorded_at": chrono::Utc::now()
                        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                    "points": result,
                });
                serde_json::to_string_pretty(&document)
                    .map_err(|e| ExportError::Serialize(e.to_string()))
            }
        }
    }

    fn write_error(&self, e: std::io::Error) -> ExportError {
        ExportError::Write {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

impl ResultExporter for FileResultExporter {
    fn export(&self, result: &SweepResult) -> Result<(), ExportError> {
        let content = self.render(result)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }
        std::fs::write(&self.path, content).map_err(|e| self.write_error(e))?;

        info!(
            "Exported {} points to {}",
            result.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> SweepResult {
        let mut result = SweepResult::new();
        result.record(19457, 16);
        result.record(100609, 37);
        result.record(708481, 99);
        result
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("out.json")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.csv")), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_path(Path::new("results")), ExportFormat::Csv);
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sweep.csv");

        FileResultExporter::new(&path).export(&reference()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "q,m_max\n19457,16\n100609,37\n708481,99\n");
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sweep.json");

        FileResultExporter::new(&path).export(&reference()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value["recorded_at"].is_string());
        let points = value["points"].as_array().unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0]["q"], 19457);
        assert_eq!(points[2]["m_max"], 99);
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be overwritten by a file
        let err = FileResultExporter::new(dir.path())
            .export(&reference())
            .unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
