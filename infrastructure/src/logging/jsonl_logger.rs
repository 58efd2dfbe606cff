//! JSONL file writer for executed rounds.
//!
//! Each [`Round`] is serialized as a single JSON line with a `timestamp`,
//! appended to the file via a buffered writer.

use avp_sweep_application::RoundLogger;
use avp_sweep_domain::{Round, TallyOutcome};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL round logger that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlRoundLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlRoundLogger {
    /// Create a new logger writing to the given path.
    ///
    /// Creates the file (and parent directories) if they don't exist.
    /// Returns `None` if the file cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create round log directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let file = match File::create(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not create round log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(modulus: u64, round: &Round) -> serde_json::Value {
        let outcome = round.outcome();
        let diagnostics = outcome.diagnostics();
        let mut record = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "modulus": modulus,
            "party_count": round.party_count(),
            "outcome": outcome.label(),
            "norm": diagnostics.norm,
            "bound": diagnostics.bound,
            "clean_exits": round.clean_exits(),
        });

        if let TallyOutcome::Indeterminate { reason, .. } = outcome
            && let (serde_json::Value::Object(map), Ok(reason)) =
                (&mut record, serde_json::to_value(reason))
        {
            map.insert("reason".to_string(), reason);
        }
        record
    }
}

impl RoundLogger for JsonlRoundLogger {
    fn log_round(&self, modulus: u64, round: &Round) {
        let Ok(line) = serde_json::to_string(&Self::record(modulus, round)) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlRoundLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
