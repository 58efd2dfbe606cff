//! Vote artifact probe backed by a directory listing

use avp_sweep_application::VoteArtifactProbe;
use std::path::{Path, PathBuf};

/// Default directory the parties persist their votes in
pub const DEFAULT_ARTIFACT_DIR: &str = "/dev/shm";

/// Default file name prefix of a persisted vote
pub const DEFAULT_ARTIFACT_PREFIX: &str = "PartyVote_";

/// Looks for `<dir>/<prefix><index>`
#[derive(Debug, Clone)]
pub struct DirectoryVoteArtifacts {
    dir: PathBuf,
    prefix: String,
}

impl Default for DirectoryVoteArtifacts {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_DIR, DEFAULT_ARTIFACT_PREFIX)
    }
}

impl DirectoryVoteArtifacts {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, index))
    }
}

impl VoteArtifactProbe for DirectoryVoteArtifacts {
    fn is_present(&self, index: usize) -> bool {
        self.artifact_path(index).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let probe = DirectoryVoteArtifacts::default();
        assert_eq!(
            probe.artifact_path(12),
            PathBuf::from("/dev/shm/PartyVote_12")
        );
    }

    #[test]
    fn test_missing_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let probe = DirectoryVoteArtifacts::new(dir.path(), "PartyVote_");

        std::fs::write(probe.artifact_path(0), b"vote").unwrap();
        std::fs::write(probe.artifact_path(2), b"vote").unwrap();

        assert!(probe.is_present(0));
        assert!(!probe.is_present(1));
        assert_eq!(probe.missing(4), vec![1, 3]);
        assert!(probe.missing(1).is_empty());
    }
}
