use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "original_filenames.txt";
pub const LOG_FILE: &str = "rename.log";
pub const RESTART_LOG_FILE: &str = "rename_restart.log";

/// State of rename runs kept in one directory.
///
/// Only one run may use a log directory at a time; nothing is locked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogDir {
    root: PathBuf,
}

impl LogDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LogDir { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source files listed at the start of a fresh run
    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    pub fn restart_log_path(&self) -> PathBuf {
        self.root.join(RESTART_LOG_FILE)
    }

    /// A prior run left both the snapshot and its log behind.
    pub fn has_prior_run(&self) -> bool {
        self.snapshot_path().is_file() && self.log_path().is_file()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_has_prior_run() -> std::io::Result<()> {
        let dir = tempfile::tempdir()?;
        let log_dir = LogDir::new(dir.path());
        assert!(!log_dir.has_prior_run());
        std::fs::write(log_dir.snapshot_path(), "")?;
        assert!(!log_dir.has_prior_run());
        std::fs::write(log_dir.log_path(), "")?;
        assert!(log_dir.has_prior_run());
        assert_eq!(
            log_dir.restart_log_path(),
            dir.path().join("rename_restart.log")
        );
        Ok(())
    }
}
