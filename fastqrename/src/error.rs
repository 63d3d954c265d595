use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenameError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to list {}: {source}", path.display())]
    ListDirectory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Rename log {}: {source}", path.display())]
    Log { path: PathBuf, source: csv::Error },
    #[error("Rename log {}, line {line}: expected original and new path separated by a tab", path.display())]
    MalformedLog { path: PathBuf, line: u64 },
    #[error("Failed to transfer {} to {}: {source}", from.display(), to.display())]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}
