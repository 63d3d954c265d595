use crate::stage::Stage;
use samplename::SampleNameError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptGenError {
    #[error("File name parse error: {0}")]
    SampleName(#[from] SampleNameError),
    #[error("{entry}: file name does not end with \"{suffix}\"")]
    UnexpectedSuffix { entry: String, suffix: &'static str },
    #[error("{0}: no parent directory to take the sample ID from")]
    NoParentDirectory(String),
    #[error("Stage {0} requires an intervals manifest")]
    MissingIntervals(Stage),
    #[error("Stage {0}: no usable entries in manifest")]
    NoEntries(Stage),
    #[error("Failed to write {}: {source}", path.display())]
    WriteScript {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to open configuration {path}: {source}")]
    ConfigOpen {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse configuration {path}: {source}")]
    ConfigParse {
        path: String,
        source: serde_yaml::Error,
    },
}
