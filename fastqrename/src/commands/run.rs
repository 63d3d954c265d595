use crate::engine::{RenameEngine, TransferMode};
use crate::logdir::LogDir;
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    about = "Copy (or move) raw FASTQ files into an output directory under their sample names",
    long_about = "Copy (or move) raw FASTQ files into an output directory under their sample names. When the log directory already holds original_filenames.txt and rename.log from an earlier run, that run is resumed and rename_restart.log is written instead.",
    version,
    author
)]
pub struct Run {
    #[arg(help = "Directory with raw *fastq.gz files")]
    source_dir: String,
    #[arg(help = "Directory to write renamed files into")]
    output_dir: String,
    #[arg(help = "Directory for the file list and rename logs")]
    log_dir: String,
    #[arg(long = "move", help = "Move files instead of copying them")]
    move_files: bool,
    #[arg(short = 'n', long, help = "Only log what would be renamed")]
    dry_run: bool,
}

impl Run {
    pub fn run(&self) -> anyhow::Result<()> {
        let mode = if self.move_files {
            TransferMode::Move
        } else {
            TransferMode::Copy
        };
        let summary = RenameEngine::new(
            &self.source_dir,
            &self.output_dir,
            LogDir::new(&self.log_dir),
        )
        .mode(mode)
        .dry_run(self.dry_run)
        .run()
        .with_context(|| format!("Failed to rename files in {}", self.source_dir))?;

        if summary.skipped > 0 {
            log::warn!(
                "{} files did not match any naming schema and were skipped",
                summary.skipped
            );
        }
        if summary.failed > 0 {
            return Err(anyhow::anyhow!(
                "{} files could not be renamed",
                summary.failed
            ));
        }
        Ok(())
    }
}
