//! Copy raw sequencer FASTQ files to names built from their sample
//! metadata, keeping a log that lets an interrupted run be resumed.

pub mod commands;
pub mod engine;
pub mod error;
pub mod logdir;
pub mod renamelog;

use clap::Args;

#[derive(Debug, Args)]
#[command(version, about = "Rename raw FASTQ files by sample", author)]
pub struct FastqRename {
    #[command(subcommand)]
    commands: commands::Commands,
}

impl FastqRename {
    pub fn run(&self) -> anyhow::Result<()> {
        self.commands.run()
    }
}
