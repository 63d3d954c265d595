pub mod commands;
pub mod config;
pub mod error;
pub mod generator;
pub mod group;
pub mod job;
pub mod stage;

use clap::Args;

#[derive(Debug, Args)]
#[command(version, about = "SLURM batch script generation", author)]
pub struct ScriptGen {
    #[command(subcommand)]
    commands: commands::Commands,
}

impl ScriptGen {
    pub fn run(&self) -> anyhow::Result<()> {
        self.commands.run()
    }
}
