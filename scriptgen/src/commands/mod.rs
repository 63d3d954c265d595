mod generate;
mod show_config;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "generate", alias = "gen")]
    Generate(generate::Generate),
    #[command(name = "show-config")]
    ShowConfig(show_config::ShowConfig),
}

impl Commands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Commands::Generate(x) => x.run(),
            Commands::ShowConfig(x) => x.run(),
        }
    }
}
