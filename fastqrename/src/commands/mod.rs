mod inspect;
mod run;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(name = "run")]
    Run(run::Run),
    #[command(name = "inspect", alias = "i")]
    Inspect(inspect::Inspect),
}

impl Commands {
    pub fn run(&self) -> anyhow::Result<()> {
        match self {
            Commands::Run(x) => x.run(),
            Commands::Inspect(x) => x.run(),
        }
    }
}
