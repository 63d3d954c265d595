use crate::config::PipelineConfig;
use anyhow::Context;
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    about = "Print the effective pipeline configuration as YAML",
    version,
    author
)]
pub struct ShowConfig {
    #[arg(short, long, help = "Pipeline configuration (YAML) to merge with the defaults")]
    config: Option<String>,
}

impl ShowConfig {
    pub fn run(&self) -> anyhow::Result<()> {
        let config = PipelineConfig::load(self.config.as_deref())?;
        let yaml = serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
        std::io::stdout().lock().write_all(yaml.as_bytes())?;
        Ok(())
    }
}
