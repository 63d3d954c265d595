use crate::config::PipelineConfig;
use crate::generator::generate;
use crate::stage::Stage;
use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use pipelinekit_common::{read_manifest, write_manifest};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(about = "Generate SLURM batch scripts for one pipeline stage", version, author)]
pub struct Generate {
    #[arg(help = "Pipeline stage", value_enum)]
    stage: Stage,
    #[arg(help = "Manifest of input files (one path per line)")]
    manifest: String,
    #[arg(help = "Manifest of genomic intervals (combine-gvcfs)")]
    intervals: Option<String>,
    #[arg(short, long, help = "Pipeline configuration (YAML)")]
    config: Option<String>,
    #[arg(
        short,
        long,
        help = "Directory to write scripts into",
        default_value = "."
    )]
    output_dir: String,
    #[arg(
        short,
        long,
        help = "Manifest of BAM files for haplotype calling (collapse-bams)",
        long_help = "Manifest of BAM files for haplotype calling (collapse-bams). Defaults to naming.haplotyper_manifest in the output directory."
    )]
    next_manifest: Option<String>,
}

impl Generate {
    pub fn run(&self) -> anyhow::Result<()> {
        let config = PipelineConfig::load(self.config.as_deref())?;
        let spec = self.stage.spec();

        let entries = read_manifest(&self.manifest)?;
        let intervals = self.intervals.as_deref().map(read_manifest).transpose()?;
        if intervals.is_some() && !spec.requires_intervals() {
            warn!(
                "stage {} does not use an intervals manifest; {} is ignored",
                self.stage,
                self.intervals.as_deref().unwrap_or_default()
            );
        }

        let output_dir = Path::new(&self.output_dir);
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", self.output_dir))?;

        let report = generate(
            self.stage,
            &config,
            &entries,
            intervals.as_deref(),
            output_dir,
        )?;
        info!("{}: {} scripts written", self.stage, report.written.len());

        if let Some(next_manifest) = report.next_manifest.as_ref() {
            let path = self
                .next_manifest
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| output_dir.join(&config.naming.haplotyper_manifest));
            let writer = BufWriter::new(
                File::create(&path)
                    .with_context(|| format!("Failed to create {}", path.display()))?,
            );
            write_manifest(writer, next_manifest)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "{} entries listed in {}",
                next_manifest.len(),
                path.display()
            );
        } else if let Some(path) = self.next_manifest.as_deref() {
            warn!("stage {} writes no next manifest; {} is ignored", self.stage, path);
        }

        if !report.failures.is_empty() {
            return Err(anyhow::anyhow!(
                "{} of {} entries could not be processed",
                report.failures.len(),
                entries.len()
            ));
        }
        Ok(())
    }
}
