use crate::config::PipelineConfig;
use crate::error::ScriptGenError;
use crate::group::{plan_collapse, CollapsePlan, SampleGroups};
use crate::job::Job;
use crate::stage::{Fanout, Stage};
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A manifest entry (or sample, or interval) that produced no script.
#[derive(Debug)]
pub struct EntryFailure {
    pub entry: String,
    pub error: ScriptGenError,
}

#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<PathBuf>,
    pub failures: Vec<EntryFailure>,
    /// Inputs of the following stage, for stages that rewrite the file list
    pub next_manifest: Option<Vec<String>>,
}

impl Report {
    fn fail(&mut self, entry: &str, error: ScriptGenError) {
        warn!("{}: {}", entry, error);
        self.failures.push(EntryFailure {
            entry: entry.to_string(),
            error,
        });
    }
}

/// Write the scripts of `stage` into `output_dir`.
///
/// Entries that cannot be used are collected in the report and the rest of
/// the batch is still generated. Only a missing intervals manifest, or a
/// stage combining entries with no usable entry left, fails the whole call.
pub fn generate(
    stage: Stage,
    config: &PipelineConfig,
    entries: &[String],
    intervals: Option<&[String]>,
    output_dir: &Path,
) -> Result<Report, ScriptGenError> {
    let spec = stage.spec();
    if spec.requires_intervals() && intervals.is_none() {
        return Err(ScriptGenError::MissingIntervals(stage));
    }

    let mut report = Report::default();
    let mut usable = Vec::new();
    for entry in entries {
        if entry.ends_with(spec.entry_suffix) {
            usable.push(entry.clone());
        } else {
            report.fail(
                entry,
                ScriptGenError::UnexpectedSuffix {
                    entry: entry.clone(),
                    suffix: spec.entry_suffix,
                },
            );
        }
    }

    let mut jobs: Vec<(String, Job)> = Vec::new();
    let mut collapse: Option<CollapsePlan> = None;
    match spec.fanout {
        Fanout::PerEntry(build) => {
            for entry in &usable {
                match build(config, entry) {
                    Ok(job) => jobs.push((entry.clone(), job)),
                    Err(e) => report.fail(entry, e),
                }
            }
        }
        Fanout::PerSampleGroup(build) => {
            let (groups, failures) = SampleGroups::from_bam_paths(&usable);
            for one in failures {
                report.fail(&one.entry, one.error);
            }
            let mut plan = plan_collapse(&groups, config, build);
            info!(
                "{} samples, {} need merging",
                groups.len(),
                plan.jobs.len()
            );
            jobs.append(&mut plan.jobs);
            collapse = Some(plan);
        }
        Fanout::PerInterval(build) => {
            if usable.is_empty() {
                return Err(ScriptGenError::NoEntries(stage));
            }
            for interval in intervals.unwrap_or_default() {
                jobs.push((interval.clone(), build(config, interval, &usable)));
            }
        }
        Fanout::WholeManifest(build) => {
            if usable.is_empty() {
                return Err(ScriptGenError::NoEntries(stage));
            }
            jobs.push((stage.to_string(), build(config, &usable)));
        }
    }

    let resources = config.scheduler.resources_for(stage);
    let mut seen = HashSet::new();
    for (entry, job) in jobs {
        let first = seen.insert(job.script_name.clone());
        if !first {
            warn!(
                "{}: {} was already generated in this run and is overwritten",
                entry, job.script_name
            );
        }
        match job.write_script(output_dir, &config.scheduler.partition, resources) {
            Ok(path) => {
                info!("{} -> {}", entry, path.display());
                if first {
                    report.written.push(path);
                }
            }
            Err(e) => {
                if let Some(plan) = collapse.as_mut() {
                    plan.exclude(&entry);
                }
                report.fail(&entry, e);
            }
        }
    }
    report.next_manifest = collapse.map(|x| x.next_manifest);

    Ok(report)
}
