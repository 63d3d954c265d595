use crate::error::RenameError;
use crate::logdir::LogDir;
use crate::renamelog::{read_rename_log, RenameLogEntry, RenameLogWriter};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const SOURCE_SUFFIX: &str = "fastq.gz";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Copy,
    Move,
}

impl TransferMode {
    pub fn transfer(self, from: &Path, to: &Path) -> Result<(), RenameError> {
        let to_error = |e| RenameError::Transfer {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source: e,
        };
        match self {
            TransferMode::Copy => {
                fs::copy(from, to).map_err(to_error)?;
            }
            TransferMode::Move => {
                if let Err(e) = fs::rename(from, to) {
                    // different filesystems
                    debug!("rename {} failed ({}), copying instead", from.display(), e);
                    fs::copy(from, to).map_err(to_error)?;
                    fs::remove_file(from).map_err(to_error)?;
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameSummary {
    /// Files transferred in this run
    pub renamed: usize,
    /// Log lines carried over from a prior run, or files found already
    /// at their new name
    pub reused: usize,
    /// Names that match no naming schema
    pub skipped: usize,
    /// Transfers that failed, or would have replaced a file renamed
    /// earlier in the same run
    pub failed: usize,
    pub resumed: bool,
}

#[derive(Debug, Clone)]
pub struct RenameEngine {
    source_dir: PathBuf,
    output_dir: PathBuf,
    log_dir: LogDir,
    mode: TransferMode,
    dry_run: bool,
}

impl RenameEngine {
    pub fn new(
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        log_dir: LogDir,
    ) -> Self {
        RenameEngine {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            log_dir,
            mode: TransferMode::Copy,
            dry_run: false,
        }
    }

    pub fn mode(mut self, mode: TransferMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Resume when the log directory holds a prior run, start fresh otherwise.
    pub fn run(&self) -> Result<RenameSummary, RenameError> {
        let summary = if self.log_dir.has_prior_run() {
            info!(
                "found {} and {} in {}, resuming",
                crate::logdir::SNAPSHOT_FILE,
                crate::logdir::LOG_FILE,
                self.log_dir.root().display()
            );
            self.resume()?
        } else {
            self.fresh()?
        };
        info!(
            "renamed: {}, reused: {}, skipped: {}, failed: {}",
            summary.renamed, summary.reused, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Regular `*fastq.gz` files of the source directory, sorted by name.
    pub fn list_sources(&self) -> Result<Vec<PathBuf>, RenameError> {
        let to_error = |e| RenameError::ListDirectory {
            path: self.source_dir.clone(),
            source: e,
        };
        let mut sources = Vec::new();
        for one in fs::read_dir(&self.source_dir).map_err(to_error)? {
            let one = one.map_err(to_error)?;
            let path = one.path();
            let is_source = path
                .file_name()
                .and_then(|x| x.to_str())
                .map(|x| x.ends_with(SOURCE_SUFFIX))
                .unwrap_or(false);
            if is_source && path.is_file() {
                sources.push(path);
            }
        }
        sources.sort();
        Ok(sources)
    }

    fn fresh(&self) -> Result<RenameSummary, RenameError> {
        let sources: Vec<String> = self
            .list_sources()?
            .iter()
            .map(|x| x.display().to_string())
            .collect();
        info!(
            "{} files to rename in {}",
            sources.len(),
            self.source_dir.display()
        );

        let mut log = if self.dry_run {
            None
        } else {
            self.prepare_directories()?;
            self.write_snapshot(&sources)?;
            Some(RenameLogWriter::create(&self.log_dir.log_path())?)
        };

        let mut summary = RenameSummary::default();
        let mut targets = HashSet::new();
        for source in &sources {
            if let Some(entry) = self.process(source, &mut targets, &mut summary) {
                if let Some(log) = log.as_mut() {
                    log.append(&entry)?;
                }
            }
        }
        Ok(summary)
    }

    fn resume(&self) -> Result<RenameSummary, RenameError> {
        let snapshot_path = self.log_dir.snapshot_path();
        let snapshot = File::open(&snapshot_path)
            .and_then(|x| pipelinekit_common::read_manifest_from(BufReader::new(x)))
            .map_err(|e| RenameError::Read {
                path: snapshot_path.clone(),
                source: e,
            })?;
        let prior = read_rename_log(&self.log_dir.log_path())?;
        let restart_path = self.log_dir.restart_log_path();
        let restarted = if restart_path.is_file() {
            read_rename_log(&restart_path)?
        } else {
            Vec::new()
        };
        if !restarted.is_empty() {
            info!(
                "continuing {} lines of {}",
                restarted.len(),
                crate::logdir::RESTART_LOG_FILE
            );
        }

        let mut index: HashMap<&str, &RenameLogEntry> = HashMap::new();
        for entry in restarted.iter().chain(prior.iter()) {
            index.entry(base_name(&entry.original)).or_insert(entry);
        }

        let drift = count_drift(&snapshot, &prior);
        if drift > 0 {
            warn!(
                "{} lines of {} are not in the order of {}",
                drift,
                crate::logdir::LOG_FILE,
                crate::logdir::SNAPSHOT_FILE
            );
        }

        // the restart log is read completely before it is replaced
        let mut log = if self.dry_run {
            None
        } else {
            self.prepare_directories()?;
            Some(RenameLogWriter::create(&restart_path)?)
        };

        let mut summary = RenameSummary {
            resumed: true,
            ..RenameSummary::default()
        };
        let mut targets = HashSet::new();
        for source in &snapshot {
            let entry = if let Some(done) = index.get(base_name(source)) {
                debug!("{} was renamed by a prior run", source);
                summary.reused += 1;
                targets.insert(PathBuf::from(&done.renamed));
                Some((*done).clone())
            } else {
                self.process(source, &mut targets, &mut summary)
            };
            if let (Some(entry), Some(log)) = (entry, log.as_mut()) {
                log.append(&entry)?;
            }
        }
        Ok(summary)
    }

    fn prepare_directories(&self) -> Result<(), RenameError> {
        for dir in [self.output_dir.as_path(), self.log_dir.root()] {
            fs::create_dir_all(dir).map_err(|e| RenameError::Write {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn write_snapshot(&self, sources: &[String]) -> Result<(), RenameError> {
        let path = self.log_dir.snapshot_path();
        File::create(&path)
            .map(BufWriter::new)
            .and_then(|mut writer| {
                pipelinekit_common::write_manifest(&mut writer, sources)?;
                writer.flush()
            })
            .map_err(|e| RenameError::Write { path, source: e })
    }

    /// Rename one source file. Returns the log line to record, if any.
    fn process(
        &self,
        source: &str,
        targets: &mut HashSet<PathBuf>,
        summary: &mut RenameSummary,
    ) -> Option<RenameLogEntry> {
        let renamed = match samplename::parse_raw(base_name(source))
            .and_then(|x| x.renamed_filename())
        {
            Ok(x) => x,
            Err(e) => {
                warn!("skipping {}: {}", source, e);
                summary.skipped += 1;
                return None;
            }
        };
        let target = self.output_dir.join(renamed);
        if !targets.insert(target.clone()) {
            warn!(
                "{} is left in place: {} is already taken by another file of this run",
                source,
                target.display()
            );
            summary.failed += 1;
            return None;
        }
        let entry = RenameLogEntry {
            original: source.to_string(),
            renamed: target.display().to_string(),
        };

        if self.dry_run {
            info!("would {:?} {} -> {}", self.mode, source, target.display());
        } else if !Path::new(source).exists() && target.exists() {
            // moved before the log line was written
            info!("{} is already at {}", source, target.display());
            summary.reused += 1;
            return Some(entry);
        } else {
            if let Err(e) = self.mode.transfer(Path::new(source), &target) {
                warn!("{}", e);
                summary.failed += 1;
                return None;
            }
            info!("{} -> {}", source, target.display());
        }
        summary.renamed += 1;
        Some(entry)
    }
}

/// Log lines whose position disagrees with the snapshot. Snapshot entries
/// without a log line (skipped or not reached) are left out of the pairing.
fn count_drift(snapshot: &[String], prior: &[RenameLogEntry]) -> usize {
    let logged: HashSet<&str> = prior.iter().map(|x| base_name(&x.original)).collect();
    snapshot
        .iter()
        .map(|x| base_name(x))
        .filter(|x| logged.contains(x))
        .zip(prior.iter().map(|x| base_name(&x.original)))
        .filter(|(expected, found)| expected != found)
        .count()
}

fn base_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or(path)
}
