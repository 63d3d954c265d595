//! Helpers shared by the pipeline subcommands.

use anyhow::Context;
use std::io::{self, prelude::*, BufReader};

/// Read a manifest: one path per line, surrounding whitespace removed and
/// blank lines skipped. Compressed manifests are detected automatically.
pub fn read_manifest(path: &str) -> anyhow::Result<Vec<String>> {
    let reader = BufReader::new(
        autocompress::autodetect_open(path)
            .with_context(|| format!("Failed to open manifest {}", path))?,
    );
    let entries =
        read_manifest_from(reader).with_context(|| format!("Failed to read manifest {}", path))?;
    log::debug!("{} entries loaded from {}", entries.len(), path);
    Ok(entries)
}

pub fn read_manifest_from<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            entries.push(trimmed.to_string());
        }
    }
    Ok(entries)
}

pub fn write_manifest<W: Write, S: AsRef<str>>(mut writer: W, entries: &[S]) -> io::Result<()> {
    for one in entries {
        writeln!(writer, "{}", one.as_ref())?;
    }
    writer.flush()
}
