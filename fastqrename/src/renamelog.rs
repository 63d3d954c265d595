use crate::error::RenameError;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One line of a rename log: `original<TAB>renamed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameLogEntry {
    pub original: String,
    pub renamed: String,
}

pub fn tsv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .quoting(false)
        .delimiter(b'\t')
        .escape(None)
        .has_headers(false)
        .flexible(true);
    builder
}

pub fn read_rename_log(path: &Path) -> Result<Vec<RenameLogEntry>, RenameError> {
    let file = File::open(path).map_err(|e| RenameError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    load_rename_log(file, path)
}

fn load_rename_log<R: Read>(reader: R, path: &Path) -> Result<Vec<RenameLogEntry>, RenameError> {
    let mut entries = Vec::new();
    for row in tsv_reader_builder().from_reader(reader).into_records() {
        let row = row.map_err(|e| RenameError::Log {
            path: path.to_path_buf(),
            source: e,
        })?;
        let line = row.position().map(|x| x.line()).unwrap_or_default();
        if row.len() == 1 && row[0].trim().is_empty() {
            continue;
        }
        if row.len() != 2 {
            return Err(RenameError::MalformedLog {
                path: path.to_path_buf(),
                line,
            });
        }
        entries.push(RenameLogEntry {
            original: row[0].to_string(),
            renamed: row[1].to_string(),
        });
    }
    Ok(entries)
}

/// Appends entries to a rename log, flushing after every line so an
/// interrupted run leaves only complete lines behind.
pub struct RenameLogWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl RenameLogWriter {
    pub fn create(path: &Path) -> Result<Self, RenameError> {
        let file = File::create(path).map_err(|e| RenameError::Write {
            path: path.to_path_buf(),
            source: e,
        })?;
        let writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(file);
        Ok(RenameLogWriter {
            path: path.to_path_buf(),
            writer,
        })
    }

    pub fn append(&mut self, entry: &RenameLogEntry) -> Result<(), RenameError> {
        self.writer
            .write_record([entry.original.as_str(), entry.renamed.as_str()])
            .map_err(|e| RenameError::Log {
                path: self.path.clone(),
                source: e,
            })?;
        self.writer.flush().map_err(|e| RenameError::Write {
            path: self.path.clone(),
            source: e,
        })
    }
}
