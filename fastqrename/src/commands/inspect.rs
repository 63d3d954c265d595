use anyhow::Context;
use clap::Parser;
use samplename::{parse_raw, Field};
use std::io::Write;

const HEADER: &[&str] = &[
    "filename",
    "schema",
    "unique_id",
    "sample_id",
    "sequencer",
    "plate",
    "lane",
    "index",
    "read",
    "renamed",
];

const COLUMNS: &[Field] = &[
    Field::UniqueId,
    Field::SampleId,
    Field::Sequencer,
    Field::Plate,
    Field::Lane,
    Field::Index,
    Field::Read,
];

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    about = "Show how raw FASTQ file names are classified and renamed",
    version,
    author
)]
pub struct Inspect {
    #[arg(help = "File names or paths", required = true)]
    names: Vec<String>,
    #[arg(short, long, help = "Output path")]
    output: Option<String>,
}

impl Inspect {
    pub fn run(&self) -> anyhow::Result<()> {
        let writer = autocompress::autodetect_create_or_stdout(
            self.output.as_ref(),
            autocompress::CompressionLevel::Default,
        )
        .with_context(|| {
            format!(
                "Failed to create {}",
                self.output.as_deref().unwrap_or("/dev/stdout")
            )
        })?;
        write_inspection(writer, &self.names)
    }
}

/// One tab separated row per name. Names that cannot be parsed get the
/// error message in the `schema` column.
pub fn write_inspection<W: Write>(writer: W, names: &[String]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    writer.write_record(HEADER)?;

    for name in names {
        let base = samplename::file_name_of(name).unwrap_or(name);
        let mut row = vec![name.to_string()];
        match parse_raw(base) {
            Ok(metadata) => {
                row.push(metadata.schema.to_string());
                for field in COLUMNS {
                    row.push(metadata.field(*field).unwrap_or("").to_string());
                }
                row.push(metadata.renamed_filename()?);
            }
            Err(e) => {
                log::debug!("{}: {}", name, e);
                row.push(format!("error: {}", e));
                row.resize(HEADER.len(), String::new());
            }
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}
