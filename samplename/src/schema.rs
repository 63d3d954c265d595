use crate::error::SampleNameError;
use crate::metadata::SampleMetadata;
use std::fmt;

pub const DELIMITER: char = '_';

/// Marker of the two LIS sample sets, which keep the default layout even
/// when sequenced on a shifted machine.
pub const LIS_MARKER: &str = "LIS";

/// Sequencers writing an extra `_Number_` token before the sample ID.
pub const SHIFTED_SEQUENCERS: &[&str] = &["I1018", "I1019"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    UniqueId,
    SampleId,
    Plate,
    Index,
    Sequencer,
    Lane,
    Read,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::UniqueId => "unique_id",
            Field::SampleId => "sample_id",
            Field::Plate => "plate",
            Field::Index => "index",
            Field::Sequencer => "sequencer",
            Field::Lane => "lane",
            Field::Read => "read",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Lis,
    Shifted,
    Default,
    Renamed,
    Aligned,
    Prefix,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                SchemaKind::Lis => "lis",
                SchemaKind::Shifted => "shifted",
                SchemaKind::Default => "default",
                SchemaKind::Renamed => "renamed",
                SchemaKind::Aligned => "aligned",
                SchemaKind::Prefix => "prefix",
            }
        )
    }
}

/// Positions of each field in a `_`-separated file name.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub fields: &'static [(Field, usize)],
}

/// `JCGT_NanoAmplified_Saccharina__LIS-F1-3_3_TCTGTTGG_Saccharina_I1018_L1_R1.fastq.gz`
pub static LIS: Schema = Schema {
    kind: SchemaKind::Lis,
    fields: &[
        (Field::UniqueId, 0),
        (Field::SampleId, 4),
        (Field::Plate, 5),
        (Field::Index, 6),
        (Field::Sequencer, 8),
        (Field::Lane, 9),
        (Field::Read, 10),
    ],
};

/// `UniqueID_AmplificationType_Genus_species_Number_SampleID_Plate_Barcode_Genus_Sequencer_Lane_Read`
pub static SHIFTED: Schema = Schema {
    kind: SchemaKind::Shifted,
    fields: &[
        (Field::UniqueId, 0),
        (Field::SampleId, 5),
        (Field::Plate, 6),
        (Field::Index, 7),
        (Field::Sequencer, 9),
        (Field::Lane, 10),
        (Field::Read, 11),
    ],
};

/// `UniqueID_AmplificationType_Genus_species_SampleID_Plate_Barcode_Genus_Sequencer_Lane_Read`
pub static DEFAULT: Schema = Schema {
    kind: SchemaKind::Default,
    fields: &[
        (Field::UniqueId, 0),
        (Field::SampleId, 4),
        (Field::Plate, 5),
        (Field::Index, 6),
        (Field::Sequencer, 8),
        (Field::Lane, 9),
        (Field::Read, 10),
    ],
};

/// `UniqueID_SampleID_Sequencer_Plate_Lane_Read`, written by the renamer.
pub static RENAMED: Schema = Schema {
    kind: SchemaKind::Renamed,
    fields: &[
        (Field::UniqueId, 0),
        (Field::SampleId, 1),
        (Field::Sequencer, 2),
        (Field::Plate, 3),
        (Field::Lane, 4),
        (Field::Read, 5),
    ],
};

/// `Sample_Sequencer_Lane_Index_...`, used by trimmed reads and alignments.
pub static ALIGNED: Schema = Schema {
    kind: SchemaKind::Aligned,
    fields: &[
        (Field::SampleId, 0),
        (Field::Sequencer, 1),
        (Field::Lane, 2),
        (Field::Index, 3),
    ],
};

/// Only the leading sample ID, for merged and per-sample files.
pub static PREFIX: Schema = Schema {
    kind: SchemaKind::Prefix,
    fields: &[(Field::SampleId, 0)],
};

enum Marker {
    Substring(&'static str),
    AnyOf(&'static [&'static str]),
}

impl Marker {
    fn matches(&self, filename: &str) -> bool {
        match self {
            Marker::Substring(x) => filename.contains(x),
            Marker::AnyOf(items) => items.iter().any(|x| filename.contains(x)),
        }
    }
}

struct ClassifierRule {
    marker: Marker,
    schema: &'static Schema,
}

// evaluated in order, first match wins
static RAW_RULES: &[ClassifierRule] = &[
    ClassifierRule {
        marker: Marker::Substring(LIS_MARKER),
        schema: &LIS,
    },
    ClassifierRule {
        marker: Marker::AnyOf(SHIFTED_SEQUENCERS),
        schema: &SHIFTED,
    },
];

/// Pick the schema of a raw sequencer file name.
pub fn classify(filename: &str) -> &'static Schema {
    RAW_RULES
        .iter()
        .find(|x| x.marker.matches(filename))
        .map(|x| x.schema)
        .unwrap_or(&DEFAULT)
}

impl Schema {
    pub fn index_of(&self, field: Field) -> Option<usize> {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, i)| *i)
    }

    /// Minimum number of tokens a file name needs for this schema.
    pub fn required_tokens(&self) -> usize {
        self.fields.iter().map(|(_, i)| *i + 1).max().unwrap_or(0)
    }

    pub fn extract(&self, filename: &str) -> Result<SampleMetadata, SampleNameError> {
        let tokens: Vec<&str> = filename.split(DELIMITER).collect();
        if tokens.len() < self.required_tokens() {
            return Err(SampleNameError::TooFewTokens {
                filename: filename.to_string(),
                schema: self.kind,
                found: tokens.len(),
                required: self.required_tokens(),
            });
        }

        let get = |field: Field| self.index_of(field).map(|i| tokens[i].to_string());

        let sample_id = get(Field::SampleId).ok_or_else(|| SampleNameError::MissingField {
            filename: filename.to_string(),
            schema: self.kind,
            field: Field::SampleId,
        })?;
        if sample_id.is_empty() {
            return Err(SampleNameError::EmptyField {
                filename: filename.to_string(),
                field: Field::SampleId,
            });
        }

        Ok(SampleMetadata {
            filename: filename.to_string(),
            schema: self.kind,
            unique_id: get(Field::UniqueId),
            sample_id,
            sequencer: get(Field::Sequencer),
            plate: get(Field::Plate),
            lane: get(Field::Lane),
            index: get(Field::Index),
            read: get(Field::Read),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const DEFAULT_NAME: &str =
        "IZYN_NanoAmplified_Saccharina_angustissima_SA-CB-5-MG-3_1_GCAATGCA_Saccharina_I997_L1_R1.fastq.gz";
    const LIS_NAME: &str =
        "JCGT_NanoAmplified_Saccharina__LIS-F1-3_3_TCTGTTGG_Saccharina_I1018_L1_R1.fastq.gz";
    const SHIFTED_NAME: &str =
        "KQPT_NanoAmplified_Saccharina_latissima_3_SL-F2-7_2_ACGTACGT_Saccharina_I1019_L2_R2.fastq.gz";

    #[test]
    fn test_classify() {
        assert_eq!(classify(DEFAULT_NAME).kind, SchemaKind::Default);
        assert_eq!(classify(SHIFTED_NAME).kind, SchemaKind::Shifted);
        assert_eq!(
            classify(&SHIFTED_NAME.replace("I1019", "I1018")).kind,
            SchemaKind::Shifted
        );
        // LIS wins although I1018 is also present
        assert_eq!(classify(LIS_NAME).kind, SchemaKind::Lis);
    }

    #[test]
    fn test_required_tokens() {
        assert_eq!(LIS.required_tokens(), 11);
        assert_eq!(SHIFTED.required_tokens(), 12);
        assert_eq!(DEFAULT.required_tokens(), 11);
        assert_eq!(RENAMED.required_tokens(), 6);
        assert_eq!(ALIGNED.required_tokens(), 4);
        assert_eq!(PREFIX.required_tokens(), 1);
    }

    #[test]
    fn test_extract_default() -> Result<(), SampleNameError> {
        let metadata = DEFAULT.extract(DEFAULT_NAME)?;
        assert_eq!(metadata.unique_id.as_deref(), Some("IZYN"));
        assert_eq!(metadata.sample_id, "SA-CB-5-MG-3");
        assert_eq!(metadata.plate.as_deref(), Some("1"));
        assert_eq!(metadata.index.as_deref(), Some("GCAATGCA"));
        assert_eq!(metadata.sequencer.as_deref(), Some("I997"));
        assert_eq!(metadata.lane.as_deref(), Some("L1"));
        assert_eq!(metadata.read.as_deref(), Some("R1.fastq.gz"));
        Ok(())
    }

    #[test]
    fn test_extract_lis() -> Result<(), SampleNameError> {
        let metadata = classify(LIS_NAME).extract(LIS_NAME)?;
        assert_eq!(metadata.schema, SchemaKind::Lis);
        assert_eq!(metadata.unique_id.as_deref(), Some("JCGT"));
        assert_eq!(metadata.sample_id, "LIS-F1-3");
        assert_eq!(metadata.plate.as_deref(), Some("3"));
        assert_eq!(metadata.sequencer.as_deref(), Some("I1018"));
        assert_eq!(metadata.lane.as_deref(), Some("L1"));
        assert_eq!(metadata.read.as_deref(), Some("R1.fastq.gz"));

        // one token short of the shifted layout
        assert!(SHIFTED.extract(LIS_NAME).is_err());
        Ok(())
    }

    #[test]
    fn test_extract_shifted() -> Result<(), SampleNameError> {
        let metadata = classify(SHIFTED_NAME).extract(SHIFTED_NAME)?;
        assert_eq!(metadata.unique_id.as_deref(), Some("KQPT"));
        assert_eq!(metadata.sample_id, "SL-F2-7");
        assert_eq!(metadata.plate.as_deref(), Some("2"));
        assert_eq!(metadata.index.as_deref(), Some("ACGTACGT"));
        assert_eq!(metadata.sequencer.as_deref(), Some("I1019"));
        assert_eq!(metadata.lane.as_deref(), Some("L2"));
        assert_eq!(metadata.read.as_deref(), Some("R2.fastq.gz"));
        Ok(())
    }

    #[test]
    fn test_extract_failures() {
        assert_eq!(
            DEFAULT.extract("S1_I997_L1_R1.fastq.gz"),
            Err(SampleNameError::TooFewTokens {
                filename: "S1_I997_L1_R1.fastq.gz".to_string(),
                schema: SchemaKind::Default,
                found: 4,
                required: 11,
            })
        );
        // a shifted sequencer with a default-length name is one token short
        let short_shifted = DEFAULT_NAME.replace("I997", "I1019");
        assert!(matches!(
            classify(&short_shifted).extract(&short_shifted),
            Err(SampleNameError::TooFewTokens { found: 11, required: 12, .. })
        ));
        assert_eq!(
            ALIGNED.extract("_I997_L1_ACGT.bam"),
            Err(SampleNameError::EmptyField {
                filename: "_I997_L1_ACGT.bam".to_string(),
                field: Field::SampleId,
            })
        );
    }

    #[test]
    fn test_extract_aligned() -> Result<(), SampleNameError> {
        let metadata = ALIGNED.extract("SA-CB-5_I997_L1_GCAATGCA_1.fq.gz")?;
        assert_eq!(metadata.sample_id, "SA-CB-5");
        assert_eq!(metadata.sequencer.as_deref(), Some("I997"));
        assert_eq!(metadata.lane.as_deref(), Some("L1"));
        assert_eq!(metadata.index.as_deref(), Some("GCAATGCA"));
        assert_eq!(metadata.unique_id, None);
        assert_eq!(metadata.read, None);
        Ok(())
    }

    #[test]
    fn test_extract_prefix() -> Result<(), SampleNameError> {
        assert_eq!(
            PREFIX
                .extract("S1_merged_files_hisat2_marked_duplicates.bam")?
                .sample_id,
            "S1"
        );
        assert_eq!(PREFIX.extract("S2.bam")?.sample_id, "S2.bam");
        assert!(PREFIX.extract("_S3.bam").is_err());
        Ok(())
    }
}
