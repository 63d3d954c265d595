use crate::error::SampleNameError;
use crate::schema::{Field, SchemaKind, DELIMITER};

/// Fields extracted from one file name. Fields not carried by the schema
/// are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleMetadata {
    pub filename: String,
    pub schema: SchemaKind,
    pub unique_id: Option<String>,
    pub sample_id: String,
    pub sequencer: Option<String>,
    pub plate: Option<String>,
    pub lane: Option<String>,
    pub index: Option<String>,
    pub read: Option<String>,
}

/// SAM read group assigned at alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadGroup {
    pub id: String,
    pub platform_unit: String,
    pub sample: String,
    pub library: String,
    pub platform: &'static str,
}

impl SampleMetadata {
    pub fn field(&self, field: Field) -> Option<&str> {
        match field {
            Field::UniqueId => self.unique_id.as_deref(),
            Field::SampleId => Some(self.sample_id.as_str()),
            Field::Sequencer => self.sequencer.as_deref(),
            Field::Plate => self.plate.as_deref(),
            Field::Lane => self.lane.as_deref(),
            Field::Index => self.index.as_deref(),
            Field::Read => self.read.as_deref(),
        }
    }

    pub fn require(&self, field: Field) -> Result<&str, SampleNameError> {
        self.field(field)
            .ok_or_else(|| SampleNameError::MissingField {
                filename: self.filename.clone(),
                schema: self.schema,
                field,
            })
    }

    /// `UniqueID_SampleID_Sequencer_Plate_Lane_Read`
    pub fn renamed_filename(&self) -> Result<String, SampleNameError> {
        let parts = [
            Field::UniqueId,
            Field::SampleId,
            Field::Sequencer,
            Field::Plate,
            Field::Lane,
            Field::Read,
        ]
        .iter()
        .map(|x| self.require(*x))
        .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(DELIMITER.to_string().as_str()))
    }

    pub fn read_group(&self) -> Result<ReadGroup, SampleNameError> {
        let sequencer = self.require(Field::Sequencer)?;
        let lane = self.require(Field::Lane)?;
        let index = self.require(Field::Index)?;
        Ok(ReadGroup {
            id: format!("{}.{}", sequencer, lane),
            platform_unit: format!("{}.{}.{}", sequencer, lane, self.sample_id),
            sample: self.sample_id.clone(),
            library: format!("{}.{}", self.sample_id, index),
            platform: "ILLUMINA",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::{classify, ALIGNED, RENAMED};

    #[test]
    fn test_renamed_filename() -> Result<(), SampleNameError> {
        let original =
            "IZYN_NanoAmplified_Saccharina_angustissima_SA-CB-5-MG-3_1_GCAATGCA_Saccharina_I997_L1_R1.fastq.gz";
        let metadata = classify(original).extract(original)?;
        let renamed = metadata.renamed_filename()?;
        assert_eq!(renamed, "IZYN_SA-CB-5-MG-3_I997_1_L1_R1.fastq.gz");

        let reparsed = RENAMED.extract(&renamed)?;
        for field in [
            Field::UniqueId,
            Field::SampleId,
            Field::Sequencer,
            Field::Plate,
            Field::Lane,
            Field::Read,
        ] {
            assert_eq!(reparsed.field(field), metadata.field(field), "{}", field);
        }
        Ok(())
    }

    #[test]
    fn test_renamed_filename_shifted() -> Result<(), SampleNameError> {
        let original =
            "KQPT_NanoAmplified_Saccharina_latissima_3_SL-F2-7_2_ACGTACGT_Saccharina_I1019_L2_R2.fastq.gz";
        let renamed = classify(original).extract(original)?.renamed_filename()?;
        assert_eq!(renamed, "KQPT_SL-F2-7_I1019_2_L2_R2.fastq.gz");
        assert_eq!(RENAMED.extract(&renamed)?.sample_id, "SL-F2-7");
        Ok(())
    }

    #[test]
    fn test_renamed_filename_missing_field() -> Result<(), SampleNameError> {
        let metadata = ALIGNED.extract("S1_I997_L1_GCAATGCA.bam")?;
        assert_eq!(
            metadata.renamed_filename(),
            Err(SampleNameError::MissingField {
                filename: "S1_I997_L1_GCAATGCA.bam".to_string(),
                schema: SchemaKind::Aligned,
                field: Field::UniqueId,
            })
        );
        Ok(())
    }

    #[test]
    fn test_read_group() -> Result<(), SampleNameError> {
        let metadata = ALIGNED.extract("SA-CB-5_I997_L1_GCAATGCA_1.fq.gz")?;
        assert_eq!(
            metadata.read_group()?,
            ReadGroup {
                id: "I997.L1".to_string(),
                platform_unit: "I997.L1.SA-CB-5".to_string(),
                sample: "SA-CB-5".to_string(),
                library: "SA-CB-5.GCAATGCA".to_string(),
                platform: "ILLUMINA",
            }
        );
        assert!(RENAMED
            .extract("IZYN_S1_I997_1_L1_R1.fastq.gz")?
            .read_group()
            .is_err());
        Ok(())
    }
}
