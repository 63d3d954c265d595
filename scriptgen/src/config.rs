use crate::error::ScriptGenError;
use crate::stage::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

/// Deployment constants baked into the generated scripts.
///
/// Every field has a default, so a configuration file only needs the
/// values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub scheduler: SchedulerConfig,
    pub tools: ToolConfig,
    pub environments: EnvironmentConfig,
    pub directories: DirectoryConfig,
    pub naming: NamingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Resources {
    pub cpus_per_task: u32,
    pub time: String,
    pub mem: String,
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            cpus_per_task: 12,
            time: "100:00:00".to_string(),
            mem: "48000mb".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub partition: String,
    pub resources: Resources,
    /// Per stage replacements of `resources`
    pub overrides: BTreeMap<Stage, Resources>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            Stage::Trim,
            Resources {
                mem: "80000mb".to_string(),
                ..Resources::default()
            },
        );
        SchedulerConfig {
            partition: "cegs".to_string(),
            resources: Resources::default(),
            overrides,
        }
    }
}

impl SchedulerConfig {
    pub fn resources_for(&self, stage: Stage) -> &Resources {
        self.overrides.get(&stage).unwrap_or(&self.resources)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub java: String,
    pub gatk_jar: String,
    pub fastp: String,
    pub hisat2: String,
    pub samtools: String,
    pub reference_fasta: String,
    pub hisat2_index: String,
    pub threads: u32,
    pub ploidy: u32,
}

impl Default for ToolConfig {
    fn default() -> Self {
        ToolConfig {
            java: "java".to_string(),
            gatk_jar: "/project/noujdine_61/gmolano/programs/gatk-4.1.2.0/gatk-package-4.1.2.0-local.jar"
                .to_string(),
            fastp: "fastp".to_string(),
            hisat2: "hisat2".to_string(),
            samtools: "samtools".to_string(),
            reference_fasta:
                "/project/noujdine_61/kelp_data/hi_c_genomes/210416_CI_03_polished_filtered_scaffolded.fasta"
                    .to_string(),
            hisat2_index:
                "/project/noujdine_61/kelp_data/hi_c_genomes/210416_CI_03_polished_filtered_scaffolded"
                    .to_string(),
            threads: 12,
            ploidy: 1,
        }
    }
}

impl ToolConfig {
    /// `java -jar <gatk> <tool>`
    pub fn gatk(&self, tool: &str) -> String {
        format!("{} -jar {} {}", self.java, self.gatk_jar, tool)
    }
}

/// Conda environments activated before each tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub trim: String,
    pub align: String,
    pub gatk: String,
    pub samtools: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        EnvironmentConfig {
            trim: "qc".to_string(),
            align: "hisat".to_string(),
            gatk: "hisat".to_string(),
            samtools: "samtools".to_string(),
        }
    }
}

/// Working directories the scripts `cd` into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    pub trim: String,
    pub align: String,
    pub variant_calling: String,
    /// Per stage replacements of the directories above
    pub overrides: BTreeMap<Stage, String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        let mut overrides = BTreeMap::new();
        for stage in [Stage::MarkDuplicates, Stage::Genotype] {
            overrides.insert(
                stage,
                "/scratch2/gmolano/seed_bank_variant_calling/second_set".to_string(),
            );
        }
        DirectoryConfig {
            trim: "/scratch2/gmolano/seed_bank_variant_calling/trimmed_reads/first_set_trimmed"
                .to_string(),
            align: "/scratch2/gmolano/seed_bank_variant_calling/testing_different_aligners/hisat2"
                .to_string(),
            variant_calling: "/scratch2/gmolano/seed_bank_variant_calling/first_set".to_string(),
            overrides,
        }
    }
}

impl DirectoryConfig {
    pub fn workdir_for(&self, stage: Stage) -> &str {
        if let Some(dir) = self.overrides.get(&stage) {
            return dir;
        }
        match stage {
            Stage::Trim => &self.trim,
            Stage::Align => &self.align,
            _ => &self.variant_calling,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Appended to the read prefix of HISAT2 output
    pub aligned_suffix: String,
    /// Appended to the sample ID of merged BAM files
    pub merged_bam_suffix: String,
    /// Appended to the sample ID of per-sample gVCF files
    pub gvcf_suffix: String,
    /// Appended to the interval of combined gVCF files
    pub combined_gvcf_suffix: String,
    /// Name of the merged cohort VCF, without `.vcf.gz`
    pub merged_vcf: String,
    pub cohort: String,
    /// Manifest written by collapse-bams for haplotype calling
    pub haplotyper_manifest: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        NamingConfig {
            aligned_suffix: "hisat2_CI_03_polished_filtered_scaffolded".to_string(),
            merged_bam_suffix: "merged_files_hisat2_CI_03_polished_filtered_scaffolded_marked_duplicates"
                .to_string(),
            gvcf_suffix: "on_210416_CI_03".to_string(),
            combined_gvcf_suffix: "second_set_gk_seed_bank_on_CI_03".to_string(),
            merged_vcf: "first_set_raw_241_indv_on_CI_03".to_string(),
            cohort: "first_set".to_string(),
            haplotyper_manifest: "list_of_bam_files_ready_for_haplotyper.txt".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration, or the defaults when `path` is `None`.
    pub fn load(path: Option<&str>) -> Result<Self, ScriptGenError> {
        match path {
            None => Ok(PipelineConfig::default()),
            Some(path) => {
                let reader = BufReader::new(File::open(path).map_err(|e| {
                    ScriptGenError::ConfigOpen {
                        path: path.to_string(),
                        source: e,
                    }
                })?);
                let config = serde_yaml::from_reader(reader).map_err(|e| {
                    ScriptGenError::ConfigParse {
                        path: path.to_string(),
                        source: e,
                    }
                })?;
                log::debug!("configuration loaded from {}", path);
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_resources() {
        let config = PipelineConfig::default();
        assert_eq!(config.scheduler.resources_for(Stage::Align).mem, "48000mb");
        assert_eq!(config.scheduler.resources_for(Stage::Trim).mem, "80000mb");
        assert_eq!(config.scheduler.resources_for(Stage::Trim).cpus_per_task, 12);
    }

    #[test]
    fn test_default_workdirs() {
        let directories = DirectoryConfig::default();
        assert!(directories.workdir_for(Stage::Trim).ends_with("/first_set_trimmed"));
        assert!(directories.workdir_for(Stage::Align).ends_with("/hisat2"));
        for stage in [Stage::MarkDuplicates, Stage::Genotype] {
            assert_eq!(
                directories.workdir_for(stage),
                "/scratch2/gmolano/seed_bank_variant_calling/second_set"
            );
        }
        for stage in [
            Stage::CollapseBams,
            Stage::CallHaplotypes,
            Stage::CombineGvcfs,
            Stage::MergeVcfs,
        ] {
            assert_eq!(
                directories.workdir_for(stage),
                "/scratch2/gmolano/seed_bank_variant_calling/first_set"
            );
        }
    }

    #[test]
    fn test_load_partial() -> Result<(), ScriptGenError> {
        let config = PipelineConfig::load(Some("./testfiles/partial-config.yaml"))?;
        assert_eq!(config.scheduler.partition, "main");
        assert_eq!(config.scheduler.resources.mem, "64000mb");
        assert_eq!(config.scheduler.resources.time, "100:00:00");
        assert_eq!(
            config.scheduler.resources_for(Stage::CallHaplotypes).cpus_per_task,
            4
        );
        // overrides from the file replace the default table
        assert_eq!(config.scheduler.resources_for(Stage::Trim).mem, "64000mb");
        assert_eq!(config.tools.reference_fasta, "/ref/genome.fasta");
        assert_eq!(config.tools.gatk_jar, ToolConfig::default().gatk_jar);
        assert_eq!(config.naming, NamingConfig::default());
        Ok(())
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            PipelineConfig::load(Some("./testfiles/no-such-config.yaml")),
            Err(ScriptGenError::ConfigOpen { .. })
        ));
        assert!(matches!(
            PipelineConfig::load(Some("./testfiles/bad-config.yaml")),
            Err(ScriptGenError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_yaml_roundtrip() -> Result<(), serde_yaml::Error> {
        let config = PipelineConfig::default();
        let yaml = serde_yaml::to_string(&config)?;
        assert!(yaml.contains("trim:"));
        let parsed: PipelineConfig = serde_yaml::from_str(&yaml)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_gatk_command() {
        let tools = ToolConfig {
            gatk_jar: "/opt/gatk.jar".to_string(),
            ..ToolConfig::default()
        };
        assert_eq!(tools.gatk("MergeVcfs"), "java -jar /opt/gatk.jar MergeVcfs");
    }
}
