use crate::config::PipelineConfig;
use crate::error::ScriptGenError;
use crate::group::SampleGroup;
use crate::job::Job;
use samplename::{file_name_of, ALIGNED, PREFIX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    clap::ValueEnum,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Trim,
    Align,
    MarkDuplicates,
    CollapseBams,
    CallHaplotypes,
    CombineGvcfs,
    Genotype,
    MergeVcfs,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Stage::Trim => "trim",
                Stage::Align => "align",
                Stage::MarkDuplicates => "mark-duplicates",
                Stage::CollapseBams => "collapse-bams",
                Stage::CallHaplotypes => "call-haplotypes",
                Stage::CombineGvcfs => "combine-gvcfs",
                Stage::Genotype => "genotype",
                Stage::MergeVcfs => "merge-vcfs",
            }
        )
    }
}

/// Merge script for one sample and the name of the BAM it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeJob {
    pub job: Job,
    pub merged: String,
}

pub type EntryBuild = fn(&PipelineConfig, &str) -> Result<Job, ScriptGenError>;
pub type GroupBuild = fn(&PipelineConfig, &SampleGroup) -> MergeJob;
pub type IntervalBuild = fn(&PipelineConfig, &str, &[String]) -> Job;
pub type ManifestBuild = fn(&PipelineConfig, &[String]) -> Job;

/// How manifest entries map onto scripts.
#[derive(Clone, Copy)]
pub enum Fanout {
    /// One script per manifest entry
    PerEntry(EntryBuild),
    /// One merge script per sample with more than one entry
    PerSampleGroup(GroupBuild),
    /// One script per line of the intervals manifest, each using every entry
    PerInterval(IntervalBuild),
    /// One script for the whole manifest
    WholeManifest(ManifestBuild),
}

pub struct StageSpec {
    pub stage: Stage,
    /// Entries not ending with this are reported and left out
    pub entry_suffix: &'static str,
    pub fanout: Fanout,
}

impl StageSpec {
    pub fn requires_grouping(&self) -> bool {
        matches!(self.fanout, Fanout::PerSampleGroup(_))
    }

    pub fn requires_intervals(&self) -> bool {
        matches!(self.fanout, Fanout::PerInterval(_))
    }
}

static TRIM: StageSpec = StageSpec {
    stage: Stage::Trim,
    entry_suffix: "1.fq.gz",
    fanout: Fanout::PerEntry(trim_job),
};

static ALIGN: StageSpec = StageSpec {
    stage: Stage::Align,
    entry_suffix: "_1.fq.gz",
    fanout: Fanout::PerEntry(align_job),
};

static MARK_DUPLICATES: StageSpec = StageSpec {
    stage: Stage::MarkDuplicates,
    entry_suffix: ".bam",
    fanout: Fanout::PerEntry(mark_duplicates_job),
};

static COLLAPSE_BAMS: StageSpec = StageSpec {
    stage: Stage::CollapseBams,
    entry_suffix: ".bam",
    fanout: Fanout::PerSampleGroup(merge_bams_job),
};

static CALL_HAPLOTYPES: StageSpec = StageSpec {
    stage: Stage::CallHaplotypes,
    entry_suffix: ".bam",
    fanout: Fanout::PerEntry(haplotype_caller_job),
};

static COMBINE_GVCFS: StageSpec = StageSpec {
    stage: Stage::CombineGvcfs,
    entry_suffix: ".g.vcf.gz",
    fanout: Fanout::PerInterval(combine_gvcfs_job),
};

static GENOTYPE: StageSpec = StageSpec {
    stage: Stage::Genotype,
    entry_suffix: ".g.vcf.gz",
    fanout: Fanout::PerEntry(genotype_job),
};

static MERGE_VCFS: StageSpec = StageSpec {
    stage: Stage::MergeVcfs,
    entry_suffix: ".vcf.gz",
    fanout: Fanout::WholeManifest(merge_vcfs_job),
};

impl Stage {
    pub fn spec(&self) -> &'static StageSpec {
        match self {
            Stage::Trim => &TRIM,
            Stage::Align => &ALIGN,
            Stage::MarkDuplicates => &MARK_DUPLICATES,
            Stage::CollapseBams => &COLLAPSE_BAMS,
            Stage::CallHaplotypes => &CALL_HAPLOTYPES,
            Stage::CombineGvcfs => &COMBINE_GVCFS,
            Stage::Genotype => &GENOTYPE,
            Stage::MergeVcfs => &MERGE_VCFS,
        }
    }
}

pub(crate) fn strip_entry_suffix<'a>(
    name: &'a str,
    suffix: &'static str,
) -> Result<&'a str, ScriptGenError> {
    name.strip_suffix(suffix)
        .ok_or_else(|| ScriptGenError::UnexpectedSuffix {
            entry: name.to_string(),
            suffix,
        })
}

/// `path` with its file name replaced by `name`.
fn sibling(path: &str, name: &str) -> String {
    Path::new(path).with_file_name(name).display().to_string()
}

/// Intervals such as `chr1:1-5000` become `chr1_1-5000` in file names.
fn file_name_safe(text: &str) -> String {
    text.chars()
        .map(|x| {
            if x.is_ascii_alphanumeric() || x == '-' || x == '.' || x == '_' {
                x
            } else {
                '_'
            }
        })
        .collect()
}

/// Sample ID of a per-sample BAM: everything before the first `_`.
pub(crate) fn bam_sample_id(entry: &str) -> Result<String, ScriptGenError> {
    let stem = strip_entry_suffix(file_name_of(entry)?, ".bam")?;
    Ok(PREFIX.extract(stem)?.sample_id)
}

pub fn merged_bam_name(config: &PipelineConfig, sample_id: &str) -> String {
    format!("{}_{}.bam", sample_id, config.naming.merged_bam_suffix)
}

/// `.../<sample_id>/<name>1.fq.gz` is trimmed together with its `2.fq.gz` mate.
fn trim_job(config: &PipelineConfig, entry: &str) -> Result<Job, ScriptGenError> {
    let fastq1 = file_name_of(entry)?;
    let fastq2 = format!("{}2.fq.gz", strip_entry_suffix(fastq1, "1.fq.gz")?);
    let sample_id = Path::new(entry)
        .parent()
        .and_then(|x| x.file_name())
        .and_then(|x| x.to_str())
        .ok_or_else(|| ScriptGenError::NoParentDirectory(entry.to_string()))?;

    let output1 = format!("{}_{}", sample_id, fastq1);
    let output2 = format!("{}_{}", sample_id, fastq2);
    let tools = &config.tools;

    Ok(Job {
        script_name: format!("{}_fastp_shell.sh", output1),
        log_name: format!("{}_fastp.out", output1),
        workdir: config.directories.workdir_for(Stage::Trim).to_string(),
        conda_env: config.environments.trim.clone(),
        commands: vec![format!(
            "{} --detect_adapter_for_pe --overrepresentation_analysis --correction --cut_right --thread {} --html {}.fastp.html --json {}.fastp.json -i {} -I {} -o {} -O {}",
            tools.fastp,
            tools.threads,
            output1,
            output1,
            entry,
            sibling(entry, &fastq2),
            output1,
            output2
        )],
    })
}

fn align_job(config: &PipelineConfig, entry: &str) -> Result<Job, ScriptGenError> {
    let fastq1 = file_name_of(entry)?;
    let prefix = strip_entry_suffix(fastq1, "_1.fq.gz")?;
    let fastq2 = format!("{}_2.fq.gz", prefix);
    let read_group = ALIGNED.extract(fastq1)?.read_group()?;
    let tools = &config.tools;

    Ok(Job {
        script_name: format!("{}_hisat2_shell_command.sh", prefix),
        log_name: format!("{}_hisat2.out", prefix),
        workdir: config.directories.workdir_for(Stage::Align).to_string(),
        conda_env: config.environments.align.clone(),
        commands: vec![format!(
            "{} -p {} -x {} -q -1 {} -2 {} --rg-id={} --rg PU:{} --rg SM:{} --rg LB:{} --rg PL:{} --summary-file {}.summary -S {}_{}.sam",
            tools.hisat2,
            tools.threads,
            tools.hisat2_index,
            entry,
            sibling(entry, &fastq2),
            read_group.id,
            read_group.platform_unit,
            read_group.sample,
            read_group.library,
            read_group.platform,
            prefix,
            prefix,
            config.naming.aligned_suffix
        )],
    })
}

fn mark_duplicates_job(config: &PipelineConfig, entry: &str) -> Result<Job, ScriptGenError> {
    let prefix = strip_entry_suffix(file_name_of(entry)?, ".bam")?;
    ALIGNED.extract(prefix)?;

    Ok(Job {
        script_name: format!("{}_markduplicates_shell_command.sh", prefix),
        log_name: format!("{}_mark_duplicates.out", prefix),
        workdir: config.directories.workdir_for(Stage::MarkDuplicates).to_string(),
        conda_env: config.environments.gatk.clone(),
        commands: vec![format!(
            "{} -I {} -O {}_marked_duplicates.bam -M {}_marked_dup_metrics.txt",
            config.tools.gatk("MarkDuplicates"),
            entry,
            prefix,
            prefix
        )],
    })
}

/// Merge every BAM of a sample into one, then delete the inputs.
fn merge_bams_job(config: &PipelineConfig, group: &SampleGroup) -> MergeJob {
    let merged = merged_bam_name(config, &group.sample_id);
    let script_name = format!("{}_collapse_single_sample_bams.sh", group.sample_id);
    let inputs: Vec<_> = group.members.iter().map(|x| format!("-I {}", x)).collect();

    MergeJob {
        job: Job {
            log_name: format!("{}.out", script_name),
            script_name,
            workdir: config.directories.workdir_for(Stage::CollapseBams).to_string(),
            conda_env: config.environments.gatk.clone(),
            commands: vec![
                format!(
                    "{} {} -O {}",
                    config.tools.gatk("MergeSamFiles"),
                    inputs.join(" "),
                    merged
                ),
                format!("rm {}", group.members.join(" ")),
            ],
        },
        merged,
    }
}

fn haplotype_caller_job(config: &PipelineConfig, entry: &str) -> Result<Job, ScriptGenError> {
    let sample_id = bam_sample_id(entry)?;
    let tools = &config.tools;

    Ok(Job {
        script_name: format!("{}_gatk4_haplotypecaller.sh", sample_id),
        log_name: format!("{}_gatk4_haplotypecaller.out", sample_id),
        workdir: config.directories.workdir_for(Stage::CallHaplotypes).to_string(),
        conda_env: config.environments.samtools.clone(),
        commands: vec![
            format!("{} index {}", tools.samtools, entry),
            "conda deactivate".to_string(),
            format!("source activate {}", config.environments.gatk),
            format!(
                "{} -R {} -I {} -O {}_{}.g.vcf.gz -ERC GVCF -ploidy {}",
                tools.gatk("HaplotypeCaller"),
                tools.reference_fasta,
                entry,
                sample_id,
                config.naming.gvcf_suffix,
                tools.ploidy
            ),
        ],
    })
}

fn combine_gvcfs_job(config: &PipelineConfig, interval: &str, gvcfs: &[String]) -> Job {
    let name = file_name_safe(interval);
    let variants: Vec<_> = gvcfs.iter().map(|x| format!("--variant {}", x)).collect();

    Job {
        script_name: format!("{}_gatk4_gvcf_combine.sh", name),
        log_name: format!("{}_gatk4_gvcf_combine.out", name),
        workdir: config.directories.workdir_for(Stage::CombineGvcfs).to_string(),
        conda_env: config.environments.gatk.clone(),
        commands: vec![format!(
            "{} -R {} --intervals {} {} -O {}_{}.g.vcf.gz",
            config.tools.gatk("CombineGVCFs"),
            config.tools.reference_fasta,
            interval,
            variants.join(" "),
            name,
            config.naming.combined_gvcf_suffix
        )],
    }
}

fn genotype_job(config: &PipelineConfig, entry: &str) -> Result<Job, ScriptGenError> {
    let stem = strip_entry_suffix(file_name_of(entry)?, ".g.vcf.gz")?;

    Ok(Job {
        script_name: format!("{}_gatk4_gvcf_genotype.sh", stem),
        log_name: format!("{}_gatk4_gvcf_genotype.out", stem),
        workdir: config.directories.workdir_for(Stage::Genotype).to_string(),
        conda_env: config.environments.gatk.clone(),
        commands: vec![format!(
            "{} -R {} -V {} -O {}.vcf.gz",
            config.tools.gatk("GenotypeGVCFs"),
            config.tools.reference_fasta,
            entry,
            stem
        )],
    })
}

fn merge_vcfs_job(config: &PipelineConfig, vcfs: &[String]) -> Job {
    let inputs: Vec<_> = vcfs.iter().map(|x| format!("-I {}", x)).collect();

    Job {
        script_name: format!("{}_gatk_vcf_merge.sh", config.naming.cohort),
        log_name: format!("{}_gatk4_vcf_merge.out", config.naming.cohort),
        workdir: config.directories.workdir_for(Stage::MergeVcfs).to_string(),
        conda_env: config.environments.gatk.clone(),
        commands: vec![format!(
            "{} {} -O {}.vcf.gz",
            config.tools.gatk("MergeVcfs"),
            inputs.join(" "),
            config.naming.merged_vcf
        )],
    }
}
