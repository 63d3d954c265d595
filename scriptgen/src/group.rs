use crate::config::PipelineConfig;
use crate::generator::EntryFailure;
use crate::job::Job;
use crate::stage::{bam_sample_id, GroupBuild, MergeJob};
use std::collections::HashMap;

/// Files sharing a sample ID, in manifest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGroup {
    pub sample_id: String,
    pub members: Vec<String>,
}

/// Sample groups kept in the order their first member was seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleGroups {
    groups: Vec<SampleGroup>,
    index: HashMap<String, usize>,
}

impl SampleGroups {
    pub fn new() -> Self {
        SampleGroups::default()
    }

    pub fn insert(&mut self, sample_id: &str, path: &str) {
        if let Some(i) = self.index.get(sample_id) {
            self.groups[*i].members.push(path.to_string());
        } else {
            self.index.insert(sample_id.to_string(), self.groups.len());
            self.groups.push(SampleGroup {
                sample_id: sample_id.to_string(),
                members: vec![path.to_string()],
            });
        }
    }

    /// Group BAM paths by sample ID. Paths without a usable sample ID are
    /// returned as failures.
    pub fn from_bam_paths(paths: &[String]) -> (Self, Vec<EntryFailure>) {
        let mut groups = SampleGroups::new();
        let mut failures = Vec::new();
        for path in paths {
            match bam_sample_id(path) {
                Ok(sample_id) => groups.insert(&sample_id, path),
                Err(error) => failures.push(EntryFailure {
                    entry: path.to_string(),
                    error,
                }),
            }
        }
        (groups, failures)
    }

    pub fn get(&self, sample_id: &str) -> Option<&SampleGroup> {
        self.index.get(sample_id).map(|i| &self.groups[*i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollapsePlan {
    /// Merge scripts with the sample they belong to
    pub jobs: Vec<(String, Job)>,
    /// Inputs of the next stage, one per sample
    pub next_manifest: Vec<String>,
    /// Merged BAM name of every sample with a merge script
    merged: HashMap<String, String>,
}

impl CollapsePlan {
    /// Leave the merged BAM of `sample_id` out of the next manifest, for a
    /// sample whose merge script could not be written.
    pub fn exclude(&mut self, sample_id: &str) {
        if let Some(merged) = self.merged.remove(sample_id) {
            self.next_manifest.retain(|x| *x != merged);
        }
    }
}

/// Single-member groups pass through; larger groups are merged and only the
/// merged BAM is listed for the next stage.
pub fn plan_collapse(
    groups: &SampleGroups,
    config: &PipelineConfig,
    build: GroupBuild,
) -> CollapsePlan {
    let mut plan = CollapsePlan::default();
    for group in groups.iter() {
        if group.members.len() > 1 {
            let MergeJob { job, merged } = build(config, group);
            log::debug!(
                "{}: merging {} BAM files into {}",
                group.sample_id,
                group.members.len(),
                merged
            );
            plan.jobs.push((group.sample_id.clone(), job));
            plan.next_manifest.push(merged.clone());
            plan.merged.insert(group.sample_id.clone(), merged);
        } else {
            plan.next_manifest.push(group.members[0].clone());
        }
    }
    plan
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stage::{merged_bam_name, Fanout, Stage};

    fn to_strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_grouping_keeps_encounter_order() {
        let paths = to_strings(&[
            "/bams/S2_I997_L1_ACGT.bam",
            "/bams/S1_I997_L2_ACGT.bam",
            "/bams/S2_I1018_L1_ACGT.bam",
            "/bams/S1_I997_L1_ACGT.bam",
        ]);
        let (groups, failures) = SampleGroups::from_bam_paths(&paths);
        assert!(failures.is_empty());
        assert_eq!(groups.len(), 2);
        let order: Vec<_> = groups.iter().map(|x| x.sample_id.as_str()).collect();
        assert_eq!(order, vec!["S2", "S1"]);
        assert_eq!(
            groups.get("S1").map(|x| x.members.clone()),
            Some(to_strings(&[
                "/bams/S1_I997_L2_ACGT.bam",
                "/bams/S1_I997_L1_ACGT.bam"
            ]))
        );
    }

    #[test]
    fn test_grouping_failures() {
        let paths = to_strings(&["/bams/_x.bam", "/bams/S1_a.bam"]);
        let (groups, failures) = SampleGroups::from_bam_paths(&paths);
        assert_eq!(groups.len(), 1);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].entry, "/bams/_x.bam");
    }

    #[test]
    fn test_plan_collapse() {
        let config = PipelineConfig::default();
        let build = match Stage::CollapseBams.spec().fanout {
            Fanout::PerSampleGroup(build) => build,
            _ => panic!("collapse-bams does not group"),
        };
        let paths = to_strings(&[
            "S1_I997_L1_ACGT.bam",
            "S2_I997_L1_TTGA.bam",
            "S1_I997_L2_ACGT.bam",
            "S1_I1018_L1_ACGT.bam",
        ]);
        let (groups, _) = SampleGroups::from_bam_paths(&paths);
        let plan = plan_collapse(&groups, &config, build);

        assert_eq!(plan.jobs.len(), 1);
        let (sample_id, job) = &plan.jobs[0];
        assert_eq!(sample_id, "S1");
        assert_eq!(
            job.commands[0],
            format!(
                "{} -I S1_I997_L1_ACGT.bam -I S1_I997_L2_ACGT.bam -I S1_I1018_L1_ACGT.bam -O {}",
                config.tools.gatk("MergeSamFiles"),
                merged_bam_name(&config, "S1")
            )
        );
        assert_eq!(
            plan.next_manifest,
            vec![
                merged_bam_name(&config, "S1"),
                "S2_I997_L1_TTGA.bam".to_string()
            ]
        );
    }

    #[test]
    fn test_plan_collapse_exclude() {
        let config = PipelineConfig::default();
        let build = match Stage::CollapseBams.spec().fanout {
            Fanout::PerSampleGroup(build) => build,
            _ => panic!("collapse-bams does not group"),
        };
        let paths = to_strings(&["S1_a.bam", "S1_b.bam", "S2_a.bam", "S3_a.bam", "S3_b.bam"]);
        let (groups, _) = SampleGroups::from_bam_paths(&paths);
        let mut plan = plan_collapse(&groups, &config, build);
        plan.exclude("S1");
        // single-member samples have nothing to exclude
        plan.exclude("S2");
        assert_eq!(plan.jobs.len(), 2);
        assert_eq!(
            plan.next_manifest,
            vec!["S2_a.bam".to_string(), merged_bam_name(&config, "S3")]
        );
    }
}
