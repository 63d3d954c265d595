use crate::config::Resources;
use crate::error::ScriptGenError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One batch script: where it goes and what it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub script_name: String,
    pub log_name: String,
    pub workdir: String,
    pub conda_env: String,
    pub commands: Vec<String>,
}

impl Job {
    pub fn render(&self, partition: &str, resources: &Resources) -> String {
        let mut lines = vec![
            "#!/bin/bash".to_string(),
            format!("#SBATCH --cpus-per-task={}", resources.cpus_per_task),
            format!("#SBATCH --time={}", resources.time),
            format!("#SBATCH --mem={}", resources.mem),
            format!("#SBATCH --partition {}", partition),
            format!("#SBATCH -o {}", self.log_name),
            format!("cd {}", self.workdir),
            format!("source activate {}", self.conda_env),
        ];
        lines.extend(self.commands.iter().cloned());
        let mut script = lines.join("\n");
        script.push('\n');
        script
    }

    /// Write the rendered script into `dir`, replacing any existing file.
    pub fn write_script(
        &self,
        dir: &Path,
        partition: &str,
        resources: &Resources,
    ) -> Result<PathBuf, ScriptGenError> {
        let path = dir.join(&self.script_name);
        let to_error = |e| ScriptGenError::WriteScript {
            path: path.clone(),
            source: e,
        };
        let mut writer = BufWriter::new(File::create(&path).map_err(to_error)?);
        writer
            .write_all(self.render(partition, resources).as_bytes())
            .map_err(to_error)?;
        writer.flush().map_err(to_error)?;
        drop(writer);
        set_executable(&path).map_err(to_error)?;
        Ok(path)
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn example_job() -> Job {
        Job {
            script_name: "S1_gatk4_haplotypecaller.sh".to_string(),
            log_name: "S1_gatk4_haplotypecaller.out".to_string(),
            workdir: "/scratch/first_set".to_string(),
            conda_env: "samtools".to_string(),
            commands: vec![
                "samtools index S1.bam".to_string(),
                "conda deactivate".to_string(),
            ],
        }
    }

    #[test]
    fn test_render() {
        let expected = "#!/bin/bash
#SBATCH --cpus-per-task=12
#SBATCH --time=100:00:00
#SBATCH --mem=48000mb
#SBATCH --partition cegs
#SBATCH -o S1_gatk4_haplotypecaller.out
cd /scratch/first_set
source activate samtools
samtools index S1.bam
conda deactivate
";
        assert_eq!(example_job().render("cegs", &Resources::default()), expected);
    }

    #[test]
    fn test_write_script() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = example_job().write_script(dir.path(), "cegs", &Resources::default())?;
        assert_eq!(path, dir.path().join("S1_gatk4_haplotypecaller.sh"));
        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("#!/bin/bash\n"));
        assert!(content.ends_with("conda deactivate\n"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            assert_eq!(std::fs::metadata(&path)?.permissions().mode() & 0o777, 0o755);
        }
        Ok(())
    }

    #[test]
    fn test_write_script_failure() {
        let result = example_job().write_script(
            Path::new("./testfiles/no-such-directory"),
            "cegs",
            &Resources::default(),
        );
        assert!(matches!(result, Err(ScriptGenError::WriteScript { .. })));
    }
}
