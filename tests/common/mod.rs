#![allow(dead_code)]

use std::path::{Path, PathBuf};

use humannpipe::{
    consts::*,
    core::humann::{HumannDatabases, HumannParams},
    core::RunRequest,
    error::{PipelineError, Result},
    executor::{Executor, Job},
    formats::SampleSequences,
};

/// Stands in for the HUMAnN3 tools: records every job and writes the
/// files each tool would leave behind.
#[derive(Debug, Default)]
pub struct MockExecutor {
    pub jobs: Vec<Job>,
    /// Fail the n-th (1-based) humann3 invocation
    pub fail_humann_at: Option<usize>,
    humann_calls: usize,
}

impl MockExecutor {
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_humann_at: Some(n),
            ..Default::default()
        }
    }

    pub fn count(&self, tool: &str) -> usize {
        self.jobs.iter().filter(|job| job.tool() == tool).count()
    }

    pub fn tools(&self) -> Vec<&str> {
        self.jobs.iter().map(|job| job.tool()).collect()
    }
}

impl Executor for MockExecutor {
    fn execute(&mut self, job: &Job) -> Result<()> {
        self.jobs.push(job.clone());

        match job.tool() {
            HUMANN => {
                self.humann_calls += 1;
                if self.fail_humann_at == Some(self.humann_calls) {
                    return Err(failed(HUMANN));
                }
                fake_humann(job)
            }
            JOIN_TABLES => fake_join(job),
            RENORM_TABLE => {
                std::fs::copy(arg(job, "-i")?, arg(job, "-o")?)?;
                Ok(())
            }
            MERGE_METAPHLAN => fake_merge(job),
            other => Err(failed(other)),
        }
    }
}

#[cfg(unix)]
fn failed(tool: &str) -> PipelineError {
    use std::os::unix::process::ExitStatusExt;

    PipelineError::ToolFailed {
        tool: tool.to_string(),
        status: std::process::ExitStatus::from_raw(1 << 8),
    }
}

#[cfg(not(unix))]
fn failed(tool: &str) -> PipelineError {
    PipelineError::ToolSpawn {
        tool: tool.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "mock failure"),
    }
}

fn arg<'a>(job: &'a Job, flag: &str) -> Result<&'a str> {
    job.value_of(flag)
        .ok_or_else(|| PipelineError::InvalidParam(format!("{} without {}", job.tool(), flag)))
}

fn sample_name(input: &str) -> String {
    Path::new(input)
        .file_name()
        .map(|n| n.to_string_lossy().split('.').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}

fn fake_humann(job: &Job) -> Result<()> {
    let sample = sample_name(arg(job, "-i")?);
    let out = PathBuf::from(arg(job, "-o")?);

    std::fs::write(
        out.join(format!("{}_genefamilies.tsv", sample)),
        format!("# Gene Family\t{}_Abundance-RPKs\nUNMAPPED\t10.0\n", sample),
    )?;
    std::fs::write(
        out.join(format!("{}_pathcoverage.tsv", sample)),
        format!("# Pathway\t{}_Coverage\nUNINTEGRATED\t1.0\n", sample),
    )?;
    std::fs::write(
        out.join(format!("{}_pathabundance.tsv", sample)),
        format!("# Pathway\t{}_Abundance\nUNINTEGRATED\t5.0\n", sample),
    )?;

    let temp = out.join(format!("{}_humann_temp", sample));
    std::fs::create_dir_all(&temp)?;
    std::fs::write(
        temp.join(format!("{}_metaphlan_bugs_list.tsv", sample)),
        "#mpa_vJan21_CHOCOPhlAnSGB_202103\nk__Bacteria\t2\t100.0\n",
    )?;

    Ok(())
}

fn fake_join(job: &Job) -> Result<()> {
    let input = PathBuf::from(arg(job, "-i")?);
    let kind = arg(job, "--file_name")?;

    let mut samples = std::fs::read_dir(&input)?
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains(kind))
        .map(|name| name.split('_').next().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    samples.sort();

    let header = samples.join("\t");
    let cells = vec!["1.0"; samples.len()].join("\t");
    std::fs::write(
        arg(job, "-o")?,
        format!("# {}\t{}\nUNMAPPED\t{}\n", kind, header, cells),
    )?;

    Ok(())
}

fn fake_merge(job: &Job) -> Result<()> {
    let output = arg(job, "-o")?.to_string();
    let profiles = job
        .get_args()
        .iter()
        .skip(2)
        .map(|p| sample_name(&p.to_string_lossy()).trim_end_matches("_metaphlan_bugs_list").to_string())
        .collect::<Vec<_>>();

    let cells = vec!["100.0"; profiles.len()].join("\t");
    std::fs::write(
        output,
        format!(
            "#mpa_vJan21_CHOCOPhlAnSGB_202103\nclade_name\t{}\nk__Bacteria\t{}\n",
            profiles.join("\t"),
            cells
        ),
    )?;

    Ok(())
}

/// Input directories laid out the way the declared formats expect
pub struct Fixture {
    pub root: tempfile::TempDir,
}

impl Fixture {
    pub fn new(samples: &[&str]) -> Self {
        let root = tempfile::tempdir().expect("tempdir");
        let fixture = Self { root };

        fixture.make("reads", &samples.iter().map(|s| format!("{}.fastq.gz", s)).collect::<Vec<_>>());
        fixture.make("chocophlan", &["g__Bacteroides.centroids.v201901.ffn.gz".to_string()]);
        fixture.make("uniref", &["uniref90_201901b_full.dmnd".to_string()]);
        fixture.make("pathways", &["metacyc_pathways_structured_filtered_v24".to_string()]);
        fixture.make("mapping", &["metacyc_reactions_level4ec_only.uniref.bz2".to_string()]);
        fixture.make(
            "metaphlan",
            &["1.bt2l", "2.bt2l", "3.bt2l", "4.bt2l", "rev.1.bt2l", "rev.2.bt2l", "pkl"]
                .iter()
                .map(|s| format!("mpa_vJan21_CHOCOPhlAnSGB_202103.{}", s))
                .collect::<Vec<_>>(),
        );
        std::fs::create_dir(fixture.path("scratch")).expect("scratch");

        fixture
    }

    fn make(&self, dir: &str, files: &[String]) {
        let dir = self.path(dir);
        std::fs::create_dir_all(&dir).expect("mkdir");
        for file in files {
            std::fs::write(dir.join(file), b"").expect("touch");
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }

    pub fn request(&self) -> RunRequest {
        let databases = HumannDatabases::resolve(
            &self.path("chocophlan"),
            &self.path("uniref"),
            &self.path("pathways"),
            &self.path("mapping"),
            &self.path("metaphlan"),
        )
        .expect("databases");

        RunRequest {
            samples: SampleSequences::from_dir(self.path("reads")).expect("samples"),
            databases,
            params: HumannParams {
                threads: 4,
                ..Default::default()
            },
            scratch_root: Some(self.path("scratch")),
        }
    }

    pub fn config_toml(&self) -> String {
        format!(
            r#"
[inputs]
sequences = "reads"
nucleotide_database = "chocophlan"
protein_database = "uniref"
pathway_database = "pathways"
pathway_mapping = "mapping"
bowtie_database = "metaphlan"

[params]
threads = 2
memory_use = "maximum"
metaphlan_stat_q = 0.15

[global]
output_dir = "results"
scratch_dir = "{}"
timestamp = false
"#,
            self.path("scratch").display()
        )
    }
}
