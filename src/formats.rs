use regex::Regex;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::error::{PipelineError, Result};

/// A declared directory layout: a name and the pattern every
/// visible file in the directory must match.
#[derive(Debug, Clone, Copy)]
pub struct DirFormat {
    pub name: &'static str,
    pub pattern: &'static str,
}

/// Nucleotide and protein databases. File contents are opaque.
pub const HUMANN_DB: DirFormat = DirFormat {
    name: "HumannDbDirFormat",
    pattern: r"^.+\..+$",
};

/// Pathway database, pathway mapping and reference name mapping.
pub const SINGLE_FILE_DB: DirFormat = DirFormat {
    name: "HumannDbSingleFileDirFormat",
    pattern: r"^.+$",
};

pub const BOWTIE2_INDEX: DirFormat = DirFormat {
    name: "Bowtie2IndexDirFormat",
    pattern: r"^.+(\.(rev\.)?\d+\.bt2l?|\.pkl)$",
};

/// Index file name split into its stem and the bowtie2/pickle suffix.
const BOWTIE2_STEM: &str = r"^(?P<stem>.+?)(\.(rev\.)?\d+\.bt2l?|\.pkl)$";

pub const SAMPLE_SEQUENCES: DirFormat = DirFormat {
    name: "PerSampleFastqDirFormat",
    pattern: r"^.+\.f(ast)?q(\.gz)?$",
};

impl DirFormat {
    /// Check that `dir` exists and every visible file matches the pattern.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// use humannpipe::formats::HUMANN_DB;
    ///
    /// HUMANN_DB.validate("db/chocophlan").unwrap();
    /// ```
    pub fn validate<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        let re = Regex::new(self.pattern)
            .map_err(|e| PipelineError::InvalidFormat(format!("{}: {}", self.name, e)))?;

        for name in list_file_names(dir)? {
            if !re.is_match(&name) {
                return Err(PipelineError::InvalidFormat(format!(
                    "{} in {} does not match {} ({})",
                    name,
                    dir.display(),
                    self.name,
                    self.pattern
                )));
            }
        }

        log::debug!("{} is a valid {}", dir.display(), self.name);

        Ok(())
    }
}

/// Visible regular file names in `dir`, sorted.
pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(PipelineError::InvalidFormat(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| {
            PipelineError::InvalidFormat(format!(
                "{} holds a file name that is not valid UTF-8: {:?}",
                dir.display(),
                raw
            ))
        })?;

        if !name.starts_with('.') {
            names.push(name);
        }
    }
    names.sort_unstable();

    Ok(names)
}

/// Path of the only file inside a single-file database directory.
pub fn resolve_single_file<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    SINGLE_FILE_DB.validate(dir)?;

    let names = list_file_names(dir)?;
    match names.as_slice() {
        [name] => Ok(dir.join(name)),
        _ => Err(PipelineError::InvalidFormat(format!(
            "{} must hold exactly one file, found {}",
            dir.display(),
            names.len()
        ))),
    }
}

/// One input read file and the sample it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub path: PathBuf,
}

/// The per-sample read files of a batch, in file-name order.
///
/// Sample ids are the output stems humann3 derives from each file, so
/// two files mapping to the same id are rejected.
#[derive(Debug, Clone)]
pub struct SampleSequences {
    samples: Vec<Sample>,
}

impl SampleSequences {
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let re = Regex::new(SAMPLE_SEQUENCES.pattern)
            .map_err(|e| PipelineError::InvalidFormat(e.to_string()))?;

        let samples = list_file_names(dir)?
            .into_iter()
            .filter(|name| re.is_match(name))
            .map(|name| Sample {
                id: sample_id(&name),
                path: dir.join(&name),
            })
            .collect::<Vec<_>>();

        if samples.is_empty() {
            return Err(PipelineError::InvalidFormat(format!(
                "no sequence files ({}) found in {}",
                FASTQ_EXTENSIONS.join(", "),
                dir.display()
            )));
        }

        let mut seen = BTreeSet::new();
        for sample in &samples {
            if !seen.insert(sample.id.as_str()) {
                return Err(PipelineError::InvalidFormat(format!(
                    "more than one sequence file in {} maps to sample {}",
                    dir.display(),
                    sample.id
                )));
            }
        }

        Ok(Self { samples })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Output stem humann3 uses for a read file: compression suffix
/// dropped, then one extension.
fn sample_id(file_name: &str) -> String {
    let name = [".gz", ".bz2"]
        .iter()
        .find_map(|ext| file_name.strip_suffix(*ext))
        .unwrap_or(file_name);

    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// A directory of bowtie2 index files sharing one basename.
#[derive(Debug, Clone, PartialEq)]
pub struct Bowtie2Index {
    pub dir: PathBuf,
    pub basename: String,
}

impl Bowtie2Index {
    /// Resolve the shared basename of the index files in `dir`.
    ///
    /// # Example
    ///
    /// ```rust, no_run
    /// use humannpipe::formats::Bowtie2Index;
    ///
    /// // db/ holds mpa_vJan21_CHOCOPhlAnSGB_202103.{1,2,3,4,rev.1,rev.2}.bt2l
    /// let index = Bowtie2Index::from_dir("db").unwrap();
    /// assert_eq!(index.basename, "mpa_vJan21_CHOCOPhlAnSGB_202103");
    /// ```
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let names = list_file_names(dir)?;
        let basename = index_basename(&names)?;

        Ok(Self {
            dir: dir.to_path_buf(),
            basename,
        })
    }
}

/// Shared basename of a set of index file names.
///
/// All names must agree on the token before the first `.`. Each name is
/// then reduced to its stem by dropping the bowtie2 or pickle suffix, and
/// exactly one stem may remain.
pub fn index_basename(names: &[String]) -> Result<String> {
    if names.is_empty() {
        return Err(PipelineError::InvalidIndex("no index files found".into()));
    }

    let tokens = names
        .iter()
        .map(|name| name.split('.').next().unwrap_or_default())
        .collect::<BTreeSet<_>>();

    if tokens.len() != 1 || longest_common_prefix(names).trim_end_matches('.').is_empty() {
        return Err(PipelineError::InvalidIndex(format!(
            "index files must share one basename, found {}: {:?}",
            tokens.len(),
            tokens
        )));
    }

    let re = Regex::new(BOWTIE2_STEM).map_err(|e| PipelineError::InvalidIndex(e.to_string()))?;
    let mut stems = BTreeSet::new();
    for name in names {
        let stem = re
            .captures(name)
            .and_then(|caps| caps.name("stem"))
            .ok_or_else(|| PipelineError::InvalidIndex(format!("{} is not a bowtie2 index file", name)))?;
        stems.insert(stem.as_str());
    }

    match stems.len() {
        1 => Ok(stems.into_iter().next().unwrap_or_default().to_string()),
        n => Err(PipelineError::InvalidIndex(format!(
            "found {} indexes sharing the token {:?}: {:?}",
            n, tokens, stems
        ))),
    }
}

/// Character-wise longest common prefix.
///
/// # Example
///
/// ```rust
/// use humannpipe::formats::longest_common_prefix;
///
/// let names = vec!["x.1.bt2".to_string(), "x.rev.1.bt2".to_string()];
/// assert_eq!(longest_common_prefix(&names), "x.");
/// ```
pub fn longest_common_prefix<S: AsRef<str>>(names: &[S]) -> String {
    let Some((first, rest)) = names.split_first() else {
        return String::new();
    };

    let mut prefix = first.as_ref();
    for name in rest {
        let name = name.as_ref();
        let common = prefix
            .char_indices()
            .zip(name.chars())
            .find(|((_, a), b)| a != b)
            .map(|((idx, _), _)| idx)
            .unwrap_or_else(|| prefix.len().min(name.len()));
        prefix = &prefix[..common];
    }

    prefix.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_lcp_of_index_files() {
        let files = names(&["x.1.bt2", "x.2.bt2", "x.rev.1.bt2"]);

        assert_eq!(longest_common_prefix(&files), "x.");
        assert_eq!(index_basename(&files).unwrap(), "x");
    }

    #[test]
    fn test_lcp_without_common_characters() {
        let files = names(&["a.1.bt2", "b.1.bt2"]);
        assert_eq!(longest_common_prefix(&files), "");
        assert!(matches!(
            index_basename(&files),
            Err(PipelineError::InvalidIndex(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.1.bt2");
        touch(dir.path(), "b.1.bt2");
        assert!(matches!(
            Bowtie2Index::from_dir(dir.path()),
            Err(PipelineError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_two_dotted_indexes_fail() {
        let files = names(&["hg38.p13.1.bt2", "hg38.p13.2.bt2", "hg38.p14.1.bt2", "hg38.p14.2.bt2"]);
        let err = index_basename(&files).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidIndex(_)));
        assert!(err.to_string().contains("hg38.p13"));
        assert!(err.to_string().contains("hg38.p14"));
    }

    #[test]
    fn test_basename_is_the_index_stem() {
        assert_eq!(index_basename(&names(&["x.1.bt2", "x.1.bt2l"])).unwrap(), "x");
        assert_eq!(index_basename(&names(&["x.1.bt2"])).unwrap(), "x");
        assert_eq!(index_basename(&names(&["x.1.bt2", "x.pkl"])).unwrap(), "x");
    }

    #[test]
    fn test_lcp_shorter_name_bounds_prefix() {
        let files = names(&["abc", "ab"]);
        assert_eq!(longest_common_prefix(&files), "ab");
    }

    #[test]
    fn test_mixed_basenames_fail() {
        let files = names(&["hg38.1.bt2", "hg38.2.bt2", "mm10.1.bt2"]);
        let err = index_basename(&files).unwrap_err().to_string();

        assert!(err.contains("hg38"));
        assert!(err.contains("mm10"));
    }

    #[test]
    fn test_dotted_basename_survives() {
        let files = names(&["hg38.p13.1.bt2", "hg38.p13.2.bt2", "hg38.p13.rev.1.bt2"]);
        assert_eq!(index_basename(&files).unwrap(), "hg38.p13");
    }

    #[test]
    fn test_empty_index_fails() {
        assert!(matches!(
            index_basename(&[]),
            Err(PipelineError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_bowtie2_index_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        for suffix in ["1.bt2l", "2.bt2l", "3.bt2l", "4.bt2l", "rev.1.bt2l", "rev.2.bt2l", "pkl"] {
            touch(dir.path(), &format!("mpa_vJan21_CHOCOPhlAnSGB_202103.{}", suffix));
        }

        BOWTIE2_INDEX.validate(dir.path()).unwrap();
        let index = Bowtie2Index::from_dir(dir.path()).unwrap();
        assert_eq!(index.basename, "mpa_vJan21_CHOCOPhlAnSGB_202103");
    }

    #[test]
    fn test_validate_rejects_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "x.1.bt2");
        touch(dir.path(), "README");

        assert!(BOWTIE2_INDEX.validate(dir.path()).is_err());
    }

    #[test]
    fn test_validate_missing_dir() {
        assert!(HUMANN_DB.validate("/nonexistent/humann/db").is_err());
    }

    #[test]
    fn test_resolve_single_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "metacyc_pathways_structured_filtered_v24");
        let file = resolve_single_file(dir.path()).unwrap();
        assert!(file.ends_with("metacyc_pathways_structured_filtered_v24"));

        touch(dir.path(), "second.gz");
        assert!(resolve_single_file(dir.path()).is_err());
    }

    #[test]
    fn test_sample_sequences_order_and_ids() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "S2_L001_R1_001.fastq.gz");
        touch(dir.path(), "S1_L001_R1_001.fastq.gz");
        touch(dir.path(), "S3.fq");
        touch(dir.path(), "MANIFEST");

        let samples = SampleSequences::from_dir(dir.path()).unwrap();
        let ids = samples.iter().map(|s| s.id.as_str()).collect::<Vec<_>>();

        assert_eq!(ids, ["S1_L001_R1_001", "S2_L001_R1_001", "S3"]);
    }

    #[test]
    fn test_sample_id_follows_humann_stem() {
        assert_eq!(sample_id("S1.fastq.gz"), "S1");
        assert_eq!(sample_id("S1.fq"), "S1");
        assert_eq!(sample_id("S1.R1.fastq.bz2"), "S1.R1");
        assert_eq!(sample_id("S1"), "S1");
    }

    #[test]
    fn test_duplicate_sample_stems_fail() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "S1.fastq.gz");
        touch(dir.path(), "S2.fastq.gz");
        touch(dir.path(), "S1.fq");

        let err = SampleSequences::from_dir(dir.path()).unwrap_err();

        assert!(matches!(err, PipelineError::InvalidFormat(_)));
        assert!(err.to_string().contains("S1"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_file_name_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"S\xff1.fastq.gz");
        if std::fs::write(dir.path().join(name), b"").is_err() {
            return;
        }

        assert!(matches!(
            list_file_names(dir.path()),
            Err(PipelineError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_sample_sequences_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SampleSequences::from_dir(dir.path()).is_err());
    }
}
