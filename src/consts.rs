// executables
pub const HUMANN: &str = "humann3";
pub const JOIN_TABLES: &str = "humann_join_tables";
pub const RENORM_TABLE: &str = "humann_renorm_table";
pub const RENAME_TABLE: &str = "humann_rename_table";
pub const MERGE_METAPHLAN: &str = "merge_metaphlan_tables.py";

// project-wide names
pub const HUMANNPIPE: &str = "humannpipe";
pub const OUTPUT: &str = "humannpipe_run";

// formats
pub const TSV: &str = "tsv";
pub const FASTQ_EXTENSIONS: &[&str] = &["fastq", "fq", "fastq.gz", "fq.gz"];

// output kinds
pub const GENEFAMILIES: &str = "genefamilies";
pub const PATHCOVERAGE: &str = "pathcoverage";
pub const PATHABUNDANCE: &str = "pathabundance";
pub const TAXONOMY: &str = "taxonomy";

// filenames
pub const METAPHLAN_PROFILE_SUFFIX: &str = "_metaphlan_bugs_list.tsv";
pub const JOINED_SUFFIX: &str = "joined";
pub const STAGED_TABLE: &str = "staged.tsv";

// tables
pub const COMMENT_MARKER: char = '#';
pub const TABLE_COMMENT: &str = "# Constructed from biom file";
pub const DEFAULT_ID_HEADER: &str = "OTU ID";

// config defaults
pub const DEFAULT_THREADS: u32 = 1;
pub const DEFAULT_STAT_Q: f64 = 0.2;
pub const DEFAULT_CONFIG: &str = "config.toml";
