use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};

use crate::consts::*;
use crate::error::{PipelineError, Result};

/// A feature-by-column table as written by the HUMAnN3 tools.
///
/// Cells are carried as text and never interpreted; the pipeline
/// only moves tables between tools and onto disk.
///
/// # Example
///
/// ```rust, no_run
/// use humannpipe::table::PooledTable;
///
/// let table = PooledTable::read("genefamilies.tsv").unwrap();
/// println!("{} features x {} samples", table.n_features(), table.n_columns());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PooledTable {
    id_header: String,
    columns: Vec<String>,
    rows: Vec<(String, Vec<String>)>,
}

impl PooledTable {
    /// Read a table from a tab-separated file.
    ///
    /// Leading `#` lines without a tab are comments. The first line after
    /// them is the header, with any leading `#` removed from the id column,
    /// unless that line has no tab, in which case the last `#` line is the
    /// header of a table without sample columns.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    pub fn from_tsv(text: &str) -> Result<Self> {
        Self::parse(text, Path::new("<memory>"))
    }

    fn parse(text: &str, origin: &Path) -> Result<Self> {
        let malformed = |reason: String| PipelineError::Table {
            path: PathBuf::from(origin),
            reason,
        };

        let lines = text.lines().collect::<Vec<_>>();
        let comments = lines
            .iter()
            .take_while(|line| line.starts_with(COMMENT_MARKER) && !line.contains('\t'))
            .count();

        // a table without sample columns has no tab in its header either
        let header_idx = match lines.get(comments) {
            Some(line) if line.contains('\t') || comments == 0 => comments,
            _ if comments > 0 => comments - 1,
            _ => return Err(malformed("no header line".into())),
        };
        let header = lines[header_idx];

        let mut fields = header.split('\t');
        let id_header = fields
            .next()
            .unwrap_or_default()
            .trim_start_matches(COMMENT_MARKER)
            .trim_start()
            .to_string();
        let columns: Vec<String> = fields.map(str::to_string).collect();

        let body = lines[header_idx + 1..].join("\n");

        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(body.as_bytes());

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != columns.len() + 1 {
                return Err(malformed(format!(
                    "row {} has {} fields, expected {}",
                    header_idx + idx + 2,
                    record.len(),
                    columns.len() + 1
                )));
            }

            let mut cells = record.iter().map(str::to_string);
            let feature = cells.next().unwrap_or_default();
            rows.push((feature, cells.collect()));
        }

        Ok(Self {
            id_header,
            columns,
            rows,
        })
    }

    /// Serialize in classic biom TSV layout: a comment line, then a
    /// `#`-prefixed header, then one row per feature.
    pub fn to_tsv(&self) -> Result<String> {
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .from_writer(Vec::new());

        let id_header = format!("{}{}", COMMENT_MARKER, self.id_header);
        writer.write_record(std::iter::once(id_header.as_str()).chain(self.columns.iter().map(String::as_str)))?;
        for (feature, cells) in &self.rows {
            writer.write_record(std::iter::once(feature.as_str()).chain(cells.iter().map(String::as_str)))?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        Ok(format!(
            "{}\n{}",
            TABLE_COMMENT,
            String::from_utf8_lossy(&bytes)
        ))
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_tsv()?)?;
        Ok(())
    }

    /// Write the table without its leading comment line, for tools
    /// that read the first line as the header.
    pub fn write_uncommented<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, strip_leading_comment(&self.to_tsv()?))?;
        Ok(())
    }

    pub fn id_header(&self) -> &str {
        &self.id_header
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|(feature, _)| feature.as_str())
    }

    pub fn row(&self, feature: &str) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(f, _)| f == feature)
            .map(|(_, cells)| cells.as_slice())
    }

    pub fn n_features(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

impl Default for PooledTable {
    fn default() -> Self {
        Self {
            id_header: DEFAULT_ID_HEADER.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }
}

/// Drop the first line when it starts with the comment marker.
///
/// # Example
///
/// ```rust
/// use humannpipe::table::strip_leading_comment;
///
/// let text = "# Constructed from biom file\n#OTU ID\tS1\nK1\t2.0\n";
/// assert_eq!(strip_leading_comment(text), "#OTU ID\tS1\nK1\t2.0\n");
/// ```
pub fn strip_leading_comment(text: &str) -> String {
    if !text.starts_with(COMMENT_MARKER) {
        return text.to_string();
    }

    match text.find('\n') {
        Some(idx) => text[idx + 1..].to_string(),
        None => String::new(),
    }
}
