use crate::report::parser::AlignmentMetrics;
use crate::{Result, TracealignError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

pub mod archive;
pub mod parser;

/// Column headers of the summary, in output order
pub const SUMMARY_HEADERS: [&str; 6] = ["Query File", "Score", "Expect", "Identities", "Gaps", "Strand"];

/// One line of the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub file: String,
    pub score: String,
    pub expect: String,
    pub identities: String,
    pub gaps: String,
    pub strand: String,
}

impl SummaryRow {
    pub fn new(file: impl Into<String>, metrics: AlignmentMetrics) -> Self {
        Self {
            file: file.into(),
            score: metrics.score,
            expect: metrics.expect_value,
            identities: metrics.identities,
            gaps: metrics.gaps,
            strand: metrics.strand,
        }
    }

    /// Cells in header order
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.file,
            &self.score,
            &self.expect,
            &self.identities,
            &self.gaps,
            &self.strand,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Table,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Table => "txt",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "table" | "text" | "txt" => Ok(Format::Table),
            _ => Err(format!("Unknown summary format: {}", s)),
        }
    }
}

/// Sink for the finished summary
pub trait TabularReportWriter {
    fn write_rows(&mut self, rows: &[SummaryRow]) -> Result<()>;
}

/// Writes the summary as CSV with a header line
pub struct CsvReportWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| TracealignError::Io(e.into_error()))
    }
}

impl<W: Write> TabularReportWriter for CsvReportWriter<W> {
    fn write_rows(&mut self, rows: &[SummaryRow]) -> Result<()> {
        let csv_err = |e: csv::Error| TracealignError::Other(format!("CSV write failed: {}", e));
        self.inner.write_record(SUMMARY_HEADERS).map_err(csv_err)?;
        for row in rows {
            self.inner.write_record(row.cells()).map_err(csv_err)?;
        }
        self.inner.flush()?;
        Ok(())
    }
}

/// Writes the summary as a JSON array of objects
pub struct JsonReportWriter<W: Write> {
    inner: W,
}

impl<W: Write> JsonReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: writer }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> TabularReportWriter for JsonReportWriter<W> {
    fn write_rows(&mut self, rows: &[SummaryRow]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.inner, rows)
            .map_err(|e| TracealignError::Other(format!("JSON write failed: {}", e)))?;
        writeln!(self.inner)?;
        Ok(())
    }
}

/// Writes the summary as a box-drawn text table
pub struct TableReportWriter<W: Write> {
    inner: W,
}

impl<W: Write> TableReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { inner: writer }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> TabularReportWriter for TableReportWriter<W> {
    fn write_rows(&mut self, rows: &[SummaryRow]) -> Result<()> {
        writeln!(self.inner, "{}", render_table(rows))?;
        Ok(())
    }
}

/// Render rows with comfy_table
pub fn render_table(rows: &[SummaryRow]) -> String {
    use comfy_table::modifiers::UTF8_ROUND_CORNERS;
    use comfy_table::presets::UTF8_FULL;
    use comfy_table::{Attribute, Cell, ContentArrangement, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(
        SUMMARY_HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for row in rows {
        table.add_row(row.cells());
    }

    table.to_string()
}

/// Write the summary to `path` in the requested format
pub fn write_summary(path: &Path, format: Format, rows: &[SummaryRow]) -> Result<()> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    match format {
        Format::Csv => {
            let mut writer = CsvReportWriter::new(file);
            writer.write_rows(rows)?;
            writer.into_inner()?.flush()?;
        }
        Format::Json => {
            let mut writer = JsonReportWriter::new(file);
            writer.write_rows(rows)?;
            writer.into_inner().flush()?;
        }
        Format::Table => {
            let mut writer = TableReportWriter::new(file);
            writer.write_rows(rows)?;
            writer.into_inner().flush()?;
        }
    }
    Ok(())
}
