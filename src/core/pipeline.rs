use crate::bio::sequence::{ReferenceSequence, SequenceRecord};
use crate::report::parser::ReportParser;
use crate::report::SummaryRow;
use crate::tools::traits::{AlignmentBackend, AlignmentReport};
use crate::{Result, TracealignError};

/// A failure confined to one query
#[derive(Debug)]
pub struct QueryError {
    pub query: String,
    pub error: TracealignError,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.query, self.error)
    }
}

/// Everything a run produced
#[derive(Debug, Default)]
pub struct RunSummary {
    /// One row per successfully parsed query, in discovery order
    pub rows: Vec<SummaryRow>,
    pub errors: Vec<QueryError>,
    /// Non-empty raw reports, kept for archival
    pub reports: Vec<AlignmentReport>,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Per-query progress notification
#[derive(Debug)]
pub enum QueryOutcome<'a> {
    Aligned(&'a SummaryRow),
    Failed(&'a QueryError),
}

/// Drives every query through a backend and the report parser
#[derive(Debug, Default, Clone, Copy)]
pub struct SummaryAggregator {
    parser: ReportParser,
}

impl SummaryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(
        &self,
        queries: &[SequenceRecord],
        reference: &ReferenceSequence,
        backend: &mut dyn AlignmentBackend,
    ) -> Result<RunSummary> {
        self.process_with(queries, reference, backend, |_, _, _| {})
    }

    /// Like [`process`](Self::process) but calls `observer` after each
    /// query with its index and outcome.
    ///
    /// Only a failure of `backend.prepare` is returned as `Err`; it happens
    /// before any query is attempted. Everything else lands in
    /// `RunSummary::errors`.
    pub fn process_with<F>(
        &self,
        queries: &[SequenceRecord],
        reference: &ReferenceSequence,
        backend: &mut dyn AlignmentBackend,
        mut observer: F,
    ) -> Result<RunSummary>
    where
        F: FnMut(usize, &SequenceRecord, QueryOutcome<'_>),
    {
        backend.prepare(reference)?;

        let mut summary = RunSummary::default();
        tracing::info!(
            "Aligning {} queries with the {} backend",
            queries.len(),
            backend.name()
        );

        for (index, query) in queries.iter().enumerate() {
            let file = query.fasta_file_name();

            let outcome = match backend.run(query) {
                Ok(report) if report.is_empty() => Err(TracealignError::EmptyReport(file.clone())),
                Ok(report) => {
                    let metrics = self.parser.parse(&report.body);
                    summary.reports.push(report);
                    Ok(SummaryRow::new(file.clone(), metrics))
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(row) => {
                    summary.rows.push(row);
                    if let Some(row) = summary.rows.last() {
                        observer(index, query, QueryOutcome::Aligned(row));
                    }
                }
                Err(error) => {
                    tracing::warn!("Query {} failed: {}", file, error);
                    summary.errors.push(QueryError { query: file, error });
                    if let Some(error) = summary.errors.last() {
                        observer(index, query, QueryOutcome::Failed(error));
                    }
                }
            }
        }

        tracing::info!(
            "Alignment finished: {} rows, {} errors",
            summary.rows.len(),
            summary.errors.len()
        );
        Ok(summary)
    }
}
