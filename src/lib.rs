pub mod bio;
pub mod cli;
pub mod core;
pub mod report;
pub mod tools;

pub use crate::core::pipeline::{RunSummary, SummaryAggregator};
pub use crate::report::parser::{AlignmentMetrics, ReportParser};
pub use crate::tools::traits::{AlignmentBackend, AlignmentReport};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TracealignError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Trace decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("BLAST submission failed for {query}: {reason}")]
    SubmissionFailure { query: String, reason: String },

    #[error("BLAST database build failed: {0}")]
    DatabaseBuildFailure(String),

    #[error("Alignment failed for {query}: {reason}")]
    AlignmentExecutionFailure { query: String, reason: String },

    #[error("No BLAST output found for {0}")]
    EmptyReport(String),

    #[error("Gave up waiting for BLAST job {rid} after {waited_secs}s")]
    PollTimeout { rid: String, waited_secs: u64 },

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TracealignError>;
