/// Trait definitions for alignment backends
///
/// A backend takes one trimmed read and returns the aligner's raw text
/// report. Remote and local execution share this interface so the
/// summary pipeline never needs to know which one it is driving.

use crate::bio::sequence::{ReferenceSequence, SequenceRecord};
use crate::Result;
use serde::{Deserialize, Serialize};

/// Raw text produced by one completed alignment job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentReport {
    pub query_id: String,
    pub body: String,
}

impl AlignmentReport {
    pub fn new(query_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            body: body.into(),
        }
    }

    /// Zero bytes of output. Whitespace-only reports are not empty.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// File name used when the report is saved or archived
    pub fn file_name(&self) -> String {
        format!("{}_blast_results.txt", self.query_id)
    }
}

/// Lifecycle of an alignment job.
///
/// Remote jobs move `Submitted -> Running -> Ready | Failed`; local jobs
/// run synchronously and move `Pending -> Completed | Failed`.
///
/// Every job is created `Pending`. For a remote job that means the query has
/// not reached the service yet, so a rejected submission goes straight from
/// `Pending` to `Failed` without ever holding a request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// Created, nothing sent or started yet
    Pending,
    Submitted { rid: String },
    Running { rid: String, polls: u32 },
    Ready { rid: String },
    Completed,
    Failed { reason: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Ready { .. } | JobState::Completed | JobState::Failed { .. }
        )
    }
}

/// One query's trip through a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentJob {
    pub query_id: String,
    pub state: JobState,
}

impl AlignmentJob {
    pub fn new(query_id: impl Into<String>, state: JobState) -> Self {
        Self {
            query_id: query_id.into(),
            state,
        }
    }

    /// Move to a new state. Terminal states are final.
    pub fn transition(&mut self, next: JobState) {
        if self.state.is_terminal() {
            tracing::warn!(
                "Ignoring transition of {} from terminal state {:?} to {:?}",
                self.query_id,
                self.state,
                next
            );
            return;
        }
        tracing::debug!("Job {}: {:?} -> {:?}", self.query_id, self.state, next);
        self.state = next;
    }
}

/// Common interface for alignment execution strategies
pub trait AlignmentBackend {
    /// Called once before any query is aligned. An error here aborts the
    /// whole run.
    fn prepare(&mut self, _reference: &ReferenceSequence) -> Result<()> {
        Ok(())
    }

    /// Align one query and return the raw report. Blocks until the job
    /// reaches a terminal state.
    fn run(&mut self, query: &SequenceRecord) -> Result<AlignmentReport>;

    /// Jobs seen so far, in submission order
    fn jobs(&self) -> &[AlignmentJob];

    /// Get the name of this backend
    fn name(&self) -> &str;
}
