/// Shared fakes for the pipeline tests
use std::collections::HashMap;
use tracealign::bio::sequence::{ReferenceSequence, SequenceRecord};
use tracealign::tools::{AlignmentBackend, AlignmentJob, AlignmentReport, JobState};
use tracealign::TracealignError;

/// What the scripted backend does for one query
#[allow(dead_code)]
pub enum Scripted {
    Report(&'static str),
    Fail(&'static str),
}

/// Backend that replays canned outcomes keyed by query identifier
pub struct ScriptedBackend {
    script: HashMap<String, Scripted>,
    fail_prepare: bool,
    pub prepared: bool,
    pub calls: Vec<String>,
    jobs: Vec<AlignmentJob>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(script: Vec<(&str, Scripted)>) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|(id, outcome)| (id.to_string(), outcome))
                .collect(),
            fail_prepare: false,
            prepared: false,
            calls: Vec::new(),
            jobs: Vec::new(),
        }
    }

    pub fn failing_prepare(mut self) -> Self {
        self.fail_prepare = true;
        self
    }
}

impl AlignmentBackend for ScriptedBackend {
    fn prepare(&mut self, _reference: &ReferenceSequence) -> tracealign::Result<()> {
        if self.fail_prepare {
            return Err(TracealignError::DatabaseBuildFailure("makeblastdb exit code 1".to_string()));
        }
        self.prepared = true;
        Ok(())
    }

    fn run(&mut self, query: &SequenceRecord) -> tracealign::Result<AlignmentReport> {
        self.calls.push(query.identifier.clone());
        let mut job = AlignmentJob::new(&query.identifier, JobState::Pending);
        let result = match self.script.get(&query.identifier) {
            Some(Scripted::Report(body)) => Ok(AlignmentReport::new(&query.identifier, *body)),
            Some(Scripted::Fail(reason)) => Err(TracealignError::AlignmentExecutionFailure {
                query: query.identifier.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(AlignmentReport::new(&query.identifier, "")),
        };
        job.transition(match &result {
            Ok(_) => JobState::Completed,
            Err(e) => JobState::Failed { reason: e.to_string() },
        });
        self.jobs.push(job);
        result
    }

    fn jobs(&self) -> &[AlignmentJob] {
        &self.jobs
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[allow(dead_code)]
pub fn query(id: &str) -> SequenceRecord {
    SequenceRecord::new(id, b"ACGTACGTACGTACGT".to_vec())
}

#[allow(dead_code)]
pub fn reference() -> ReferenceSequence {
    ReferenceSequence::from_text("ACGTACGTACGTACGTACGTACGT").unwrap()
}

/// Report for query A in the end-to-end scenario
#[allow(dead_code)]
pub const REPORT_A: &str = "\
Query= A

>Reference_Sequence
Length=850

 Score = 150 bits (81)
 Expect = 1e-10
 Identities = 95/100, 95%
 Gaps = 2/100, 2%
 Strand = Plus/Plus
";
