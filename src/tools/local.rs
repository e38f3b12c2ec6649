use crate::bio::fasta::write_fasta;
use crate::bio::sequence::{ReferenceSequence, SequenceRecord};
use crate::core::config::LocalConfig;
use crate::core::workspace::RunContext;
use crate::tools::process::{CommandSpec, ProcessRunner, SystemRunner};
use crate::tools::traits::{AlignmentBackend, AlignmentJob, AlignmentReport, JobState};
use crate::{Result, TracealignError};
use std::fs;
use std::path::PathBuf;

/// A built BLAST nucleotide database, identified by its path prefix.
/// Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    pub prefix: PathBuf,
}

/// Local BLAST+ integration (`makeblastdb` + `blastn`)
pub struct LocalBackend<R: ProcessRunner = SystemRunner> {
    runner: R,
    config: LocalConfig,
    context: RunContext,
    database: Option<DatabaseHandle>,
    jobs: Vec<AlignmentJob>,
}

impl LocalBackend<SystemRunner> {
    pub fn new(config: LocalConfig, context: RunContext) -> Self {
        Self::with_runner(SystemRunner, config, context)
    }
}

impl<R: ProcessRunner> LocalBackend<R> {
    pub fn with_runner(runner: R, config: LocalConfig, context: RunContext) -> Self {
        Self {
            runner,
            config,
            context,
            database: None,
            jobs: Vec::new(),
        }
    }

    pub fn database(&self) -> Option<&DatabaseHandle> {
        self.database.as_ref()
    }

    /// Build the searchable database from the reference. Any failure here
    /// is fatal for the whole run since every query depends on it.
    pub fn build_database(&self, reference: &ReferenceSequence) -> Result<DatabaseHandle> {
        write_fasta(&self.context.reference_path, std::slice::from_ref(reference.record()))?;
        fs::create_dir_all(&self.context.db_dir)?;

        let prefix = self.context.database_prefix();
        let spec = CommandSpec::new(&self.config.makeblastdb)
            .arg("-in")
            .arg(&self.context.reference_path)
            .args(["-dbtype", "nucl"])
            .arg("-out")
            .arg(&prefix);

        tracing::info!("Building BLAST database for {} at {}", reference.identifier(), prefix.display());
        let output = self.runner.run(&spec).map_err(|e| {
            TracealignError::DatabaseBuildFailure(format!(
                "failed to start {}: {}",
                self.config.makeblastdb.display(),
                e
            ))
        })?;

        if !output.success() {
            return Err(TracealignError::DatabaseBuildFailure(output.failure_summary()));
        }

        Ok(DatabaseHandle { prefix })
    }

    /// Align one query against a built database. A missing report file is
    /// returned as an empty report, not an error.
    pub fn run_against(&mut self, query: &SequenceRecord, db: &DatabaseHandle) -> Result<AlignmentReport> {
        let mut job = AlignmentJob::new(&query.identifier, JobState::Pending);
        let result = self.execute(query, db);

        match &result {
            Ok(_) => job.transition(JobState::Completed),
            Err(e) => job.transition(JobState::Failed {
                reason: e.to_string(),
            }),
        }
        self.jobs.push(job);
        result
    }

    fn execute(&self, query: &SequenceRecord, db: &DatabaseHandle) -> Result<AlignmentReport> {
        let query_path = self.context.query_fasta_path(&query.identifier);
        let report_path = self.context.report_path(&query.identifier);
        write_fasta(&query_path, std::slice::from_ref(query))?;
        if report_path.exists() {
            fs::remove_file(&report_path)?;
        }

        let spec = CommandSpec::new(&self.config.blastn)
            .arg("-query")
            .arg(&query_path)
            .arg("-db")
            .arg(&db.prefix)
            .arg("-out")
            .arg(&report_path)
            .args(self.config.extra_args.iter().cloned());

        tracing::info!("Running blastn for {}", query.identifier);
        let output = self
            .runner
            .run(&spec)
            .map_err(|e| TracealignError::AlignmentExecutionFailure {
                query: query.identifier.clone(),
                reason: format!("failed to start {}: {}", self.config.blastn.display(), e),
            })?;

        if !output.success() {
            return Err(TracealignError::AlignmentExecutionFailure {
                query: query.identifier.clone(),
                reason: output.failure_summary(),
            });
        }

        let body = if report_path.exists() {
            fs::read_to_string(&report_path)?
        } else {
            tracing::warn!("blastn produced no report file for {}", query.identifier);
            String::new()
        };

        Ok(AlignmentReport::new(&query.identifier, body))
    }
}

impl<R: ProcessRunner> AlignmentBackend for LocalBackend<R> {
    fn prepare(&mut self, reference: &ReferenceSequence) -> Result<()> {
        let handle = self.build_database(reference)?;
        self.database = Some(handle);
        Ok(())
    }

    fn run(&mut self, query: &SequenceRecord) -> Result<AlignmentReport> {
        let db = self.database().cloned().ok_or_else(|| TracealignError::AlignmentExecutionFailure {
            query: query.identifier.clone(),
            reason: "BLAST database has not been built".to_string(),
        })?;
        self.run_against(query, &db)
    }

    fn jobs(&self) -> &[AlignmentJob] {
        &self.jobs
    }

    fn name(&self) -> &str {
        "local"
    }
}
