use crate::bio::abi::AbiDecoder;
use crate::bio::sequence::ReferenceSequence;
use crate::cli::commands::convert::{load_traces, write_records};
use crate::cli::formatter::{create_progress_style, info_box, print_error, print_section, print_success, print_warning};
use crate::cli::BackendKind;
use crate::core::config::{self, Config};
use crate::core::pipeline::{QueryOutcome, SummaryAggregator};
use crate::core::preprocess::SequencePreprocessor;
use crate::core::store::{DirectoryStore, FileStore};
use crate::core::workspace::RunContext;
use crate::report::archive::archive_reports;
use crate::report::{render_table, write_summary, Format};
use crate::tools::{AlignmentBackend, LocalBackend, RemoteBackend};
use anyhow::Context;
use clap::Args;
use indicatif::ProgressBar;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Directory containing .ab1 trace files
    #[arg(short, long, value_name = "DIR")]
    pub traces: PathBuf,

    /// Reference sequence (plain text or FASTA)
    #[arg(short, long, value_name = "FILE")]
    pub reference: PathBuf,

    /// Where alignments run: remote (NCBI BLAST) or local (BLAST+)
    #[arg(short, long, default_value = "remote")]
    pub backend: BackendKind,

    /// Scratch directory for this run (default: ./blast_workspace_<timestamp>)
    #[arg(short, long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Summary file (default: <workspace>/BLAST_Results/BLAST_Summary.<ext>)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Summary format: csv, json or table
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Archive of raw reports (default: <workspace>/BLAST_Results/BLAST_Reports.tar.gz)
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,

    /// Do not write the report archive
    #[arg(long, conflicts_with = "archive")]
    pub no_archive: bool,

    /// Give up on a remote job after this many seconds (default: wait forever)
    #[arg(long, value_name = "SECS")]
    pub max_wait: Option<u64>,

    /// Leading bases to drop from each trace
    #[arg(long)]
    pub trim: Option<usize>,

    /// Configuration file
    #[arg(short = 'c', long, env = "TRACEALIGN_CONFIG")]
    pub config: Option<PathBuf>,
}

fn resolve_config(args: &RunArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    if let Some(max_wait) = args.max_wait {
        config.remote.max_wait_secs = Some(max_wait);
    }
    if let Some(trim) = args.trim {
        config.preprocess.trim_leading = trim;
    }
    if args.no_archive {
        config.output.archive = false;
    }
    Ok(config)
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let format = match args.format {
        Some(format) => format,
        None => config
            .output
            .format
            .parse::<Format>()
            .map_err(crate::TracealignError::Config)?,
    };

    let workspace = args
        .workspace
        .clone()
        .unwrap_or_else(|| PathBuf::from(RunContext::timestamped_name()));
    let ctx = RunContext::create(&workspace)
        .with_context(|| format!("Failed to create workspace {}", workspace.display()))?;
    let store = DirectoryStore::new(&ctx.root);

    let reference_text = std::fs::read_to_string(&args.reference)
        .with_context(|| format!("Failed to read reference {}", args.reference.display()))?;
    let reference = ReferenceSequence::from_text(&reference_text)?;
    if reference.bases().is_empty() {
        print_warning("Reference sequence is empty");
    }

    print_section("Converting traces");
    let preprocessor = SequencePreprocessor::new(config.preprocess.trim_leading);
    let traces = DirectoryStore::new(&args.traces);
    let (queries, failures) = load_traces(&traces, &AbiDecoder::new(), &preprocessor)?;
    for (name, error) in &failures {
        print_error(&format!("{}: {}", name, error));
    }
    if queries.is_empty() {
        anyhow::bail!("No readable .ab1 trace files in {}", args.traces.display());
    }
    write_records(&store, "FASTA_Files", &queries)?;
    print_success(&format!("{} files converted to FASTA", queries.len()));

    let mut backend: Box<dyn AlignmentBackend> = match args.backend {
        BackendKind::Remote => Box::new(RemoteBackend::new(config.remote.clone())?),
        BackendKind::Local => Box::new(LocalBackend::new(config.local.clone(), ctx.clone())),
    };

    print_section(&format!("Running BLAST ({})", backend.name()));
    let pb = ProgressBar::new(queries.len() as u64);
    pb.set_style(create_progress_style());

    let aggregator = SummaryAggregator::new();
    let summary = aggregator.process_with(&queries, &reference, backend.as_mut(), |_, query, outcome| {
        match outcome {
            QueryOutcome::Aligned(_) => pb.set_message(format!("{} done", query.identifier)),
            QueryOutcome::Failed(error) => pb.println(format!("  ✗ {}", error)),
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    for report in &summary.reports {
        store.put("BLAST_Results", &report.file_name(), report.body.as_bytes())?;
    }
    for error in &summary.errors {
        print_error(&format!("{}. Check your input sequences!", error.error));
    }
    print_success("BLAST alignment completed!");

    let summary_path = args
        .output
        .clone()
        .unwrap_or_else(|| ctx.default_summary_path(format.extension()));
    write_summary(&summary_path, format, &summary.rows)?;

    println!("{}", render_table(&summary.rows));

    let mut items = vec![format!("Summary: {}", summary_path.display())];
    // An explicit --archive path wins over `archive = false` in the config.
    if config.output.archive || args.archive.is_some() {
        let archive_path = args
            .archive
            .clone()
            .unwrap_or_else(|| ctx.results_dir.join("BLAST_Reports.tar.gz"));
        archive_reports(&archive_path, &summary.reports)?;
        items.push(format!("Reports: {}", archive_path.display()));
    }
    items.push(format!(
        "{} aligned, {} failed",
        summary.rows.len(),
        summary.errors.len()
    ));

    let item_refs: Vec<&str> = items.iter().map(String::as_str).collect();
    info_box("BLAST summary saved", &item_refs);
    Ok(())
}
