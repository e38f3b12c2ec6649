use crate::bio::abi::{AbiDecoder, ChromatogramDecoder};
use crate::bio::fasta::to_fasta_string;
use crate::bio::sequence::SequenceRecord;
use crate::cli::formatter::{print_error, print_success};
use crate::core::preprocess::SequencePreprocessor;
use crate::core::store::{DirectoryStore, FileStore};
use crate::TracealignError;
use clap::Args;
use std::collections::HashSet;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory containing .ab1 trace files
    #[arg(short, long, value_name = "DIR")]
    pub traces: PathBuf,

    /// Directory the FASTA files are written to
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Leading bases to drop from each trace
    #[arg(long, default_value = "20")]
    pub trim: usize,
}

/// Traces that could not be decoded, by file name
pub type DecodeFailures = Vec<(String, TracealignError)>;

/// Decode and trim every `.ab1` file in `store`, in listing order.
///
/// Identifiers are unique within the result: a trace whose file stem
/// repeats an earlier one is reported as a failure instead.
pub fn load_traces(
    store: &dyn FileStore,
    decoder: &dyn ChromatogramDecoder,
    preprocessor: &SequencePreprocessor,
) -> crate::Result<(Vec<SequenceRecord>, DecodeFailures)> {
    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut seen = HashSet::new();

    for name in store.list("")? {
        if !name.to_lowercase().ends_with(".ab1") {
            continue;
        }

        let loaded = store
            .get("", &name)
            .and_then(|data| preprocessor.load(decoder, &name, &data))
            .and_then(|record| {
                if seen.insert(record.identifier.clone()) {
                    Ok(record)
                } else {
                    Err(TracealignError::Decode(format!(
                        "duplicate identifier {}; another trace already uses it",
                        record.identifier
                    )))
                }
            });
        match loaded {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("Could not read trace {}: {}", name, e);
                failures.push((name, e));
            }
        }
    }

    Ok((records, failures))
}

/// Write each record to `folder/<identifier>.fasta`
pub fn write_records(store: &dyn FileStore, folder: &str, records: &[SequenceRecord]) -> crate::Result<()> {
    for record in records {
        store.put(folder, &record.fasta_file_name(), to_fasta_string(record).as_bytes())?;
    }
    Ok(())
}

pub fn run(args: ConvertArgs) -> anyhow::Result<()> {
    let traces = DirectoryStore::new(&args.traces);
    let output = DirectoryStore::new(&args.out);
    let preprocessor = SequencePreprocessor::new(args.trim);

    let (records, failures) = load_traces(&traces, &AbiDecoder::new(), &preprocessor)?;
    for (name, error) in &failures {
        print_error(&format!("{}: {}", name, error));
    }

    if records.is_empty() {
        anyhow::bail!("No readable .ab1 trace files in {}", args.traces.display());
    }

    write_records(&output, "", &records)?;
    print_success(&format!(
        "Converted {} traces to FASTA in {}",
        records.len(),
        args.out.display()
    ));
    Ok(())
}
