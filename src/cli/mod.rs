pub mod commands;
pub mod formatter;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tracealign",
    version,
    about = "Align Sanger trace files with BLAST and summarise the hits",
    long_about = "tracealign converts ABI .ab1 chromatograms to trimmed FASTA, aligns every read \
                  with blastn (NCBI web service or a local BLAST+ install) and collects score, \
                  expect, identities, gaps and strand into one summary table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert traces, align them and write the summary
    Run(commands::run::RunArgs),

    /// Convert .ab1 traces to trimmed FASTA without aligning
    Convert(commands::convert::ConvertArgs),

    /// Extract metrics from saved BLAST text reports
    Parse(commands::parse::ParseArgs),

    /// Print or write the default configuration
    Config(commands::config::ConfigArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Remote,
    Local,
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" | "ncbi" | "web" => Ok(BackendKind::Remote),
            "local" | "blast+" => Ok(BackendKind::Local),
            _ => Err(format!("Unknown backend: {}", s)),
        }
    }
}
