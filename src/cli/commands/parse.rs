use crate::cli::formatter::print_warning;
use crate::report::parser::ReportParser;
use crate::report::{render_table, write_summary, Format, SummaryRow};
use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// BLAST text reports to parse
    #[arg(value_name = "REPORT", required = true)]
    pub reports: Vec<PathBuf>,

    /// Write the rows to this file instead of only printing them
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format for --output: csv, json or table
    #[arg(short, long, default_value = "csv")]
    pub format: Format,
}

pub fn run(args: ParseArgs) -> anyhow::Result<()> {
    let parser = ReportParser::new();
    let mut rows = Vec::new();

    for path in &args.reports {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        if body.is_empty() {
            print_warning(&format!("{} is empty, skipping", name));
            continue;
        }
        rows.push(SummaryRow::new(name, parser.parse(&body)));
    }

    println!("{}", render_table(&rows));

    if let Some(output) = &args.output {
        write_summary(output, args.format, &rows)?;
    }
    Ok(())
}
