use crate::cli::formatter::print_success;
use crate::core::config::{default_config, save_config, to_toml};
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the default configuration here instead of printing it
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let config = default_config();
    match args.output {
        Some(path) => {
            save_config(&path, &config)?;
            print_success(&format!("Wrote default configuration to {}", path.display()));
        }
        None => print!("{}", to_toml(&config)?),
    }
    Ok(())
}
