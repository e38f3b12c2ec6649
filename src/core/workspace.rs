use std::fs;
use std::path::{Path, PathBuf};

/// Isolated scratch area for one run.
///
/// Every component that touches disk receives this value instead of
/// reaching for fixed paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub root: PathBuf,
    pub fasta_dir: PathBuf,
    pub results_dir: PathBuf,
    pub db_dir: PathBuf,
    pub reference_path: PathBuf,
}

impl RunContext {
    /// Lay out (and create) the scratch directories under `root`
    pub fn create<P: AsRef<Path>>(root: P) -> std::io::Result<Self> {
        let ctx = Self::at(root);
        fs::create_dir_all(&ctx.fasta_dir)?;
        fs::create_dir_all(&ctx.results_dir)?;
        fs::create_dir_all(&ctx.db_dir)?;
        Ok(ctx)
    }

    /// Compute the layout without touching the filesystem
    pub fn at<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            fasta_dir: root.join("FASTA_Files"),
            results_dir: root.join("BLAST_Results"),
            db_dir: root.join("blastdb"),
            reference_path: root.join("reference.fasta"),
            root,
        }
    }

    /// Default workspace name for a fresh run
    pub fn timestamped_name() -> String {
        format!("blast_workspace_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"))
    }

    pub fn query_fasta_path(&self, identifier: &str) -> PathBuf {
        self.fasta_dir.join(format!("{}.fasta", identifier))
    }

    pub fn report_path(&self, identifier: &str) -> PathBuf {
        self.results_dir
            .join(format!("{}_blast_results.txt", identifier))
    }

    pub fn database_prefix(&self) -> PathBuf {
        self.db_dir.join("reference")
    }

    pub fn default_summary_path(&self, extension: &str) -> PathBuf {
        self.results_dir.join(format!("BLAST_Summary.{}", extension))
    }
}
