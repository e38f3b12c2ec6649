use crate::tools::traits::AlignmentReport;
use crate::Result;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Pack raw reports into a gzipped tarball, one entry per report
pub fn archive_reports(path: &Path, reports: &[AlignmentReport]) -> Result<()> {
    let file = File::create(path)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;

    for report in reports {
        let data = report.body.as_bytes();
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(mtime);
        header.set_cksum();
        builder.append_data(&mut header, report.file_name(), data)?;
    }

    let mut encoder = builder.into_inner()?;
    encoder.flush()?;
    encoder.finish()?;
    tracing::info!("Archived {} reports to {}", reports.len(), path.display());
    Ok(())
}
