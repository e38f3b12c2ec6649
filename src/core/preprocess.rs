use crate::bio::abi::{ChromatogramDecoder, DecodedTrace};
use crate::bio::sequence::SequenceRecord;
use crate::Result;
use std::path::Path;

/// Leading bases dropped from every trace. The first calls of a Sanger
/// read are consistently low quality.
pub const DEFAULT_TRIM: usize = 20;

/// Turns decoded traces into alignment-ready records
#[derive(Debug, Clone, Copy)]
pub struct SequencePreprocessor {
    trim_leading: usize,
}

impl Default for SequencePreprocessor {
    fn default() -> Self {
        Self::new(DEFAULT_TRIM)
    }
}

impl SequencePreprocessor {
    pub fn new(trim_leading: usize) -> Self {
        Self { trim_leading }
    }

    /// Drop the leading bases and all quality data. A trace shorter than
    /// the trim length yields an empty record.
    pub fn trim(&self, raw: DecodedTrace) -> SequenceRecord {
        let DecodedTrace {
            identifier, mut bases, ..
        } = raw;
        let cut = self.trim_leading.min(bases.len());
        bases.drain(..cut);
        SequenceRecord::new(identifier, bases)
    }

    /// Decode a trace file's bytes and trim the result. The identifier is
    /// the file name without its extension.
    pub fn load<D: ChromatogramDecoder + ?Sized>(
        &self,
        decoder: &D,
        file_name: &str,
        data: &[u8],
    ) -> Result<SequenceRecord> {
        let identifier = identifier_from_file_name(file_name);
        let trace = decoder.decode(&identifier, data)?;
        let record = self.trim(trace);
        if record.is_empty() {
            tracing::warn!("{} has no bases left after trimming", file_name);
        }
        Ok(record)
    }
}

pub fn identifier_from_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string())
}
