use serde::{Deserialize, Serialize};

/// Identifier given to the user reference in every run.
pub const REFERENCE_ID: &str = "Reference_Sequence";

/// A trimmed read ready for alignment. Carries bases only, no qualities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub identifier: String,
    pub bases: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(identifier: impl Into<String>, bases: Vec<u8>) -> Self {
        Self {
            identifier: identifier.into(),
            bases,
        }
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Name of the FASTA file this record is written to, also the `File`
    /// column of the summary.
    pub fn fasta_file_name(&self) -> String {
        format!("{}.fasta", self.identifier)
    }

    pub fn header(&self) -> String {
        format!(">{}", self.identifier)
    }
}

/// The user-supplied reference. Built once per run, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSequence {
    record: SequenceRecord,
}

impl ReferenceSequence {
    /// Build the reference from free text. FASTA input contributes its
    /// first record's bases; anything else is taken as raw sequence.
    pub fn from_text(text: &str) -> crate::Result<Self> {
        let bases = if text.trim_start().starts_with('>') {
            crate::bio::fasta::parse_fasta_from_bytes(text.trim_start().as_bytes())?
                .into_iter()
                .next()
                .map(|seq| seq.bases)
                .unwrap_or_default()
        } else {
            text.bytes()
                .filter(|c| !c.is_ascii_whitespace())
                .map(|c| c.to_ascii_uppercase())
                .collect()
        };

        Ok(Self {
            record: SequenceRecord::new(REFERENCE_ID, bases),
        })
    }

    pub fn record(&self) -> &SequenceRecord {
        &self.record
    }

    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    pub fn bases(&self) -> &[u8] {
        &self.record.bases
    }
}
