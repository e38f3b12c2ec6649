//! Reader for Applied Biosystems ABIF trace files (`.ab1`).
//!
//! Only the tags needed to recover base calls are read: `PBAS` (called bases,
//! number 2 is the edited call set, number 1 the original) and `PCON`
//! (per-base quality). The layout is a big-endian header followed by a flat
//! directory of 28-byte entries.

use crate::{Result, TracealignError};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Cursor;

const MAGIC: &[u8; 4] = b"ABIF";
const ROOT_ENTRY_OFFSET: u64 = 6;
const DIR_ENTRY_SIZE: usize = 28;

/// Output of a chromatogram decoder before trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTrace {
    pub identifier: String,
    pub bases: Vec<u8>,
    pub qualities: Vec<u8>,
}

impl DecodedTrace {
    pub fn new(identifier: impl Into<String>, bases: Vec<u8>) -> Self {
        Self {
            identifier: identifier.into(),
            bases,
            qualities: Vec::new(),
        }
    }
}

/// Turns a binary trace into base calls.
pub trait ChromatogramDecoder {
    fn decode(&self, identifier: &str, data: &[u8]) -> Result<DecodedTrace>;
}

#[derive(Debug, Clone)]
struct DirEntry {
    name: [u8; 4],
    number: i32,
    data_size: usize,
    data_offset: usize,
    inline_data: [u8; 4],
}

/// Decoder for the ABIF container used by ABI sequencers.
#[derive(Debug, Default, Clone, Copy)]
pub struct AbiDecoder;

impl AbiDecoder {
    pub fn new() -> Self {
        Self
    }

    fn read_entry(cursor: &mut Cursor<&[u8]>) -> std::io::Result<DirEntry> {
        let mut name = [0u8; 4];
        std::io::Read::read_exact(cursor, &mut name)?;
        let number = cursor.read_i32::<BigEndian>()?;
        let _element_type = cursor.read_i16::<BigEndian>()?;
        let _element_size = cursor.read_i16::<BigEndian>()?;
        let _num_elements = cursor.read_i32::<BigEndian>()?;
        let data_size = cursor.read_i32::<BigEndian>()?.max(0) as usize;
        let mut inline_data = [0u8; 4];
        std::io::Read::read_exact(cursor, &mut inline_data)?;
        let data_offset = u32::from_be_bytes(inline_data) as usize;
        let _data_handle = cursor.read_i32::<BigEndian>()?;

        Ok(DirEntry {
            name,
            number,
            data_size,
            data_offset,
            inline_data,
        })
    }

    fn directory(data: &[u8]) -> Result<Vec<DirEntry>> {
        if data.len() < 4 || &data[..4] != MAGIC {
            return Err(TracealignError::Decode(
                "file should start with ABIF".to_string(),
            ));
        }

        let mut cursor = Cursor::new(data);
        cursor.set_position(ROOT_ENTRY_OFFSET);
        let root = Self::read_entry(&mut cursor)
            .map_err(|e| TracealignError::Decode(format!("truncated ABIF header: {}", e)))?;

        // The header's size is untrusted; never read past the end of the data.
        let available = data.len().saturating_sub(root.data_offset) / DIR_ENTRY_SIZE;
        let count = root.data_size / DIR_ENTRY_SIZE;
        if count > available {
            return Err(TracealignError::Decode(format!(
                "ABIF directory claims {} entries but only {} fit in the file",
                count, available
            )));
        }
        let mut entries = Vec::with_capacity(count);
        cursor.set_position(root.data_offset as u64);
        for i in 0..count {
            let entry = Self::read_entry(&mut cursor).map_err(|e| {
                TracealignError::Decode(format!("truncated ABIF directory at entry {}: {}", i, e))
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn entry_data<'a>(data: &'a [u8], entry: &'a DirEntry) -> Result<&'a [u8]> {
        if entry.data_size <= 4 {
            return Ok(&entry.inline_data[..entry.data_size]);
        }
        let end = entry
            .data_offset
            .checked_add(entry.data_size)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                TracealignError::Decode(format!(
                    "tag {}{} points past end of file",
                    String::from_utf8_lossy(&entry.name),
                    entry.number
                ))
            })?;
        Ok(&data[entry.data_offset..end])
    }

    fn find<'a>(entries: &'a [DirEntry], name: &[u8; 4], number: i32) -> Option<&'a DirEntry> {
        entries.iter().find(|e| &e.name == name && e.number == number)
    }
}

impl ChromatogramDecoder for AbiDecoder {
    fn decode(&self, identifier: &str, data: &[u8]) -> Result<DecodedTrace> {
        let entries = Self::directory(data)?;

        let bases_entry = Self::find(&entries, b"PBAS", 2)
            .or_else(|| Self::find(&entries, b"PBAS", 1))
            .ok_or_else(|| TracealignError::Decode(format!("{} has no PBAS base calls", identifier)))?;
        let bases = Self::entry_data(data, bases_entry)?.to_vec();

        let qualities = match Self::find(&entries, b"PCON", 2) {
            Some(entry) => Self::entry_data(data, entry)?.to_vec(),
            None => Vec::new(),
        };

        tracing::debug!("Decoded {} bases from {}", bases.len(), identifier);

        Ok(DecodedTrace {
            identifier: identifier.to_string(),
            bases,
            qualities,
        })
    }
}

/// Build a minimal ABIF image from `(tag, number, data)` triples.
#[doc(hidden)]
pub fn build_abif(tags: &[(&[u8; 4], i32, &[u8])]) -> Vec<u8> {
    let header_len = 34usize;
    let mut payload = Vec::new();
    let mut directory = Vec::new();

    for (name, number, bytes) in tags {
        directory.extend_from_slice(&name[..]);
        directory.extend_from_slice(&number.to_be_bytes());
        directory.extend_from_slice(&2i16.to_be_bytes());
        directory.extend_from_slice(&1i16.to_be_bytes());
        directory.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
        directory.extend_from_slice(&(bytes.len() as i32).to_be_bytes());
        if bytes.len() <= 4 {
            let mut inline = [0u8; 4];
            inline[..bytes.len()].copy_from_slice(bytes);
            directory.extend_from_slice(&inline);
        } else {
            let offset = header_len + payload.len();
            directory.extend_from_slice(&(offset as u32).to_be_bytes());
            payload.extend_from_slice(bytes);
        }
        directory.extend_from_slice(&0i32.to_be_bytes());
    }

    let dir_offset = header_len + payload.len();
    let mut out = Vec::with_capacity(dir_offset + directory.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&101u16.to_be_bytes());
    out.extend_from_slice(b"tdir");
    out.extend_from_slice(&1i32.to_be_bytes());
    out.extend_from_slice(&1023i16.to_be_bytes());
    out.extend_from_slice(&(DIR_ENTRY_SIZE as i16).to_be_bytes());
    out.extend_from_slice(&(tags.len() as i32).to_be_bytes());
    out.extend_from_slice(&(directory.len() as i32).to_be_bytes());
    out.extend_from_slice(&(dir_offset as u32).to_be_bytes());
    out.extend_from_slice(&0i32.to_be_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&directory);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_prefers_edited_base_calls() {
        let data = build_abif(&[
            (b"PBAS", 1, &b"AAAAAAAAAA"[..]),
            (b"PBAS", 2, &b"ACGTACGTAC"[..]),
            (b"PCON", 2, &[30u8; 10][..]),
            (b"SMPL", 1, &b"\x05well1"[..]),
        ]);

        let trace = AbiDecoder::new().decode("A", &data).unwrap();
        assert_eq!(trace.identifier, "A");
        assert_eq!(trace.bases, &b"ACGTACGTAC"[..]);
        assert_eq!(trace.qualities, vec![30u8; 10]);
    }

    #[test]
    fn test_decode_falls_back_to_original_calls() {
        let data = build_abif(&[(b"PBAS", 1, &b"GGGGCCCC"[..])]);
        let trace = AbiDecoder::new().decode("B", &data).unwrap();
        assert_eq!(trace.bases, b"GGGGCCCC");
        assert!(trace.qualities.is_empty());
    }

    #[test]
    fn test_inline_short_data() {
        let data = build_abif(&[(b"PBAS", 2, &b"ACG"[..])]);
        let trace = AbiDecoder::new().decode("C", &data).unwrap();
        assert_eq!(trace.bases, b"ACG");
    }

    #[test]
    fn test_rejects_non_abif() {
        let err = AbiDecoder::new().decode("bad", b"GIF89a....").unwrap_err();
        assert!(matches!(err, TracealignError::Decode(_)));
    }

    #[test]
    fn test_oversized_directory_rejected() {
        let mut data = build_abif(&[(b"PBAS", 2, &b"ACGTACGT"[..])]);
        // Root entry data size lives at bytes 22..26.
        data[22..26].copy_from_slice(&i32::MAX.to_be_bytes());

        let err = AbiDecoder::new().decode("E", &data).unwrap_err();
        assert!(matches!(err, TracealignError::Decode(ref msg) if msg.contains("only 1 fit")));
    }

    #[test]
    fn test_missing_base_calls() {
        let data = build_abif(&[(b"PCON", 2, &[20u8; 8][..])]);
        let err = AbiDecoder::new().decode("D", &data).unwrap_err();
        assert!(err.to_string().contains("PBAS"));
    }
}
