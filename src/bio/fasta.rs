use crate::bio::sequence::SequenceRecord;
use crate::TracealignError;
use nom::{
    bytes::complete::{tag, take_till},
    character::complete::{line_ending, not_line_ending},
    combinator::{map, opt},
    sequence::preceded,
    IResult,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Residues per sequence line when writing FASTA.
const LINE_WIDTH: usize = 60;

/// Parse a FASTA header line, returning the identifier and the optional
/// description. Descriptions are dropped downstream.
fn parse_header(input: &[u8]) -> IResult<&[u8], (&str, Option<&str>)> {
    let (input, _) = tag(b">")(input)?;
    let (input, id) = map(
        take_till(|c: u8| c == b' ' || c == b'\t' || c == b'\n' || c == b'\r'),
        |s| std::str::from_utf8(s).unwrap_or(""),
    )(input)?;
    let (input, description) = opt(preceded(
        tag(b" "),
        map(not_line_ending, |s| std::str::from_utf8(s).unwrap_or("")),
    ))(input)?;
    let (input, _) = opt(line_ending)(input)?;
    Ok((input, (id, description)))
}

/// Parse sequence lines until next header or EOF
fn parse_sequence(input: &[u8]) -> IResult<&[u8], Vec<u8>> {
    let mut sequence = Vec::new();
    let mut remaining = input;

    while !remaining.is_empty() && remaining[0] != b'>' {
        let (rest, line) =
            take_till::<_, _, nom::error::Error<_>>(|c: u8| c == b'\n' || c == b'\r')(remaining)?;
        let (rest, _) = opt(line_ending)(rest)?;

        for &c in line {
            if !c.is_ascii_whitespace() {
                sequence.push(c.to_ascii_uppercase());
            }
        }

        remaining = rest;
    }

    Ok((remaining, sequence))
}

/// Parse FASTA from bytes
pub fn parse_fasta_from_bytes(data: &[u8]) -> Result<Vec<SequenceRecord>, TracealignError> {
    let mut records = Vec::new();
    let mut remaining = data;

    while !remaining.is_empty() {
        while !remaining.is_empty() && remaining[0].is_ascii_whitespace() {
            remaining = &remaining[1..];
        }

        if remaining.is_empty() {
            break;
        }

        if remaining[0] != b'>' {
            return Err(TracealignError::Parse(
                "FASTA record must start with '>'".to_string(),
            ));
        }

        let (rest, (id, _description)) = parse_header(remaining)
            .map_err(|_| TracealignError::Parse("Failed to parse FASTA header".to_string()))?;
        let (rest, bases) = parse_sequence(rest)
            .map_err(|_| TracealignError::Parse("Failed to parse FASTA sequence".to_string()))?;

        records.push(SequenceRecord::new(id, bases));
        remaining = rest;
    }

    Ok(records)
}

/// Render a single record as a FASTA document. This is the query text sent
/// to the remote service.
pub fn to_fasta_string(record: &SequenceRecord) -> String {
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_fasta_to_writer(&mut buffer, std::slice::from_ref(record));
    String::from_utf8_lossy(&buffer).to_string()
}

/// Write records to a FASTA file
pub fn write_fasta<P: AsRef<Path>>(path: P, records: &[SequenceRecord]) -> Result<(), TracealignError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    write_fasta_to_writer(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

/// Write records to any writer
fn write_fasta_to_writer<W: Write>(writer: &mut W, records: &[SequenceRecord]) -> Result<(), TracealignError> {
    for record in records {
        writeln!(writer, "{}", record.header())?;

        for chunk in record.bases.chunks(LINE_WIDTH) {
            writeln!(writer, "{}", String::from_utf8_lossy(chunk))?;
        }
    }
    Ok(())
}
