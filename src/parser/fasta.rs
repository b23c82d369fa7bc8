// mssmaker: Genome assembly and metadata conversion to MSS format.
//
// Copyright 2025 mssmaker contributors.
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::io::Cursor;
use std::io::Read;
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::SequenceRecord;
use crate::errors::InputError;

type E = Box<dyn std::error::Error>;

/// Parse FASTA records
///
/// Reads all records from `conn`. The id of a record is the first word of
/// its header line; the rest of the header is dropped.
///
/// Input without any records returns an empty vector.
///
/// ## Usage
///
/// ```rust
/// use mssmaker::parser::fasta::read_fasta_from;
/// use std::io::Cursor;
///
/// let mut input: Cursor<Vec<u8>> = Cursor::new(b">chr1 Escherichia coli\nACGT\nNNAC\n>p1\nTTGA\n".to_vec());
/// let records = read_fasta_from(&mut input).unwrap();
///
/// assert_eq!(records[0].id, "chr1");
/// assert_eq!(records[0].seq, b"ACGTNNAC".to_vec());
/// assert_eq!(records[1].id, "p1");
/// ```
///
pub fn read_fasta_from<R: Read>(
    conn: &mut R,
) -> Result<Vec<SequenceRecord>, E> {
    let mut contents: Vec<u8> = Vec::new();
    conn.read_to_end(&mut contents)?;
    if contents.iter().all(|x| x.is_ascii_whitespace()) {
        return Ok(Vec::new())
    }

    let mut reader = needletail::parse_fastx_reader(Cursor::new(contents))
        .map_err(|e| InputError::new(&format!("cannot parse FASTA: {}", e)))?;

    let mut records: Vec<SequenceRecord> = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| InputError::new(&format!("cannot parse FASTA record: {}", e)))?;
        let header = String::from_utf8_lossy(record.id()).to_string();
        let id = header.split_whitespace().next().unwrap_or_default().to_string();
        records.push(SequenceRecord{ id, seq: record.seq().to_vec() });
    }

    Ok(records)
}

/// Reads a FASTA file, decompressing it first if the name ends in `.gz`.
pub fn read_fasta(
    path: &Path,
) -> Result<Vec<SequenceRecord>, E> {
    let file = std::fs::File::open(path).map_err(|e| {
        InputError::new(&format!("cannot open FASTA file {}: {}", path.display(), e))
    })?;
    let is_gz = path.extension().is_some_and(|x| x == "gz");
    if is_gz {
        let mut conn = MultiGzDecoder::new(file);
        read_fasta_from(&mut conn)
    } else {
        let mut conn = file;
        read_fasta_from(&mut conn)
    }
}
