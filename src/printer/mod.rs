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

//! Printers for the MSS output files.
//!
//! [write_annotation] formats [AnnotationRow]s as the tab-separated `.ann`
//! file and [write_fasta] formats the renamed [SequenceRecord]s as the `.fa`
//! file that accompanies it.
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::{AnnotationRow, SequenceRecord};
//! use mssmaker::printer::{write_annotation, write_fasta};
//! use std::io::Cursor;
//!
//! let mut first = AnnotationRow::feature("DBLINK", "", "bioproject", "PRJDB00001");
//! first.entry = "COMMON".to_string();
//! let rows = vec![first, AnnotationRow::qualifier("biosample", "SAMD00000001")];
//!
//! let mut ann: Cursor<Vec<u8>> = Cursor::new(Vec::new());
//! write_annotation(&rows, &mut ann).unwrap();
//!
//! let mut expected: Vec<u8> = Vec::new();
//! expected.append(&mut b"COMMON\tDBLINK\t\tbioproject\tPRJDB00001\n".to_vec());
//! expected.append(&mut b"\t\t\tbiosample\tSAMD00000001\n".to_vec());
//! assert_eq!(ann.get_ref(), &expected);
//!
//! let records = vec![SequenceRecord{ id: "chr".to_string(), seq: b"ACGT".to_vec() }];
//! let mut fa: Cursor<Vec<u8>> = Cursor::new(Vec::new());
//! write_fasta(&records, &mut fa).unwrap();
//!
//! assert_eq!(fa.get_ref(), &b">chr\nACGT\n//\n".to_vec());
//! ```
//!
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::AnnotationRow;
use crate::SequenceRecord;
use crate::errors::InputError;

type E = Box<dyn std::error::Error>;

/// Sequence characters per line in `.fa` output.
pub const FASTA_LINE_WIDTH: usize = 60;

/// Record separator of the MSS sequence file.
pub const RECORD_TERMINATOR: &[u8] = b"//\n";

/// Writes one line per row.
pub fn write_annotation<W: Write>(
    rows: &[AnnotationRow],
    conn: &mut W,
) -> Result<(), E> {
    for row in rows {
        let mut line = row.to_line();
        line += "\n";
        conn.write_all(line.as_bytes())?;
    }
    conn.flush()?;
    Ok(())
}

/// Writes each record as FASTA wrapped at [FASTA_LINE_WIDTH], followed by a `//` line.
pub fn write_fasta<W: Write>(
    records: &[SequenceRecord],
    conn: &mut W,
) -> Result<(), E> {
    for record in records {
        conn.write_all(b">")?;
        conn.write_all(record.id.as_bytes())?;
        conn.write_all(b"\n")?;
        for chunk in record.seq.chunks(FASTA_LINE_WIDTH) {
            conn.write_all(chunk)?;
            conn.write_all(b"\n")?;
        }
        conn.write_all(RECORD_TERMINATOR)?;
    }
    conn.flush()?;
    Ok(())
}

fn create_file(
    path: &Path,
) -> Result<BufWriter<File>, E> {
    let file = File::create(path).map_err(|e| {
        InputError::new(&format!("cannot create {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Writes `<prefix>.ann` and `<prefix>.fa` into `out_dir`, creating the
/// directory if needed. Existing files are overwritten.
///
/// Returns the paths of the two files.
pub fn write_outputs(
    out_dir: &Path,
    prefix: &str,
    rows: &[AnnotationRow],
    records: &[SequenceRecord],
) -> Result<(PathBuf, PathBuf), E> {
    std::fs::create_dir_all(out_dir).map_err(|e| {
        InputError::new(&format!("cannot create output directory {}: {}", out_dir.display(), e))
    })?;

    let ann_path = out_dir.join(format!("{}.ann", prefix));
    let fa_path = out_dir.join(format!("{}.fa", prefix));

    write_annotation(rows, &mut create_file(&ann_path)?)?;
    write_fasta(records, &mut create_file(&fa_path)?)?;

    Ok((ann_path, fa_path))
}
