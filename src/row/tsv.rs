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
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::errors::InputError;
use crate::row::Cell;
use crate::row::Row;

type E = Box<dyn std::error::Error>;

/// Parse a sample table
///
/// Reads tab-separated text with two header lines: feature names on the
/// first and qualifier keys on the second. An empty feature name continues
/// the feature to its left, as merged header cells do when a spreadsheet is
/// exported. Cells missing from the end of a line are read as empty.
///
/// Returns one [Row] per data line.
///
pub fn read_tsv<R: Read>(
    conn: &mut R,
) -> Result<Vec<Row>, E> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(conn);

    let mut records = reader.records();
    let features = records.next().ok_or_else(|| InputError::new("sample table has no header lines"))??;
    let qualifiers = records.next().ok_or_else(|| InputError::new("sample table has only one header line"))??;

    let mut columns: Vec<(String, String)> = Vec::with_capacity(qualifiers.len());
    let mut current_feature = String::new();
    for (idx, qualifier) in qualifiers.iter().enumerate() {
        let feature = features.get(idx).map(|x| x.trim()).unwrap_or_default();
        if !feature.is_empty() {
            current_feature = feature.to_string();
        }
        columns.push((current_feature.clone(), qualifier.trim().to_string()));
    }

    let mut rows: Vec<Row> = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|x| x.trim().is_empty()) {
            continue
        }
        let mut row = Row::new();
        columns.iter().enumerate().for_each(|(idx, (feature, qualifier))| {
            let text = record.get(idx).unwrap_or_default();
            row.insert(feature, qualifier, Cell::Text(text.to_string()));
        });
        rows.push(row);
    }

    Ok(rows)
}

/// Reads a sample table from a file; see [read_tsv].
pub fn read_tsv_file(
    path: &Path,
) -> Result<Vec<Row>, E> {
    let mut conn = std::fs::File::open(path).map_err(|e| {
        InputError::new(&format!("cannot open sample table {}: {}", path.display(), e))
    })?;
    read_tsv(&mut conn)
}
