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

//! Mapping of sample table rows to metadata.
//!
//! Each sample is one [Row] whose cells are keyed by a (feature name,
//! qualifier key) pair, taken from the two header lines of the sample table.
//! [map_row] splits a row into the metadata [Document] of the submission, a
//! [SequenceDescriptor] and a [SourceDescriptor].
//!
//! Reserved feature names:
//!   - `_` carries `_trad_submission_category` and `_file_path`.
//!   - `_sequence` carries `seq_names`, `seq_types`, `seq_topologies` and `seq_prefix`.
//!   - `source` carries the qualifiers of the source feature.
//!   - `-` marks columns that are ignored.
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::SubmissionCategory;
//! use mssmaker::metadata::{Document, Value};
//! use mssmaker::row::{map_row, Row};
//!
//! let mut row = Row::new();
//! row.insert("_", "_trad_submission_category", "GNM".into());
//! row.insert("_", "_file_path", "assembly.fa.gz".into());
//! row.insert("_sequence", "seq_names", "chromosome; pEC1".into());
//! row.insert("source", "organism", "Escherichia coli".into());
//! row.insert("DBLINK", "biosample", "SAMD00000001".into());
//!
//! let mapped = map_row(&row, &Document::new()).unwrap();
//!
//! assert_eq!(mapped.category, SubmissionCategory::GNM);
//! assert_eq!(mapped.sequence.names, vec!["chromosome".to_string(), "pEC1".to_string()]);
//! assert_eq!(mapped.source["organism"], "Escherichia coli");
//!
//! let Value::Object(dblink) = &mapped.document["DBLINK"] else { panic!() };
//! assert_eq!(dblink["biosample"], Value::List(vec!["SAMD00000001".to_string()]));
//! ```
//!
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::SubmissionCategory;
use crate::errors::InputError;
use crate::errors::StructuralError;
use crate::metadata::CATEGORY_KEY;
use crate::metadata::COMMENT;
use crate::metadata::Document;
use crate::metadata::Qualifiers;
use crate::metadata::REFERENCE;
use crate::metadata::Value;

pub mod tsv;

type E = Box<dyn std::error::Error>;

/// Columns under this feature name are skipped.
pub const IGNORE_FEATURE: &str = "-";
/// Feature name of the control columns.
pub const CONTROL_FEATURE: &str = "_";
pub const FILE_PATH_KEY: &str = "_file_path";
/// Feature name of the per-sequence columns.
pub const SEQUENCE_FEATURE: &str = "_sequence";
pub const SOURCE_FEATURE: &str = "source";

const CROSS_REFERENCE_KEYS: [&str; 2] = ["biosample", "sequence read archive"];

/// Content of one table cell.
///
/// Spreadsheet readers may hand over dates as native values; everything read
/// from text is [Cell::Text].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Text(text) if text.is_empty())
    }

    pub fn to_text(&self) -> String {
        match self {
            Cell::Text(text) => text.clone(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
            Cell::Timestamp(timestamp) => timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Formats native dates as `YYYY-MM-DD`, dropping any time of day.
    pub fn to_date_text(&self) -> String {
        match self {
            Cell::Timestamp(timestamp) => timestamp.date().format("%Y-%m-%d").to_string(),
            other => other.to_text(),
        }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::Text(text.to_string())
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Cell::Text(text)
    }
}

/// One sample: cells keyed by (feature name, qualifier key) in column order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    cells: IndexMap<(String, String), Cell>,
}

impl Row {
    pub fn new() -> Self {
        Row::default()
    }

    pub fn insert(
        &mut self,
        feature: &str,
        qualifier: &str,
        cell: Cell,
    ) {
        self.cells.insert((feature.to_string(), qualifier.to_string()), cell);
    }

    pub fn get(
        &self,
        feature: &str,
        qualifier: &str,
    ) -> Option<&Cell> {
        self.cells.get(&(feature.to_string(), qualifier.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Cell)> {
        self.cells.iter().map(|((feature, qualifier), cell)| (feature.as_str(), qualifier.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Names, types and topologies of the sequences in one assembly.
///
/// The lists are parallel to the records of the FASTA file; see
/// [align_with_records](SequenceDescriptor::align_with_records).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SequenceDescriptor {
    pub names: Vec<String>,
    pub types: Vec<String>,
    pub topologies: Vec<String>,
    /// Prefix for generated entry names.
    pub prefix: Option<String>,
    /// Any other `_sequence` columns.
    pub other: IndexMap<String, String>,
}

impl SequenceDescriptor {
    pub fn set(
        &mut self,
        key: &str,
        value: &str,
    ) {
        match key {
            "seq_names" => self.names = split_fields(value, &[';', ',']),
            "seq_types" => self.types = split_fields(value, &[';', ',']),
            "seq_topologies" => self.topologies = split_fields(value, &[';', ',']),
            "seq_prefix" => self.prefix = Some(value.trim().to_string()),
            _ => { self.other.insert(key.to_string(), value.to_string()); },
        }
    }

    /// Checks the descriptor against the FASTA record ids.
    ///
    /// Missing sequence names default to `record_ids`.
    ///
    /// ## Errors
    ///
    /// Returns [StructuralError] unless there are as many names, types and
    /// topologies as records.
    pub fn align_with_records(
        &mut self,
        record_ids: &[String],
    ) -> Result<(), E> {
        if self.names.is_empty() {
            self.names = record_ids.to_vec();
        }
        let n_records = record_ids.len();
        if self.names.len() != n_records || self.types.len() != n_records || self.topologies.len() != n_records {
            return Err(Box::new(StructuralError::new(&format!(
                "the number of sequences is not consistent: {} records, {} seq_names, {} seq_types, {} seq_topologies",
                n_records, self.names.len(), self.types.len(), self.topologies.len()
            ))))
        }
        Ok(())
    }
}

/// Source feature qualifiers in column order.
pub type SourceDescriptor = IndexMap<String, String>;

/// Everything derived from one [Row].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappedRow {
    pub file_path: PathBuf,
    pub category: SubmissionCategory,
    pub document: Document,
    pub sequence: SequenceDescriptor,
    pub source: SourceDescriptor,
}

/// Splits on any of `delimiters` and trims the pieces. Empty pieces are kept,
/// so `chr;;p1` has three fields.
pub fn split_fields(
    value: &str,
    delimiters: &[char],
) -> Vec<String> {
    value.split(|c: char| delimiters.contains(&c))
        .map(|x| x.trim().to_string())
        .collect()
}

/// Splits on any of `delimiters`, trims the pieces and drops empty ones.
pub fn split_list(
    value: &str,
    delimiters: &[char],
) -> Vec<String> {
    value.split(|c: char| delimiters.contains(&c))
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .map(|x| x.to_string())
        .collect()
}

fn required_cell(
    row: &Row,
    qualifier: &str,
) -> Result<String, E> {
    match row.get(CONTROL_FEATURE, qualifier) {
        Some(cell) if !cell.is_empty() => Ok(cell.to_text().trim().to_string()),
        _ => Err(Box::new(InputError::new(&format!("column ({}, {}) is required", CONTROL_FEATURE, qualifier)))),
    }
}

/// Reads the submission category of `row`.
///
/// ## Errors
///
/// Returns [InputError] if the column is missing or empty and
/// [SchemaError](crate::errors::SchemaError) if the category is not
/// recognised.
pub fn row_category(
    row: &Row,
) -> Result<SubmissionCategory, E> {
    Ok(SubmissionCategory::from_str(&required_cell(row, CATEGORY_KEY)?)?)
}

fn push_comment(
    document: &mut Document,
    qualifier: &str,
    values: Vec<String>,
) -> Result<(), E> {
    let mut block = Qualifiers::new();
    block.insert(qualifier.to_string(), Value::List(values));

    let entry = document.entry(COMMENT.to_string()).or_insert_with(|| Value::Objects(Vec::new()));
    match entry {
        Value::Objects(blocks) => blocks.push(block),
        Value::List(items) if items.is_empty() => *entry = Value::Objects(vec![block]),
        Value::Object(existing) => {
            let existing = std::mem::take(existing);
            *entry = Value::Objects(vec![existing, block]);
        },
        _ => return Err(Box::new(StructuralError::new("COMMENT must hold a list of qualifier mappings"))),
    }
    Ok(())
}

fn set_qualifier(
    document: &mut Document,
    feature: &str,
    qualifier: &str,
    value: Value,
) -> Result<(), E> {
    let entry = document.entry(feature.to_string()).or_insert_with(|| {
        if feature == REFERENCE {
            Value::Objects(vec![Qualifiers::new()])
        } else {
            Value::Object(Qualifiers::new())
        }
    });
    if matches!(entry, Value::List(items) if items.is_empty()) {
        *entry = Value::Objects(vec![Qualifiers::new()]);
    }
    match entry {
        Value::Object(qualifiers) => {
            qualifiers.insert(qualifier.to_string(), value);
        },
        Value::Objects(blocks) => {
            if blocks.is_empty() {
                blocks.push(Qualifiers::new());
            }
            if let Some(last) = blocks.last_mut() {
                last.insert(qualifier.to_string(), value);
            }
        },
        _ => return Err(Box::new(StructuralError::new(&format!("feature '{}' does not hold qualifiers", feature)))),
    }
    Ok(())
}

/// Maps the cells of `row` on top of a copy of `base`.
///
/// `base` is expected to hold the schema defaults already, see
/// [prepare_row](crate::prepare_row). Cells then replace scalar defaults and
/// COMMENT cells are appended after the default COMMENT blocks.
///
/// Cell rules, first match wins:
///   1. `-` columns and empty cells are skipped.
///   2. `_sequence` columns go to the [SequenceDescriptor]; the name, type and
///      topology lists are split on `;` or `,`, keeping empty fields.
///   3. `source` columns go to the [SourceDescriptor]; a native date in
///      `collection_date` is written as `YYYY-MM-DD`.
///   4. `COMMENT` values are split on `;` and appended as a new COMMENT block.
///   5. `biosample` and `sequence read archive` values are split on `,` or `;`
///      into a list.
///   6. Everything else is stored as a single value, replacing earlier ones.
///
/// The category is also recorded in the document under
/// `_trad_submission_category`.
///
/// ## Errors
///
/// Returns [InputError] if the category or file path column is missing,
/// [SchemaError](crate::errors::SchemaError) if the category is not
/// recognised, and [StructuralError] if a cell targets a feature that does
/// not hold qualifiers.
pub fn map_row(
    row: &Row,
    base: &Document,
) -> Result<MappedRow, E> {
    let category = row_category(row)?;
    let file_path = PathBuf::from(required_cell(row, FILE_PATH_KEY)?);

    let mut document = base.clone();
    document.insert(CATEGORY_KEY.to_string(), Value::Scalar(category.as_str().to_string()));
    let mut sequence = SequenceDescriptor::default();
    let mut source = SourceDescriptor::new();

    for (feature, qualifier, cell) in row.iter() {
        if feature == IGNORE_FEATURE || feature == CONTROL_FEATURE || cell.is_empty() {
            continue
        }
        match feature {
            SEQUENCE_FEATURE => sequence.set(qualifier, &cell.to_text()),
            SOURCE_FEATURE => {
                let text = if qualifier == "collection_date" { cell.to_date_text() } else { cell.to_text() };
                source.insert(qualifier.to_string(), text);
            },
            COMMENT => push_comment(&mut document, qualifier, split_list(&cell.to_text(), &[';']))?,
            _ if CROSS_REFERENCE_KEYS.contains(&qualifier) => {
                let ids = split_list(&cell.to_text(), &[',', ';']);
                set_qualifier(&mut document, feature, qualifier, Value::List(ids))?;
            },
            _ => set_qualifier(&mut document, feature, qualifier, Value::Scalar(cell.to_text()))?,
        }
    }

    Ok(MappedRow{ file_path, category, document, sequence, source })
}

// Tests
#[cfg(test)]
mod tests {

    fn control_row(category: &str) -> super::Row {
        let mut row = super::Row::new();
        row.insert("_", "_trad_submission_category", category.into());
        row.insert("_", "_file_path", "genome.fa".into());
        row
    }

    #[test]
    fn map_row_skips_empty_and_ignored_cells() {
        use super::map_row;
        use crate::metadata::Document;

        let mut row = control_row("WGS");
        row.insert("-", "memo", "internal note".into());
        row.insert("SUBMITTER", "contact", "".into());

        let got = map_row(&row, &Document::new()).unwrap();

        let keys: Vec<&str> = got.document.keys().map(|x| x.as_str()).collect();
        assert_eq!(keys, vec!["_trad_submission_category"]);
    }

    #[test]
    fn empty_cell_does_not_override_base_value() {
        use super::map_row;
        use crate::metadata::{document_from_json, document_to_json};

        let base = document_from_json(&serde_json::json!({"SUBMITTER": {"contact": "Taro"}})).unwrap();
        let mut row = control_row("WGS");
        row.insert("SUBMITTER", "contact", "".into());
        row.insert("SUBMITTER", "email", "taro@example.org".into());

        let got = map_row(&row, &base).unwrap();

        assert_eq!(document_to_json(&got.document)["SUBMITTER"], serde_json::json!({"contact": "Taro", "email": "taro@example.org"}));
        assert_eq!(document_to_json(&base)["SUBMITTER"], serde_json::json!({"contact": "Taro"}));
    }

    #[test]
    fn comment_cells_become_separate_blocks() {
        use super::map_row;
        use crate::metadata::{Document, Value};

        let mut row = control_row("MAG");
        row.insert("COMMENT", "line", "first note; second note".into());
        row.insert("COMMENT", "remark", "third".into());

        let got = map_row(&row, &Document::new()).unwrap();

        let Value::Objects(blocks) = &got.document["COMMENT"] else { panic!("expected COMMENT blocks") };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["line"], Value::List(vec!["first note".to_string(), "second note".to_string()]));
        assert_eq!(blocks[1]["remark"], Value::List(vec!["third".to_string()]));
    }

    #[test]
    fn comment_cells_append_to_base_comments() {
        use super::map_row;
        use crate::metadata::{document_from_json, Value};

        let base = document_from_json(&serde_json::json!({"COMMENT": [{"line": ["from template"]}]})).unwrap();
        let mut row = control_row("MAG");
        row.insert("COMMENT", "line", "from row".into());

        let got = map_row(&row, &base).unwrap();

        let Value::Objects(blocks) = &got.document["COMMENT"] else { panic!("expected COMMENT blocks") };
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn cross_references_are_lists() {
        use super::map_row;
        use crate::metadata::{Document, Value};

        let mut row = control_row("WGS");
        row.insert("DBLINK", "biosample", "SAMD00000001; SAMD00000002,SAMD00000003".into());
        row.insert("DBLINK", "sequence read archive", "DRR000001".into());
        row.insert("DBLINK", "bioproject", "PRJDB00001".into());

        let got = map_row(&row, &Document::new()).unwrap();

        let Value::Object(dblink) = &got.document["DBLINK"] else { panic!("expected DBLINK qualifiers") };
        assert_eq!(dblink["biosample"], Value::List(vec!["SAMD00000001".to_string(), "SAMD00000002".to_string(), "SAMD00000003".to_string()]));
        assert_eq!(dblink["sequence read archive"], Value::List(vec!["DRR000001".to_string()]));
        assert_eq!(dblink["bioproject"], Value::Scalar("PRJDB00001".to_string()));
    }

    #[test]
    fn reference_cells_fill_last_entry() {
        use super::map_row;
        use crate::metadata::{document_from_json, Value};

        let base = document_from_json(&serde_json::json!({"REFERENCE": [{"title": "first"}, {"title": "second"}]})).unwrap();
        let mut row = control_row("GNM");
        row.insert("REFERENCE", "year", "2024".into());

        let got = map_row(&row, &base).unwrap();

        let Value::Objects(blocks) = &got.document["REFERENCE"] else { panic!("expected REFERENCE blocks") };
        assert!(!blocks[0].contains_key("year"));
        assert_eq!(blocks[1]["year"], Value::Scalar("2024".to_string()));
    }

    #[test]
    fn source_dates_are_normalized() {
        use super::{map_row, Cell};
        use crate::metadata::Document;
        use chrono::NaiveDate;

        let timestamp = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap().and_hms_opt(12, 30, 0).unwrap();
        let mut row = control_row("GNM");
        row.insert("source", "strain", "K-12".into());
        row.insert("source", "collection_date", Cell::Timestamp(timestamp));
        row.insert("source", "country", "Japan:Tokyo".into());

        let got = map_row(&row, &Document::new()).unwrap();

        let pairs: Vec<(&str, &str)> = got.source.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(pairs, vec![("strain", "K-12"), ("collection_date", "2023-07-01"), ("country", "Japan:Tokyo")]);

        let mut row = control_row("MAG");
        row.insert("source", "collection_date", Cell::Date(NaiveDate::from_ymd_opt(2019, 11, 30).unwrap()));

        let got = map_row(&row, &Document::new()).unwrap();

        assert_eq!(got.source["collection_date"], "2019-11-30");
    }

    #[test]
    fn sequence_columns() {
        use super::map_row;
        use crate::metadata::Document;

        let mut row = control_row("MAG");
        row.insert("_sequence", "seq_names", "chr;p1".into());
        row.insert("_sequence", "seq_types", "complete, plasmid".into());
        row.insert("_sequence", "seq_topologies", "circular;circular".into());
        row.insert("_sequence", "seq_prefix", "bin1".into());

        let got = map_row(&row, &Document::new()).unwrap().sequence;

        assert_eq!(got.names, vec!["chr".to_string(), "p1".to_string()]);
        assert_eq!(got.types, vec!["complete".to_string(), "plasmid".to_string()]);
        assert_eq!(got.topologies, vec!["circular".to_string(), "circular".to_string()]);
        assert_eq!(got.prefix, Some("bin1".to_string()));
    }

    #[test]
    fn sequence_columns_keep_empty_fields() {
        use super::map_row;
        use crate::errors::StructuralError;
        use crate::metadata::Document;

        let mut row = control_row("GNM");
        row.insert("_sequence", "seq_names", "chr;;p1".into());
        row.insert("_sequence", "seq_types", "complete;plasmid".into());
        row.insert("_sequence", "seq_topologies", "circular;linear".into());

        let mut got = map_row(&row, &Document::new()).unwrap().sequence;

        assert_eq!(got.names, vec!["chr".to_string(), "".to_string(), "p1".to_string()]);
        let aligned = got.align_with_records(&["a".to_string(), "b".to_string()]);
        assert!(aligned.unwrap_err().is::<StructuralError>());
    }

    #[test]
    fn missing_control_columns_are_input_errors() {
        use super::{map_row, Row};
        use crate::errors::InputError;
        use crate::metadata::Document;

        let mut row = Row::new();
        row.insert("_", "_file_path", "genome.fa".into());
        let no_category = map_row(&row, &Document::new());

        let mut row = Row::new();
        row.insert("_", "_trad_submission_category", "WGS".into());
        let no_path = map_row(&row, &Document::new());

        assert!(no_category.unwrap_err().is::<InputError>());
        assert!(no_path.unwrap_err().is::<InputError>());
    }

    #[test]
    fn unknown_category_is_schema_error() {
        use super::map_row;
        use crate::errors::SchemaError;
        use crate::metadata::Document;

        let got = map_row(&control_row("draft_genome"), &Document::new());

        assert!(got.unwrap_err().is::<SchemaError>());
    }

    #[test]
    fn align_with_records_defaults_names() {
        use super::SequenceDescriptor;

        let mut descriptor = SequenceDescriptor{ types: vec!["complete".to_string()], topologies: vec!["circular".to_string()], ..Default::default() };
        descriptor.align_with_records(&["contig_1".to_string()]).unwrap();

        assert_eq!(descriptor.names, vec!["contig_1".to_string()]);
    }

    #[test]
    fn align_with_records_count_mismatch() {
        use super::SequenceDescriptor;
        use crate::errors::StructuralError;

        let mut descriptor = SequenceDescriptor{
            names: vec!["chr".to_string()],
            types: vec!["complete".to_string(), "plasmid".to_string()],
            topologies: vec!["circular".to_string(), "linear".to_string()],
            ..Default::default()
        };
        let got = descriptor.align_with_records(&["a".to_string(), "b".to_string()]);

        assert!(got.unwrap_err().is::<StructuralError>());
    }
}
