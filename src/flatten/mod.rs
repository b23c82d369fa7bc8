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

//! Flattening of metadata documents into MSS rows.
//!
//! Each feature becomes a block of [AnnotationRow]s: the first row of the
//! block carries the feature name, the following rows only a qualifier key
//! and value. A list-valued qualifier produces one row per item.
//!
//! `REFERENCE` and `COMMENT` hold several blocks; every block is written
//! separately and repeats the feature name on its first row. `ST_COMMENT`
//! qualifiers are written with `tagset_id` first and the rest sorted by key.
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::flatten::flatten_common;
//! use mssmaker::metadata::document_from_json;
//!
//! let document = document_from_json(&serde_json::json!({
//!     "_trad_submission_category": "WGS",
//!     "DBLINK": { "bioproject": "PRJDB00001", "biosample": ["SAMD00000001", "SAMD00000002"] },
//!     "COMMENT": [ { "line": ["first note"] }, { "line": ["second note"] } ],
//! })).unwrap();
//!
//! let lines: Vec<String> = flatten_common(&document).unwrap().iter().map(|row| row.to_line()).collect();
//!
//! assert_eq!(lines, vec![
//!     "COMMON\tDBLINK\t\tbioproject\tPRJDB00001",
//!     "\t\t\tbiosample\tSAMD00000001",
//!     "\t\t\tbiosample\tSAMD00000002",
//!     "\tCOMMENT\t\tline\tfirst note",
//!     "\tCOMMENT\t\tline\tsecond note",
//! ]);
//! ```
//!
use crate::AnnotationRow;
use crate::errors::StructuralError;
use crate::metadata::Document;
use crate::metadata::INTERNAL_PREFIX;
use crate::metadata::Qualifiers;
use crate::metadata::ST_COMMENT;
use crate::metadata::Value;

type E = Box<dyn std::error::Error>;

/// Entry name of the rows that apply to the whole submission.
pub const COMMON_ENTRY: &str = "COMMON";

/// `ST_COMMENT` qualifier that is always written first.
pub const ST_COMMENT_PINNED_KEY: &str = "tagset_id";

/// Rows for one qualifier: one row for a scalar, one row per item for a list.
pub fn flatten_qualifier(
    key: &str,
    value: &Value,
) -> Result<Vec<AnnotationRow>, E> {
    match value {
        Value::Scalar(text) => Ok(vec![AnnotationRow::qualifier(key, text)]),
        Value::List(items) => Ok(items.iter().map(|item| AnnotationRow::qualifier(key, item)).collect()),
        Value::Object(_) | Value::Objects(_) => Err(Box::new(StructuralError::new(
            &format!("qualifier '{}' holds nested mappings, which MSS cannot represent", key)
        ))),
    }
}

/// Orders `ST_COMMENT` keys: `tagset_id` first, the rest sorted.
pub fn sort_st_comment_keys<'a>(
    keys: impl Iterator<Item = &'a str>,
) -> Vec<&'a str> {
    let (mut pinned, mut rest): (Vec<&str>, Vec<&str>) = keys.partition(|key| *key == ST_COMMENT_PINNED_KEY);
    rest.sort_unstable();
    pinned.append(&mut rest);
    pinned
}

fn flatten_block(
    name: &str,
    qualifiers: &Qualifiers,
) -> Result<Vec<AnnotationRow>, E> {
    let mut rows: Vec<AnnotationRow> = Vec::new();
    if name == ST_COMMENT {
        for key in sort_st_comment_keys(qualifiers.keys().map(|x| x.as_str())) {
            rows.extend(flatten_qualifier(key, &qualifiers[key])?);
        }
    } else {
        for (key, value) in qualifiers {
            rows.extend(flatten_qualifier(key, value)?);
        }
    }
    if let Some(first) = rows.first_mut() {
        first.feature = name.to_string();
    }
    Ok(rows)
}

/// Rows for one feature.
///
/// ## Errors
///
/// Returns [StructuralError] if the feature value is a bare scalar or list,
/// or if a qualifier holds a nested mapping.
pub fn flatten_feature(
    name: &str,
    value: &Value,
) -> Result<Vec<AnnotationRow>, E> {
    match value {
        Value::Object(qualifiers) => flatten_block(name, qualifiers),
        Value::Objects(blocks) => {
            let mut rows: Vec<AnnotationRow> = Vec::new();
            for block in blocks {
                rows.extend(flatten_block(name, block)?);
            }
            Ok(rows)
        },
        Value::List(items) if items.is_empty() => Ok(Vec::new()),
        Value::Scalar(_) | Value::List(_) => Err(Box::new(StructuralError::new(
            &format!("feature '{}' must hold qualifier mappings", name)
        ))),
    }
}

/// Rows for every feature of `document` in document order.
///
/// Features whose name starts with `_` are internal and skipped.
pub fn flatten(
    document: &Document,
) -> Result<Vec<AnnotationRow>, E> {
    let mut rows: Vec<AnnotationRow> = Vec::new();
    for (name, value) in document {
        if name.starts_with(INTERNAL_PREFIX) {
            continue
        }
        rows.extend(flatten_feature(name, value)?);
    }
    Ok(rows)
}

/// Rows of the COMMON block: [flatten] with `COMMON` in the entry column of
/// the first row.
///
/// ## Errors
///
/// Returns [StructuralError] if the document produces no rows; the COMMON
/// block must at least carry the BioProject and BioSample links.
pub fn flatten_common(
    document: &Document,
) -> Result<Vec<AnnotationRow>, E> {
    let mut rows = flatten(document)?;
    match rows.first_mut() {
        Some(first) => first.entry = COMMON_ENTRY.to_string(),
        None => return Err(Box::new(StructuralError::new("the COMMON block is empty"))),
    }
    Ok(rows)
}
