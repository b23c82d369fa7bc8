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

//! Nested metadata documents.
//!
//! A [Document] maps feature names (`DBLINK`, `SUBMITTER`, `REFERENCE`,
//! `COMMENT`, `ST_COMMENT`, ...) to a [Value]. Features are normally
//! [Value::Object] (qualifier key to value) or, for `REFERENCE` and
//! `COMMENT`, [Value::Objects]. Qualifier values are [Value::Scalar] or
//! [Value::List].
//!
//! Key order is insertion order and is carried through to the MSS output.
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::metadata::{document_from_json, Value};
//!
//! let json = serde_json::json!({
//!     "DBLINK": { "biosample": ["SAMD00000001"] },
//!     "REFERENCE": [ { "title": "Genome of E. coli" } ],
//! });
//! let document = document_from_json(&json).unwrap();
//!
//! let Value::Object(dblink) = &document["DBLINK"] else { panic!() };
//! assert_eq!(dblink["biosample"], Value::List(vec!["SAMD00000001".to_string()]));
//! assert!(matches!(document["REFERENCE"], Value::Objects(_)));
//! ```
//!
use std::path::Path;

use indexmap::IndexMap;

use crate::errors::InputError;

type E = Box<dyn std::error::Error>;

/// Prefix marking internal keys that are never written to the MSS table.
pub const INTERNAL_PREFIX: &str = "_";
/// Document key holding the submission category of a row.
pub const CATEGORY_KEY: &str = "_trad_submission_category";

pub const DBLINK: &str = "DBLINK";
pub const REFERENCE: &str = "REFERENCE";
pub const COMMENT: &str = "COMMENT";
pub const ST_COMMENT: &str = "ST_COMMENT";

/// Qualifiers of a single feature block.
pub type Qualifiers = IndexMap<String, Value>;

/// Feature name to feature value.
pub type Document = IndexMap<String, Value>;

/// A metadata value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
    Object(Qualifiers),
    Objects(Vec<Qualifiers>),
}

impl Default for Value {
    fn default() -> Self {
        Value::Object(Qualifiers::new())
    }
}

impl Value {
    /// Converts a JSON value.
    ///
    /// Strings become [Value::Scalar]; numbers and booleans are stored in their
    /// JSON text form and `null` as an empty string. Arrays consisting only of
    /// objects become [Value::Objects], all other arrays (including empty ones)
    /// [Value::List].
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Object(map) => Value::Object(qualifiers_from_json(map)),
            serde_json::Value::Array(items) => {
                if !items.is_empty() && items.iter().all(|item| item.is_object()) {
                    Value::Objects(items.iter().filter_map(|item| item.as_object().map(qualifiers_from_json)).collect())
                } else {
                    Value::List(items.iter().map(scalar_text).collect())
                }
            },
            other => Value::Scalar(scalar_text(other)),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Scalar(text) => serde_json::Value::String(text.clone()),
            Value::List(items) => serde_json::Value::Array(items.iter().map(|x| serde_json::Value::String(x.clone())).collect()),
            Value::Object(qualifiers) => serde_json::Value::Object(qualifiers_to_json(qualifiers)),
            Value::Objects(blocks) => serde_json::Value::Array(blocks.iter().map(|x| serde_json::Value::Object(qualifiers_to_json(x))).collect()),
        }
    }
}

fn scalar_text(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::String(text) => text.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn qualifiers_from_json(
    map: &serde_json::Map<String, serde_json::Value>,
) -> Qualifiers {
    map.iter().map(|(key, value)| (key.clone(), Value::from_json(value))).collect()
}

fn qualifiers_to_json(
    qualifiers: &Qualifiers,
) -> serde_json::Map<String, serde_json::Value> {
    qualifiers.iter().map(|(key, value)| (key.clone(), value.to_json())).collect()
}

/// Converts a JSON object into a [Document].
///
/// ## Errors
///
/// Returns [InputError] if `json` is not an object.
pub fn document_from_json(
    json: &serde_json::Value,
) -> Result<Document, E> {
    match json {
        serde_json::Value::Object(map) => Ok(qualifiers_from_json(map)),
        _ => Err(Box::new(InputError::new("metadata must be a JSON object keyed by feature name"))),
    }
}

pub fn document_to_json(
    document: &Document,
) -> serde_json::Value {
    serde_json::Value::Object(qualifiers_to_json(document))
}

/// Reads the common metadata (submitter, reference, ...) from a JSON file.
pub fn load_metadata(
    path: &Path,
) -> Result<Document, E> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        InputError::new(&format!("cannot read metadata file {}: {}", path.display(), e))
    })?;
    let json: serde_json::Value = serde_json::from_str(&contents).map_err(|e| {
        InputError::new(&format!("cannot parse metadata file {}: {}", path.display(), e))
    })?;
    document_from_json(&json)
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn from_json_keeps_key_order() {
        use super::document_from_json;

        let json: serde_json::Value = serde_json::from_str(r#"{"SUBMITTER": {}, "DBLINK": {}, "COMMENT": []}"#).unwrap();
        let document = document_from_json(&json).unwrap();

        let got: Vec<&str> = document.keys().map(|x| x.as_str()).collect();
        let expected = vec!["SUBMITTER", "DBLINK", "COMMENT"];

        assert_eq!(got, expected);
    }

    #[test]
    fn from_json_stringifies_non_string_scalars() {
        use super::Value;

        let json = serde_json::json!({"year": 2024, "public": true, "note": null});
        let Value::Object(got) = Value::from_json(&json) else { panic!("expected object") };

        assert_eq!(got["year"], Value::Scalar("2024".to_string()));
        assert_eq!(got["public"], Value::Scalar("true".to_string()));
        assert_eq!(got["note"], Value::Scalar(String::new()));
    }

    #[test]
    fn from_json_distinguishes_array_kinds() {
        use super::Value;

        assert_eq!(Value::from_json(&serde_json::json!([])), Value::List(vec![]));
        assert_eq!(Value::from_json(&serde_json::json!(["a", "b"])), Value::List(vec!["a".to_string(), "b".to_string()]));
        assert!(matches!(Value::from_json(&serde_json::json!([{"title": "x"}])), Value::Objects(ref x) if x.len() == 1));
    }

    #[test]
    fn document_from_json_rejects_arrays() {
        use super::document_from_json;
        use crate::errors::InputError;

        let got = document_from_json(&serde_json::json!([1, 2]));

        assert!(got.unwrap_err().is::<InputError>());
    }

    #[test]
    fn to_json_inverts_from_json() {
        use super::{document_from_json, document_to_json};

        let json = serde_json::json!({
            "SUBMITTER": {"ab_name": ["Tanizawa,Y.", "Fujisawa,T."], "contact": "Yasuhiro Tanizawa"},
            "REFERENCE": [{"title": "Draft genome"}],
        });

        let got = document_to_json(&document_from_json(&json).unwrap());

        assert_eq!(got, json);
    }

    #[test]
    fn load_metadata_from_file() {
        use super::{load_metadata, Value};
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"SUBMITTER": {"contact": "Taro"}, "DBLINK": {"bioproject": "PRJDB00001"}}"#).unwrap();

        let got = load_metadata(file.path()).unwrap();

        let keys: Vec<&str> = got.keys().map(|x| x.as_str()).collect();
        assert_eq!(keys, vec!["SUBMITTER", "DBLINK"]);
        let Value::Object(dblink) = &got["DBLINK"] else { panic!("expected DBLINK qualifiers") };
        assert_eq!(dblink["bioproject"], Value::Scalar("PRJDB00001".to_string()));
    }

    #[test]
    fn load_metadata_invalid_json() {
        use super::load_metadata;
        use crate::errors::InputError;
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(load_metadata(file.path()).unwrap_err().is::<InputError>());
    }
}
