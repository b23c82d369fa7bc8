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

//! Category-specific views of the MSS JSON Schema and default filling.
//!
//! The MSS COMMON template schema is conditional: its `allOf` list holds one
//! `if`/`then` branch per submission category, guarded by
//! `if.properties._trad_submission_category.const`. [narrow_to_category]
//! collapses it to a [FlatSchema] for one category and [apply_defaults]
//! writes the declared `default` values into a metadata [Document].
//!
//! Only the schema features used by the template are supported: `default`,
//! `type: object` with nested `properties`, `type: array` with object
//! `items` (for `REFERENCE`), and `$ref` into `definitions`. Nothing is
//! validated.
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::SubmissionCategory;
//! use mssmaker::metadata::{Document, Value};
//! use mssmaker::schema::{apply_defaults, narrow_to_category};
//!
//! let schema = serde_json::json!({
//!     "definitions": {
//!         "submitter": { "type": "object", "properties": { "country": { "default": "Japan" } } }
//!     },
//!     "allOf": [
//!         {
//!             "if": { "properties": { "_trad_submission_category": { "const": "WGS" } } },
//!             "then": {
//!                 "properties": { "SUBMITTER": { "$ref": "#/definitions/submitter" } },
//!                 "required": ["SUBMITTER"]
//!             }
//!         }
//!     ]
//! });
//!
//! let flat = narrow_to_category(&schema, SubmissionCategory::WGS).unwrap();
//! let mut document = Document::new();
//! apply_defaults(&flat, &mut document).unwrap();
//!
//! let Value::Object(submitter) = &document["SUBMITTER"] else { panic!() };
//! assert_eq!(submitter["country"], Value::Scalar("Japan".to_string()));
//! ```
//!

pub mod fetch;

use crate::SubmissionCategory;
use crate::errors::SchemaError;
use crate::metadata::CATEGORY_KEY;
use crate::metadata::Document;
use crate::metadata::Qualifiers;
use crate::metadata::REFERENCE;
use crate::metadata::Value;

type E = Box<dyn std::error::Error>;

type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A schema reduced to a single submission category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlatSchema {
    pub properties: JsonMap,
    pub required: Vec<String>,
    /// Targets of `$ref` pointers.
    pub definitions: JsonMap,
}

fn branch_category(
    branch: &serde_json::Value,
) -> Option<&str> {
    branch.get("if")?
        .get("properties")?
        .get(CATEGORY_KEY)?
        .get("const")?
        .as_str()
}

fn string_list(
    json: Option<&serde_json::Value>,
) -> Vec<String> {
    json.and_then(|x| x.as_array())
        .map(|items| items.iter().filter_map(|x| x.as_str().map(|s| s.to_string())).collect())
        .unwrap_or_default()
}

/// Selects the `allOf` branches that apply to `category`.
///
/// Properties of the matching branches are merged on top of the top-level
/// `properties` (later branches win on key collisions) and their `required`
/// lists are concatenated. `schema` is not modified, so narrowing the same
/// schema twice gives equal results.
///
/// ## Errors
///
/// Returns [SchemaError] if no branch matches `category` or the result has no
/// properties.
pub fn narrow_to_category(
    schema: &serde_json::Value,
    category: SubmissionCategory,
) -> Result<FlatSchema, E> {
    let mut properties: JsonMap = schema.get("properties").and_then(|x| x.as_object()).cloned().unwrap_or_default();
    let mut required: Vec<String> = string_list(schema.get("required"));

    let branches = schema.get("allOf").and_then(|x| x.as_array()).map(|x| x.as_slice()).unwrap_or_default();
    let mut n_matched = 0;
    for branch in branches.iter().filter(|branch| branch_category(branch) == Some(category.as_str())) {
        n_matched += 1;
        if let Some(then) = branch.get("then") {
            if let Some(branch_properties) = then.get("properties").and_then(|x| x.as_object()) {
                branch_properties.iter().for_each(|(key, value)| {
                    properties.insert(key.clone(), value.clone());
                });
            }
            required.extend(string_list(then.get("required")));
        }
    }

    if n_matched == 0 {
        return Err(Box::new(SchemaError::new(&format!("no schema branch matches submission category '{}'", category))))
    }
    if properties.is_empty() {
        return Err(Box::new(SchemaError::new(&format!("schema for submission category '{}' declares no properties", category))))
    }

    let definitions: JsonMap = schema.get("definitions")
        .or_else(|| schema.get("$defs"))
        .and_then(|x| x.as_object())
        .cloned()
        .unwrap_or_default();

    Ok(FlatSchema{ properties, required, definitions })
}

fn definition_name(
    reference: &str,
) -> Result<&str, E> {
    let name = reference.strip_prefix("#/definitions/")
        .or_else(|| reference.strip_prefix("#/$defs/"));
    match name {
        Some(name) if !name.is_empty() && !name.contains('/') => Ok(name),
        _ => Err(Box::new(SchemaError::new(&format!("unsupported $ref '{}'", reference)))),
    }
}

// Follows `$ref` chains and returns the resolved schema with the names of the
// definitions that were visited.
fn resolve_with_trail(
    subschema: &JsonMap,
    definitions: &JsonMap,
) -> Result<(JsonMap, Vec<String>), E> {
    let mut resolved = subschema.clone();
    let mut trail: Vec<String> = Vec::new();
    while let Some(reference) = resolved.remove("$ref") {
        let reference = reference.as_str().ok_or_else(|| SchemaError::new("$ref must be a string"))?;
        let name = definition_name(reference)?;
        if trail.iter().any(|x| x == name) {
            return Err(Box::new(SchemaError::new(&format!("cyclic $ref to '{}'", name))))
        }
        let target = definitions.get(name)
            .and_then(|x| x.as_object())
            .ok_or_else(|| SchemaError::new(&format!("$ref to unknown definition '{}'", name)))?;

        let mut merged = target.clone();
        resolved.into_iter().for_each(|(key, value)| {
            merged.insert(key, value);
        });
        resolved = merged;
        trail.push(name.to_string());
    }
    Ok((resolved, trail))
}

/// Returns a copy of `subschema` with its `$ref` inlined.
///
/// Keys written next to the `$ref` override the keys of the referenced
/// definition. `definitions` is only read.
///
/// ## Errors
///
/// Returns [SchemaError] for references outside `#/definitions/`, unknown
/// targets and reference cycles.
pub fn resolve_ref(
    subschema: &JsonMap,
    definitions: &JsonMap,
) -> Result<JsonMap, E> {
    Ok(resolve_with_trail(subschema, definitions)?.0)
}

fn enter(
    trail: &mut Vec<String>,
    names: Vec<String>,
) -> Result<usize, E> {
    if let Some(name) = names.iter().find(|name| trail.contains(name)) {
        return Err(Box::new(SchemaError::new(&format!("self-referential definition '{}'", name))))
    }
    let depth = trail.len();
    trail.extend(names);
    Ok(depth)
}

fn object_properties(
    subschema: &JsonMap,
) -> Option<&JsonMap> {
    subschema.get("properties").and_then(|x| x.as_object())
}

fn is_type(
    subschema: &JsonMap,
    expected: &str,
) -> bool {
    subschema.get("type").and_then(|x| x.as_str()) == Some(expected)
}

fn apply_properties(
    properties: &JsonMap,
    target: &mut Qualifiers,
    definitions: &JsonMap,
    trail: &mut Vec<String>,
) -> Result<(), E> {
    for (property, subschema) in properties {
        let Some(subschema) = subschema.as_object() else { continue };
        let (subschema, names) = resolve_with_trail(subschema, definitions)?;
        let depth = enter(trail, names)?;

        if let Some(default) = subschema.get("default") {
            if !target.contains_key(property) {
                target.insert(property.clone(), Value::from_json(default));
            }
        }

        if is_type(&subschema, "object") {
            let entry = target.entry(property.clone()).or_insert_with(|| Value::Object(Qualifiers::new()));
            match (entry, object_properties(&subschema)) {
                (Value::Object(nested), Some(nested_properties)) => {
                    apply_properties(nested_properties, nested, definitions, trail)?;
                },
                (Value::Object(_), None) => (),
                (_, _) => log::warn!("'{}' is declared as an object but holds a different value, defaults not applied", property),
            }
        } else if is_type(&subschema, "array") && property == REFERENCE {
            let entry = target.entry(property.clone()).or_insert_with(|| Value::Objects(vec![Qualifiers::new()]));
            if matches!(entry, Value::List(items) if items.is_empty()) {
                *entry = Value::Objects(Vec::new());
            }
            if let (Value::Objects(blocks), Some(items)) = (entry, subschema.get("items").and_then(|x| x.as_object())) {
                let (items, item_names) = resolve_with_trail(items, definitions)?;
                let item_depth = enter(trail, item_names)?;
                if let (true, Some(item_properties)) = (is_type(&items, "object"), object_properties(&items)) {
                    for block in blocks.iter_mut() {
                        apply_properties(item_properties, block, definitions, trail)?;
                    }
                }
                trail.truncate(item_depth);
            }
        }

        trail.truncate(depth);
    }
    Ok(())
}

/// Fills `document` with the defaults declared in `schema`.
///
/// For every declared property:
///   - a `default` is inserted if the property is missing,
///   - `type: object` properties are created if missing and filled recursively,
///   - the `REFERENCE` array gets one empty entry if missing and every entry
///     is filled from the `items` schema.
///
/// Existing values are never overwritten, so applying the defaults again
/// leaves the document unchanged.
///
/// ## Errors
///
/// Returns [SchemaError] if a `$ref` cannot be resolved or definitions refer
/// back to themselves.
pub fn apply_defaults(
    schema: &FlatSchema,
    document: &mut Document,
) -> Result<(), E> {
    let mut trail: Vec<String> = Vec::new();
    apply_properties(&schema.properties, document, &schema.definitions, &mut trail)
}
