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
use std::path::Path;
use std::time::Duration;

use crate::errors::InputError;

type E = Box<dyn std::error::Error>;

/// Published MSS COMMON template schema.
pub const SCHEMA_URL: &str = "https://raw.githubusercontent.com/ddbj/template_generator_api/main/src/dev_schemas/MSS_COMMON_template.json";

/// File name the downloaded schema is cached under.
pub const SCHEMA_CACHE_FILE: &str = "MSS_COMMON_template.json";

fn parse_schema(
    contents: &str,
    origin: &str,
) -> Result<serde_json::Value, E> {
    let schema: serde_json::Value = serde_json::from_str(contents).map_err(|e| {
        InputError::new(&format!("cannot parse schema from {}: {}", origin, e))
    })?;
    if !schema.is_object() {
        return Err(Box::new(InputError::new(&format!("schema from {} is not a JSON object", origin))))
    }
    Ok(schema)
}

/// Reads a schema document from a local file.
pub fn load_schema(
    path: &Path,
) -> Result<serde_json::Value, E> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        InputError::new(&format!("cannot read schema file {}: {}", path.display(), e))
    })?;
    parse_schema(&contents, &path.display().to_string())
}

/// Downloads a schema document.
///
/// Makes a single attempt; any network or HTTP status failure is returned as
/// an [InputError].
pub fn fetch_schema_text(
    url: &str,
) -> Result<String, E> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| InputError::new(&format!("cannot build HTTP client: {}", e)))?;
    let response = client.get(url).send()
        .map_err(|e| InputError::new(&format!("cannot fetch schema from {}: {}", url, e)))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Box::new(InputError::new(&format!("cannot fetch schema from {}: HTTP {}", url, status))))
    }
    let body = response.text()
        .map_err(|e| InputError::new(&format!("cannot read schema response from {}: {}", url, e)))?;
    Ok(body)
}

pub fn fetch_schema(
    url: &str,
) -> Result<serde_json::Value, E> {
    parse_schema(&fetch_schema_text(url)?, url)
}

/// Reads the schema from `cache`, downloading it from `url` first if the
/// file does not exist.
pub fn load_or_fetch_schema(
    cache: &Path,
    url: &str,
) -> Result<serde_json::Value, E> {
    if cache.exists() {
        log::debug!("Reading cached schema from {}", cache.display());
        return load_schema(cache)
    }

    log::info!("Downloading schema from {}", url);
    let contents = fetch_schema_text(url)?;
    let schema = parse_schema(&contents, url)?;
    std::fs::write(cache, contents.as_bytes()).map_err(|e| {
        InputError::new(&format!("cannot write schema cache {}: {}", cache.display(), e))
    })?;
    log::info!("Schema cached at {}", cache.display());
    Ok(schema)
}
