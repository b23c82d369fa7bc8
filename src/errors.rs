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

//! Error types returned by the conversion pipeline.
//!
//! All fallible functions in mssmaker return `Box<dyn std::error::Error>`.
//! The four types here mark the failure classes a caller may want to tell
//! apart, eg. with [is](https://doc.rust-lang.org/std/error/trait.Error.html#method.is):
//!
//! ```rust
//! use mssmaker::errors::StructuralError;
//!
//! let err: Box<dyn std::error::Error> = Box::new(StructuralError::new("empty COMMON block"));
//! assert!(err.is::<StructuralError>());
//! ```
//!
//! Any failure aborts the sample (row) being processed.

/// Invalid or ambiguous tool configuration, eg. gap annotation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    pub message: String,
}

impl ConfigurationError {
    pub fn new(message: &str) -> Self {
        ConfigurationError{ message: message.to_string() }
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigurationError {}

/// The schema has no branch for a category or contains a broken `$ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: &str) -> Self {
        SchemaError{ message: message.to_string() }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Schema error: {}", self.message)
    }
}

impl std::error::Error for SchemaError {}

/// The data does not have the shape the MSS table requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralError {
    pub message: String,
}

impl StructuralError {
    pub fn new(message: &str) -> Self {
        StructuralError{ message: message.to_string() }
    }
}

impl std::fmt::Display for StructuralError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Structural error: {}", self.message)
    }
}

impl std::error::Error for StructuralError {}

/// An input could not be read, parsed or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    pub message: String,
}

impl InputError {
    pub fn new(message: &str) -> Self {
        InputError{ message: message.to_string() }
    }
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Input error: {}", self.message)
    }
}

impl std::error::Error for InputError {}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn display_prefixes_error_class() {
        use super::SchemaError;

        let got = SchemaError::new("no branch for category 'GNM'").to_string();
        let expected = "Schema error: no branch for category 'GNM'".to_string();

        assert_eq!(got, expected);
    }

    #[test]
    fn boxed_error_keeps_its_type() {
        use super::ConfigurationError;
        use super::InputError;

        let err: Box<dyn std::error::Error> = Box::new(ConfigurationError::new("please specify gap_type"));

        assert!(err.is::<ConfigurationError>());
        assert!(!err.is::<InputError>());
    }
}
