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

//! The `source` feature of each entry.
//!
//! The `@@[field]@@` placeholders in `ff_definition` and `submitter_seqid`
//! are filled in by the submission tool that reads the MSS files.
//!
use crate::AnnotationRow;
use crate::SubmissionCategory;
use crate::row::SourceDescriptor;

/// Location of a source feature spanning the whole entry.
pub const SOURCE_LOCATION: &str = "1..E";

pub const SUBMITTER_SEQID_PLACEHOLDER: &str = "@@[entry]@@";

/// Kind of sequence given in the `seq_types` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceType {
    Complete,
    NearlyComplete,
    Plasmid,
    Other,
}

impl SequenceType {
    /// Reads the full or single-letter form; anything else is [SequenceType::Other].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|x| x.trim()) {
            Some("c") | Some("complete") => SequenceType::Complete,
            Some("n") | Some("nearly complete") | Some("nearly-complete") => SequenceType::NearlyComplete,
            Some("p") | Some("plasmid") => SequenceType::Plasmid,
            _ => SequenceType::Other,
        }
    }
}

pub fn is_circular(
    topology: Option<&str>,
) -> bool {
    matches!(topology.map(|x| x.trim()), Some("c") | Some("circular"))
}

/// Fixed part of a source feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTemplate {
    pub mol_type: &'static str,
    pub ff_definition: &'static str,
    pub submitter_seqid: bool,
    pub environmental_sample: bool,
    pub plasmid: bool,
}

/// Looks up the source feature template of a category and sequence type.
///
/// The sequence type only matters for the single-entry categories.
pub fn source_template(
    category: SubmissionCategory,
    seq_type: SequenceType,
) -> SourceTemplate {
    let template = |ff_definition, submitter_seqid, environmental_sample, plasmid| {
        SourceTemplate{ mol_type: "genomic DNA", ff_definition, submitter_seqid, environmental_sample, plasmid }
    };
    match (category, seq_type) {
        (SubmissionCategory::GNM, SequenceType::Complete) => template("@@[organism]@@ @@[strain]@@ DNA, complete genome", false, false, false),
        (SubmissionCategory::GNM, SequenceType::NearlyComplete) => template("@@[organism]@@ @@[strain]@@ DNA, nearly complete genome", false, false, false),
        (SubmissionCategory::GNM, SequenceType::Plasmid) => template("@@[organism]@@ @@[strain]@@ plasmid @@[plasmid]@@ DNA, complete sequence", false, false, true),
        (SubmissionCategory::GNM, SequenceType::Other) => template("@@[organism]@@ @@[strain]@@ DNA, @@[submitter_seqid]@@", true, false, false),
        (SubmissionCategory::MAG, SequenceType::Complete) => template("@@[organism]@@ @@[isolate]@@ DNA, complete genome", false, true, false),
        (SubmissionCategory::MAG, SequenceType::NearlyComplete) => template("@@[organism]@@ @@[isolate]@@ DNA, nearly complete genome", false, true, false),
        (SubmissionCategory::MAG, SequenceType::Plasmid) => template("@@[organism]@@ @@[isolate]@@ plasmid @@[plasmid]@@ DNA, complete sequence", false, true, true),
        (SubmissionCategory::MAG, SequenceType::Other) => template("@@[organism]@@ @@[isolate]@@ DNA, @@[submitter_seqid]@@", true, true, false),
        (SubmissionCategory::WGS, _) => template("@@[organism]@@ @@[strain]@@ DNA, @@[submitter_seqid]@@", true, false, false),
        (SubmissionCategory::MagWgs, _) => template("@@[organism]@@ @@[isolate]@@ DNA, @@[submitter_seqid]@@", true, true, false),
    }
}

/// Builds the source feature block of one entry.
///
/// For GNM and MAG the block belongs to the sequence `seq_name`: its name is
/// written to the entry column of the first row, preceded by a `TOPOLOGY`
/// row for circular sequences. For WGS and MAG-WGS the block is appended to
/// the COMMON block and is left unstamped.
///
/// The qualifiers in `source` follow the fixed rows in their own order.
///
/// ## Usage
///
/// ```rust
/// use mssmaker::SubmissionCategory;
/// use mssmaker::row::SourceDescriptor;
/// use mssmaker::source::build_source_feature;
///
/// let mut source = SourceDescriptor::new();
/// source.insert("organism".to_string(), "Escherichia coli".to_string());
///
/// let lines: Vec<String> = build_source_feature(SubmissionCategory::GNM, Some("chr"), Some("complete"), Some("circular"), &source)
///     .iter().map(|row| row.to_line()).collect();
///
/// assert_eq!(lines, vec![
///     "chr\tTOPOLOGY\t\tcircular\t",
///     "\tsource\t1..E\tmol_type\tgenomic DNA",
///     "\t\t\tff_definition\t@@[organism]@@ @@[strain]@@ DNA, complete genome",
///     "\t\t\torganism\tEscherichia coli",
/// ]);
/// ```
///
pub fn build_source_feature(
    category: SubmissionCategory,
    seq_name: Option<&str>,
    seq_type: Option<&str>,
    seq_topology: Option<&str>,
    source: &SourceDescriptor,
) -> Vec<AnnotationRow> {
    let template = source_template(category, SequenceType::parse(seq_type));

    let mut rows: Vec<AnnotationRow> = Vec::new();
    rows.push(AnnotationRow::feature("source", SOURCE_LOCATION, "mol_type", template.mol_type));
    rows.push(AnnotationRow::qualifier("ff_definition", template.ff_definition));
    if template.submitter_seqid {
        rows.push(AnnotationRow::qualifier("submitter_seqid", SUBMITTER_SEQID_PLACEHOLDER));
    }
    if template.environmental_sample {
        rows.push(AnnotationRow::qualifier("environmental_sample", ""));
    }
    if template.plasmid {
        rows.push(AnnotationRow::qualifier("plasmid", seq_name.unwrap_or_default()));
    }
    source.iter().for_each(|(key, value)| {
        rows.push(AnnotationRow::qualifier(key, value));
    });

    if category.is_per_sequence() {
        if is_circular(seq_topology) {
            rows.insert(0, AnnotationRow::feature("TOPOLOGY", "", "circular", ""));
        }
        rows[0].entry = seq_name.unwrap_or_default().to_string();
    }

    rows
}
