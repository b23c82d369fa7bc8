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

//! mssmaker is a library and a command-line client for:
//!
//!   - Converting genome assemblies and their sample metadata to the MSS
//!     annotation format used for DDBJ submissions.
//!   - Filling in metadata defaults from the MSS COMMON template schema.
//!   - Annotating assembly gaps (runs of `N`) in the submitted sequences.
//!
//! The following submission categories are supported:
//!   - GNM: complete or nearly complete genomes, one entry per sequence.
//!   - MAG: metagenome-assembled genomes, one entry per sequence.
//!   - WGS: draft genomes, all sequences share the COMMON block.
//!   - MAG-WGS: draft metagenome-assembled genomes.
//!
//! ## Usage
//!
//! ### Command line
//!
//! ```text
//! mssmaker --tsv samples.tsv -m common.json -o mss/
//! ```
//!
//! Each line of the sample table produces two files in the output directory:
//! `<prefix>.ann` with the annotation rows and `<prefix>.fa` with the
//! renamed sequences. The prefix is built from the BioSample accessions and
//! the strain or isolate name of the sample.
//!
//! ### Rust API
//!
//! One sample is converted in three steps:
//!
//!   - [prepare_row]: applies the schema defaults to the common metadata and
//!     maps a [Row](row::Row) of the sample table on top of them.
//!   - [build_annotation]: produces the [AnnotationRow]s for the prepared
//!     sample and its sequences.
//!   - [write_outputs](printer::write_outputs): writes the `.ann` and `.fa` files.
//!
//! [create_mss] runs all three, reading the sequences from the FASTA file
//! named in the sample table.
//!
//! ## MSS format
//!
//! An `.ann` file has five tab-separated columns: entry, feature, location,
//! qualifier and value. The first row of a feature block carries the feature
//! name and the following rows only a qualifier and value. The entry column
//! is set on the first row of each entry; rows that apply to all entries
//! belong to the `COMMON` entry.
//!
use std::path::Path;
use std::path::PathBuf;

use chrono::NaiveDate;

use errors::ConfigurationError;
use errors::SchemaError;
use errors::StructuralError;
use gap::GapAnnotator;
use metadata::CATEGORY_KEY;
use metadata::DBLINK;
use metadata::Document;
use metadata::Value;
use row::MappedRow;
use row::Row;

pub mod errors;
pub mod flatten;
pub mod gap;
pub mod metadata;
pub mod parser;
pub mod printer;
pub mod row;
pub mod schema;
pub mod source;

type E = Box<dyn std::error::Error>;

/// Placeholder for samples without BioSample accessions in output file names.
pub const NO_BIOSAMPLE: &str = "NO_BIOSAMPLE";
/// Placeholder for samples without a strain or isolate in output file names.
pub const NO_IDENTIFIER: &str = "NO_IDENTIFIER";

/// Supported submission categories.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionCategory {
    GNM,
    MAG,
    WGS,
    MagWgs,
}

impl SubmissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionCategory::GNM => "GNM",
            SubmissionCategory::MAG => "MAG",
            SubmissionCategory::WGS => "WGS",
            SubmissionCategory::MagWgs => "MAG-WGS",
        }
    }

    /// GNM and MAG have one entry per sequence, WGS and MAG-WGS share one
    /// source feature between all sequences.
    pub fn is_per_sequence(&self) -> bool {
        matches!(self, SubmissionCategory::GNM | SubmissionCategory::MAG)
    }
}

impl std::fmt::Display for SubmissionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubmissionCategory {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "GNM" => Ok(SubmissionCategory::GNM),
            "MAG" => Ok(SubmissionCategory::MAG),
            "WGS" => Ok(SubmissionCategory::WGS),
            "MAG-WGS" => Ok(SubmissionCategory::MagWgs),
            legacy @ ("draft_genome" | "draft_mag" | "complete_genome" | "complete_mag") => Err(SchemaError::new(
                &format!("'{}' is a legacy submission category, use one of GNM, MAG, WGS, MAG-WGS", legacy)
            )),
            other => Err(SchemaError::new(&format!("'{}' is not a valid SubmissionCategory", other))),
        }
    }
}

/// One line of an `.ann` file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnnotationRow {
    /// Entry name; set on the first row of an entry only.
    pub entry: String,
    /// Feature name; set on the first row of a feature block only.
    pub feature: String,
    pub location: String,
    pub qualifier: String,
    pub value: String,
}

impl AnnotationRow {
    /// First row of a feature block.
    pub fn feature(
        feature: &str,
        location: &str,
        qualifier: &str,
        value: &str,
    ) -> Self {
        AnnotationRow{
            feature: feature.to_string(),
            location: location.to_string(),
            qualifier: qualifier.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    /// Continuation row of a feature block.
    pub fn qualifier(
        qualifier: &str,
        value: &str,
    ) -> Self {
        AnnotationRow{
            qualifier: qualifier.to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    /// Tab-separated columns without a line terminator.
    pub fn to_line(&self) -> String {
        [&self.entry, &self.feature, &self.location, &self.qualifier, &self.value]
            .map(|x| x.as_str())
            .join("\t")
    }
}

/// A sequence read from the FASTA file of a sample.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SequenceRecord {
    /// First word of the FASTA header; replaced by the entry name.
    pub id: String,
    pub seq: Vec<u8>,
}

/// Checks that `date` is a valid `YYYYMMDD` date.
///
/// ## Errors
///
/// Returns [ConfigurationError] if the format or the date is invalid.
pub fn validate_hold_date(
    date: &str,
) -> Result<String, E> {
    let date = date.trim();
    let is_digits = date.len() == 8 && date.bytes().all(|x| x.is_ascii_digit());
    if !is_digits || NaiveDate::parse_from_str(date, "%Y%m%d").is_err() {
        return Err(Box::new(ConfigurationError::new(&format!("hold date '{}' is not a valid YYYYMMDD date", date))))
    }
    Ok(date.to_string())
}

/// Fills in the schema defaults and maps one sample table row on top of them.
///
/// The base document is copied, the category of the row is recorded in it
/// and the defaults of the narrowed schema are applied before any cell is
/// mapped. Cells therefore replace scalar defaults, and COMMENT cells follow
/// the default COMMENT blocks. Features created by defaults come first in the
/// COMMON block.
///
/// `base_document` and `base_schema` are left untouched, so the same base
/// can be used for every row.
///
/// ## Usage
///
/// ```rust
/// use mssmaker::prepare_row;
/// use mssmaker::metadata::{document_from_json, document_to_json};
/// use mssmaker::row::Row;
///
/// let base = document_from_json(&serde_json::json!({"DBLINK": {"bioproject": "PRJDB00001"}})).unwrap();
/// let schema = serde_json::json!({
///     "allOf": [{
///         "if": { "properties": { "_trad_submission_category": { "const": "WGS" } } },
///         "then": { "properties": {
///             "DATA_TYPE": { "type": "object", "properties": { "DATA_TYPE": { "default": "WGS" } } }
///         } }
///     }]
/// });
///
/// let mut row = Row::new();
/// row.insert("_", "_trad_submission_category", "WGS".into());
/// row.insert("_", "_file_path", "contigs.fa".into());
///
/// let mapped = prepare_row(&row, &base, &schema).unwrap();
///
/// assert_eq!(document_to_json(&mapped.document)["DATA_TYPE"], serde_json::json!({"DATA_TYPE": "WGS"}));
/// ```
///
pub fn prepare_row(
    row: &Row,
    base_document: &Document,
    base_schema: &serde_json::Value,
) -> Result<MappedRow, E> {
    let category = row::row_category(row)?;
    let mut document = base_document.clone();
    document.insert(CATEGORY_KEY.to_string(), Value::Scalar(category.as_str().to_string()));

    let schema = schema::narrow_to_category(base_schema, category)?;
    schema::apply_defaults(&schema, &mut document)?;

    row::map_row(row, &document)
}

fn entry_name_width(
    n_records: usize,
) -> usize {
    n_records.to_string().len()
}

/// Builds the annotation rows of one sample and renames `records` to their
/// entry names.
///
/// The rows are, in order:
///   - the COMMON block from the metadata document,
///   - the `DATE` feature if `hold_date` is given,
///   - GNM and MAG: a source feature per record, each followed by the gaps
///     of that record,
///   - WGS and MAG-WGS: a single source feature, then the gaps of every
///     record starting a new entry.
///
/// GNM and MAG records take their names from the `seq_names` column, or keep
/// their FASTA ids if the column is empty. WGS and MAG-WGS records are named
/// `<seq_prefix>_<i>` if a prefix is given, with `i` counting from 1 and
/// padded to the width of the number of records.
///
/// Pass `None` as `gap_annotator` to leave out the assembly gaps.
///
/// ## Errors
///
/// Returns [StructuralError] if there are no records, if the number of
/// records does not match the sequence columns, or if the COMMON block is
/// empty.
///
/// ## Usage
///
/// ```rust
/// use mssmaker::{build_annotation, SequenceRecord};
/// use mssmaker::gap::GapAnnotator;
/// use mssmaker::metadata::Document;
/// use mssmaker::row::{map_row, Row};
///
/// let mut row = Row::new();
/// row.insert("_", "_trad_submission_category", "WGS".into());
/// row.insert("_", "_file_path", "contigs.fa".into());
/// row.insert("_sequence", "seq_prefix", "ctg".into());
/// row.insert("DBLINK", "bioproject", "PRJDB00001".into());
/// row.insert("source", "organism", "Escherichia coli".into());
/// let mapped = map_row(&row, &Document::new()).unwrap();
///
/// let mut records = vec![SequenceRecord{ id: "NODE_1".to_string(), seq: b"ACGTNNNNNNNNNNACGT".to_vec() }];
/// let gaps = GapAnnotator::default();
///
/// let lines: Vec<String> = build_annotation(&mapped, &mut records, Some(&gaps), None).unwrap()
///     .iter().map(|row| row.to_line()).collect();
///
/// assert_eq!(lines, vec![
///     "COMMON\tDBLINK\t\tbioproject\tPRJDB00001",
///     "\tsource\t1..E\tmol_type\tgenomic DNA",
///     "\t\t\tff_definition\t@@[organism]@@ @@[strain]@@ DNA, @@[submitter_seqid]@@",
///     "\t\t\tsubmitter_seqid\t@@[entry]@@",
///     "\t\t\torganism\tEscherichia coli",
///     "ctg_1\tassembly_gap\t5..14\testimated_length\tknown",
///     "\t\t\tgap_type\twithin scaffolds",
///     "\t\t\tlinkage_evidence\tpaired-ends",
/// ]);
/// assert_eq!(records[0].id, "ctg_1");
/// ```
///
pub fn build_annotation(
    mapped: &MappedRow,
    records: &mut [SequenceRecord],
    gap_annotator: Option<&GapAnnotator>,
    hold_date: Option<&str>,
) -> Result<Vec<AnnotationRow>, E> {
    if records.is_empty() {
        return Err(Box::new(StructuralError::new(&format!("no sequences in {}", mapped.file_path.display()))))
    }

    let mut rows = flatten::flatten_common(&mapped.document)?;
    if let Some(date) = hold_date {
        rows.push(AnnotationRow::feature("DATE", "", "hold_date", date));
    }

    if mapped.category.is_per_sequence() {
        let mut sequence = mapped.sequence.clone();
        let record_ids: Vec<String> = records.iter().map(|record| record.id.clone()).collect();
        sequence.align_with_records(&record_ids)?;

        for (idx, record) in records.iter_mut().enumerate() {
            let name = &sequence.names[idx];
            rows.extend(source::build_source_feature(
                mapped.category,
                Some(name.as_str()),
                Some(sequence.types[idx].as_str()),
                Some(sequence.topologies[idx].as_str()),
                &mapped.source,
            ));
            if let Some(annotator) = gap_annotator {
                let gaps = annotator.annotate(&record.seq, None);
                log::debug!("{} assembly gaps in {}", gaps.len() / 3, name);
                rows.extend(gaps);
            }
            record.id = name.clone();
        }
    } else {
        rows.extend(source::build_source_feature(mapped.category, None, None, None, &mapped.source));

        let width = entry_name_width(records.len());
        for (idx, record) in records.iter_mut().enumerate() {
            let name = match &mapped.sequence.prefix {
                Some(prefix) if !prefix.is_empty() => format!("{}_{:0width$}", prefix, idx + 1, width = width),
                _ => record.id.clone(),
            };
            if let Some(annotator) = gap_annotator {
                let gaps = annotator.annotate(&record.seq, Some(name.as_str()));
                log::debug!("{} assembly gaps in {}", gaps.len() / 3, name);
                rows.extend(gaps);
            }
            record.id = name;
        }
    }

    Ok(rows)
}

/// File name prefix for the outputs of a sample.
///
/// `<biosamples>_<identifier>` where `<biosamples>` are the BioSample
/// accessions joined by `,` and `<identifier>` is the strain, or the isolate
/// if there is no strain. Spaces are replaced by `_`.
///
/// ## Usage
///
/// ```rust
/// use mssmaker::output_prefix;
/// use mssmaker::metadata::Document;
/// use mssmaker::row::{map_row, Row};
///
/// let mut row = Row::new();
/// row.insert("_", "_trad_submission_category", "MAG".into());
/// row.insert("_", "_file_path", "bin.fa".into());
/// row.insert("DBLINK", "biosample", "SAMD00000001, SAMD00000002".into());
/// row.insert("source", "isolate", "bin 3".into());
///
/// let mapped = map_row(&row, &Document::new()).unwrap();
///
/// assert_eq!(output_prefix(&mapped), "SAMD00000001,SAMD00000002_bin_3");
/// ```
///
pub fn output_prefix(
    mapped: &MappedRow,
) -> String {
    let biosamples = match mapped.document.get(DBLINK) {
        Some(Value::Object(dblink)) => match dblink.get("biosample") {
            Some(Value::List(ids)) if !ids.is_empty() => ids.join(","),
            Some(Value::Scalar(id)) if !id.is_empty() => id.clone(),
            _ => NO_BIOSAMPLE.to_string(),
        },
        _ => NO_BIOSAMPLE.to_string(),
    };
    let identifier = ["strain", "isolate"].iter()
        .filter_map(|key| mapped.source.get(*key))
        .find(|value| !value.is_empty())
        .map(|value| value.as_str())
        .unwrap_or(NO_IDENTIFIER);
    format!("{}_{}", biosamples, identifier).replace(' ', "_")
}

/// Converts one sample table row to MSS files in `out_dir`.
///
/// Reads the FASTA file named in the row, builds the annotation with
/// [build_annotation] and writes `<prefix>.ann` and `<prefix>.fa`, see
/// [output_prefix]. Nothing is written if any step fails.
///
/// Returns the paths of the annotation and sequence files.
pub fn create_mss(
    row: &Row,
    base_document: &Document,
    base_schema: &serde_json::Value,
    out_dir: &Path,
    gap_annotator: Option<&GapAnnotator>,
    hold_date: Option<&str>,
) -> Result<(PathBuf, PathBuf), E> {
    let mapped = prepare_row(row, base_document, base_schema)?;
    log::info!("Converting {} assembly {}", mapped.category, mapped.file_path.display());

    let mut records = parser::fasta::read_fasta(&mapped.file_path)?;
    log::debug!("Read {} sequences from {}", records.len(), mapped.file_path.display());

    let rows = build_annotation(&mapped, &mut records, gap_annotator, hold_date)?;
    let prefix = output_prefix(&mapped);
    let (ann_path, fa_path) = printer::write_outputs(out_dir, &prefix, &rows, &records)?;
    log::info!("Wrote {} and {}", ann_path.display(), fa_path.display());

    Ok((ann_path, fa_path))
}

// Tests
#[cfg(test)]
mod tests {
    use crate::row::Row;

    fn sample_row(category: &str) -> Row {
        let mut row = Row::new();
        row.insert("_", "_trad_submission_category", category.into());
        row.insert("_", "_file_path", "assembly.fa".into());
        row.insert("DBLINK", "bioproject", "PRJDB00001".into());
        row.insert("DBLINK", "biosample", "SAMD00000001".into());
        row.insert("source", "organism", "Escherichia coli".into());
        row
    }

    #[test]
    fn submission_category_from_str() {
        use super::SubmissionCategory;
        use std::str::FromStr;

        assert_eq!(SubmissionCategory::from_str("MAG-WGS").unwrap(), SubmissionCategory::MagWgs);
        assert_eq!(SubmissionCategory::from_str(" GNM ").unwrap(), SubmissionCategory::GNM);
        assert_eq!(SubmissionCategory::MagWgs.to_string(), "MAG-WGS");
    }

    #[test]
    fn legacy_category_is_rejected() {
        use super::SubmissionCategory;
        use std::str::FromStr;

        let got = SubmissionCategory::from_str("complete_genome").unwrap_err();

        assert!(got.message.contains("legacy"));
    }

    #[test]
    fn annotation_row_to_line() {
        use super::AnnotationRow;

        let mut row = AnnotationRow::feature("source", "1..E", "mol_type", "genomic DNA");
        row.entry = "chr".to_string();

        assert_eq!(row.to_line(), "chr\tsource\t1..E\tmol_type\tgenomic DNA");
        assert_eq!(AnnotationRow::qualifier("strain", "K-12").to_line(), "\t\t\tstrain\tK-12");
    }

    #[test]
    fn validate_hold_date_formats() {
        use super::validate_hold_date;
        use crate::errors::ConfigurationError;

        assert_eq!(validate_hold_date("20251231").unwrap(), "20251231");
        assert!(validate_hold_date("2025-12-31").unwrap_err().is::<ConfigurationError>());
        assert!(validate_hold_date("20250230").unwrap_err().is::<ConfigurationError>());
    }

    #[test]
    fn wgs_single_record_with_gap() {
        use super::{build_annotation, SequenceRecord};
        use crate::gap::{GapAnnotator, GapLength, GapType, LinkageEvidence};
        use crate::metadata::Document;
        use crate::row::map_row;

        let mapped = map_row(&sample_row("WGS"), &Document::new()).unwrap();
        let mut seq = vec![b'A'; 1000];
        seq[100..115].fill(b'N');
        let mut records = vec![SequenceRecord{ id: "contig_1".to_string(), seq }];
        let annotator = GapAnnotator::new(10, LinkageEvidence::PairedEnds, GapType::Auto, GapLength::Auto).unwrap();

        let got = build_annotation(&mapped, &mut records, Some(&annotator), None).unwrap();

        let source_idx = got.iter().position(|row| row.feature == "source").unwrap();
        assert_eq!(got[source_idx].qualifier, "mol_type");
        assert_eq!(got[source_idx].value, "genomic DNA");

        let gap: Vec<String> = got.iter().skip_while(|row| row.feature != "assembly_gap").map(|row| row.to_line()).collect();
        assert_eq!(gap, vec![
            "contig_1\tassembly_gap\t101..115\testimated_length\tknown",
            "\t\t\tgap_type\twithin scaffolds",
            "\t\t\tlinkage_evidence\tpaired-ends",
        ]);
        assert!(gap.len() < got.len() && got.iter().position(|row| row.feature == "assembly_gap").unwrap() > source_idx);
    }

    #[test]
    fn mag_descriptor_count_mismatch() {
        use super::{build_annotation, SequenceRecord};
        use crate::errors::StructuralError;
        use crate::metadata::Document;
        use crate::row::map_row;

        let mut row = sample_row("MAG");
        row.insert("_sequence", "seq_names", "chr".into());
        row.insert("_sequence", "seq_types", "complete;plasmid".into());
        row.insert("_sequence", "seq_topologies", "circular;linear".into());
        let mapped = map_row(&row, &Document::new()).unwrap();
        let mut records = vec![
            SequenceRecord{ id: "a".to_string(), seq: b"ACGT".to_vec() },
            SequenceRecord{ id: "b".to_string(), seq: b"ACGT".to_vec() },
        ];

        let got = build_annotation(&mapped, &mut records, None, None);

        assert!(got.unwrap_err().is::<StructuralError>());
    }

    #[test]
    fn gnm_entries_are_renamed_and_stamped() {
        use super::{build_annotation, SequenceRecord};
        use crate::gap::GapAnnotator;
        use crate::metadata::Document;
        use crate::row::map_row;

        let mut row = sample_row("GNM");
        row.insert("_sequence", "seq_names", "chromosome;pEC1".into());
        row.insert("_sequence", "seq_types", "complete;plasmid".into());
        row.insert("_sequence", "seq_topologies", "circular;linear".into());
        let mapped = map_row(&row, &Document::new()).unwrap();
        let mut records = vec![
            SequenceRecord{ id: "tig1".to_string(), seq: b"ACGTNNNNNNNNNNNNACGT".to_vec() },
            SequenceRecord{ id: "tig2".to_string(), seq: b"ACGT".to_vec() },
        ];

        let got = build_annotation(&mapped, &mut records, Some(&GapAnnotator::default()), Some("20260101")).unwrap();

        let entries: Vec<(&str, &str)> = got.iter()
            .filter(|row| !row.entry.is_empty())
            .map(|row| (row.entry.as_str(), row.feature.as_str()))
            .collect();
        assert_eq!(entries, vec![("COMMON", "DBLINK"), ("chromosome", "TOPOLOGY"), ("pEC1", "source")]);

        let date = got.iter().position(|row| row.feature == "DATE").unwrap();
        assert_eq!(got[date].value, "20260101");
        assert_eq!(got[date + 1].feature, "TOPOLOGY");

        let gap = got.iter().find(|row| row.feature == "assembly_gap").unwrap();
        assert_eq!(gap.location, "5..16");
        assert!(gap.entry.is_empty());

        assert_eq!(records[0].id, "chromosome");
        assert_eq!(records[1].id, "pEC1");
    }

    #[test]
    fn gnm_names_default_to_record_ids() {
        use super::{build_annotation, SequenceRecord};
        use crate::metadata::Document;
        use crate::row::map_row;

        let mut row = sample_row("GNM");
        row.insert("_sequence", "seq_types", "complete".into());
        row.insert("_sequence", "seq_topologies", "linear".into());
        let mapped = map_row(&row, &Document::new()).unwrap();
        let mut records = vec![SequenceRecord{ id: "NC_000913".to_string(), seq: b"ACGT".to_vec() }];

        let got = build_annotation(&mapped, &mut records, None, None).unwrap();

        assert!(got.iter().any(|row| row.entry == "NC_000913" && row.feature == "source"));
    }

    #[test]
    fn wgs_prefix_names_are_padded() {
        use super::{build_annotation, SequenceRecord};
        use crate::metadata::Document;
        use crate::row::map_row;

        let mut row = sample_row("MAG-WGS");
        row.insert("_sequence", "seq_prefix", "bin1".into());
        let mapped = map_row(&row, &Document::new()).unwrap();
        let mut records: Vec<SequenceRecord> = (0..12).map(|idx| SequenceRecord{ id: format!("k141_{}", idx), seq: b"ACGT".to_vec() }).collect();

        build_annotation(&mapped, &mut records, None, None).unwrap();

        assert_eq!(records[0].id, "bin1_01");
        assert_eq!(records[11].id, "bin1_12");
    }

    #[test]
    fn wgs_without_prefix_keeps_ids() {
        use super::{build_annotation, SequenceRecord};
        use crate::metadata::Document;
        use crate::row::map_row;

        let mapped = map_row(&sample_row("WGS"), &Document::new()).unwrap();
        let mut records = vec![SequenceRecord{ id: "NODE_7".to_string(), seq: b"ACGT".to_vec() }];

        build_annotation(&mapped, &mut records, None, None).unwrap();

        assert_eq!(records[0].id, "NODE_7");
    }

    #[test]
    fn empty_fasta_is_structural_error() {
        use super::build_annotation;
        use crate::errors::StructuralError;
        use crate::metadata::Document;
        use crate::row::map_row;

        let mapped = map_row(&sample_row("WGS"), &Document::new()).unwrap();

        let got = build_annotation(&mapped, &mut [], None, None);

        assert!(got.unwrap_err().is::<StructuralError>());
    }

    // One COMMENT cell is one block, its `;` pieces are `line` rows of that
    // block. Separate blocks come from separate cells or from defaults.
    #[test]
    fn comment_cell_pieces_share_one_block() {
        use super::{build_annotation, SequenceRecord};
        use crate::metadata::Document;
        use crate::row::map_row;

        let mut row = sample_row("WGS");
        row.insert("COMMENT", "line", "first note; second note".into());
        let mapped = map_row(&row, &Document::new()).unwrap();
        let mut records = vec![SequenceRecord{ id: "c1".to_string(), seq: b"ACGT".to_vec() }];

        let got = build_annotation(&mapped, &mut records, None, None).unwrap();

        let start = got.iter().position(|row| row.feature == "COMMENT").unwrap();
        assert_eq!(got[start].to_line(), "\tCOMMENT\t\tline\tfirst note");
        assert_eq!(got[start + 1].to_line(), "\t\t\tline\tsecond note");
    }

    #[test]
    fn output_prefix_defaults() {
        use super::output_prefix;
        use crate::metadata::Document;
        use crate::row::{map_row, Row};

        let mut row = Row::new();
        row.insert("_", "_trad_submission_category", "WGS".into());
        row.insert("_", "_file_path", "contigs.fa".into());
        let mapped = map_row(&row, &Document::new()).unwrap();

        assert_eq!(output_prefix(&mapped), "NO_BIOSAMPLE_NO_IDENTIFIER");
    }

    #[test]
    fn prepare_row_keeps_base_untouched() {
        use super::prepare_row;
        use crate::metadata::{document_from_json, document_to_json};

        let base = document_from_json(&serde_json::json!({"DBLINK": {"bioproject": "PRJDB00001"}})).unwrap();
        let schema = serde_json::json!({
            "allOf": [{
                "if": { "properties": { "_trad_submission_category": { "const": "GNM" } } },
                "then": { "properties": {
                    "DATA_TYPE": { "type": "object", "properties": { "DATA_TYPE": { "default": "GNM" } } }
                } }
            }]
        });

        let first = prepare_row(&sample_row("GNM"), &base, &schema).unwrap();
        let second = prepare_row(&sample_row("GNM"), &base, &schema).unwrap();

        assert_eq!(first.document, second.document);
        assert_eq!(document_to_json(&base), serde_json::json!({"DBLINK": {"bioproject": "PRJDB00001"}}));
    }

    #[test]
    fn prepare_row_maps_cells_over_defaults() {
        use super::prepare_row;
        use crate::metadata::{Document, Value};

        let schema = serde_json::json!({
            "allOf": [{
                "if": { "properties": { "_trad_submission_category": { "const": "WGS" } } },
                "then": { "properties": {
                    "ST_COMMENT": { "type": "object", "properties": { "tagset_id": { "default": "Genome-Assembly-Data" } } },
                    "DBLINK": { "type": "object", "properties": { "bioproject": { "default": "PRJDB99999" } } },
                    "COMMENT": { "type": "array", "default": [{ "line": ["template note"] }] }
                } }
            }]
        });
        let mut row = Row::new();
        row.insert("_", "_trad_submission_category", "WGS".into());
        row.insert("_", "_file_path", "contigs.fa".into());
        row.insert("DBLINK", "bioproject", "PRJDB00001".into());
        row.insert("DBLINK", "biosample", "SAMD00000001".into());
        row.insert("COMMENT", "line", "row note".into());

        let got = prepare_row(&row, &Document::new(), &schema).unwrap();

        let keys: Vec<&str> = got.document.keys().map(|x| x.as_str()).collect();
        assert_eq!(keys, vec!["_trad_submission_category", "ST_COMMENT", "DBLINK", "COMMENT"]);

        let Value::Object(dblink) = &got.document["DBLINK"] else { panic!("expected DBLINK qualifiers") };
        assert_eq!(dblink["bioproject"], Value::Scalar("PRJDB00001".to_string()));

        let Value::Objects(blocks) = &got.document["COMMENT"] else { panic!("expected COMMENT blocks") };
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0]["line"], Value::List(vec!["template note".to_string()]));
        assert_eq!(blocks[1]["line"], Value::List(vec!["row note".to_string()]));
    }

    #[test]
    fn create_mss_writes_outputs() {
        use super::create_mss;
        use crate::metadata::Document;
        use crate::row::Row;

        let dir = tempfile::tempdir().unwrap();
        let fasta = dir.path().join("contigs.fa");
        std::fs::write(&fasta, b">NODE_1 length=8\nACGTACGT\n").unwrap();

        let mut row = Row::new();
        row.insert("_", "_trad_submission_category", "WGS".into());
        row.insert("_", "_file_path", fasta.to_string_lossy().to_string().into());
        row.insert("DBLINK", "biosample", "SAMD00000001".into());
        row.insert("source", "strain", "K 12".into());
        let schema = serde_json::json!({
            "allOf": [{
                "if": { "properties": { "_trad_submission_category": { "const": "WGS" } } },
                "then": { "properties": { "DBLINK": { "type": "object" } } }
            }]
        });

        let out_dir = dir.path().join("out");
        let (ann, fa) = create_mss(&row, &Document::new(), &schema, &out_dir, None, None).unwrap();

        assert_eq!(ann, out_dir.join("SAMD00000001_K_12.ann"));
        assert!(std::fs::read_to_string(&ann).unwrap().starts_with("COMMON\tDBLINK\t\tbiosample\tSAMD00000001\n"));
        assert_eq!(std::fs::read_to_string(&fa).unwrap(), ">NODE_1\nACGTACGT\n//\n");
    }
}
