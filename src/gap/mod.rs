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

//! Annotation of runs of unknown bases as `assembly_gap` features.
//!
//! Allowed values follow the AGP specification
//! (<https://www.ncbi.nlm.nih.gov/assembly/agp/AGP_Specification/>).
//!
//! ## Usage
//!
//! ```rust
//! use mssmaker::gap::{GapAnnotator, GapLength, GapType, LinkageEvidence};
//!
//! let annotator = GapAnnotator::new(10, LinkageEvidence::PairedEnds, GapType::Auto, GapLength::Auto).unwrap();
//! let rows = annotator.annotate(b"ACGTnnnnnnnnnnACGT", Some("contig_1"));
//!
//! assert_eq!(rows.len(), 3);
//! assert_eq!(rows[0].to_line(), "contig_1\tassembly_gap\t5..14\testimated_length\tknown");
//! assert_eq!(rows[1].to_line(), "\t\t\tgap_type\twithin scaffolds");
//! assert_eq!(rows[2].to_line(), "\t\t\tlinkage_evidence\tpaired-ends");
//! ```
//!
use crate::AnnotationRow;
use crate::errors::ConfigurationError;

type E = Box<dyn std::error::Error>;

/// Default minimum length of a reported gap.
pub const MIN_GAP_LENGTH: usize = 10;

/// Controlled vocabulary for the `linkage_evidence` qualifier.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkageEvidence {
    Pcr,
    #[default]
    PairedEnds,
    AlignGenus,
    AlignXgenus,
    AlignTrnscpt,
    WithinClone,
    CloneContig,
    Map,
    Strobe,
    ProximityLigation,
    Unspecified,
}

impl LinkageEvidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkageEvidence::Pcr => "pcr",
            LinkageEvidence::PairedEnds => "paired-ends",
            LinkageEvidence::AlignGenus => "align genus",
            LinkageEvidence::AlignXgenus => "align xgenus",
            LinkageEvidence::AlignTrnscpt => "align trnscpt",
            LinkageEvidence::WithinClone => "within clone",
            LinkageEvidence::CloneContig => "clone contig",
            LinkageEvidence::Map => "map",
            LinkageEvidence::Strobe => "strobe",
            LinkageEvidence::ProximityLigation => "proximity ligation",
            LinkageEvidence::Unspecified => "unspecified",
        }
    }
}

impl std::str::FromStr for LinkageEvidence {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', " ").as_str() {
            "pcr" => Ok(LinkageEvidence::Pcr),
            "paired-ends" => Ok(LinkageEvidence::PairedEnds),
            "align genus" => Ok(LinkageEvidence::AlignGenus),
            "align xgenus" => Ok(LinkageEvidence::AlignXgenus),
            "align trnscpt" => Ok(LinkageEvidence::AlignTrnscpt),
            "within clone" => Ok(LinkageEvidence::WithinClone),
            "clone contig" => Ok(LinkageEvidence::CloneContig),
            "map" => Ok(LinkageEvidence::Map),
            "strobe" => Ok(LinkageEvidence::Strobe),
            "proximity ligation" => Ok(LinkageEvidence::ProximityLigation),
            "unspecified" => Ok(LinkageEvidence::Unspecified),
            _ => Err(ConfigurationError::new(&format!("'{}' is not a valid linkage_evidence", s))),
        }
    }
}

/// Controlled vocabulary for the `gap_type` qualifier.
///
/// [GapType::Auto] derives the value from [LinkageEvidence].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapType {
    #[default]
    Auto,
    BetweenScaffolds,
    WithinScaffold,
    Telomere,
    Centromere,
    ShortArm,
    Heterochromatin,
    RepeatWithinScaffold,
    RepeatBetweenScaffolds,
    Contamination,
    Unknown,
}

impl GapType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapType::Auto => "auto",
            GapType::BetweenScaffolds => "between scaffolds",
            GapType::WithinScaffold => "within scaffold",
            GapType::Telomere => "telomere",
            GapType::Centromere => "centromere",
            GapType::ShortArm => "short arm",
            GapType::Heterochromatin => "heterochromatin",
            GapType::RepeatWithinScaffold => "repeat within scaffold",
            GapType::RepeatBetweenScaffolds => "repeat between scaffolds",
            GapType::Contamination => "contamination",
            GapType::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for GapType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', " ").as_str() {
            "auto" => Ok(GapType::Auto),
            "between scaffolds" => Ok(GapType::BetweenScaffolds),
            "within scaffold" => Ok(GapType::WithinScaffold),
            "telomere" => Ok(GapType::Telomere),
            "centromere" => Ok(GapType::Centromere),
            "short arm" => Ok(GapType::ShortArm),
            "heterochromatin" => Ok(GapType::Heterochromatin),
            "repeat within scaffold" => Ok(GapType::RepeatWithinScaffold),
            "repeat between scaffolds" => Ok(GapType::RepeatBetweenScaffolds),
            "contamination" => Ok(GapType::Contamination),
            "unknown" => Ok(GapType::Unknown),
            _ => Err(ConfigurationError::new(&format!("'{}' is not a valid gap_type", s))),
        }
    }
}

/// Value of the `estimated_length` qualifier.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GapLength {
    #[default]
    Auto,
    Known,
    Unknown,
}

impl GapLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            GapLength::Auto => "auto",
            GapLength::Known => "known",
            GapLength::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for GapLength {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(GapLength::Auto),
            "known" => Ok(GapLength::Known),
            "unknown" => Ok(GapLength::Unknown),
            _ => Err(ConfigurationError::new(&format!("'{}' is not a valid gap_length", s))),
        }
    }
}

/// Finds runs of `N`/`n` and formats them as `assembly_gap` rows.
///
/// The qualifier values are resolved once in [new](GapAnnotator::new) and
/// shared by every gap reported by this annotator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapAnnotator {
    pub min_gap_length: usize,
    pub linkage_evidence: String,
    pub gap_type: String,
    pub gap_length: String,
}

impl GapAnnotator {
    /// Resolves `auto` settings and builds the annotator.
    ///
    /// `auto` for `gap_type` or `gap_length` is only supported for the
    /// `paired-ends`, `proximity ligation` and `align genus` linkage evidences.
    ///
    /// ## Errors
    ///
    /// Returns [ConfigurationError] if `min_gap_length` is 0 or if an `auto`
    /// value cannot be derived from `linkage_evidence`.
    pub fn new(
        min_gap_length: usize,
        linkage_evidence: LinkageEvidence,
        gap_type: GapType,
        gap_length: GapLength,
    ) -> Result<Self, E> {
        if min_gap_length == 0 {
            return Err(Box::new(ConfigurationError::new("min_gap_length must be at least 1")))
        }

        let gap_type = match (gap_type, linkage_evidence) {
            (GapType::Auto, LinkageEvidence::PairedEnds) => "within scaffolds",
            (GapType::Auto, LinkageEvidence::ProximityLigation) => "within scaffolds",
            (GapType::Auto, LinkageEvidence::AlignGenus) => "within scaffolds",
            (GapType::Auto, _) => return Err(Box::new(ConfigurationError::new(
                &format!("cannot derive gap_type from linkage_evidence '{}', please specify gap_type explicitly", linkage_evidence.as_str())
            ))),
            (explicit, _) => explicit.as_str(),
        };

        let gap_length = match (gap_length, linkage_evidence) {
            (GapLength::Auto, LinkageEvidence::PairedEnds) => "known",
            (GapLength::Auto, LinkageEvidence::ProximityLigation) => "unknown",
            (GapLength::Auto, LinkageEvidence::AlignGenus) => "unknown",
            (GapLength::Auto, _) => return Err(Box::new(ConfigurationError::new(
                &format!("cannot derive gap_length from linkage_evidence '{}', please specify gap_length explicitly", linkage_evidence.as_str())
            ))),
            (explicit, _) => explicit.as_str(),
        };

        Ok(GapAnnotator{
            min_gap_length,
            linkage_evidence: linkage_evidence.as_str().to_string(),
            gap_type: gap_type.to_string(),
            gap_length: gap_length.to_string(),
        })
    }

    /// Locates maximal runs of `N` (either case) at least `min_gap_length` long.
    ///
    /// Returns 1-based inclusive `(start, end)` coordinates in sequence order.
    pub fn find_gaps(
        &self,
        seq: &[u8],
    ) -> Vec<(usize, usize)> {
        let mut gaps: Vec<(usize, usize)> = Vec::new();
        let mut run_start: Option<usize> = None;
        for (idx, base) in seq.iter().enumerate() {
            let is_gap = base.eq_ignore_ascii_case(&b'n');
            match (is_gap, run_start) {
                (true, None) => run_start = Some(idx),
                (false, Some(start)) => {
                    if idx - start >= self.min_gap_length {
                        gaps.push((start + 1, idx));
                    }
                    run_start = None;
                },
                _ => (),
            }
        }
        if let Some(start) = run_start {
            if seq.len() - start >= self.min_gap_length {
                gaps.push((start + 1, seq.len()));
            }
        }
        gaps
    }

    /// Formats every gap in `seq` as an `assembly_gap` block.
    ///
    /// If `entry` is given, it is written to the entry column of the first
    /// row only. Otherwise the rows belong to the entry of the preceding block.
    pub fn annotate(
        &self,
        seq: &[u8],
        entry: Option<&str>,
    ) -> Vec<AnnotationRow> {
        let mut rows: Vec<AnnotationRow> = Vec::new();
        for (start, end) in self.find_gaps(seq) {
            rows.push(AnnotationRow::feature("assembly_gap", &format!("{}..{}", start, end), "estimated_length", &self.gap_length));
            rows.push(AnnotationRow::qualifier("gap_type", &self.gap_type));
            rows.push(AnnotationRow::qualifier("linkage_evidence", &self.linkage_evidence));
        }
        if let (Some(first), Some(entry)) = (rows.first_mut(), entry) {
            first.entry = entry.to_string();
        }
        rows
    }
}

impl Default for GapAnnotator {
    fn default() -> Self {
        GapAnnotator{
            min_gap_length: MIN_GAP_LENGTH,
            linkage_evidence: LinkageEvidence::PairedEnds.as_str().to_string(),
            gap_type: "within scaffolds".to_string(),
            gap_length: GapLength::Known.as_str().to_string(),
        }
    }
}
