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
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version)]
#[command(about = "Convert genome assemblies and sample metadata to MSS format")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    // Sample table with feature and qualifier header lines
    #[arg(long = "tsv", required = true, help = "Sample table (.tsv)")]
    pub tsv_file: PathBuf,

    // Metadata shared by all samples
    #[arg(short = 'm', long = "metadata", required = true, help = "Common metadata (.json)")]
    pub metadata_file: PathBuf,

    // Local schema, skips the cache and download
    #[arg(long = "schema", required = false, help = "MSS COMMON template schema (.json)")]
    pub schema_file: Option<PathBuf>,

    // Schema cache location
    #[arg(long = "schema-cache", default_value = mssmaker::schema::fetch::SCHEMA_CACHE_FILE)]
    pub schema_cache: PathBuf,

    // Schema download location
    #[arg(long = "schema-url", default_value = mssmaker::schema::fetch::SCHEMA_URL)]
    pub schema_url: String,

    // Output directory
    #[arg(short = 'o', long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,

    // Hold date
    #[arg(short = 'H', long = "hold-date", required = false, help = "Hold date (YYYYMMDD)")]
    pub hold_date: Option<String>,

    // Assembly gaps
    // // Linkage evidence
    #[arg(long = "linkage-evidence", default_value = "paired-ends")]
    pub linkage_evidence: String,
    // // Gap type, `auto` derives it from the linkage evidence
    #[arg(long = "gap-type", default_value = "auto")]
    pub gap_type: String,
    // // Estimated length, `auto` derives it from the linkage evidence
    #[arg(long = "gap-length", default_value = "auto")]
    pub gap_length: String,
    // // Shortest run of N reported as a gap
    #[arg(long = "min-gap-length", default_value_t = mssmaker::gap::MIN_GAP_LENGTH)]
    pub min_gap_length: usize,
    // // Disable
    #[arg(long = "no-gaps", default_value_t = false, help = "Do not annotate assembly gaps")]
    pub no_gaps: bool,

    // Stop at the first sample that fails
    #[arg(long = "fail-fast", default_value_t = false)]
    pub fail_fast: bool,

    // Verbosity
    #[arg(long = "verbose", default_value_t = false)]
    pub verbose: bool,
}
