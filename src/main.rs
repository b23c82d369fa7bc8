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
use std::str::FromStr;

use clap::Parser;

use mssmaker::gap::GapAnnotator;
use mssmaker::gap::GapLength;
use mssmaker::gap::GapType;
use mssmaker::gap::LinkageEvidence;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    let res = stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init();
    if let Err(e) = res {
        eprintln!("Cannot initialize logging: {}", e);
    }
}

fn gap_annotator(
    cli: &cli::Cli,
) -> Result<Option<GapAnnotator>, E> {
    if cli.no_gaps {
        return Ok(None)
    }
    let annotator = GapAnnotator::new(
        cli.min_gap_length,
        LinkageEvidence::from_str(&cli.linkage_evidence)?,
        GapType::from_str(&cli.gap_type)?,
        GapLength::from_str(&cli.gap_length)?,
    )?;
    log::debug!("Assembly gaps: min_gap_length={}, linkage_evidence={}, gap_type={}, estimated_length={}",
                annotator.min_gap_length, annotator.linkage_evidence, annotator.gap_type, annotator.gap_length);
    Ok(Some(annotator))
}

// Returns the number of samples that failed.
fn run(
    cli: &cli::Cli,
) -> Result<usize, E> {
    let hold_date = cli.hold_date.as_deref().map(mssmaker::validate_hold_date).transpose()?;
    let gaps = gap_annotator(cli)?;

    let metadata = mssmaker::metadata::load_metadata(&cli.metadata_file)?;
    let schema = match &cli.schema_file {
        Some(file) => mssmaker::schema::fetch::load_schema(file)?,
        None => mssmaker::schema::fetch::load_or_fetch_schema(&cli.schema_cache, &cli.schema_url)?,
    };

    let rows = mssmaker::row::tsv::read_tsv_file(&cli.tsv_file)?;
    log::info!("Read {} samples from {}", rows.len(), cli.tsv_file.display());

    let mut n_failed = 0;
    for (idx, row) in rows.iter().enumerate() {
        let res = mssmaker::create_mss(row, &metadata, &schema, &cli.out_dir, gaps.as_ref(), hold_date.as_deref());
        if let Err(e) = res {
            log::error!("Sample on row {} failed: {}", idx + 1, e);
            n_failed += 1;
            if cli.fail_fast {
                break
            }
        }
    }

    Ok(n_failed)
}

fn main() {
    let cli = cli::Cli::parse();
    init_log(if cli.verbose { 3 } else { 2 });

    match run(&cli) {
        Ok(0) => (),
        Ok(n_failed) => {
            log::error!("{} samples failed", n_failed);
            std::process::exit(1);
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        },
    }
}
