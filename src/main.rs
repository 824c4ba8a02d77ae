//! IFD Builder - inspect and rewrite TIFF/EXIF image file directories.
//!
//! This binary parses a classic TIFF stream, imports its IFD chain into
//! builders, and either dumps it or encodes it back to disk.

use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bytes::Bytes;
use ifd_builder::{
    config::{Cli, Command, DumpConfig, RebuildConfig},
    parse_ifd_chain, IfdBuilder, IfdByteEncoder, ImportReport, TagIndex,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Dump(config) => run_dump(config),
        Command::Rebuild(config) => run_rebuild(config),
    }
}

// =============================================================================
// Dump Command
// =============================================================================

fn run_dump(config: DumpConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let report = match load(&config.input) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.json {
        let summary = report.root.summary(TagIndex::standard());
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        for (i, ib) in report.root.chain().enumerate() {
            println!("IFD{}: {}", i, ib);
            for line in ib.dump_to_strings() {
                println!("  {}", line);
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Rebuild Command
// =============================================================================

fn run_rebuild(config: RebuildConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut report = match load(&config.input) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for &tag_id in &config.delete_tags {
        let removed = report.root.delete_all(tag_id);
        if removed == 0 {
            warn!("Tag 0x{:04x} not present in the first IFD", tag_id);
        } else {
            info!("Deleted {} occurrence(s) of tag 0x{:04x}", removed, tag_id);
        }
    }

    for (index, tag_id) in report.root.image_data_offset_tags() {
        warn!(
            "IFD{} tag 0x{:04x} points at image data that is not copied; \
             its offsets will not be valid in {}",
            index,
            tag_id,
            config.output.display()
        );
    }

    let bytes = match IfdByteEncoder::default().encode_to_tiff(&report.root) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Encoding failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = std::fs::write(&config.output, &bytes) {
        error!("Failed to write {}: {}", config.output.display(), e);
        return ExitCode::FAILURE;
    }

    info!(
        "Wrote {} bytes to {}",
        bytes.len(),
        config.output.display()
    );
    ExitCode::SUCCESS
}

// =============================================================================
// Helpers
// =============================================================================

/// Read, parse and import a file, logging every skipped tag.
fn load(path: &Path) -> Result<ImportReport, String> {
    let data = std::fs::read(path)
        .map(Bytes::from)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let root = parse_ifd_chain(&data, TagIndex::standard())
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

    let report = IfdBuilder::from_existing_chain(&root, data)
        .map_err(|e| format!("Failed to import {}: {}", path.display(), e))?;

    for skipped in &report.skipped {
        warn!(
            "Skipped tag 0x{:04x} (type {}) in IFD [{}]: {}",
            skipped.tag_id, skipped.field_type_raw, skipped.ifd_name, skipped.reason
        );
    }

    Ok(report)
}

fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "ifd_builder=debug"
    } else {
        "ifd_builder=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
