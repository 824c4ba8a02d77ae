//! Configuration for the `ifd-builder` command-line tool.
//!
//! This module provides:
//! - Command-line arguments via clap
//! - Environment variables with `IFD_` prefix
//! - Validation before any file is touched
//!
//! # Example
//!
//! ```ignore
//! use ifd_builder::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.into_command() {
//!     Command::Dump(config) => println!("dumping {}", config.input.display()),
//!     Command::Rebuild(config) => println!("writing {}", config.output.display()),
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `IFD_INPUT` - Input TIFF/EXIF file
//! - `IFD_OUTPUT` - Output file (`rebuild` only)
//! - `IFD_JSON` - Print the dump as JSON (default: false)
//! - `IFD_DELETE_TAGS` - Comma-separated tag ids to delete (`rebuild` only)

use std::path::PathBuf;

use clap::{Parser, Subcommand};

// =============================================================================
// CLI Arguments
// =============================================================================

/// IFD Builder - inspect and rewrite TIFF/EXIF image file directories.
#[derive(Parser, Debug, Clone)]
#[command(name = "ifd-builder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Consume the parsed arguments and return the selected command.
    pub fn into_command(self) -> Command {
        self.command
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print every IFD entry of a file.
    Dump(DumpConfig),

    /// Re-encode a file, optionally deleting tags from the first IFD.
    ///
    /// Only the IFDs are written. Image strips, tiles and embedded
    /// thumbnails are not copied, so StripOffsets, TileOffsets and
    /// JPEGInterchangeFormat values in the output no longer point at them.
    Rebuild(RebuildConfig),
}

// =============================================================================
// Dump Command
// =============================================================================

/// Arguments of `ifd-builder dump`.
#[derive(Parser, Debug, Clone)]
pub struct DumpConfig {
    /// Classic TIFF or EXIF-TIFF file to read.
    #[arg(env = "IFD_INPUT")]
    pub input: PathBuf,

    /// Print a JSON summary instead of one line per entry.
    #[arg(long, default_value_t = false, env = "IFD_JSON")]
    pub json: bool,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl DumpConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("Input path is required".to_string());
        }

        Ok(())
    }
}

// =============================================================================
// Rebuild Command
// =============================================================================

/// Arguments of `ifd-builder rebuild`.
#[derive(Parser, Debug, Clone)]
pub struct RebuildConfig {
    /// Classic TIFF or EXIF-TIFF file to read.
    #[arg(env = "IFD_INPUT")]
    pub input: PathBuf,

    /// Where to write the re-encoded file.
    #[arg(env = "IFD_OUTPUT")]
    pub output: PathBuf,

    /// Tag id to delete from the first IFD (decimal or 0x hex, repeatable).
    #[arg(
        long = "delete-tag",
        value_name = "ID",
        value_parser = parse_tag_id,
        env = "IFD_DELETE_TAGS",
        value_delimiter = ','
    )]
    pub delete_tags: Vec<u16>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl RebuildConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.input.as_os_str().is_empty() {
            return Err("Input path is required".to_string());
        }
        if self.output.as_os_str().is_empty() {
            return Err("Output path is required".to_string());
        }

        if self.input == self.output {
            return Err(format!(
                "Output path must differ from input path ({})",
                self.input.display()
            ));
        }

        Ok(())
    }
}

/// Parse a tag id given in decimal or as `0x`-prefixed hex.
pub fn parse_tag_id(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };

    parsed.map_err(|_| format!("Invalid tag id '{}': expected 0-65535 or 0x0000-0xFFFF", s))
}

// =============================================================================
// Tests
// =============================================================================
