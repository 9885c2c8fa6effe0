// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! One device operation runs per invocation:
//!
//! - `scan`: Start a scan (ScanStart)
//! - `scan-stop`: Stop a running scan (ScanStop)
//! - `last-scan`: Read the LastScanData variable
//! - `read-tag`: Read tag memory (ReadTag)
//! - `write-tag`: Write tag memory (WriteTag)
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rfu_opcua::{TagIdentifier, TagKind};

use crate::error::{BinError, BinResult};

// =============================================================================
// Main CLI Structure
// =============================================================================

/// rfu-client - OPC UA client for SICK RFU6xx RFID interrogators
#[derive(Parser, Debug)]
#[command(
    name = "rfu-client",
    author = "Sylvex <contact@sylvex.io>",
    version = crate::VERSION,
    about = "OPC UA client for SICK RFU6xx RFID interrogators",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "RFU_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Server URL, overrides the configuration file
    #[arg(short, long, env = "RFU_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "RFU_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "RFU_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start scanning for tags
    Scan(ScanArgs),

    /// Stop a running scan
    #[command(name = "scan-stop")]
    ScanStop,

    /// Read the last scan result
    #[command(name = "last-scan")]
    LastScan(LastScanArgs),

    /// Read tag memory
    #[command(name = "read-tag")]
    ReadTag(ReadTagArgs),

    /// Write tag memory
    #[command(name = "write-tag")]
    WriteTag(WriteTagArgs),

    /// Validate the configuration file
    ///
    /// Parses and validates the configuration without connecting.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `scan` command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Scan duration in milliseconds
    #[arg(short, long, default_value = "2000")]
    pub duration_ms: f64,

    /// Number of scan cycles (0 for none)
    #[arg(long, default_value = "0")]
    pub cycles: i32,

    /// Stop the scan as soon as data is available
    #[arg(long)]
    pub data_available: bool,

    /// Read LastScanData after the scan duration elapsed
    #[arg(long)]
    pub wait: bool,
}

/// Arguments for the `last-scan` command.
#[derive(Args, Debug, Clone, Default)]
pub struct LastScanArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Tag selection and memory location shared by `read-tag` and `write-tag`.
#[derive(Args, Debug, Clone)]
pub struct TagArgs {
    /// Identifier kind
    #[arg(short, long, default_value = "epc")]
    pub kind: TagKindArg,

    /// Tag identifier (hex bytes for `raw`, text otherwise)
    #[arg(short, long)]
    pub tag: String,

    /// Code type of the tag data
    #[arg(long, default_value = "RAW:STRING")]
    pub codetype: String,

    /// Memory bank
    #[arg(short, long, default_value = "3")]
    pub region: u16,

    /// Start offset in bytes
    #[arg(short, long, default_value = "0")]
    pub offset: u32,

    /// Access password as hex bytes
    #[arg(short, long, default_value = "")]
    pub password: String,
}

/// Arguments for the `read-tag` command.
#[derive(Args, Debug, Clone)]
pub struct ReadTagArgs {
    /// Tag and memory location
    #[command(flatten)]
    pub tag: TagArgs,

    /// Number of bytes to read
    #[arg(long, default_value = "16")]
    pub length: u32,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `write-tag` command.
#[derive(Args, Debug, Clone)]
pub struct WriteTagArgs {
    /// Tag and memory location
    #[command(flatten)]
    pub tag: TagArgs,

    /// Data to write, as text
    #[arg(short, long, required_unless_present = "hex", conflicts_with = "hex")]
    pub data: Option<String>,

    /// Data to write, as hex bytes
    #[arg(long)]
    pub hex: Option<String>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

/// Tag identifier kind as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TagKindArg {
    /// Raw identifier bytes
    Raw,
    /// Plain text identifier
    Text,
    /// EPC identifier
    #[default]
    Epc,
    /// Custom TID
    CustomTid,
}

impl From<TagKindArg> for TagKind {
    fn from(kind: TagKindArg) -> Self {
        match kind {
            TagKindArg::Raw => TagKind::Raw,
            TagKindArg::Text => TagKind::Text,
            TagKindArg::Epc => TagKind::Epc,
            TagKindArg::CustomTid => TagKind::CustomTid,
        }
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

impl TagArgs {
    /// Builds the tag identifier from `--kind` and `--tag`.
    pub fn identifier(&self) -> BinResult<TagIdentifier> {
        Ok(match self.kind {
            TagKindArg::Raw => TagIdentifier::Raw(parse_hex(&self.tag)?),
            TagKindArg::Text => TagIdentifier::Text(self.tag.clone()),
            TagKindArg::Epc => TagIdentifier::Epc(self.tag.clone()),
            TagKindArg::CustomTid => TagIdentifier::CustomTid(self.tag.clone()),
        })
    }

    /// Decodes the access password.
    pub fn password_bytes(&self) -> BinResult<Vec<u8>> {
        parse_hex(&self.password)
    }
}

impl WriteTagArgs {
    /// Returns the bytes to write.
    pub fn data_bytes(&self) -> BinResult<Vec<u8>> {
        match (&self.data, &self.hex) {
            (Some(text), _) => Ok(text.as_bytes().to_vec()),
            (None, Some(hex)) => parse_hex(hex),
            (None, None) => Err(BinError::usage("either --data or --hex is required")),
        }
    }
}

/// Parses a hex string. Whitespace, `:` and a leading `0x` are ignored.
pub fn parse_hex(input: &str) -> BinResult<Vec<u8>> {
    let digits: String = input
        .trim()
        .trim_start_matches("0x")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();

    hex::decode(&digits).map_err(|e| BinError::usage(format!("invalid hex '{}': {}", input, e)))
}

// =============================================================================
// Tests
// =============================================================================
