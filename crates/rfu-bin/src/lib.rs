// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # rfu-bin
//!
//! Command-line client for SICK RFU6xx RFID interrogators.
//!
//! - CLI argument parsing with clap
//! - YAML configuration loading
//! - Logging initialization
//! - One command per device operation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         main.rs                             │
//! └─────────────────────────┬───────────────────────────────────┘
//!                           │
//!                    ┌──────▼──────┐
//!                    │    cli.rs   │
//!                    └──────┬──────┘
//!                           │
//!               ┌───────────┼───────────┐
//!               ▼           ▼           ▼
//!        ┌──────────┐ ┌──────────┐ ┌──────────┐
//!        │ commands │ │  config  │ │ logging  │
//!        └────┬─────┘ └──────────┘ └──────────┘
//!             │
//!     ┌──────▼───────┐
//!     │  rfu-opcua   │
//!     │ DeviceClient │
//!     └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Scan for two seconds and print the result
//! rfu-client -e opc.tcp://192.168.0.1:4840 scan --wait
//!
//! # Read 16 bytes of user memory from a tag
//! rfu-client read-tag --tag HELLOWORLD1234 --length 16
//!
//! # Write text to a tag
//! rfu-client write-tag --tag HELLOWORLD1234 --data testwrite123test
//!
//! # Validate configuration
//! rfu-client -c rfu-client.yaml validate
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use config::{AppConfig, LoadedConfig};
pub use error::{BinError, BinResult};
pub use logging::init_logging;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
