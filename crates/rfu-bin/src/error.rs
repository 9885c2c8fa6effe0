// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the rfu-client binary.

use rfu_opcua::OpcUaError;
use thiserror::Error;

/// Result type alias for rfu-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the rfu-client binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid command-line input.
    #[error("Invalid argument: {0}")]
    Usage(String),

    /// The device reported a failure.
    #[error("Device error: {0}")]
    Device(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Error from the OPC UA client.
    #[error("OPC UA error: {0}")]
    OpcUa(#[from] OpcUaError),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        /// The context description.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Creates a device error.
    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Adds context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Usage(_) => 2,
            Self::OpcUa(e) => match e.category() {
                "connection" | "security" | "session" => 3,
                "configuration" => 1,
                _ => 4,
            },
            Self::Device(_) => 5,
            Self::Io(_) => 6,
            Self::Runtime(_) => 7,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(err.to_string())
    }
}

impl From<serde_yaml::Error> for BinError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with appropriate formatting.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }

    if let BinError::OpcUa(e) = error {
        for hint in e.recovery_hints() {
            eprintln!("  Hint: {}", hint);
        }
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BinError::config("test error");
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_error_with_context() {
        let err = BinError::device("ReadTag failed").with_context("read-tag");
        assert_eq!(err.to_string(), "read-tag: Device error: ReadTag failed");
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::config("test").exit_code(), 1);
        assert_eq!(BinError::usage("test").exit_code(), 2);
        assert_eq!(BinError::from(OpcUaError::not_connected()).exit_code(), 3);
        assert_eq!(
            BinError::from(OpcUaError::call_failed("ns=4;i=7004", "boom")).exit_code(),
            4
        );
        assert_eq!(BinError::io("test").exit_code(), 6);
    }
}
