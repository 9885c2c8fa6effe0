// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the RFU6xx OPC UA client.
//!
//! Every fallible operation in this crate returns [`OpcUaResult`]. The error
//! hierarchy mirrors the failure kinds a caller has to tell apart:
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Discovery, endpoint selection, session open (incl. NotConnected)
//! ├── Session       - Post-connect initialization and namespace resolution
//! ├── Security      - Server certificate trust decisions
//! ├── Operation     - Remote read/call failures and rejected responses
//! ├── Decode        - Malformed or unexpected payloads
//! └── Configuration - Invalid settings
//! ```
//!
//! # Examples
//!
//! ```
//! use rfu_opcua::error::{OpcUaError, ErrorSeverity};
//!
//! let error = OpcUaError::not_connected();
//! assert!(error.is_not_connected());
//! assert_eq!(error.severity(), ErrorSeverity::Warning);
//! assert_eq!(error.error_code().to_string(), "UA-0105");
//! ```

use std::fmt;
use std::time::Duration;

use thiserror::Error;
use tracing::Level;

/// Result alias used throughout the crate.
pub type OpcUaResult<T> = Result<T, OpcUaError>;

// =============================================================================
// OpcUaError - Main Error Type
// =============================================================================

/// The main error type for OPC UA client operations.
#[derive(Debug, Error)]
pub enum OpcUaError {
    /// Connection errors (discovery, session open, not connected).
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// Session initialization errors.
    #[error("{0}")]
    Session(#[from] SessionError),

    /// Certificate and security errors.
    #[error("{0}")]
    Security(#[from] SecurityError),

    /// Remote read or method call failures.
    #[error("{0}")]
    Operation(#[from] OperationError),

    /// Payload decoding failures.
    #[error("{0}")]
    Decode(#[from] DecodeError),

    /// Configuration errors.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),
}

impl OpcUaError {
    // =========================================================================
    // Factory Methods
    // =========================================================================

    /// Creates a connection error.
    #[inline]
    pub fn connection(error: ConnectionError) -> Self {
        Self::Connection(error)
    }

    /// Creates a session error.
    #[inline]
    pub fn session(error: SessionError) -> Self {
        Self::Session(error)
    }

    /// Creates a security error.
    #[inline]
    pub fn security(error: SecurityError) -> Self {
        Self::Security(error)
    }

    /// Creates an operation error.
    #[inline]
    pub fn operation(error: OperationError) -> Self {
        Self::Operation(error)
    }

    /// Creates a decode error.
    #[inline]
    pub fn decode(error: DecodeError) -> Self {
        Self::Decode(error)
    }

    /// Creates a configuration error.
    #[inline]
    pub fn configuration(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }

    // =========================================================================
    // Convenience Factory Methods
    // =========================================================================

    /// Creates a not connected error.
    pub fn not_connected() -> Self {
        Self::Connection(ConnectionError::NotConnected)
    }

    /// Creates a read failed error.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation(OperationError::read_failed(node_id, message))
    }

    /// Creates a method call failed error.
    pub fn call_failed(method_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Operation(OperationError::call_failed(method_id, message))
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::Decode(DecodeError::type_mismatch(expected, actual))
    }

    // =========================================================================
    // Error Properties
    // =========================================================================

    /// Returns `true` if the operation was refused because no session was open.
    #[inline]
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::Connection(ConnectionError::NotConnected))
    }

    /// Returns the severity level of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Connection(e) => e.severity(),
            Self::Session(_) => ErrorSeverity::Error,
            Self::Security(_) => ErrorSeverity::Critical,
            Self::Operation(e) => e.severity(),
            Self::Decode(_) => ErrorSeverity::Error,
            Self::Configuration(_) => ErrorSeverity::Critical,
        }
    }

    /// Returns the error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::Session(_) => "session",
            Self::Security(_) => "security",
            Self::Operation(_) => "operation",
            Self::Decode(_) => "decode",
            Self::Configuration(_) => "configuration",
        }
    }

    /// Returns a unique error code for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Connection(e) => e.error_code(),
            Self::Session(e) => e.error_code(),
            Self::Security(e) => e.error_code(),
            Self::Operation(e) => e.error_code(),
            Self::Decode(e) => e.error_code(),
            Self::Configuration(e) => e.error_code(),
        }
    }

    /// Returns recovery hints for this error.
    pub fn recovery_hints(&self) -> Vec<&'static str> {
        match self {
            Self::Connection(ConnectionError::NotConnected) => {
                vec!["Call connect() before issuing reads or method calls"]
            }
            Self::Connection(_) => vec![
                "Verify the server URL and that the device is reachable",
                "Check that the device exposes an endpoint matching the selection policy",
            ],
            Self::Session(SessionError::NamespaceNotFound { .. }) => vec![
                "Verify the device firmware exposes the AutoID companion namespace",
                "Check the namespace URIs configured in the device profile",
            ],
            Self::Session(_) => vec!["Reconnect to create a fresh session"],
            Self::Security(_) => vec![
                "Add the server certificate to the allow list",
                "Check the certificate trust policy",
            ],
            Self::Operation(_) => vec![
                "Check the device status and that a tag is in the field",
                "Verify the method arguments for the target operation",
            ],
            Self::Decode(_) => vec!["Verify the device firmware matches the configured profile"],
            Self::Configuration(_) => vec!["Review the configuration file and command-line flags"],
        }
    }

    /// Returns the tracing level for this error.
    pub fn tracing_level(&self) -> Level {
        self.severity().to_tracing_level()
    }

    /// Logs this error with appropriate level and context.
    pub fn log(&self, context: &str) {
        let level = self.tracing_level();
        let code = self.error_code();

        match level {
            Level::ERROR => tracing::error!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            Level::WARN => tracing::warn!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
            _ => tracing::debug!(
                error_code = %code,
                category = self.category(),
                context = context,
                "{self}"
            ),
        }
    }
}

// =============================================================================
// ConnectionError
// =============================================================================

/// Connection-related errors.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Endpoint discovery against the server URL failed.
    #[error("Endpoint discovery failed for '{endpoint}': {message}")]
    DiscoveryFailed {
        /// Server URL.
        endpoint: String,
        /// Failure details.
        message: String,
    },

    /// The server offered no endpoint matching the selection policy.
    #[error("No suitable endpoint found at '{endpoint}' for selection '{selection}'")]
    NoSuitableEndpoint {
        /// Server URL.
        endpoint: String,
        /// Selection policy description.
        selection: String,
    },

    /// Session open was refused.
    #[error("Connection refused to '{endpoint}': {message}")]
    Refused {
        /// Endpoint URL.
        endpoint: String,
        /// Failure details.
        message: String,
    },

    /// Invalid endpoint URL.
    #[error("Invalid endpoint URL: '{url}' - {reason}")]
    InvalidEndpoint {
        /// The invalid URL.
        url: String,
        /// Reason.
        reason: String,
    },

    /// No session is open.
    #[error("Not connected to OPC UA server")]
    NotConnected,
}

impl ConnectionError {
    /// Creates a discovery failed error.
    pub fn discovery_failed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DiscoveryFailed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a no suitable endpoint error.
    pub fn no_suitable_endpoint(endpoint: impl Into<String>, selection: impl Into<String>) -> Self {
        Self::NoSuitableEndpoint {
            endpoint: endpoint.into(),
            selection: selection.into(),
        }
    }

    /// Creates a connection refused error.
    pub fn refused(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Refused {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns the severity of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotConnected => ErrorSeverity::Warning,
            Self::InvalidEndpoint { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::DiscoveryFailed { .. } => ErrorCode::new(1, 1),
            Self::NoSuitableEndpoint { .. } => ErrorCode::new(1, 2),
            Self::Refused { .. } => ErrorCode::new(1, 3),
            Self::InvalidEndpoint { .. } => ErrorCode::new(1, 4),
            Self::NotConnected => ErrorCode::new(1, 5),
        }
    }
}

// =============================================================================
// SessionError
// =============================================================================

/// Errors raised while initializing an opened session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Session creation failed.
    #[error("Failed to create session: {message}")]
    CreationFailed {
        /// Error message.
        message: String,
    },

    /// The server namespace array could not be read.
    #[error("Failed to read server namespace array: {message}")]
    NamespaceArrayUnavailable {
        /// Error message.
        message: String,
    },

    /// A required namespace URI is not registered on the server.
    #[error("Namespace '{uri}' not found on server")]
    NamespaceNotFound {
        /// The missing namespace URI.
        uri: String,
    },
}

impl SessionError {
    /// Creates a creation failed error.
    pub fn creation_failed(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
        }
    }

    /// Creates a namespace array unavailable error.
    pub fn namespace_array_unavailable(message: impl Into<String>) -> Self {
        Self::NamespaceArrayUnavailable {
            message: message.into(),
        }
    }

    /// Creates a namespace not found error.
    pub fn namespace_not_found(uri: impl Into<String>) -> Self {
        Self::NamespaceNotFound { uri: uri.into() }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::CreationFailed { .. } => ErrorCode::new(2, 1),
            Self::NamespaceArrayUnavailable { .. } => ErrorCode::new(2, 2),
            Self::NamespaceNotFound { .. } => ErrorCode::new(2, 3),
        }
    }
}

// =============================================================================
// SecurityError
// =============================================================================

/// Security-related errors.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// The trust policy rejected the server certificate.
    #[error("Server certificate rejected ({subject}): {reason}")]
    CertificateRejected {
        /// Certificate subject or thumbprint.
        subject: String,
        /// Rejection reason.
        reason: String,
    },

    /// The server certificate could not be parsed.
    #[error("Certificate error: {message}")]
    Certificate {
        /// Error message.
        message: String,
    },
}

impl SecurityError {
    /// Creates a certificate rejected error.
    pub fn certificate_rejected(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CertificateRejected {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// Creates a certificate error.
    pub fn certificate(message: impl Into<String>) -> Self {
        Self::Certificate {
            message: message.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::CertificateRejected { .. } => ErrorCode::new(3, 1),
            Self::Certificate { .. } => ErrorCode::new(3, 2),
        }
    }
}

// =============================================================================
// OperationError
// =============================================================================

/// Remote operation errors.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Read service failed.
    #[error("Read failed for node '{node_id}': {message}")]
    ReadFailed {
        /// Node ID.
        node_id: String,
        /// Error message.
        message: String,
    },

    /// Call service failed.
    #[error("Call failed for method '{method_id}': {message}")]
    CallFailed {
        /// Method node ID.
        method_id: String,
        /// Error message.
        message: String,
    },

    /// The server reported a bad status code.
    #[error("Bad status code {status_code:#010x} ({status_name}) for '{target}'")]
    BadStatus {
        /// Node or method ID.
        target: String,
        /// Raw status code.
        status_code: u32,
        /// Symbolic status name.
        status_name: &'static str,
    },

    /// The response validator rejected the service response.
    #[error("Response for '{operation}' rejected: {reason}")]
    ResponseRejected {
        /// The operation whose response was rejected.
        operation: String,
        /// Rejection reason.
        reason: String,
    },
}

impl OperationError {
    /// Creates a read failed error.
    pub fn read_failed(node_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ReadFailed {
            node_id: node_id.into(),
            message: message.into(),
        }
    }

    /// Creates a call failed error.
    pub fn call_failed(method_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CallFailed {
            method_id: method_id.into(),
            message: message.into(),
        }
    }

    /// Creates a bad status error.
    pub fn bad_status(target: impl Into<String>, status_code: u32) -> Self {
        Self::BadStatus {
            target: target.into(),
            status_code,
            status_name: Self::status_code_name(status_code),
        }
    }

    /// Creates a response rejected error.
    pub fn response_rejected(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ResponseRejected {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Returns the symbolic name for an OPC UA status code.
    pub fn status_code_name(code: u32) -> &'static str {
        match code & 0xFFFF_0000 {
            0x0000_0000 => "Good",
            0x8000_0000 => "Bad",
            0x8001_0000 => "BadUnexpectedError",
            0x8002_0000 => "BadInternalError",
            0x8003_0000 => "BadOutOfMemory",
            0x8004_0000 => "BadResourceUnavailable",
            0x8005_0000 => "BadCommunicationError",
            0x8006_0000 => "BadEncodingError",
            0x8007_0000 => "BadDecodingError",
            0x800A_0000 => "BadTimeout",
            0x800B_0000 => "BadServiceUnsupported",
            0x800D_0000 => "BadServerNotConnected",
            0x800E_0000 => "BadServerHalted",
            0x800F_0000 => "BadNothingToDo",
            0x8010_0000 => "BadTooManyOperations",
            0x8011_0000 => "BadDataTypeIdUnknown",
            0x8012_0000 => "BadCertificateInvalid",
            0x8013_0000 => "BadSecurityChecksFailed",
            0x801F_0000 => "BadUserAccessDenied",
            0x8020_0000 => "BadIdentityTokenInvalid",
            0x8021_0000 => "BadIdentityTokenRejected",
            0x8025_0000 => "BadSessionIdInvalid",
            0x8026_0000 => "BadSessionClosed",
            0x8027_0000 => "BadSessionNotActivated",
            0x8033_0000 => "BadNodeIdInvalid",
            0x8034_0000 => "BadNodeIdUnknown",
            0x8035_0000 => "BadAttributeIdInvalid",
            0x8036_0000 => "BadIndexRangeInvalid",
            0x803A_0000 => "BadNotReadable",
            0x803B_0000 => "BadNotWritable",
            0x803C_0000 => "BadOutOfRange",
            0x803D_0000 => "BadNotSupported",
            0x803E_0000 => "BadNotFound",
            0x8074_0000 => "BadTypeMismatch",
            0x8075_0000 => "BadMethodInvalid",
            0x8076_0000 => "BadArgumentsMissing",
            0x80AB_0000 => "BadInvalidArgument",
            0x80AC_0000 => "BadConnectionRejected",
            0x80AD_0000 => "BadDisconnect",
            0x80AE_0000 => "BadConnectionClosed",
            0x80E5_0000 => "BadTooManyArguments",
            0x4000_0000 => "Uncertain",
            0x408F_0000 => "UncertainNoCommunicationLastUsableValue",
            _ => "Unknown",
        }
    }

    /// Returns the severity of this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ResponseRejected { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ReadFailed { .. } => ErrorCode::new(4, 1),
            Self::CallFailed { .. } => ErrorCode::new(4, 2),
            Self::BadStatus { .. } => ErrorCode::new(4, 3),
            Self::ResponseRejected { .. } => ErrorCode::new(4, 4),
        }
    }
}

// =============================================================================
// DecodeError
// =============================================================================

/// Errors raised when a payload does not have the expected shape.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// A value had a different type than expected.
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Expected type.
        expected: String,
        /// Actual type.
        actual: String,
    },

    /// A method returned fewer outputs than required.
    #[error("Missing output argument {index} (got {count} outputs)")]
    MissingOutput {
        /// Index of the missing output.
        index: usize,
        /// Number of outputs received.
        count: usize,
    },

    /// Union discriminator with no matching variant.
    #[error("Unknown {type_name} discriminator: {value}")]
    UnknownDiscriminator {
        /// Union type name.
        type_name: &'static str,
        /// The discriminator value.
        value: u32,
    },

    /// Input ended before a field was complete.
    #[error("Truncated {field}: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        /// Field being decoded.
        field: &'static str,
        /// Bytes required.
        needed: usize,
        /// Bytes available.
        remaining: usize,
    },

    /// A length prefix was invalid.
    #[error("Invalid length prefix {length} for {field}")]
    InvalidLength {
        /// Field being decoded.
        field: &'static str,
        /// The length read.
        length: i32,
    },

    /// String field was not valid UTF-8.
    #[error("Invalid UTF-8 in {field}")]
    InvalidUtf8 {
        /// Field being decoded.
        field: &'static str,
    },

    /// An extension object had an unexpected encoding id.
    #[error("Unexpected encoding id: expected {expected}, got {actual}")]
    UnexpectedEncoding {
        /// Expected encoding node id.
        expected: String,
        /// Actual encoding node id.
        actual: String,
    },
}

impl DecodeError {
    /// Creates a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a missing output error.
    pub fn missing_output(index: usize, count: usize) -> Self {
        Self::MissingOutput { index, count }
    }

    /// Creates an unknown discriminator error.
    pub fn unknown_discriminator(type_name: &'static str, value: u32) -> Self {
        Self::UnknownDiscriminator { type_name, value }
    }

    /// Creates a truncated input error.
    pub fn truncated(field: &'static str, needed: usize, remaining: usize) -> Self {
        Self::Truncated {
            field,
            needed,
            remaining,
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::TypeMismatch { .. } => ErrorCode::new(5, 1),
            Self::MissingOutput { .. } => ErrorCode::new(5, 2),
            Self::UnknownDiscriminator { .. } => ErrorCode::new(5, 3),
            Self::Truncated { .. } => ErrorCode::new(5, 4),
            Self::InvalidLength { .. } => ErrorCode::new(5, 5),
            Self::InvalidUtf8 { .. } => ErrorCode::new(5, 6),
            Self::UnexpectedEncoding { .. } => ErrorCode::new(5, 7),
        }
    }
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Invalid endpoint URL.
    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The endpoint.
        endpoint: String,
        /// Reason.
        reason: String,
    },

    /// Invalid node ID text.
    #[error("Invalid node ID '{node_id}': {reason}")]
    InvalidNodeId {
        /// The node ID text.
        node_id: String,
        /// Reason.
        reason: String,
    },

    /// Invalid timeout value.
    #[error("Invalid timeout {duration:?}: {reason}")]
    InvalidTimeout {
        /// The timeout.
        duration: Duration,
        /// Reason.
        reason: String,
    },

    /// Required field missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Field name.
        field: String,
    },

    /// Unknown security mode name.
    #[error("Invalid security mode: {mode}")]
    InvalidSecurityMode {
        /// The mode text.
        mode: String,
    },

    /// Unknown security policy name.
    #[error("Invalid security policy: {policy}")]
    InvalidSecurityPolicy {
        /// The policy text.
        policy: String,
    },

    /// Invalid value for a named setting.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Setting name.
        field: String,
        /// Reason.
        reason: String,
    },
}

impl ConfigurationError {
    /// Creates an invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid node ID error.
    pub fn invalid_node_id(node_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNodeId {
            node_id: node_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid timeout error.
    pub fn invalid_timeout(duration: Duration, reason: impl Into<String>) -> Self {
        Self::InvalidTimeout {
            duration,
            reason: reason.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an invalid security mode error.
    pub fn invalid_security_mode(mode: impl Into<String>) -> Self {
        Self::InvalidSecurityMode { mode: mode.into() }
    }

    /// Creates an invalid security policy error.
    pub fn invalid_security_policy(policy: impl Into<String>) -> Self {
        Self::InvalidSecurityPolicy {
            policy: policy.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error code.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidEndpoint { .. } => ErrorCode::new(6, 1),
            Self::InvalidNodeId { .. } => ErrorCode::new(6, 2),
            Self::InvalidTimeout { .. } => ErrorCode::new(6, 3),
            Self::MissingField { .. } => ErrorCode::new(6, 4),
            Self::InvalidSecurityMode { .. } => ErrorCode::new(6, 5),
            Self::InvalidSecurityPolicy { .. } => ErrorCode::new(6, 6),
            Self::InvalidValue { .. } => ErrorCode::new(6, 7),
        }
    }
}

// =============================================================================
// ErrorSeverity
// =============================================================================

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    /// Informational - no action required.
    Info,
    /// Warning - action may be required.
    Warning,
    /// Error - action required, but recoverable.
    Error,
    /// Critical - immediate action required.
    Critical,
}

impl ErrorSeverity {
    /// Converts to tracing level.
    pub fn to_tracing_level(self) -> Level {
        match self {
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error | Self::Critical => Level::ERROR,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// ErrorCode
// =============================================================================

/// Structured error code for categorization.
///
/// Format: `UA-XXYY` where XX is category and YY is specific error.
///
/// Categories:
/// - 1: Connection
/// - 2: Session
/// - 3: Security
/// - 4: Operation
/// - 5: Decode
/// - 6: Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    /// Category (1-6).
    pub category: u8,
    /// Specific error within category.
    pub code: u8,
}

impl ErrorCode {
    /// Creates a new error code.
    pub const fn new(category: u8, code: u8) -> Self {
        Self { category, code }
    }

    /// Returns the full error code as a u16.
    pub fn as_u16(&self) -> u16 {
        ((self.category as u16) << 8) | (self.code as u16)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UA-{:02X}{:02X}", self.category, self.code)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_connected_classification() {
        let err = OpcUaError::not_connected();
        assert!(err.is_not_connected());
        assert_eq!(err.category(), "connection");
        assert_eq!(err.severity(), ErrorSeverity::Warning);

        let other = OpcUaError::connection(ConnectionError::refused("opc.tcp://x:4840", "down"));
        assert!(!other.is_not_connected());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            OpcUaError::not_connected().error_code().to_string(),
            "UA-0105"
        );
        let decode = OpcUaError::decode(DecodeError::unknown_discriminator("ScanData", 9));
        assert_eq!(decode.error_code(), ErrorCode::new(5, 3));
        assert_eq!(decode.error_code().as_u16(), 0x0503);
        assert_eq!(decode.category(), "decode");
    }

    #[test]
    fn test_connection_error_codes_are_contiguous() {
        let codes: Vec<u16> = [
            ConnectionError::discovery_failed("opc.tcp://x:4840", "m"),
            ConnectionError::no_suitable_endpoint("opc.tcp://x:4840", "none"),
            ConnectionError::refused("opc.tcp://x:4840", "m"),
            ConnectionError::invalid_endpoint("x", "scheme"),
            ConnectionError::NotConnected,
        ]
        .iter()
        .map(|e| e.error_code().as_u16())
        .collect();
        assert_eq!(codes, vec![0x0101, 0x0102, 0x0103, 0x0104, 0x0105]);

        assert_eq!(
            SessionError::namespace_not_found("urn:x").error_code(),
            ErrorCode::new(2, 3)
        );
        assert_eq!(
            SecurityError::certificate("bad der").error_code(),
            ErrorCode::new(3, 2)
        );
    }

    #[test]
    fn test_bad_status_name() {
        let err = OperationError::bad_status("ns=4;i=7004", 0x8034_0000);
        assert!(err.to_string().contains("BadNodeIdUnknown"));
        assert_eq!(OperationError::status_code_name(0), "Good");
        assert_eq!(OperationError::status_code_name(0x8034_0001), "BadNodeIdUnknown");
        assert_eq!(OperationError::status_code_name(0x8FFF_0000), "Unknown");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Critical > ErrorSeverity::Error);
        assert!(ErrorSeverity::Warning > ErrorSeverity::Info);
        assert_eq!(ErrorSeverity::Critical.to_tracing_level(), Level::ERROR);
    }

    #[test]
    fn test_recovery_hints_present() {
        let err = OpcUaError::session(SessionError::namespace_not_found(
            "http://opcfoundation.org/UA/AutoID/",
        ));
        assert!(!err.recovery_hints().is_empty());
        assert!(err.to_string().contains("AutoID"));
    }
}
