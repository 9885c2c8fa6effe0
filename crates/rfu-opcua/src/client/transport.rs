// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport abstraction layer.
//!
//! The transport is the seam between the session logic and the protocol
//! stack. Production code uses the `opcua`-backed transport; tests script a
//! mock implementation of the same trait.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, OpcUaError, OpcUaResult, OperationError};
use crate::types::{AttributeId, NodeId, SecurityMode, SecurityPolicy, UserTokenType};

/// Well-known node holding the server namespace array (`i=2255`).
pub const SERVER_NAMESPACE_ARRAY: u32 = 2255;

// =============================================================================
// TransportState
// =============================================================================

/// Connection state of the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    /// No session is open.
    #[default]
    Disconnected,

    /// A session is being opened.
    Connecting,

    /// A session is open and usable.
    Connected,

    /// The last session open attempt failed.
    Failed,
}

impl TransportState {
    /// Returns `true` if the transport is connected.
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if the transport has failed.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// EndpointDescription
// =============================================================================

/// One endpoint offered by the server during discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescription {
    /// Endpoint URL.
    pub endpoint_url: String,

    /// Message security mode.
    pub security_mode: SecurityMode,

    /// Security policy URI as reported by the server.
    pub security_policy_uri: String,

    /// Server-assigned relative security level.
    pub security_level: u8,

    /// DER-encoded server certificate, if the endpoint carries one.
    pub server_certificate: Option<Vec<u8>>,
}

impl EndpointDescription {
    /// Creates an endpoint without security.
    pub fn unsecured(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            security_mode: SecurityMode::None,
            security_policy_uri: SecurityPolicy::None.uri().to_string(),
            security_level: 0,
            server_certificate: None,
        }
    }

    /// Creates a secured endpoint.
    pub fn secured(
        endpoint_url: impl Into<String>,
        security_mode: SecurityMode,
        security_policy: SecurityPolicy,
        security_level: u8,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            security_mode,
            security_policy_uri: security_policy.uri().to_string(),
            security_level,
            server_certificate: None,
        }
    }

    /// Attaches a server certificate.
    pub fn with_certificate(mut self, der: Vec<u8>) -> Self {
        self.server_certificate = Some(der);
        self
    }

    /// Returns the parsed security policy, if known.
    pub fn security_policy(&self) -> Option<SecurityPolicy> {
        SecurityPolicy::from_uri(&self.security_policy_uri)
    }
}

impl fmt::Display for EndpointDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = self
            .security_policy()
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| self.security_policy_uri.clone());
        write!(
            f,
            "{} [{}/{}, level {}]",
            self.endpoint_url, self.security_mode, policy, self.security_level
        )
    }
}

// =============================================================================
// SessionParams / SessionInfo
// =============================================================================

/// Parameters for opening a session on a selected endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    /// Session name shown on the server.
    pub session_name: String,

    /// Requested session timeout.
    pub session_timeout: Duration,

    /// User identity.
    pub identity: UserTokenType,

    /// Whether the server certificate has been accepted by the trust policy.
    pub trust_server_certificate: bool,
}

/// Information about an open session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session ID (server-assigned or transport-generated).
    pub session_id: String,

    /// Endpoint URL the session is bound to.
    pub endpoint_url: String,

    /// Session timeout as revised by the server.
    pub revised_timeout: Duration,

    /// Session creation time.
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl SessionInfo {
    /// Creates session info with the current time.
    pub fn new(
        session_id: impl Into<String>,
        endpoint_url: impl Into<String>,
        revised_timeout: Duration,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            endpoint_url: endpoint_url.into(),
            revised_timeout,
            created_at: chrono::Utc::now(),
        }
    }
}

// =============================================================================
// Read service types
// =============================================================================

/// Which timestamps the server should return with read values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimestampsToReturn {
    /// Source timestamp only.
    Source,
    /// Server timestamp only.
    Server,
    /// Both timestamps.
    #[default]
    Both,
    /// No timestamps.
    Neither,
}

/// One item of a Read request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadValueId {
    /// Node to read.
    pub node_id: NodeId,

    /// Attribute to read.
    pub attribute_id: AttributeId,
}

impl ReadValueId {
    /// Reads the Value attribute of `node_id`.
    pub fn value(node_id: NodeId) -> Self {
        Self {
            node_id,
            attribute_id: AttributeId::Value,
        }
    }
}

/// Result of reading one attribute (an OPC UA DataValue).
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    /// The node ID that was read.
    pub node_id: NodeId,

    /// The value read.
    pub value: Option<OpcUaValue>,

    /// Status code of the read.
    pub status_code: u32,

    /// Server timestamp.
    pub server_timestamp: Option<chrono::DateTime<chrono::Utc>>,

    /// Source timestamp.
    pub source_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

impl ReadResult {
    /// Creates a successful read result.
    pub fn success(node_id: NodeId, value: OpcUaValue) -> Self {
        Self {
            node_id,
            value: Some(value),
            status_code: 0,
            server_timestamp: Some(chrono::Utc::now()),
            source_timestamp: None,
        }
    }

    /// Creates a failed read result.
    pub fn failure(node_id: NodeId, status_code: u32) -> Self {
        Self {
            node_id,
            value: None,
            status_code,
            server_timestamp: Some(chrono::Utc::now()),
            source_timestamp: None,
        }
    }

    /// Returns `true` if the status is good.
    #[inline]
    pub fn is_good(&self) -> bool {
        self.status_code & 0xC000_0000 == 0
    }

    /// Returns `true` if the status is uncertain.
    #[inline]
    pub fn is_uncertain(&self) -> bool {
        self.status_code & 0x4000_0000 != 0 && self.status_code & 0x8000_0000 == 0
    }

    /// Returns `true` if the status is bad.
    #[inline]
    pub fn is_bad(&self) -> bool {
        self.status_code & 0x8000_0000 != 0
    }

    /// Returns the symbolic status name.
    pub fn status_name(&self) -> &'static str {
        OperationError::status_code_name(self.status_code)
    }
}

// =============================================================================
// Call service types
// =============================================================================

/// Result of a single method call.
#[derive(Debug, Clone, PartialEq)]
pub struct CallResult {
    /// Status code of the call.
    pub status_code: u32,

    /// Output arguments; `None` when the server returned none.
    pub output_arguments: Option<Vec<OpcUaValue>>,
}

impl CallResult {
    /// Creates a good call result.
    pub fn good(outputs: Vec<OpcUaValue>) -> Self {
        Self {
            status_code: 0,
            output_arguments: Some(outputs),
        }
    }

    /// Creates a failed call result.
    pub fn bad(status_code: u32) -> Self {
        Self {
            status_code,
            output_arguments: None,
        }
    }

    /// Returns `true` if the status is bad.
    #[inline]
    pub fn is_bad(&self) -> bool {
        self.status_code & 0x8000_0000 != 0
    }
}

// =============================================================================
// ExtensionObject
// =============================================================================

/// A structured value with a binary body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionObject {
    /// Binary encoding id of the body.
    pub type_id: NodeId,

    /// Encoded body.
    pub body: Vec<u8>,
}

impl ExtensionObject {
    /// Creates an extension object.
    pub fn new(type_id: NodeId, body: Vec<u8>) -> Self {
        Self { type_id, body }
    }
}

// =============================================================================
// OpcUaValue
// =============================================================================

/// OPC UA value as seen by the transport layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OpcUaValue {
    /// Boolean value.
    Boolean(bool),
    /// Signed byte.
    SByte(i8),
    /// Unsigned byte.
    Byte(u8),
    /// 16-bit signed integer.
    Int16(i16),
    /// 16-bit unsigned integer.
    UInt16(u16),
    /// 32-bit signed integer.
    Int32(i32),
    /// 32-bit unsigned integer.
    UInt32(u32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit unsigned integer.
    UInt64(u64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit double.
    Double(f64),
    /// String value.
    String(String),
    /// Date/time value.
    DateTime(chrono::DateTime<chrono::Utc>),
    /// GUID value.
    Guid(uuid::Uuid),
    /// Byte string.
    ByteString(Vec<u8>),
    /// Status code.
    StatusCode(u32),
    /// Structured value.
    ExtensionObject(ExtensionObject),
    /// Array of values.
    Array(Vec<OpcUaValue>),
    /// Null value.
    #[default]
    Null,
}

impl OpcUaValue {
    /// Returns the OPC UA built-in type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::SByte(_) => "SByte",
            Self::Byte(_) => "Byte",
            Self::Int16(_) => "Int16",
            Self::UInt16(_) => "UInt16",
            Self::Int32(_) => "Int32",
            Self::UInt32(_) => "UInt32",
            Self::Int64(_) => "Int64",
            Self::UInt64(_) => "UInt64",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::String(_) => "String",
            Self::DateTime(_) => "DateTime",
            Self::Guid(_) => "Guid",
            Self::ByteString(_) => "ByteString",
            Self::StatusCode(_) => "StatusCode",
            Self::ExtensionObject(_) => "ExtensionObject",
            Self::Array(_) => "Array",
            Self::Null => "Null",
        }
    }

    /// Returns `true` if this is a null value.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to get the value as an i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::SByte(v) => Some(*v as i64),
            Self::Byte(v) => Some(*v as i64),
            Self::Int16(v) => Some(*v as i64),
            Self::UInt16(v) => Some(*v as i64),
            Self::Int32(v) => Some(*v as i64),
            Self::UInt32(v) => Some(*v as i64),
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Attempts to get the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Attempts to get the value as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::ByteString(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the bytes of a ByteString value or a decode error.
    pub fn expect_bytes(&self) -> Result<&[u8], DecodeError> {
        self.as_bytes()
            .ok_or_else(|| DecodeError::type_mismatch("ByteString", self.type_name()))
    }

    /// Attempts to get the value as an extension object.
    pub fn as_extension_object(&self) -> Option<&ExtensionObject> {
        match self {
            Self::ExtensionObject(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the strings of a string array, skipping non-string entries.
    pub fn as_string_array(&self) -> Option<Vec<String>> {
        match self {
            Self::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }
}

impl From<ExtensionObject> for OpcUaValue {
    fn from(value: ExtensionObject) -> Self {
        Self::ExtensionObject(value)
    }
}

impl fmt::Display for OpcUaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{}", v),
            Self::SByte(v) => write!(f, "{}", v),
            Self::Byte(v) => write!(f, "{}", v),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Guid(v) => write!(f, "{}", v),
            Self::ByteString(v) => write!(f, "<{} bytes>", v.len()),
            Self::StatusCode(v) => write!(
                f,
                "{} ({:#010x})",
                OperationError::status_code_name(*v),
                v
            ),
            Self::ExtensionObject(v) => write!(f, "ExtensionObject({})", v.type_id),
            Self::Array(v) => write!(f, "[{} items]", v.len()),
            Self::Null => write!(f, "null"),
        }
    }
}

// =============================================================================
// OpcUaTransport Trait
// =============================================================================

/// Low-level operations against an OPC UA server.
///
/// Implementations own the network connection and at most one session.
/// They must be `Send + Sync` so a session can be driven from any task.
#[async_trait]
pub trait OpcUaTransport: Send + Sync {
    /// Queries the endpoints offered at `url`.
    ///
    /// This does not open a session.
    async fn discover_endpoints(&self, url: &str) -> OpcUaResult<Vec<EndpointDescription>>;

    /// Opens and activates a session on `endpoint`.
    async fn open_session(
        &mut self,
        endpoint: &EndpointDescription,
        params: &SessionParams,
    ) -> OpcUaResult<SessionInfo>;

    /// Closes the open session, if any.
    async fn close_session(&mut self) -> OpcUaResult<()>;

    /// Returns `true` if a session is open.
    fn is_connected(&self) -> bool;

    /// Returns the current transport state.
    fn state(&self) -> TransportState;

    /// Reads node attributes. Results are returned in request order.
    async fn read(
        &self,
        items: &[ReadValueId],
        timestamps: TimestampsToReturn,
    ) -> OpcUaResult<Vec<ReadResult>>;

    /// Calls `method_id` on `object_id`.
    async fn call(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        input_arguments: &[OpcUaValue],
    ) -> OpcUaResult<CallResult>;

    /// Reads the server namespace array.
    async fn namespace_array(&self) -> OpcUaResult<Vec<String>> {
        let node_id = NodeId::numeric(0, SERVER_NAMESPACE_ARRAY);
        let results = self
            .read(&[ReadValueId::value(node_id.clone())], TimestampsToReturn::Neither)
            .await?;

        let result = results.into_iter().next().ok_or_else(|| {
            OpcUaError::read_failed(node_id.to_string(), "Empty read response")
        })?;
        if result.is_bad() {
            return Err(OpcUaError::operation(OperationError::bad_status(
                node_id.to_string(),
                result.status_code,
            )));
        }

        let value = result.value.unwrap_or_default();
        value
            .as_string_array()
            .ok_or_else(|| OpcUaError::type_mismatch("Array<String>", value.type_name()))
    }

    /// Returns the transport display name for logging.
    fn display_name(&self) -> String;
}

// =============================================================================
// Tests
// =============================================================================
