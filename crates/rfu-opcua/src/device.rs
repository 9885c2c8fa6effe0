// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! RFID interrogator facade.
//!
//! [`DeviceClient`] maps the AutoID device operations of a [`DeviceProfile`]
//! onto [`RemoteSession`] reads and method calls. Namespace indices are
//! resolved from the server namespace array on every connect, before any
//! device operation can run.
//!
//! Each operation exists in two forms. The `try_*` form returns typed results
//! including the status reported by the device. The plain form keeps the
//! compatibility contract: a method call counts as successful when the server
//! returned an output list, whatever status the device put in it.
//!
//! # Example
//!
//! ```rust,ignore
//! use rfu_opcua::{DeviceClient, DeviceProfile, OpcUaConfig, RealOpcUaTransport};
//!
//! let config = OpcUaConfig::default();
//! let mut device = DeviceClient::new(
//!     RealOpcUaTransport::new(config.clone()),
//!     config,
//!     DeviceProfile::rfu6xx(),
//! );
//! if device.connect("opc.tcp://192.168.0.1:4840").await {
//!     device.scan_start(2000.0, 0, false).await;
//!     println!("{:?}", device.get_last_scan_data().await);
//! }
//! ```

use std::fmt;

use crate::autoid::{DeviceProfile, ReportedStatus, ScanSettings, TagIdentifier, TagValue};
use crate::client::{
    CertificateTrustPolicy, ConnectHook, NamespaceTable, OpcUaTransport, OpcUaValue,
    RemoteSession,
};
use crate::error::{DecodeError, OpcUaError, OpcUaResult};
use crate::types::{AttributeId, NodeId, OpcUaConfig};

// =============================================================================
// ResolvedNodes
// =============================================================================

/// Node ids of the device, bound to the namespace indices of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedNodes {
    /// AutoID namespace index.
    pub autoid_namespace: u16,
    /// DI namespace index.
    pub di_namespace: u16,
    /// Device namespace index.
    pub device_namespace: u16,
    /// Device root object.
    pub device: NodeId,
    /// ScanStart method.
    pub scan_start: NodeId,
    /// ScanStop method.
    pub scan_stop: NodeId,
    /// ReadTag method.
    pub read_tag: NodeId,
    /// WriteTag method.
    pub write_tag: NodeId,
    /// LastScanData variable.
    pub last_scan_data: NodeId,
}

impl ResolvedNodes {
    /// Resolves `profile` against a namespace table.
    pub fn resolve(profile: &DeviceProfile, namespaces: &NamespaceTable) -> OpcUaResult<Self> {
        let autoid_namespace = namespaces.require(&profile.autoid_namespace)?;
        let di_namespace = namespaces.require(&profile.di_namespace)?;
        let device_namespace = namespaces.require(&profile.device_namespace)?;
        let node = |id: u32| NodeId::numeric(device_namespace, id);

        Ok(Self {
            autoid_namespace,
            di_namespace,
            device_namespace,
            device: node(profile.device_node),
            scan_start: node(profile.scan_start_method),
            scan_stop: node(profile.scan_stop_method),
            read_tag: node(profile.read_tag_method),
            write_tag: node(profile.write_tag_method),
            last_scan_data: node(profile.last_scan_data_node),
        })
    }
}

struct NamespaceResolver<'a> {
    profile: &'a DeviceProfile,
    resolved: Option<ResolvedNodes>,
}

impl ConnectHook for NamespaceResolver<'_> {
    fn on_connect(&mut self, namespaces: &NamespaceTable) -> OpcUaResult<()> {
        let nodes = ResolvedNodes::resolve(self.profile, namespaces)?;
        tracing::debug!(
            autoid_ns = nodes.autoid_namespace,
            di_ns = nodes.di_namespace,
            device_ns = nodes.device_namespace,
            device = %nodes.device,
            "Resolved device namespaces"
        );
        self.resolved = Some(nodes);
        Ok(())
    }
}

// =============================================================================
// Requests and results
// =============================================================================

/// Memory access parameters of a ReadTag call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadTagRequest {
    /// Code type of the tag data (e.g. "RAW:STRING").
    pub codetype: String,
    /// Memory bank.
    pub region: u16,
    /// Start offset in bytes.
    pub offset: u32,
    /// Number of bytes to read.
    pub length: u32,
    /// Access password; empty for none.
    pub password: Vec<u8>,
}

/// Memory access parameters of a WriteTag call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTagRequest {
    /// Code type of the tag data.
    pub codetype: String,
    /// Memory bank.
    pub region: u16,
    /// Start offset in bytes.
    pub offset: u32,
    /// Bytes to write.
    pub data: Vec<u8>,
    /// Access password; empty for none.
    pub password: Vec<u8>,
}

/// Outputs of a device method call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodOutcome {
    /// Output arguments in order.
    pub outputs: Vec<OpcUaValue>,
}

impl MethodOutcome {
    /// Status reported by the device. AutoID methods return it last.
    pub fn status(&self) -> Option<ReportedStatus> {
        self.outputs.last().map(ReportedStatus::from_value)
    }
}

/// Value of the LastScanData variable.
#[derive(Debug, Clone, PartialEq)]
pub struct LastScanData {
    /// Printable form of the value.
    pub text: String,
    /// Decoded identifier when the value is a ScanData structure.
    pub tag: Option<TagIdentifier>,
    /// Raw value.
    pub value: Option<OpcUaValue>,
    /// Status code of the read.
    pub status_code: u32,
    /// Source timestamp.
    pub source_timestamp: Option<chrono::DateTime<chrono::Utc>>,
    /// Server timestamp.
    pub server_timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Result of a ReadTag call.
#[derive(Debug, Clone, PartialEq)]
pub struct TagReadResult {
    /// Tag data bytes.
    pub data: Vec<u8>,
    /// Tag data as text, with invalid UTF-8 replaced.
    pub text: String,
    /// Status reported by the device.
    pub status: Option<ReportedStatus>,
}

/// Result of a WriteTag call.
#[derive(Debug, Clone, PartialEq)]
pub struct TagWriteResult {
    /// Status reported by the device.
    pub status: Option<ReportedStatus>,
}

// =============================================================================
// DeviceClient
// =============================================================================

/// Client for one AutoID RFID interrogator.
pub struct DeviceClient<T: OpcUaTransport> {
    session: RemoteSession<T>,
    profile: DeviceProfile,
    nodes: Option<ResolvedNodes>,
}

impl<T: OpcUaTransport> DeviceClient<T> {
    /// Creates a device client.
    pub fn new(transport: T, config: OpcUaConfig, profile: DeviceProfile) -> Self {
        Self::from_session(RemoteSession::new(transport, config), profile)
    }

    /// Creates a device client around an existing session.
    pub fn from_session(session: RemoteSession<T>, profile: DeviceProfile) -> Self {
        Self {
            session,
            profile,
            nodes: None,
        }
    }

    /// Replaces the certificate trust policy.
    pub fn with_trust_policy(mut self, policy: Box<dyn CertificateTrustPolicy>) -> Self {
        self.session = self.session.with_trust_policy(policy);
        self
    }

    /// Returns the underlying session.
    pub fn session(&self) -> &RemoteSession<T> {
        &self.session
    }

    /// Returns the device profile.
    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    /// Returns the node ids of the current session.
    pub fn nodes(&self) -> Option<&ResolvedNodes> {
        self.nodes.as_ref()
    }

    /// Returns `true` if the session is open.
    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Connects and resolves the device namespaces, returning `false` on failure.
    pub async fn connect(&mut self, url: &str) -> bool {
        match self.try_connect(url).await {
            Ok(()) => true,
            Err(e) => {
                e.log("device connect");
                false
            }
        }
    }

    /// Connects and resolves the device namespaces.
    pub async fn try_connect(&mut self, url: &str) -> OpcUaResult<()> {
        let mut resolver = NamespaceResolver {
            profile: &self.profile,
            resolved: None,
        };
        self.session.try_connect_with(url, &mut resolver).await?;

        if let Some(nodes) = resolver.resolved {
            self.nodes = Some(nodes);
        }
        Ok(())
    }

    /// Closes the session.
    pub async fn disconnect(&mut self) {
        self.session.disconnect().await;
        self.nodes = None;
    }

    fn resolved(&self) -> OpcUaResult<&ResolvedNodes> {
        match self.nodes.as_ref() {
            Some(nodes) if self.session.is_connected() => Ok(nodes),
            _ => Err(OpcUaError::not_connected()),
        }
    }

    // -------------------------------------------------------------------------
    // Scanning
    // -------------------------------------------------------------------------

    /// Starts a scan. Returns `true` if the call returned outputs.
    pub async fn scan_start(&self, duration_ms: f64, cycles: i32, data_available: bool) -> bool {
        let settings = ScanSettings::new(duration_ms, cycles, data_available);
        match self.try_scan_start(&settings).await {
            Ok(_) => true,
            Err(e) => {
                e.log("ScanStart");
                false
            }
        }
    }

    /// Calls ScanStart with `settings`.
    pub async fn try_scan_start(&self, settings: &ScanSettings) -> OpcUaResult<MethodOutcome> {
        let nodes = self.resolved()?;
        let args = vec![OpcUaValue::ExtensionObject(
            settings.to_extension_object(nodes.autoid_namespace),
        )];

        tracing::info!(%settings, "ScanStart");
        self.call_method(&nodes.device, &nodes.scan_start, "ScanStart", args)
            .await
    }

    /// Stops a scan. Returns `true` if the call returned outputs.
    pub async fn scan_stop(&self) -> bool {
        match self.try_scan_stop().await {
            Ok(_) => true,
            Err(e) => {
                e.log("ScanStop");
                false
            }
        }
    }

    /// Calls ScanStop.
    pub async fn try_scan_stop(&self) -> OpcUaResult<MethodOutcome> {
        let nodes = self.resolved()?;
        self.call_method(&nodes.device, &nodes.scan_stop, "ScanStop", Vec::new())
            .await
    }

    /// Reads LastScanData as text, or `None` if the read failed.
    pub async fn get_last_scan_data(&self) -> Option<String> {
        match self.try_get_last_scan_data().await {
            Ok(data) => Some(data.text),
            Err(e) => {
                e.log("LastScanData");
                None
            }
        }
    }

    /// Reads LastScanData.
    ///
    /// The read status is reported but does not make this fail.
    pub async fn try_get_last_scan_data(&self) -> OpcUaResult<LastScanData> {
        let nodes = self.resolved()?;
        let result = self
            .session
            .try_read_attribute(&nodes.last_scan_data, AttributeId::Value)
            .await?;

        let tag = result
            .value
            .as_ref()
            .and_then(OpcUaValue::as_extension_object)
            .and_then(|eo| TagIdentifier::from_extension_object(eo, nodes.autoid_namespace).ok());
        let text = match (&tag, &result.value) {
            (Some(tag), _) => tag.display_text(),
            (None, Some(value)) => value.to_string(),
            (None, None) => String::new(),
        };

        if result.is_good() {
            tracing::info!(status = result.status_name(), text = %text, "LastScanData");
        } else {
            tracing::warn!(status = result.status_name(), text = %text, "LastScanData read with non-good status");
        }

        Ok(LastScanData {
            text,
            tag,
            value: result.value,
            status_code: result.status_code,
            source_timestamp: result.source_timestamp,
            server_timestamp: result.server_timestamp,
        })
    }

    // -------------------------------------------------------------------------
    // Tag memory
    // -------------------------------------------------------------------------

    /// Reads tag memory. Returns `true` if the call returned outputs and the
    /// first output holds the data bytes.
    #[allow(clippy::too_many_arguments)]
    pub async fn read_tag(
        &self,
        switch_field: u32,
        tag_id: impl Into<TagValue>,
        codetype: &str,
        region: u16,
        offset: u32,
        length: u32,
        password: &[u8],
    ) -> bool {
        let tag = match TagIdentifier::from_parts(switch_field, tag_id.into()) {
            Ok(tag) => tag,
            Err(e) => {
                OpcUaError::decode(e).log("ReadTag");
                return false;
            }
        };
        let request = ReadTagRequest {
            codetype: codetype.to_string(),
            region,
            offset,
            length,
            password: password.to_vec(),
        };

        match self.try_read_tag(&tag, &request).await {
            Ok(_) => true,
            Err(e) => {
                e.log("ReadTag");
                false
            }
        }
    }

    /// Calls ReadTag for `tag`.
    pub async fn try_read_tag(
        &self,
        tag: &TagIdentifier,
        request: &ReadTagRequest,
    ) -> OpcUaResult<TagReadResult> {
        let nodes = self.resolved()?;
        let args = vec![
            OpcUaValue::ExtensionObject(tag.to_extension_object(nodes.autoid_namespace)),
            OpcUaValue::String(request.codetype.clone()),
            OpcUaValue::UInt16(request.region),
            OpcUaValue::UInt32(request.offset),
            OpcUaValue::UInt32(request.length),
            OpcUaValue::ByteString(request.password.clone()),
        ];

        tracing::info!(
            tag = %tag,
            codetype = %request.codetype,
            region = request.region,
            offset = request.offset,
            length = request.length,
            "ReadTag"
        );
        let outcome = self
            .call_method(&nodes.device, &nodes.read_tag, "ReadTag", args)
            .await?;

        let first = outcome
            .outputs
            .first()
            .ok_or_else(|| DecodeError::missing_output(0, outcome.outputs.len()))?;
        let data = first.expect_bytes()?.to_vec();
        let text = String::from_utf8_lossy(&data).into_owned();
        let status = outcome.outputs.get(1).map(ReportedStatus::from_value);

        tracing::info!(
            text = %text,
            status = status.as_ref().map(ToString::to_string).unwrap_or_default(),
            "ReadTag result"
        );
        Ok(TagReadResult { data, text, status })
    }

    /// Writes tag memory. Returns `true` if the call returned outputs.
    #[allow(clippy::too_many_arguments)]
    pub async fn write_tag(
        &self,
        switch_field: u32,
        tag_id: impl Into<TagValue>,
        codetype: &str,
        region: u16,
        offset: u32,
        data: &[u8],
        password: &[u8],
    ) -> bool {
        let tag = match TagIdentifier::from_parts(switch_field, tag_id.into()) {
            Ok(tag) => tag,
            Err(e) => {
                OpcUaError::decode(e).log("WriteTag");
                return false;
            }
        };
        let request = WriteTagRequest {
            codetype: codetype.to_string(),
            region,
            offset,
            data: data.to_vec(),
            password: password.to_vec(),
        };

        match self.try_write_tag(&tag, &request).await {
            Ok(_) => true,
            Err(e) => {
                e.log("WriteTag");
                false
            }
        }
    }

    /// Calls WriteTag for `tag`.
    pub async fn try_write_tag(
        &self,
        tag: &TagIdentifier,
        request: &WriteTagRequest,
    ) -> OpcUaResult<TagWriteResult> {
        let nodes = self.resolved()?;
        let args = vec![
            OpcUaValue::ExtensionObject(tag.to_extension_object(nodes.autoid_namespace)),
            OpcUaValue::String(request.codetype.clone()),
            OpcUaValue::UInt16(request.region),
            OpcUaValue::UInt32(request.offset),
            OpcUaValue::ByteString(request.data.clone()),
            OpcUaValue::ByteString(request.password.clone()),
        ];

        tracing::info!(
            tag = %tag,
            codetype = %request.codetype,
            region = request.region,
            offset = request.offset,
            bytes = request.data.len(),
            "WriteTag"
        );
        let outcome = self
            .call_method(&nodes.device, &nodes.write_tag, "WriteTag", args)
            .await?;

        Ok(TagWriteResult {
            status: outcome.outputs.first().map(ReportedStatus::from_value),
        })
    }

    async fn call_method(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        name: &'static str,
        args: Vec<OpcUaValue>,
    ) -> OpcUaResult<MethodOutcome> {
        let outputs = self.session.try_invoke(object_id, method_id, args).await?;
        let outcome = MethodOutcome { outputs };

        match outcome.status() {
            Some(status) if !status.is_success() => tracing::warn!(
                method = name,
                output_count = outcome.outputs.len(),
                status = %status,
                "Device reported a non-success status"
            ),
            status => tracing::debug!(
                method = name,
                output_count = outcome.outputs.len(),
                status = status.as_ref().map(ToString::to_string).unwrap_or_default(),
                "Method completed"
            ),
        }
        Ok(outcome)
    }
}

impl<T: OpcUaTransport> fmt::Debug for DeviceClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceClient")
            .field("session", &self.session)
            .field("device_namespace", &self.profile.device_namespace)
            .field("nodes", &self.nodes)
            .finish()
    }
}
