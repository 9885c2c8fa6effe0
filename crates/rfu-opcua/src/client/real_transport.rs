// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA transport backed by the `opcua` crate.
//!
//! The `opcua` 0.12 client is synchronous and drives its own runtime, so all
//! of its calls run on the blocking thread pool.
//!
//! # Example
//!
//! ```rust,ignore
//! use rfu_opcua::client::{RealOpcUaTransport, RemoteSession};
//! use rfu_opcua::types::OpcUaConfig;
//!
//! let config = OpcUaConfig::default();
//! let transport = RealOpcUaTransport::new(config.clone());
//! let mut session = RemoteSession::new(transport, config);
//! session.try_connect("opc.tcp://192.168.0.1:4840").await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, trace};

use opcua::client::prelude::{
    AttributeService, Client, ClientBuilder, IdentityToken, MethodService, Session,
};
use opcua::sync::RwLock as OpcUaRwLock;
use opcua::types::{
    ByteString, CallMethodRequest, DataValue, ExtensionObjectEncoding, MessageSecurityMode,
    UAString, UserTokenPolicy, Variant,
};

use crate::client::transport::{
    CallResult, EndpointDescription, ExtensionObject, OpcUaTransport, OpcUaValue, ReadResult,
    ReadValueId, SessionInfo, SessionParams, TimestampsToReturn, TransportState,
};
use crate::error::{ConfigurationError, ConnectionError, OpcUaError, OpcUaResult, SessionError};
use crate::types::{NodeId, NodeIdentifier, OpcUaConfig, SecurityMode, UserTokenType};

/// Policy id offered for username/password identities.
const USERNAME_POLICY_ID: &str = "username";

// =============================================================================
// RealOpcUaTransport
// =============================================================================

/// Transport talking to a real server through the `opcua` crate.
pub struct RealOpcUaTransport {
    config: OpcUaConfig,
    state: TransportState,
    client: Option<Client>,
    session: Option<Arc<OpcUaRwLock<Session>>>,
}

impl RealOpcUaTransport {
    /// Creates a disconnected transport.
    pub fn new(config: OpcUaConfig) -> Self {
        Self {
            config,
            state: TransportState::Disconnected,
            client: None,
            session: None,
        }
    }

    /// Builds an `opcua` client from configuration.
    fn build_client(
        config: &OpcUaConfig,
        session_timeout: Duration,
        trust_server_certs: bool,
    ) -> OpcUaResult<Client> {
        let mut builder = ClientBuilder::new()
            .application_name(config.application_name.as_str())
            .application_uri(config.effective_application_uri().as_str())
            .session_retry_limit(0)
            .session_timeout(u32::try_from(session_timeout.as_millis()).unwrap_or(u32::MAX))
            .create_sample_keypair(true)
            .trust_server_certs(trust_server_certs);

        if let Some(ref pki_dir) = config.pki_dir {
            builder = builder.pki_dir(pki_dir.as_str());
        }

        builder.client().ok_or_else(|| {
            OpcUaError::configuration(ConfigurationError::invalid_value(
                "client",
                "Failed to build OPC UA client",
            ))
        })
    }

    fn get_session(&self) -> OpcUaResult<Arc<OpcUaRwLock<Session>>> {
        self.session.clone().ok_or_else(OpcUaError::not_connected)
    }

    fn to_message_security_mode(mode: SecurityMode) -> MessageSecurityMode {
        match mode {
            SecurityMode::None => MessageSecurityMode::None,
            SecurityMode::Sign => MessageSecurityMode::Sign,
            SecurityMode::SignAndEncrypt => MessageSecurityMode::SignAndEncrypt,
        }
    }

    fn from_message_security_mode(mode: MessageSecurityMode) -> Option<SecurityMode> {
        match mode {
            MessageSecurityMode::None => Some(SecurityMode::None),
            MessageSecurityMode::Sign => Some(SecurityMode::Sign),
            MessageSecurityMode::SignAndEncrypt => Some(SecurityMode::SignAndEncrypt),
            _ => None,
        }
    }

    /// Pairs the configured identity with a token policy of the same type.
    fn identity_token(identity: &UserTokenType) -> (IdentityToken, UserTokenPolicy) {
        match identity {
            UserTokenType::Anonymous => (IdentityToken::Anonymous, UserTokenPolicy::anonymous()),
            UserTokenType::UserName { username, password } => (
                IdentityToken::UserName(username.clone(), password.clone()),
                UserTokenPolicy {
                    policy_id: UAString::from(USERNAME_POLICY_ID),
                    token_type: opcua::types::UserTokenType::UserName,
                    issued_token_type: UAString::null(),
                    issuer_endpoint_url: UAString::null(),
                    security_policy_uri: UAString::null(),
                },
            ),
        }
    }

    fn to_opcua_node_id(node_id: &NodeId) -> opcua::types::NodeId {
        match &node_id.identifier {
            NodeIdentifier::Numeric(v) => opcua::types::NodeId::new(node_id.namespace_index, *v),
            NodeIdentifier::String(v) => {
                opcua::types::NodeId::new(node_id.namespace_index, v.clone())
            }
            NodeIdentifier::Guid(v) => opcua::types::NodeId::new(
                node_id.namespace_index,
                opcua::types::Guid::from_bytes(*v.as_bytes()),
            ),
            NodeIdentifier::Opaque(v) => opcua::types::NodeId::new(
                node_id.namespace_index,
                ByteString::from(v.as_slice()),
            ),
        }
    }

    fn from_opcua_node_id(node_id: &opcua::types::NodeId) -> NodeId {
        let namespace_index = node_id.namespace;
        match &node_id.identifier {
            opcua::types::Identifier::Numeric(v) => NodeId::numeric(namespace_index, *v),
            opcua::types::Identifier::String(v) => NodeId::string(namespace_index, v.as_ref()),
            opcua::types::Identifier::Guid(v) => {
                NodeId::guid(namespace_index, uuid::Uuid::from_bytes(*v.as_bytes()))
            }
            opcua::types::Identifier::ByteString(v) => {
                NodeId::opaque(namespace_index, v.value.clone().unwrap_or_default())
            }
        }
    }

    fn to_chrono(value: &opcua::types::DateTime) -> chrono::DateTime<chrono::Utc> {
        let dt = value.as_chrono();
        chrono::DateTime::from_timestamp(dt.timestamp(), dt.timestamp_subsec_nanos())
            .unwrap_or_else(chrono::Utc::now)
    }

    fn from_opcua_variant(variant: &Variant) -> OpcUaValue {
        match variant {
            Variant::Empty => OpcUaValue::Null,
            Variant::Boolean(v) => OpcUaValue::Boolean(*v),
            Variant::SByte(v) => OpcUaValue::SByte(*v),
            Variant::Byte(v) => OpcUaValue::Byte(*v),
            Variant::Int16(v) => OpcUaValue::Int16(*v),
            Variant::UInt16(v) => OpcUaValue::UInt16(*v),
            Variant::Int32(v) => OpcUaValue::Int32(*v),
            Variant::UInt32(v) => OpcUaValue::UInt32(*v),
            Variant::Int64(v) => OpcUaValue::Int64(*v),
            Variant::UInt64(v) => OpcUaValue::UInt64(*v),
            Variant::Float(v) => OpcUaValue::Float(*v),
            Variant::Double(v) => OpcUaValue::Double(*v),
            Variant::String(v) => OpcUaValue::String(v.as_ref().to_string()),
            Variant::DateTime(v) => OpcUaValue::DateTime(Self::to_chrono(v)),
            Variant::Guid(v) => OpcUaValue::Guid(uuid::Uuid::from_bytes(*v.as_bytes())),
            Variant::ByteString(v) => OpcUaValue::ByteString(v.value.clone().unwrap_or_default()),
            Variant::StatusCode(v) => OpcUaValue::StatusCode(v.bits()),
            Variant::ExtensionObject(eo) => {
                let body = match &eo.body {
                    ExtensionObjectEncoding::ByteString(b) => b.value.clone().unwrap_or_default(),
                    _ => Vec::new(),
                };
                OpcUaValue::ExtensionObject(ExtensionObject::new(
                    Self::from_opcua_node_id(&eo.node_id),
                    body,
                ))
            }
            Variant::Array(arr) => OpcUaValue::Array(
                arr.values.iter().map(Self::from_opcua_variant).collect(),
            ),
            other => OpcUaValue::String(format!("{:?}", other)),
        }
    }

    fn to_opcua_variant(value: &OpcUaValue) -> Variant {
        match value {
            OpcUaValue::Null => Variant::Empty,
            OpcUaValue::Boolean(v) => Variant::Boolean(*v),
            OpcUaValue::SByte(v) => Variant::SByte(*v),
            OpcUaValue::Byte(v) => Variant::Byte(*v),
            OpcUaValue::Int16(v) => Variant::Int16(*v),
            OpcUaValue::UInt16(v) => Variant::UInt16(*v),
            OpcUaValue::Int32(v) => Variant::Int32(*v),
            OpcUaValue::UInt32(v) => Variant::UInt32(*v),
            OpcUaValue::Int64(v) => Variant::Int64(*v),
            OpcUaValue::UInt64(v) => Variant::UInt64(*v),
            OpcUaValue::Float(v) => Variant::Float(*v),
            OpcUaValue::Double(v) => Variant::Double(*v),
            OpcUaValue::String(v) => Variant::String(UAString::from(v.as_str())),
            OpcUaValue::DateTime(v) => Variant::DateTime(Box::new(opcua::types::DateTime::from(*v))),
            OpcUaValue::Guid(v) => {
                Variant::Guid(Box::new(opcua::types::Guid::from_bytes(*v.as_bytes())))
            }
            OpcUaValue::ByteString(v) => Variant::ByteString(ByteString::from(v.as_slice())),
            OpcUaValue::StatusCode(v) => {
                Variant::StatusCode(opcua::types::StatusCode::from_bits_truncate(*v))
            }
            OpcUaValue::ExtensionObject(eo) => {
                Variant::ExtensionObject(Box::new(opcua::types::ExtensionObject {
                    node_id: Self::to_opcua_node_id(&eo.type_id),
                    body: ExtensionObjectEncoding::ByteString(ByteString::from(eo.body.as_slice())),
                }))
            }
            OpcUaValue::Array(arr) => {
                let variants: Vec<Variant> = arr.iter().map(Self::to_opcua_variant).collect();
                let value_type = variants
                    .first()
                    .map(Variant::type_id)
                    .unwrap_or(opcua::types::VariantTypeId::Empty);
                opcua::types::Array::new(value_type, variants)
                    .map(|array| Variant::Array(Box::new(array)))
                    .unwrap_or(Variant::Empty)
            }
        }
    }

    fn to_read_result(node_id: &NodeId, data_value: &DataValue) -> ReadResult {
        ReadResult {
            node_id: node_id.clone(),
            value: data_value.value.as_ref().map(Self::from_opcua_variant),
            status_code: data_value.status.as_ref().map(|s| s.bits()).unwrap_or(0),
            server_timestamp: data_value.server_timestamp.as_ref().map(Self::to_chrono),
            source_timestamp: data_value.source_timestamp.as_ref().map(Self::to_chrono),
        }
    }

    fn to_opcua_timestamps(timestamps: TimestampsToReturn) -> opcua::types::TimestampsToReturn {
        match timestamps {
            TimestampsToReturn::Source => opcua::types::TimestampsToReturn::Source,
            TimestampsToReturn::Server => opcua::types::TimestampsToReturn::Server,
            TimestampsToReturn::Both => opcua::types::TimestampsToReturn::Both,
            TimestampsToReturn::Neither => opcua::types::TimestampsToReturn::Neither,
        }
    }
}

fn join_error(endpoint: &str, e: tokio::task::JoinError) -> OpcUaError {
    OpcUaError::connection(ConnectionError::refused(
        endpoint,
        format!("worker task failed: {}", e),
    ))
}

#[async_trait]
impl OpcUaTransport for RealOpcUaTransport {
    async fn discover_endpoints(&self, url: &str) -> OpcUaResult<Vec<EndpointDescription>> {
        let config = self.config.clone();
        let server_url = url.to_string();

        let endpoints = tokio::task::spawn_blocking(move || {
            let client = Self::build_client(&config, config.session_timeout, false)?;
            client
                .get_server_endpoints_from_url(server_url.as_str())
                .map_err(|status| {
                    OpcUaError::connection(ConnectionError::discovery_failed(
                        server_url.as_str(),
                        status.to_string(),
                    ))
                })
        })
        .await
        .map_err(|e| join_error(url, e))??;

        let described = endpoints
            .iter()
            .filter_map(|e| {
                let security_mode = Self::from_message_security_mode(e.security_mode)?;
                Some(EndpointDescription {
                    endpoint_url: e.endpoint_url.as_ref().to_string(),
                    security_mode,
                    security_policy_uri: e.security_policy_uri.as_ref().to_string(),
                    security_level: e.security_level,
                    server_certificate: e
                        .server_certificate
                        .value
                        .clone()
                        .filter(|der| !der.is_empty()),
                })
            })
            .collect::<Vec<_>>();

        debug!(endpoint = %url, count = described.len(), "Server endpoints received");
        Ok(described)
    }

    async fn open_session(
        &mut self,
        endpoint: &EndpointDescription,
        params: &SessionParams,
    ) -> OpcUaResult<SessionInfo> {
        self.state = TransportState::Connecting;
        info!(endpoint = %endpoint.endpoint_url, "Opening OPC UA session");

        let mut client = match Self::build_client(
            &self.config,
            params.session_timeout,
            params.trust_server_certificate,
        ) {
            Ok(client) => client,
            Err(e) => {
                self.state = TransportState::Failed;
                return Err(e);
            }
        };

        let (identity, token_policy) = Self::identity_token(&params.identity);
        let endpoint_url = endpoint.endpoint_url.clone();
        let policy_uri = endpoint.security_policy_uri.clone();
        let mode = Self::to_message_security_mode(endpoint.security_mode);

        let outcome = tokio::task::spawn_blocking(move || {
            let result = client.connect_to_endpoint(
                (
                    endpoint_url.as_str(),
                    policy_uri.as_str(),
                    mode,
                    token_policy,
                ),
                identity,
            );
            (client, result)
        })
        .await;

        let (client, result) = match outcome {
            Ok(pair) => pair,
            Err(e) => {
                self.state = TransportState::Failed;
                return Err(join_error(&endpoint.endpoint_url, e));
            }
        };

        match result {
            Ok(session) => {
                self.client = Some(client);
                self.session = Some(session);
                self.state = TransportState::Connected;
                Ok(SessionInfo::new(
                    uuid::Uuid::new_v4().to_string(),
                    endpoint.endpoint_url.clone(),
                    params.session_timeout,
                ))
            }
            Err(status) => {
                self.state = TransportState::Failed;
                Err(OpcUaError::session(SessionError::creation_failed(format!(
                    "{}: {}",
                    endpoint.endpoint_url, status
                ))))
            }
        }
    }

    async fn close_session(&mut self) -> OpcUaResult<()> {
        if let Some(session) = self.session.take() {
            tokio::task::spawn_blocking(move || session.read().disconnect())
                .await
                .map_err(|e| join_error(&self.config.endpoint, e))?;
        }
        self.client = None;
        self.state = TransportState::Disconnected;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    fn state(&self) -> TransportState {
        self.state
    }

    async fn read(
        &self,
        items: &[ReadValueId],
        timestamps: TimestampsToReturn,
    ) -> OpcUaResult<Vec<ReadResult>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let session = self.get_session()?;
        let requests: Vec<opcua::types::ReadValueId> = items
            .iter()
            .map(|item| opcua::types::ReadValueId {
                node_id: Self::to_opcua_node_id(&item.node_id),
                attribute_id: item.attribute_id.value(),
                index_range: UAString::null(),
                data_encoding: opcua::types::QualifiedName::null(),
            })
            .collect();
        let timestamps = Self::to_opcua_timestamps(timestamps);

        trace!(count = items.len(), "Reading attributes");

        let label = items
            .first()
            .map(|i| i.node_id.to_string())
            .unwrap_or_default();
        let data_values = tokio::task::spawn_blocking(move || {
            session.read().read(&requests, timestamps, 0.0)
        })
        .await
        .map_err(|e| join_error(&self.config.endpoint, e))?
        .map_err(|status| OpcUaError::read_failed(label, status.to_string()))?;

        Ok(items
            .iter()
            .zip(data_values.iter())
            .map(|(item, dv)| Self::to_read_result(&item.node_id, dv))
            .collect())
    }

    async fn call(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        input_arguments: &[OpcUaValue],
    ) -> OpcUaResult<CallResult> {
        let session = self.get_session()?;
        let request = CallMethodRequest {
            object_id: Self::to_opcua_node_id(object_id),
            method_id: Self::to_opcua_node_id(method_id),
            input_arguments: Some(input_arguments.iter().map(Self::to_opcua_variant).collect()),
        };

        trace!(object_id = %object_id, method_id = %method_id, "Calling method");

        let result = tokio::task::spawn_blocking(move || session.read().call(request))
            .await
            .map_err(|e| join_error(&self.config.endpoint, e))?
            .map_err(|status| OpcUaError::call_failed(method_id.to_string(), status.to_string()))?;

        Ok(CallResult {
            status_code: result.status_code.bits(),
            output_arguments: result
                .output_arguments
                .map(|outputs| outputs.iter().map(Self::from_opcua_variant).collect()),
        })
    }

    fn display_name(&self) -> String {
        format!("OPC UA ({})", self.config.endpoint)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_token_policy_matches_identity() {
        let (token, policy) = RealOpcUaTransport::identity_token(&UserTokenType::Anonymous);
        assert!(matches!(token, IdentityToken::Anonymous));
        assert_eq!(policy.token_type, opcua::types::UserTokenType::Anonymous);

        let (token, policy) = RealOpcUaTransport::identity_token(&UserTokenType::UserName {
            username: "operator".into(),
            password: "secret".into(),
        });
        assert!(matches!(token, IdentityToken::UserName(ref user, _) if user == "operator"));
        assert_eq!(policy.token_type, opcua::types::UserTokenType::UserName);
        assert_eq!(policy.policy_id.as_ref(), USERNAME_POLICY_ID);
    }

    #[test]
    fn test_node_id_conversion() {
        let node_id = NodeId::numeric(3, 7004);
        let converted = RealOpcUaTransport::to_opcua_node_id(&node_id);
        assert_eq!(RealOpcUaTransport::from_opcua_node_id(&converted), node_id);

        let node_id = NodeId::string(2, "Device");
        let converted = RealOpcUaTransport::to_opcua_node_id(&node_id);
        assert_eq!(RealOpcUaTransport::from_opcua_node_id(&converted), node_id);
    }

    #[test]
    fn test_extension_object_conversion() {
        let value = OpcUaValue::ExtensionObject(ExtensionObject::new(
            NodeId::numeric(3, 5030),
            vec![2, 0, 0, 0, 1, 0, 0, 0, b'A'],
        ));
        let variant = RealOpcUaTransport::to_opcua_variant(&value);
        assert_eq!(RealOpcUaTransport::from_opcua_variant(&variant), value);
    }

    #[test]
    fn test_value_conversion() {
        for value in [
            OpcUaValue::Int32(8),
            OpcUaValue::UInt16(1),
            OpcUaValue::String("EPC".into()),
            OpcUaValue::ByteString(b"HELLOWORLD1234".to_vec()),
        ] {
            let variant = RealOpcUaTransport::to_opcua_variant(&value);
            assert_eq!(RealOpcUaTransport::from_opcua_variant(&variant), value);
        }
    }

    #[test]
    fn test_transport_creation() {
        let transport = RealOpcUaTransport::new(OpcUaConfig::default());
        assert!(!transport.is_connected());
        assert_eq!(transport.state(), TransportState::Disconnected);
        assert!(transport.display_name().contains("localhost:4840"));
    }
}
