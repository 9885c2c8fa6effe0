// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Device client tests against a scripted transport.
//!
//! The mock transport serves endpoint discovery, the server namespace array,
//! attribute values and method call responses from in-memory tables, and
//! counts every request so tests can assert that nothing reached the wire.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use rfu_opcua::autoid::{
    ScanSettings, AUTOID_NAMESPACE_URI, DI_NAMESPACE_URI, RFU6XX_NAMESPACE_URI,
    SCAN_DATA_ENCODING_ID, SCAN_SETTINGS_ENCODING_ID,
};
use rfu_opcua::client::{
    CallResult, EndpointDescription, ExtensionObject, OpcUaTransport, OpcUaValue, ReadResult,
    ReadValueId, RemoteSession, SessionInfo, SessionParams, TimestampsToReturn, TransportState,
    SERVER_NAMESPACE_ARRAY,
};
use rfu_opcua::codec::BinaryDecode;
use rfu_opcua::{
    AttributeId, AutoIdOperationStatus, DeviceClient, DeviceProfile, NodeId, OpcUaConfig,
    OpcUaError, OpcUaResult, OperationError, ReadTagRequest, RejectAllPolicy, ReportedStatus,
    SecurityMode, SecurityPolicy, SessionState, TagIdentifier, UserTokenType, DEFAULT_APPLICATION_NAME,
};

// =============================================================================
// Test Configuration
// =============================================================================

const ENDPOINT: &str = "opc.tcp://rfu620:4840";

const DI_NS: u16 = 2;
const AUTOID_NS: u16 = 3;
const DEVICE_NS: u16 = 4;

fn device_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 5002)
}

fn scan_start_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 7002)
}

fn scan_stop_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 7003)
}

fn read_tag_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 7004)
}

fn write_tag_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 7005)
}

fn last_scan_data_node() -> NodeId {
    NodeId::numeric(DEVICE_NS, 6023)
}

// =============================================================================
// Mock Transport
// =============================================================================

#[derive(Debug, Clone)]
struct RecordedCall {
    object_id: NodeId,
    method_id: NodeId,
    args: Vec<OpcUaValue>,
}

/// Shared state of the mock server, inspectable after the transport moved.
#[derive(Default)]
struct MockServer {
    fail_discovery: AtomicBool,
    endpoints: Mutex<Vec<EndpointDescription>>,
    namespaces: Mutex<Vec<String>>,
    values: Mutex<HashMap<NodeId, ReadResult>>,
    responses: Mutex<HashMap<NodeId, OpcUaResult<CallResult>>>,
    calls: Mutex<Vec<RecordedCall>>,
    sessions: Mutex<Vec<SessionParams>>,
    read_timestamps: Mutex<Vec<(NodeId, TimestampsToReturn)>>,
    discoveries: AtomicU32,
    sessions_opened: AtomicU32,
    sessions_closed: AtomicU32,
    reads: AtomicU32,
    namespace_reads: AtomicU32,
}

impl MockServer {
    fn rfu620() -> Arc<Self> {
        let server = Self::default();
        *server.endpoints.lock().unwrap() = vec![
            EndpointDescription::secured(
                ENDPOINT,
                SecurityMode::SignAndEncrypt,
                SecurityPolicy::Basic256Sha256,
                4,
            ),
            EndpointDescription::unsecured(ENDPOINT),
        ];
        *server.namespaces.lock().unwrap() = vec![
            "http://opcfoundation.org/UA/".to_string(),
            "urn:SICK:RFU620".to_string(),
            DI_NAMESPACE_URI.to_string(),
            AUTOID_NAMESPACE_URI.to_string(),
            RFU6XX_NAMESPACE_URI.to_string(),
        ];
        Arc::new(server)
    }

    fn respond(&self, method: NodeId, response: OpcUaResult<CallResult>) {
        self.responses.lock().unwrap().insert(method, response);
    }

    fn set_value(&self, node: NodeId, result: ReadResult) {
        self.values.lock().unwrap().insert(node, result);
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn timestamps_for(&self, node: &NodeId) -> Vec<TimestampsToReturn> {
        self.read_timestamps
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == node)
            .map(|(_, ts)| *ts)
            .collect()
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

struct MockTransport {
    server: Arc<MockServer>,
    connected: bool,
}

impl MockTransport {
    fn new(server: &Arc<MockServer>) -> Self {
        Self {
            server: Arc::clone(server),
            connected: false,
        }
    }
}

#[async_trait]
impl OpcUaTransport for MockTransport {
    async fn discover_endpoints(&self, url: &str) -> OpcUaResult<Vec<EndpointDescription>> {
        self.server.discoveries.fetch_add(1, Ordering::SeqCst);
        if self.server.fail_discovery.load(Ordering::SeqCst) {
            return Err(OpcUaError::connection(
                rfu_opcua::ConnectionError::discovery_failed(url, "BadTcpInternalError"),
            ));
        }
        Ok(self.server.endpoints.lock().unwrap().clone())
    }

    async fn open_session(
        &mut self,
        endpoint: &EndpointDescription,
        params: &SessionParams,
    ) -> OpcUaResult<SessionInfo> {
        self.server.sessions_opened.fetch_add(1, Ordering::SeqCst);
        self.server.sessions.lock().unwrap().push(params.clone());
        self.connected = true;
        Ok(SessionInfo::new(
            "mock-session",
            endpoint.endpoint_url.clone(),
            params.session_timeout,
        ))
    }

    async fn close_session(&mut self) -> OpcUaResult<()> {
        self.server.sessions_closed.fetch_add(1, Ordering::SeqCst);
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn state(&self) -> TransportState {
        if self.connected {
            TransportState::Connected
        } else {
            TransportState::Disconnected
        }
    }

    async fn read(
        &self,
        items: &[ReadValueId],
        timestamps: TimestampsToReturn,
    ) -> OpcUaResult<Vec<ReadResult>> {
        let namespace_array = NodeId::numeric(0, SERVER_NAMESPACE_ARRAY);
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            self.server
                .read_timestamps
                .lock()
                .unwrap()
                .push((item.node_id.clone(), timestamps));
            if item.node_id == namespace_array {
                self.server.namespace_reads.fetch_add(1, Ordering::SeqCst);
                let uris = self.server.namespaces.lock().unwrap().clone();
                results.push(ReadResult::success(
                    item.node_id.clone(),
                    OpcUaValue::Array(uris.into_iter().map(OpcUaValue::String).collect()),
                ));
                continue;
            }

            self.server.reads.fetch_add(1, Ordering::SeqCst);
            let result = self
                .server
                .values
                .lock()
                .unwrap()
                .get(&item.node_id)
                .cloned()
                .unwrap_or_else(|| ReadResult::failure(item.node_id.clone(), 0x8034_0000));
            results.push(result);
        }
        Ok(results)
    }

    async fn call(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        input_arguments: &[OpcUaValue],
    ) -> OpcUaResult<CallResult> {
        self.server.calls.lock().unwrap().push(RecordedCall {
            object_id: object_id.clone(),
            method_id: method_id.clone(),
            args: input_arguments.to_vec(),
        });

        match self.server.responses.lock().unwrap().remove(method_id) {
            Some(response) => response,
            None => Ok(CallResult::bad(0x8075_0000)),
        }
    }

    fn display_name(&self) -> String {
        "MockTransport".to_string()
    }
}

fn device(server: &Arc<MockServer>) -> DeviceClient<MockTransport> {
    DeviceClient::new(
        MockTransport::new(server),
        OpcUaConfig::new(ENDPOINT),
        DeviceProfile::rfu6xx(),
    )
}

async fn connected_device(server: &Arc<MockServer>) -> DeviceClient<MockTransport> {
    let mut device = device(server);
    assert!(device.connect(ENDPOINT).await);
    device
}

fn read_tag_ok() -> OpcUaResult<CallResult> {
    Ok(CallResult::good(vec![
        OpcUaValue::ByteString(b"HELLOWORLD1234".to_vec()),
        OpcUaValue::Int32(0),
    ]))
}

fn decode_tag_arg(call: &RecordedCall) -> TagIdentifier {
    let eo = call.args[0]
        .as_extension_object()
        .expect("first argument is an extension object");
    assert_eq!(eo.type_id, NodeId::numeric(AUTOID_NS, SCAN_DATA_ENCODING_ID));
    TagIdentifier::from_bytes(&eo.body).expect("ScanData body decodes")
}

// =============================================================================
// Connect lifecycle
// =============================================================================

#[tokio::test]
async fn test_connect_resolves_namespaces() {
    let server = MockServer::rfu620();
    let device = connected_device(&server).await;

    assert!(device.is_connected());
    let nodes = device.nodes().expect("nodes resolved");
    assert_eq!(nodes.di_namespace, DI_NS);
    assert_eq!(nodes.autoid_namespace, AUTOID_NS);
    assert_eq!(nodes.device_namespace, DEVICE_NS);
    assert_eq!(nodes.device, device_node());
    assert_eq!(server.namespace_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_opened_anonymously_with_default_name() {
    let server = MockServer::rfu620();
    let _device = connected_device(&server).await;

    let sessions = server.sessions.lock().unwrap().clone();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].identity, UserTokenType::Anonymous);
    assert_eq!(sessions[0].session_name, DEFAULT_APPLICATION_NAME);
    assert!(!sessions[0].trust_server_certificate);
}

#[tokio::test]
async fn test_connect_is_idempotent() {
    let server = MockServer::rfu620();
    let mut device = connected_device(&server).await;

    assert!(device.connect(ENDPOINT).await);
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 1);
    assert_eq!(server.discoveries.load(Ordering::SeqCst), 1);
    assert_eq!(server.namespace_reads.load(Ordering::SeqCst), 1);
    assert_eq!(device.session().stats().connects(), 1);
}

#[tokio::test]
async fn test_discovery_failure_leaves_session_unset() {
    let server = MockServer::rfu620();
    server.fail_discovery.store(true, Ordering::SeqCst);
    let mut device = device(&server);

    assert!(!device.connect(ENDPOINT).await);
    assert!(!device.is_connected());
    assert!(device.session().session_info().is_none());
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 0);

    let err = device
        .session()
        .try_read_attribute(&last_scan_data_node(), AttributeId::Value)
        .await
        .unwrap_err();
    assert!(err.is_not_connected());
    assert!(device.get_last_scan_data().await.is_none());
    assert_eq!(server.reads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_unsecured_endpoint() {
    let server = MockServer::rfu620();
    server.endpoints.lock().unwrap().retain(|e| !e.security_mode.is_none());
    let mut device = device(&server);

    let err = device.try_connect(ENDPOINT).await.unwrap_err();
    assert_eq!(err.category(), "connection");
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_url_rejected_before_discovery() {
    let server = MockServer::rfu620();
    let mut device = device(&server);

    assert!(!device.connect("http://rfu620:4840").await);
    assert_eq!(server.discoveries.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_namespace_closes_session() {
    let server = MockServer::rfu620();
    server
        .namespaces
        .lock()
        .unwrap()
        .retain(|uri| uri != RFU6XX_NAMESPACE_URI);
    let mut device = device(&server);

    let err = device.try_connect(ENDPOINT).await.unwrap_err();
    assert_eq!(err.category(), "session");
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 1);
    assert_eq!(server.sessions_closed.load(Ordering::SeqCst), 1);
    assert!(!device.is_connected());
    assert!(device.nodes().is_none());
}

#[tokio::test]
async fn test_trust_policy_rejection() {
    let server = MockServer::rfu620();
    *server.endpoints.lock().unwrap() =
        vec![EndpointDescription::unsecured(ENDPOINT).with_certificate(vec![0x30, 0x82, 0x01])];
    let mut device = device(&server).with_trust_policy(Box::new(RejectAllPolicy));

    let err = device.try_connect(ENDPOINT).await.unwrap_err();
    assert_eq!(err.category(), "security");
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_certificate_accepted_by_default() {
    let server = MockServer::rfu620();
    *server.endpoints.lock().unwrap() =
        vec![EndpointDescription::unsecured(ENDPOINT).with_certificate(vec![0x30, 0x82, 0x01])];
    let mut device = device(&server);

    assert!(device.connect(ENDPOINT).await);
}

#[tokio::test]
async fn test_session_state_follows_lifecycle() {
    let server = MockServer::rfu620();
    let mut device = device(&server);
    assert_eq!(device.session().state(), SessionState::Disconnected);

    assert!(device.connect(ENDPOINT).await);
    assert_eq!(device.session().state(), SessionState::Connected);
    assert_eq!(device.session().stats().connects(), 1);

    device.disconnect().await;
    assert_eq!(device.session().state(), SessionState::Disconnected);
    assert_eq!(device.session().stats().disconnects(), 1);
}

#[tokio::test]
async fn test_failed_connect_sets_failed_state() {
    let server = MockServer::rfu620();
    server.fail_discovery.store(true, Ordering::SeqCst);
    let mut device = device(&server);

    assert!(!device.connect(ENDPOINT).await);
    assert_eq!(device.session().state(), SessionState::Failed);
    assert_eq!(device.session().stats().failures(), 1);
}

#[tokio::test]
async fn test_disconnect() {
    let server = MockServer::rfu620();
    let mut device = connected_device(&server).await;

    device.disconnect().await;
    assert!(!device.is_connected());
    assert!(device.nodes().is_none());
    assert_eq!(server.sessions_closed.load(Ordering::SeqCst), 1);

    // Second disconnect is a no-op.
    device.disconnect().await;
    assert_eq!(server.sessions_closed.load(Ordering::SeqCst), 1);

    assert!(!device.scan_stop().await);
    assert_eq!(server.call_count(), 0);
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let server = MockServer::rfu620();
    let mut device = connected_device(&server).await;
    device.disconnect().await;

    assert!(device.connect(ENDPOINT).await);
    assert_eq!(server.sessions_opened.load(Ordering::SeqCst), 2);
    assert_eq!(server.namespace_reads.load(Ordering::SeqCst), 2);
    assert!(device.nodes().is_some());
}

// =============================================================================
// Not connected
// =============================================================================

#[tokio::test]
async fn test_operations_fail_fast_when_not_connected() {
    let server = MockServer::rfu620();
    server.respond(scan_start_node(), Ok(CallResult::good(vec![])));
    let device = device(&server);

    assert!(!device.scan_start(1000.0, 0, false).await);
    assert!(!device.scan_stop().await);
    assert!(
        !device
            .read_tag(2, "E200", "RAW:STRING", 3, 0, 14, &[])
            .await
    );
    assert!(
        !device
            .write_tag(2, "E200", "RAW:STRING", 3, 0, b"DATA", &[])
            .await
    );
    assert!(device.get_last_scan_data().await.is_none());

    let outputs = device
        .session()
        .invoke(&device_node(), &scan_start_node(), vec![])
        .await;
    assert!(outputs.is_none());

    assert_eq!(server.call_count(), 0);
    assert_eq!(server.reads.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Scanning
// =============================================================================

#[tokio::test]
async fn test_scan_start_encodes_settings() {
    let server = MockServer::rfu620();
    server.respond(
        scan_start_node(),
        Ok(CallResult::good(vec![
            OpcUaValue::Array(vec![]),
            OpcUaValue::Int32(0),
        ])),
    );
    let device = connected_device(&server).await;

    assert!(device.scan_start(2000.0, 0, false).await);

    let calls = server.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].object_id, device_node());
    assert_eq!(calls[0].method_id, scan_start_node());

    let eo: &ExtensionObject = calls[0].args[0].as_extension_object().unwrap();
    assert_eq!(eo.type_id, NodeId::numeric(AUTOID_NS, SCAN_SETTINGS_ENCODING_ID));
    assert_eq!(
        ScanSettings::from_bytes(&eo.body).unwrap(),
        ScanSettings::new(2000.0, 0, false)
    );
}

#[tokio::test]
async fn test_scan_start_success_ignores_device_status() {
    let server = MockServer::rfu620();
    server.respond(
        scan_start_node(),
        Ok(CallResult::good(vec![
            OpcUaValue::Array(vec![]),
            OpcUaValue::Int32(17),
        ])),
    );
    let device = connected_device(&server).await;

    let outcome = device
        .try_scan_start(&ScanSettings::new(500.0, 1, true))
        .await
        .unwrap();
    assert_eq!(
        outcome.status(),
        Some(ReportedStatus::Operation(AutoIdOperationStatus::DeviceNotReady))
    );
}

#[tokio::test]
async fn test_scan_stop() {
    let server = MockServer::rfu620();
    server.respond(scan_stop_node(), Ok(CallResult::good(vec![])));
    let device = connected_device(&server).await;

    assert!(device.scan_stop().await);
    let calls = server.calls();
    assert_eq!(calls[0].method_id, scan_stop_node());
    assert!(calls[0].args.is_empty());
}

#[tokio::test]
async fn test_method_failures_report_false() {
    let server = MockServer::rfu620();
    let device = connected_device(&server).await;

    // Bad call status.
    server.respond(scan_stop_node(), Ok(CallResult::bad(0x8076_0000)));
    assert!(!device.scan_stop().await);

    // Transport error.
    server.respond(
        scan_start_node(),
        Err(OpcUaError::call_failed("ns=4;i=7002", "BadTimeout")),
    );
    assert!(!device.scan_start(1000.0, 0, false).await);

    // ReadTag without outputs has no data to decode.
    server.respond(read_tag_node(), Ok(CallResult::bad(0x80AB_0000)));
    assert!(!device.read_tag(1, "tag", "RAW:STRING", 3, 0, 4, &[]).await);

    server.respond(write_tag_node(), Ok(CallResult::bad(0x80AB_0000)));
    assert!(
        !device
            .write_tag(1, "tag", "RAW:STRING", 3, 0, b"x", &[])
            .await
    );

    let err = device.try_scan_stop().await.unwrap_err();
    assert!(matches!(
        err,
        OpcUaError::Operation(OperationError::BadStatus { .. })
    ));
}

// =============================================================================
// LastScanData
// =============================================================================

#[tokio::test]
async fn test_last_scan_data_scan_data_structure() {
    let server = MockServer::rfu620();
    let tag = TagIdentifier::Epc("E2801160600002".into());
    server.set_value(
        last_scan_data_node(),
        ReadResult::success(
            last_scan_data_node(),
            OpcUaValue::ExtensionObject(tag.to_extension_object(AUTOID_NS)),
        ),
    );
    let device = connected_device(&server).await;

    assert_eq!(
        device.get_last_scan_data().await.as_deref(),
        Some("E2801160600002")
    );
    let data = device.try_get_last_scan_data().await.unwrap();
    assert_eq!(data.tag, Some(tag));
    assert_eq!(data.status_code, 0);

    assert_eq!(
        server.timestamps_for(&last_scan_data_node()),
        vec![TimestampsToReturn::Both, TimestampsToReturn::Both]
    );
}

#[tokio::test]
async fn test_last_scan_data_plain_value() {
    let server = MockServer::rfu620();
    server.set_value(
        last_scan_data_node(),
        ReadResult::success(last_scan_data_node(), OpcUaValue::String("3000E200".into())),
    );
    let device = connected_device(&server).await;

    assert_eq!(device.get_last_scan_data().await.as_deref(), Some("3000E200"));
}

#[tokio::test]
async fn test_last_scan_data_status_does_not_gate_result() {
    let server = MockServer::rfu620();
    let mut stale = ReadResult::success(last_scan_data_node(), OpcUaValue::String("old".into()));
    stale.status_code = 0x408F_0000;
    server.set_value(last_scan_data_node(), stale);
    let device = connected_device(&server).await;

    assert_eq!(device.get_last_scan_data().await.as_deref(), Some("old"));
    let data = device.try_get_last_scan_data().await.unwrap();
    assert_eq!(data.status_code, 0x408F_0000);
}

#[tokio::test]
async fn test_validator_rejection() {
    let server = MockServer::rfu620();
    server.set_value(
        last_scan_data_node(),
        ReadResult::success(last_scan_data_node(), OpcUaValue::String("x".into())),
    );

    let session = RemoteSession::new(MockTransport::new(&server), OpcUaConfig::new(ENDPOINT))
        .with_validator(|_: &[ReadResult], _: &[ReadValueId]| -> OpcUaResult<()> {
            Err(OpcUaError::operation(OperationError::response_rejected(
                "Read",
                "diagnostics mismatch",
            )))
        });
    let mut device = DeviceClient::from_session(session, DeviceProfile::rfu6xx());

    assert!(device.connect(ENDPOINT).await);
    assert!(device.get_last_scan_data().await.is_none());
    assert_eq!(server.reads.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Tag memory
// =============================================================================

#[tokio::test]
async fn test_read_tag_decodes_text() {
    let server = MockServer::rfu620();
    server.respond(read_tag_node(), read_tag_ok());
    let device = connected_device(&server).await;

    assert!(
        device
            .read_tag(2, "E2801160600002", "RAW:STRING", 3, 0, 14, &[])
            .await
    );

    server.respond(read_tag_node(), read_tag_ok());
    let result = device
        .try_read_tag(
            &TagIdentifier::Epc("E2801160600002".into()),
            &ReadTagRequest {
                codetype: "RAW:STRING".into(),
                region: 3,
                offset: 0,
                length: 14,
                password: Vec::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(result.text, "HELLOWORLD1234");
    assert_eq!(result.data, b"HELLOWORLD1234");
    assert_eq!(
        result.status,
        Some(ReportedStatus::Operation(AutoIdOperationStatus::Success))
    );
}

#[tokio::test]
async fn test_read_tag_argument_layout() {
    let server = MockServer::rfu620();
    server.respond(read_tag_node(), read_tag_ok());
    let device = connected_device(&server).await;

    assert!(
        device
            .read_tag(2, "E200", "RAW:STRING", 3, 4, 14, &[0xAA, 0xBB])
            .await
    );

    let call = &server.calls()[0];
    assert_eq!(call.object_id, device_node());
    assert_eq!(call.method_id, read_tag_node());
    assert_eq!(call.args.len(), 6);
    assert_eq!(decode_tag_arg(call), TagIdentifier::Epc("E200".into()));
    assert_eq!(call.args[1], OpcUaValue::String("RAW:STRING".into()));
    assert_eq!(call.args[2], OpcUaValue::UInt16(3));
    assert_eq!(call.args[3], OpcUaValue::UInt32(4));
    assert_eq!(call.args[4], OpcUaValue::UInt32(14));
    assert_eq!(call.args[5], OpcUaValue::ByteString(vec![0xAA, 0xBB]));
}

#[tokio::test]
async fn test_read_tag_encodes_every_identifier_kind() {
    let server = MockServer::rfu620();
    let device = connected_device(&server).await;

    let cases: Vec<(u32, rfu_opcua::TagValue, TagIdentifier)> = vec![
        (0, vec![0xE2, 0x80].into(), TagIdentifier::Raw(vec![0xE2, 0x80])),
        (1, "plain".into(), TagIdentifier::Text("plain".into())),
        (2, "E2801160".into(), TagIdentifier::Epc("E2801160".into())),
        (3, "TID-01".into(), TagIdentifier::CustomTid("TID-01".into())),
    ];

    for (switch_field, value, expected) in cases {
        server.respond(read_tag_node(), read_tag_ok());
        assert!(
            device
                .read_tag(switch_field, value, "RAW:STRING", 3, 0, 14, &[])
                .await
        );
        let calls = server.calls();
        let tag = decode_tag_arg(calls.last().unwrap());
        assert_eq!(tag, expected);
        assert_eq!(tag.switch_field(), switch_field);
    }
}

#[tokio::test]
async fn test_read_tag_rejects_unmapped_identifier() {
    let server = MockServer::rfu620();
    server.respond(read_tag_node(), read_tag_ok());
    let device = connected_device(&server).await;

    assert!(!device.read_tag(7, "E200", "RAW:STRING", 3, 0, 4, &[]).await);
    assert!(!device.read_tag(0, "not-bytes", "RAW:STRING", 3, 0, 4, &[]).await);
    assert_eq!(server.call_count(), 0);
}

#[tokio::test]
async fn test_read_tag_without_outputs() {
    let server = MockServer::rfu620();
    server.respond(read_tag_node(), Ok(CallResult::good(vec![])));
    let device = connected_device(&server).await;

    assert!(!device.read_tag(2, "E200", "RAW:STRING", 3, 0, 4, &[]).await);
}

#[tokio::test]
async fn test_read_tag_wrong_output_type() {
    let server = MockServer::rfu620();
    server.respond(
        read_tag_node(),
        Ok(CallResult::good(vec![OpcUaValue::String("text".into())])),
    );
    let device = connected_device(&server).await;

    let err = device
        .try_read_tag(
            &TagIdentifier::Epc("E200".into()),
            &ReadTagRequest {
                codetype: "RAW:STRING".into(),
                region: 3,
                offset: 0,
                length: 4,
                password: Vec::new(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.category(), "decode");
}

#[tokio::test]
async fn test_write_tag_argument_layout() {
    let server = MockServer::rfu620();
    server.respond(
        write_tag_node(),
        Ok(CallResult::good(vec![OpcUaValue::Int32(4)])),
    );
    let device = connected_device(&server).await;

    assert!(
        device
            .write_tag(0, vec![0x01, 0x02], "RAW:STRING", 3, 2, b"HELLO", &[])
            .await
    );

    let call = &server.calls()[0];
    assert_eq!(call.method_id, write_tag_node());
    assert_eq!(call.args.len(), 6);
    assert_eq!(decode_tag_arg(call), TagIdentifier::Raw(vec![0x01, 0x02]));
    assert_eq!(call.args[3], OpcUaValue::UInt32(2));
    assert_eq!(call.args[4], OpcUaValue::ByteString(b"HELLO".to_vec()));
    assert_eq!(call.args[5], OpcUaValue::ByteString(Vec::new()));
}

#[tokio::test]
async fn test_session_stats_and_timeout() {
    let server = MockServer::rfu620();
    server.respond(scan_stop_node(), Ok(CallResult::good(vec![])));
    let device = connected_device(&server).await;

    assert!(device.scan_stop().await);
    let _ = device.get_last_scan_data().await;

    let stats = device.session().stats();
    assert_eq!(stats.calls(), 1);
    assert_eq!(stats.reads(), 1);
    assert_eq!(
        device.session().session_info().unwrap().revised_timeout,
        Duration::from_secs(30 * 60)
    );
}
