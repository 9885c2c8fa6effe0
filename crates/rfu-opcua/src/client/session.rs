// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Remote session lifecycle.
//!
//! [`RemoteSession`] owns a transport and at most one open session. It runs
//! endpoint discovery and selection, certificate trust, session creation and
//! namespace resolution on connect, and exposes the two primitives device
//! facades are built on: attribute reads and method calls.
//!
//! Every fallible operation has a `try_*` form returning [`OpcUaResult`] and a
//! compatibility form that logs the error and returns a sentinel (`false` or
//! `None`). Nothing panics past this boundary.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::transport::{
    EndpointDescription, OpcUaTransport, OpcUaValue, ReadResult, ReadValueId, SessionInfo,
    SessionParams, TimestampsToReturn,
};
use super::trust::{AcceptAllPolicy, CertificateTrustPolicy, ServerCertificate, TrustDecision};
use crate::error::{
    ConnectionError, OpcUaError, OpcUaResult, OperationError, SecurityError, SessionError,
};
use crate::types::{validate_endpoint, AttributeId, EndpointSelection, NodeId, OpcUaConfig};

// =============================================================================
// SessionState
// =============================================================================

/// State of a [`RemoteSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session.
    #[default]
    Disconnected,

    /// Connect in progress.
    Connecting,

    /// Session open and initialized.
    Connected,

    /// Disconnect in progress.
    Closing,

    /// The last connect attempt failed.
    Failed,
}

impl SessionState {
    /// Returns `true` if the session is usable.
    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns `true` if a transition is in progress.
    #[inline]
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Closing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Connected => write!(f, "Connected"),
            Self::Closing => write!(f, "Closing"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

// =============================================================================
// NamespaceTable
// =============================================================================

/// Snapshot of the server namespace array taken at connect time.
///
/// Indices are only valid for the session they were read in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    uris: Vec<String>,
}

impl NamespaceTable {
    /// Creates a table from the namespace array.
    pub fn new(uris: Vec<String>) -> Self {
        Self { uris }
    }

    /// Returns the index of `uri`, if present.
    pub fn index_of(&self, uri: &str) -> Option<u16> {
        self.uris
            .iter()
            .position(|u| u == uri)
            .and_then(|i| u16::try_from(i).ok())
    }

    /// Returns the index of `uri` or a `NamespaceNotFound` error.
    pub fn require(&self, uri: &str) -> OpcUaResult<u16> {
        self.index_of(uri)
            .ok_or_else(|| OpcUaError::session(SessionError::namespace_not_found(uri)))
    }

    /// Returns all URIs in index order.
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Number of namespaces.
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }
}

// =============================================================================
// ConnectHook
// =============================================================================

/// Post-connect initialization run once per successful session open.
pub trait ConnectHook: Send {
    /// Called with the namespace table of the new session.
    ///
    /// An error aborts the connect and closes the session.
    fn on_connect(&mut self, namespaces: &NamespaceTable) -> OpcUaResult<()>;
}

impl<F> ConnectHook for F
where
    F: FnMut(&NamespaceTable) -> OpcUaResult<()> + Send,
{
    fn on_connect(&mut self, namespaces: &NamespaceTable) -> OpcUaResult<()> {
        self(namespaces)
    }
}

/// Hook that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHook;

impl ConnectHook for NoopHook {
    fn on_connect(&mut self, _namespaces: &NamespaceTable) -> OpcUaResult<()> {
        Ok(())
    }
}

// =============================================================================
// ResponseValidator
// =============================================================================

/// Checks a read response against the request that produced it.
pub trait ResponseValidator: Send + Sync {
    /// Returns an error if the response does not fit the request.
    fn validate(&self, results: &[ReadResult], requested: &[ReadValueId]) -> OpcUaResult<()>;
}

impl<F> ResponseValidator for F
where
    F: Fn(&[ReadResult], &[ReadValueId]) -> OpcUaResult<()> + Send + Sync,
{
    fn validate(&self, results: &[ReadResult], requested: &[ReadValueId]) -> OpcUaResult<()> {
        self(results, requested)
    }
}

/// Requires one result per requested item.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountValidator;

impl ResponseValidator for CountValidator {
    fn validate(&self, results: &[ReadResult], requested: &[ReadValueId]) -> OpcUaResult<()> {
        if results.len() != requested.len() {
            return Err(OpcUaError::operation(OperationError::response_rejected(
                "Read",
                format!(
                    "expected {} results, got {}",
                    requested.len(),
                    results.len()
                ),
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Endpoint selection
// =============================================================================

/// Picks an endpoint according to `selection`.
///
/// Ties on security level keep the first endpoint offered.
pub fn select_endpoint<'a>(
    endpoints: &'a [EndpointDescription],
    selection: &EndpointSelection,
) -> Option<&'a EndpointDescription> {
    match selection {
        EndpointSelection::NoSecurity => endpoints.iter().find(|e| e.security_mode.is_none()),
        EndpointSelection::HighestSecurityLevel => {
            endpoints.iter().fold(None, |best: Option<&EndpointDescription>, e| {
                match best {
                    Some(b) if b.security_level >= e.security_level => Some(b),
                    _ => Some(e),
                }
            })
        }
        EndpointSelection::Exact { mode, policy } => endpoints.iter().find(|e| {
            e.security_mode == *mode && e.security_policy().as_ref() == Some(policy)
        }),
    }
}

// =============================================================================
// RemoteSession
// =============================================================================

/// A client session against one OPC UA server.
pub struct RemoteSession<T: OpcUaTransport> {
    transport: T,
    config: OpcUaConfig,
    trust_policy: Box<dyn CertificateTrustPolicy>,
    validator: Box<dyn ResponseValidator>,
    state: SessionState,
    session_info: Option<SessionInfo>,
    namespaces: Option<NamespaceTable>,
    stats: SessionStats,
}

impl<T: OpcUaTransport> RemoteSession<T> {
    /// Creates a session with the default trust policy and validator.
    pub fn new(transport: T, config: OpcUaConfig) -> Self {
        Self {
            transport,
            config,
            trust_policy: Box::new(AcceptAllPolicy),
            validator: Box::new(CountValidator),
            state: SessionState::Disconnected,
            session_info: None,
            namespaces: None,
            stats: SessionStats::new(),
        }
    }

    /// Replaces the certificate trust policy.
    pub fn with_trust_policy(mut self, policy: Box<dyn CertificateTrustPolicy>) -> Self {
        self.trust_policy = policy;
        self
    }

    /// Replaces the read response validator.
    pub fn with_validator(mut self, validator: impl ResponseValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &OpcUaConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` if a session is open and initialized.
    pub fn is_connected(&self) -> bool {
        self.state.is_connected() && self.transport.is_connected()
    }

    /// Returns the open session info.
    pub fn session_info(&self) -> Option<&SessionInfo> {
        self.session_info.as_ref()
    }

    /// Returns the namespace table of the open session.
    pub fn namespaces(&self) -> Option<&NamespaceTable> {
        self.namespaces.as_ref()
    }

    /// Returns the statistics.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // -------------------------------------------------------------------------
    // Connect / disconnect
    // -------------------------------------------------------------------------

    /// Connects to `url`, returning `false` on any failure.
    pub async fn connect(&mut self, url: &str) -> bool {
        self.connect_with(url, &mut NoopHook).await
    }

    /// Connects to `url` running `hook`, returning `false` on any failure.
    pub async fn connect_with(&mut self, url: &str, hook: &mut dyn ConnectHook) -> bool {
        match self.try_connect_with(url, hook).await {
            Ok(()) => true,
            Err(e) => {
                e.log("connect");
                false
            }
        }
    }

    /// Connects to `url`.
    pub async fn try_connect(&mut self, url: &str) -> OpcUaResult<()> {
        self.try_connect_with(url, &mut NoopHook).await
    }

    /// Connects to `url` and runs `hook` on the new session.
    ///
    /// Connecting while already connected succeeds without opening another
    /// session or running the hook again.
    #[tracing::instrument(level = "debug", skip(self, hook), fields(transport = %self.transport.display_name()))]
    pub async fn try_connect_with(
        &mut self,
        url: &str,
        hook: &mut dyn ConnectHook,
    ) -> OpcUaResult<()> {
        if self.is_connected() {
            tracing::info!(endpoint = %url, "Already connected, reusing session");
            return Ok(());
        }

        validate_endpoint(url)?;
        self.set_state(SessionState::Connecting);

        match self.establish(url, hook).await {
            Ok(()) => {
                self.stats.record_connect();
                self.set_state(SessionState::Connected);
                Ok(())
            }
            Err(e) => {
                self.session_info = None;
                self.namespaces = None;
                self.stats.record_failure();
                self.set_state(SessionState::Failed);
                Err(e)
            }
        }
    }

    async fn establish(&mut self, url: &str, hook: &mut dyn ConnectHook) -> OpcUaResult<()> {
        let endpoints = self.transport.discover_endpoints(url).await?;
        tracing::debug!(endpoint = %url, count = endpoints.len(), "Discovered endpoints");

        let endpoint = select_endpoint(&endpoints, &self.config.endpoint_selection)
            .cloned()
            .ok_or_else(|| {
                OpcUaError::connection(ConnectionError::no_suitable_endpoint(
                    url,
                    self.config.endpoint_selection.to_string(),
                ))
            })?;
        tracing::debug!(selected = %endpoint, "Selected endpoint");

        let trusted = self.check_trust(&endpoint)?;

        let params = SessionParams {
            session_name: self.config.effective_session_name().to_string(),
            session_timeout: self.config.session_timeout,
            identity: self.config.user_token.clone(),
            trust_server_certificate: trusted,
        };
        let info = self.transport.open_session(&endpoint, &params).await?;

        tracing::info!(
            endpoint = %endpoint.endpoint_url,
            session_id = %info.session_id,
            timeout = ?info.revised_timeout,
            "OPC UA session opened"
        );
        self.session_info = Some(info);

        if let Err(e) = self.initialize(hook).await {
            self.close_transport().await;
            return Err(e);
        }
        Ok(())
    }

    async fn initialize(&mut self, hook: &mut dyn ConnectHook) -> OpcUaResult<()> {
        let uris = self.transport.namespace_array().await.map_err(|e| {
            OpcUaError::session(SessionError::namespace_array_unavailable(e.to_string()))
        })?;
        let table = NamespaceTable::new(uris);
        tracing::debug!(namespaces = table.len(), "Read namespace array");

        hook.on_connect(&table)?;
        self.namespaces = Some(table);
        Ok(())
    }

    /// Runs the trust policy. Returns whether a certificate was accepted.
    fn check_trust(&self, endpoint: &EndpointDescription) -> OpcUaResult<bool> {
        let Some(der) = endpoint.server_certificate.as_ref() else {
            return Ok(false);
        };

        let certificate = ServerCertificate::new(endpoint.endpoint_url.clone(), der.clone());
        match self.trust_policy.decide(&certificate) {
            TrustDecision::Accept => {
                tracing::debug!(policy = self.trust_policy.name(), "Server certificate trusted");
                Ok(true)
            }
            TrustDecision::Reject(reason) => Err(OpcUaError::security(
                SecurityError::certificate_rejected(certificate.summary(), reason),
            )),
        }
    }

    /// Closes the session. Safe to call when not connected.
    pub async fn disconnect(&mut self) {
        if self.session_info.is_none() && !self.transport.is_connected() {
            tracing::debug!("Disconnect requested without an open session");
            return;
        }

        self.set_state(SessionState::Closing);
        self.close_transport().await;
        self.stats.record_disconnect();
        self.set_state(SessionState::Disconnected);
        tracing::info!("OPC UA session closed");
    }

    async fn close_transport(&mut self) {
        if let Err(e) = self.transport.close_session().await {
            e.log("close session");
        }
        self.session_info = None;
        self.namespaces = None;
    }

    // -------------------------------------------------------------------------
    // Read
    // -------------------------------------------------------------------------

    /// Reads one attribute, returning `None` on failure.
    pub async fn read_attribute(
        &self,
        node_id: &NodeId,
        attribute_id: AttributeId,
    ) -> Option<ReadResult> {
        match self.try_read_attribute(node_id, attribute_id).await {
            Ok(result) => Some(result),
            Err(e) => {
                e.log("read attribute");
                None
            }
        }
    }

    /// Reads one attribute with both timestamps.
    ///
    /// The result is returned whatever its status code.
    pub async fn try_read_attribute(
        &self,
        node_id: &NodeId,
        attribute_id: AttributeId,
    ) -> OpcUaResult<ReadResult> {
        if !self.is_connected() {
            return Err(OpcUaError::not_connected());
        }

        let requested = [ReadValueId {
            node_id: node_id.clone(),
            attribute_id,
        }];
        self.stats.record_read();

        let results = self
            .transport
            .read(&requested, TimestampsToReturn::Both)
            .await?;
        self.validator.validate(&results, &requested)?;

        let result = results
            .into_iter()
            .next()
            .ok_or_else(|| OpcUaError::read_failed(node_id.to_string(), "Empty read response"))?;

        tracing::debug!(
            node_id = %node_id,
            status = result.status_name(),
            "Read attribute"
        );
        Ok(result)
    }

    // -------------------------------------------------------------------------
    // Call
    // -------------------------------------------------------------------------

    /// Calls a method, returning `None` on failure.
    pub async fn invoke(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        args: Vec<OpcUaValue>,
    ) -> Option<Vec<OpcUaValue>> {
        match self.try_invoke(object_id, method_id, args).await {
            Ok(outputs) => Some(outputs),
            Err(e) => {
                e.log("invoke");
                None
            }
        }
    }

    /// Calls a method and returns its output arguments.
    ///
    /// A bad call status is an error. A good call without outputs yields an
    /// empty list.
    pub async fn try_invoke(
        &self,
        object_id: &NodeId,
        method_id: &NodeId,
        args: Vec<OpcUaValue>,
    ) -> OpcUaResult<Vec<OpcUaValue>> {
        if !self.is_connected() {
            return Err(OpcUaError::not_connected());
        }

        self.stats.record_call();
        let result = self.transport.call(object_id, method_id, &args).await?;

        if result.is_bad() {
            return Err(OpcUaError::operation(OperationError::bad_status(
                method_id.to_string(),
                result.status_code,
            )));
        }

        let outputs = result.output_arguments.unwrap_or_default();
        tracing::debug!(
            object_id = %object_id,
            method_id = %method_id,
            outputs = outputs.len(),
            "Method call completed"
        );
        Ok(outputs)
    }

    fn set_state(&mut self, new_state: SessionState) {
        let old_state = std::mem::replace(&mut self.state, new_state);
        if old_state != new_state {
            tracing::trace!(
                old_state = %old_state,
                new_state = %new_state,
                "Session state changed"
            );
        }
    }
}

impl<T: OpcUaTransport> fmt::Debug for RemoteSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSession")
            .field("transport", &self.transport.display_name())
            .field("state", &self.state)
            .field("trust_policy", &self.trust_policy.name())
            .finish()
    }
}

// =============================================================================
// SessionStats
// =============================================================================

/// Counters for session operations.
#[derive(Debug, Default)]
pub struct SessionStats {
    connects: AtomicU64,
    failures: AtomicU64,
    reads: AtomicU64,
    calls: AtomicU64,
    disconnects: AtomicU64,
}

impl SessionStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful connect.
    pub fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed connect.
    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a read request.
    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a method call.
    pub fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a disconnect.
    pub fn record_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Successful connects.
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }

    /// Failed connects.
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Read requests sent.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }

    /// Method calls sent.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Disconnects.
    pub fn disconnects(&self) -> u64 {
        self.disconnects.load(Ordering::Relaxed)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SecurityMode, SecurityPolicy};

    fn endpoints() -> Vec<EndpointDescription> {
        vec![
            EndpointDescription::secured(
                "opc.tcp://rfu:4840",
                SecurityMode::Sign,
                SecurityPolicy::Basic256Sha256,
                2,
            ),
            EndpointDescription::unsecured("opc.tcp://rfu:4840"),
            EndpointDescription::secured(
                "opc.tcp://rfu:4840",
                SecurityMode::SignAndEncrypt,
                SecurityPolicy::Basic256Sha256,
                5,
            ),
        ]
    }

    #[test]
    fn test_session_state() {
        assert!(SessionState::Connected.is_connected());
        assert!(SessionState::Connecting.is_transitioning());
        assert!(!SessionState::Failed.is_connected());
        assert_eq!(SessionState::Closing.to_string(), "Closing");
    }

    #[test]
    fn test_select_no_security() {
        let eps = endpoints();
        let ep = select_endpoint(&eps, &EndpointSelection::NoSecurity).unwrap();
        assert!(ep.security_mode.is_none());
    }

    #[test]
    fn test_select_highest_level() {
        let eps = endpoints();
        let ep = select_endpoint(&eps, &EndpointSelection::HighestSecurityLevel).unwrap();
        assert_eq!(ep.security_level, 5);
    }

    #[test]
    fn test_select_exact() {
        let eps = endpoints();
        let selection = EndpointSelection::Exact {
            mode: SecurityMode::Sign,
            policy: SecurityPolicy::Basic256Sha256,
        };
        assert_eq!(select_endpoint(&eps, &selection).unwrap().security_level, 2);

        let missing = EndpointSelection::Exact {
            mode: SecurityMode::Sign,
            policy: SecurityPolicy::Aes256Sha256RsaPss,
        };
        assert!(select_endpoint(&eps, &missing).is_none());
    }

    #[test]
    fn test_select_none_without_unsecured() {
        let eps = vec![endpoints().remove(0)];
        assert!(select_endpoint(&eps, &EndpointSelection::NoSecurity).is_none());
        assert!(select_endpoint(&[], &EndpointSelection::HighestSecurityLevel).is_none());
    }

    #[test]
    fn test_namespace_table() {
        let table = NamespaceTable::new(vec![
            "http://opcfoundation.org/UA/".into(),
            "urn:server".into(),
            "http://www.sick.com/RFU6xx/".into(),
        ]);
        assert_eq!(table.index_of("http://www.sick.com/RFU6xx/"), Some(2));
        assert_eq!(table.index_of("urn:missing"), None);
        assert!(table.require("urn:missing").is_err());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_count_validator() {
        let requested = [ReadValueId::value(NodeId::numeric(1, 1))];
        let one = [ReadResult::success(NodeId::numeric(1, 1), OpcUaValue::Int32(1))];
        assert!(CountValidator.validate(&one, &requested).is_ok());
        assert!(CountValidator.validate(&[], &requested).is_err());
    }

    #[test]
    fn test_closure_validator() {
        let reject_all = |_: &[ReadResult], _: &[ReadValueId]| -> OpcUaResult<()> {
            Err(OpcUaError::operation(OperationError::response_rejected(
                "Read", "test",
            )))
        };
        assert!(reject_all.validate(&[], &[]).is_err());
    }

    #[test]
    fn test_session_stats() {
        let stats = SessionStats::new();
        stats.record_connect();
        stats.record_read();
        stats.record_read();
        stats.record_call();
        assert_eq!(stats.connects(), 1);
        assert_eq!(stats.reads(), 2);
        assert_eq!(stats.calls(), 1);
        assert_eq!(stats.disconnects(), 0);
    }
}
