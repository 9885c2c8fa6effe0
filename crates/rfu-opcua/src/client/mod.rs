// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client layers.
//!
//! - **Transport**: abstract protocol operations (discovery, session, read, call)
//! - **Session**: connect lifecycle, namespace resolution and the read/call primitives
//! - **Trust**: server certificate trust policies
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        DeviceClient                             │
//! │          (ScanStart / ScanStop / LastScanData / Tags)           │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       RemoteSession                             │
//! │        (connect, read_attribute, invoke, disconnect)            │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      OpcUaTransport                             │
//! │          (RealOpcUaTransport or a test double)                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod session;
mod transport;
mod trust;

#[cfg(feature = "real-transport")]
mod real_transport;

pub use session::{
    select_endpoint, ConnectHook, CountValidator, NamespaceTable, NoopHook, RemoteSession,
    ResponseValidator, SessionState, SessionStats,
};
pub use transport::{
    CallResult, EndpointDescription, ExtensionObject, OpcUaTransport, OpcUaValue, ReadResult,
    ReadValueId, SessionInfo, SessionParams, TimestampsToReturn, TransportState,
    SERVER_NAMESPACE_ARRAY,
};
pub use trust::{
    AcceptAllPolicy, AllowListPolicy, CertificateTrustPolicy, RejectAllPolicy, ServerCertificate,
    TrustDecision, TrustMode,
};

#[cfg(feature = "real-transport")]
pub use real_transport::RealOpcUaTransport;
