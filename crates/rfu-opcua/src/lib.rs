// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA client for SICK RFU6xx RFID interrogators.
//!
//! The crate is layered:
//!
//! - [`client::RemoteSession`] manages one session against a server and
//!   exposes attribute reads and method calls.
//! - [`device::DeviceClient`] maps the AutoID device operations (ScanStart,
//!   ScanStop, LastScanData, ReadTag, WriteTag) onto that session.
//! - [`autoid`] holds the AutoID structured argument types and their binary
//!   encodings, built on [`codec`].
//!
//! The protocol stack itself sits behind [`client::OpcUaTransport`]. Enable
//! the `real-transport` feature for the `opcua`-backed implementation.
//!
//! # Error Handling
//!
//! ```text
//! OpcUaError
//! ├── Connection    - Discovery, endpoint selection, not connected
//! ├── Session       - Session creation and post-connect initialization
//! ├── Security      - Certificate trust
//! ├── Operation     - Read and method call failures
//! ├── Decode        - Structured payload and output decoding
//! └── Configuration - Invalid settings
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use rfu_opcua::{DeviceClient, DeviceProfile, OpcUaConfig, RealOpcUaTransport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = OpcUaConfig::builder()
//!         .endpoint("opc.tcp://192.168.0.1:4840")
//!         .build()?;
//!
//!     let endpoint = config.endpoint.clone();
//!     let mut device = DeviceClient::new(
//!         RealOpcUaTransport::new(config.clone()),
//!         config,
//!         DeviceProfile::rfu6xx(),
//!     );
//!     device.try_connect(&endpoint).await?;
//!
//!     let data = device.try_get_last_scan_data().await?;
//!     println!("Last scan: {}", data.text);
//!
//!     device.disconnect().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod autoid;
pub mod client;
pub mod codec;
pub mod device;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{
    ConfigurationError, ConnectionError, DecodeError, ErrorCode, ErrorSeverity, OpcUaError,
    OpcUaResult, OperationError, SecurityError, SessionError,
};

pub use types::{
    AttributeId, EndpointSelection, NodeId, NodeIdentifier, OpcUaConfig, OpcUaConfigBuilder,
    SecurityMode, SecurityPolicy, UserTokenType, DEFAULT_APPLICATION_NAME, DEFAULT_ENDPOINT,
};

pub use autoid::{
    AutoIdOperationStatus, DeviceProfile, ReportedStatus, ScanSettings, TagIdentifier, TagKind,
    TagValue,
};

pub use client::{
    AcceptAllPolicy, AllowListPolicy, CertificateTrustPolicy, OpcUaTransport, OpcUaValue,
    RejectAllPolicy, RemoteSession, SessionState, TransportState, TrustMode,
};

#[cfg(feature = "real-transport")]
pub use client::RealOpcUaTransport;

pub use device::{
    DeviceClient, LastScanData, MethodOutcome, ReadTagRequest, ResolvedNodes, TagReadResult,
    TagWriteResult, WriteTagRequest,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
