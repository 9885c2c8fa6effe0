// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use serde::{Deserialize, Serialize};

/// Namespace URI of the OPC UA AutoID companion specification.
pub const AUTOID_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/AutoID/";

/// Namespace URI of the OPC UA Device Integration model.
pub const DI_NAMESPACE_URI: &str = "http://opcfoundation.org/UA/DI/";

/// Vendor namespace URI of the SICK RFU6xx family.
pub const RFU6XX_NAMESPACE_URI: &str = "http://www.sick.com/RFU6xx/";

/// Namespace URIs and numeric node ids that locate a device in the server
/// address space.
///
/// Node ids are relative to the device namespace; the actual namespace
/// indices are resolved from the server namespace array on every connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    /// AutoID companion namespace URI (encoding ids of structured arguments).
    pub autoid_namespace: String,

    /// Device Integration namespace URI.
    pub di_namespace: String,

    /// Vendor namespace URI (device object, methods and variables).
    pub device_namespace: String,

    /// Device root object.
    pub device_node: u32,

    /// ScanStart method.
    pub scan_start_method: u32,

    /// ScanStop method.
    pub scan_stop_method: u32,

    /// ReadTag method.
    pub read_tag_method: u32,

    /// WriteTag method.
    pub write_tag_method: u32,

    /// LastScanData variable.
    pub last_scan_data_node: u32,
}

impl DeviceProfile {
    /// Profile of the SICK RFU6xx interrogators.
    pub fn rfu6xx() -> Self {
        Self {
            autoid_namespace: AUTOID_NAMESPACE_URI.to_string(),
            di_namespace: DI_NAMESPACE_URI.to_string(),
            device_namespace: RFU6XX_NAMESPACE_URI.to_string(),
            device_node: 5002,
            scan_start_method: 7002,
            scan_stop_method: 7003,
            read_tag_method: 7004,
            write_tag_method: 7005,
            last_scan_data_node: 6023,
        }
    }

    /// Namespace URIs that must be present on the server.
    pub fn required_namespaces(&self) -> [&str; 3] {
        [
            self.autoid_namespace.as_str(),
            self.di_namespace.as_str(),
            self.device_namespace.as_str(),
        ]
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::rfu6xx()
    }
}
