// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::client::ExtensionObject;
use crate::codec::{self, BinaryDecode, BinaryEncode};
use crate::error::DecodeError;
use crate::types::NodeId;

/// Numeric id (in the AutoID namespace) of the ScanSettings type and its
/// binary encoding.
pub const SCAN_SETTINGS_ENCODING_ID: u32 = 3010;

/// Scan configuration passed to the ScanStart method.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanSettings {
    /// Location type flag; the device ignores location data when 0.
    pub location_type: i32,

    /// Scan duration in milliseconds; 0 means unlimited.
    pub duration_ms: f64,

    /// Number of scan cycles; 0 means unlimited.
    pub cycles: i32,

    /// Stop as soon as data is available.
    pub data_available: bool,
}

impl ScanSettings {
    /// Creates scan settings without location data.
    pub fn new(duration_ms: f64, cycles: i32, data_available: bool) -> Self {
        Self {
            location_type: 0,
            duration_ms,
            cycles,
            data_available,
        }
    }

    /// Wraps the encoded settings in an extension object.
    pub fn to_extension_object(&self, autoid_namespace: u16) -> ExtensionObject {
        ExtensionObject::new(
            NodeId::numeric(autoid_namespace, SCAN_SETTINGS_ENCODING_ID),
            self.to_bytes(),
        )
    }
}

impl BinaryEncode for ScanSettings {
    fn encoded_len(&self) -> usize {
        4 + 8 + 4 + 1
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) {
        codec::put_i32(dst, self.location_type);
        codec::put_f64(dst, self.duration_ms);
        codec::put_i32(dst, self.cycles);
        codec::put_bool(dst, self.data_available);
    }
}

impl BinaryDecode for ScanSettings {
    fn decode_from<B: Buf>(src: &mut B) -> Result<Self, DecodeError> {
        Ok(Self {
            location_type: codec::get_i32(src, "LocationTypeSpecified")?,
            duration_ms: codec::get_f64(src, "Duration")?,
            cycles: codec::get_i32(src, "Cycles")?,
            data_available: codec::get_bool(src, "DataAvailable")?,
        })
    }
}

impl fmt::Display for ScanSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScanSettings(location_type={}, duration={}ms, cycles={}, data_available={})",
            self.location_type, self.duration_ms, self.cycles, self.data_available
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_layout() {
        let settings = ScanSettings::new(2000.0, 0, false);
        let bytes = settings.to_bytes();
        assert_eq!(bytes.len(), settings.encoded_len());
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        assert_eq!(&bytes[4..12], &2000.0f64.to_le_bytes());
        assert_eq!(&bytes[12..16], &[0, 0, 0, 0]);
        assert_eq!(bytes[16], 0);
    }

    #[test]
    fn test_decode() {
        let settings = ScanSettings {
            location_type: 1,
            duration_ms: 150.5,
            cycles: 3,
            data_available: true,
        };
        let decoded = ScanSettings::from_bytes(&settings.to_bytes()).unwrap();
        assert_eq!(decoded, settings);
    }

    #[test]
    fn test_extension_object_id() {
        let eo = ScanSettings::new(100.0, 1, true).to_extension_object(3);
        assert_eq!(eo.type_id, NodeId::numeric(3, SCAN_SETTINGS_ENCODING_ID));
        assert_eq!(eo.body.len(), 17);
    }

    #[test]
    fn test_truncated_settings() {
        let bytes = ScanSettings::new(1.0, 1, true).to_bytes();
        assert!(ScanSettings::from_bytes(&bytes[..10]).is_err());
    }
}
