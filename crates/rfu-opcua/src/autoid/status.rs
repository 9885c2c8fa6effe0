// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use std::fmt;

use crate::client::OpcUaValue;
use crate::error::OperationError;

/// Result code of an AutoID device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum AutoIdOperationStatus {
    Success,
    MiscErrorTotal,
    MiscErrorPartial,
    PermissionError,
    PasswordError,
    RegionNotFoundError,
    OpNotPossibleError,
    OutOfRangeError,
    NoIdentifier,
    MultipleIdentifiers,
    ReadError,
    DecodingError,
    MatchError,
    CodeNotSupported,
    WriteError,
    NotSupportedByDevice,
    NotSupportedByTag,
    DeviceNotReady,
    InvalidConfiguration,
    RfCommunicationError,
    DeviceFault,
    TagHasLowBattery,
}

impl AutoIdOperationStatus {
    /// Maps the enumeration value reported by the device.
    pub fn from_code(code: i32) -> Option<Self> {
        use AutoIdOperationStatus::*;
        const ALL: [AutoIdOperationStatus; 22] = [
            Success,
            MiscErrorTotal,
            MiscErrorPartial,
            PermissionError,
            PasswordError,
            RegionNotFoundError,
            OpNotPossibleError,
            OutOfRangeError,
            NoIdentifier,
            MultipleIdentifiers,
            ReadError,
            DecodingError,
            MatchError,
            CodeNotSupported,
            WriteError,
            NotSupportedByDevice,
            NotSupportedByTag,
            DeviceNotReady,
            InvalidConfiguration,
            RfCommunicationError,
            DeviceFault,
            TagHasLowBattery,
        ];
        usize::try_from(code).ok().and_then(|i| ALL.get(i).copied())
    }

    /// Returns the symbolic name used by the AutoID model.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::MiscErrorTotal => "MISC_ERROR_TOTAL",
            Self::MiscErrorPartial => "MISC_ERROR_PARTIAL",
            Self::PermissionError => "PERMISSON_ERROR",
            Self::PasswordError => "PASSWORD_ERROR",
            Self::RegionNotFoundError => "REGION_NOT_FOUND_ERROR",
            Self::OpNotPossibleError => "OP_NOT_POSSIBLE_ERROR",
            Self::OutOfRangeError => "OUT_OF_RANGE_ERROR",
            Self::NoIdentifier => "NO_IDENTIFIER",
            Self::MultipleIdentifiers => "MULTIPLE_IDENTIFIERS",
            Self::ReadError => "READ_ERROR",
            Self::DecodingError => "DECODING_ERROR",
            Self::MatchError => "MATCH_ERROR",
            Self::CodeNotSupported => "CODE_NOT_SUPPORTED",
            Self::WriteError => "WRITE_ERROR",
            Self::NotSupportedByDevice => "NOT_SUPPORTED_BY_DEVICE",
            Self::NotSupportedByTag => "NOT_SUPPORTED_BY_TAG",
            Self::DeviceNotReady => "DEVICE_NOT_READY",
            Self::InvalidConfiguration => "INVALID_CONFIGURATION",
            Self::RfCommunicationError => "RF_COMMUNICATION_ERROR",
            Self::DeviceFault => "DEVICE_FAULT",
            Self::TagHasLowBattery => "TAG_HAS_LOW_BATTERY",
        }
    }
}

impl fmt::Display for AutoIdOperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Status output of a device method, as reported.
///
/// The status is informational: a method call that returned outputs counts
/// as completed whatever the status says.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportedStatus {
    /// AutoID operation status enumeration.
    Operation(AutoIdOperationStatus),
    /// Service-level status code.
    Service(u32),
    /// Any other value.
    Other(OpcUaValue),
}

impl ReportedStatus {
    /// Interprets a method output value as a status.
    pub fn from_value(value: &OpcUaValue) -> Self {
        match value {
            OpcUaValue::Int32(code) => AutoIdOperationStatus::from_code(*code)
                .map(Self::Operation)
                .unwrap_or_else(|| Self::Other(value.clone())),
            OpcUaValue::StatusCode(code) => Self::Service(*code),
            other => Self::Other(other.clone()),
        }
    }

    /// Returns `true` for SUCCESS or a Good status code.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Operation(status) => *status == AutoIdOperationStatus::Success,
            Self::Service(code) => code & 0xC000_0000 == 0,
            Self::Other(_) => false,
        }
    }
}

impl fmt::Display for ReportedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operation(status) => write!(f, "{}", status),
            Self::Service(code) => write!(
                f,
                "{} ({:#010x})",
                OperationError::status_code_name(*code),
                code
            ),
            Self::Other(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AutoIdOperationStatus::from_code(0),
            Some(AutoIdOperationStatus::Success)
        );
        assert_eq!(
            AutoIdOperationStatus::from_code(8),
            Some(AutoIdOperationStatus::NoIdentifier)
        );
        assert_eq!(
            AutoIdOperationStatus::from_code(21),
            Some(AutoIdOperationStatus::TagHasLowBattery)
        );
        assert_eq!(AutoIdOperationStatus::from_code(22), None);
        assert_eq!(AutoIdOperationStatus::from_code(-1), None);
    }

    #[test]
    fn test_reported_status() {
        let ok = ReportedStatus::from_value(&OpcUaValue::Int32(0));
        assert!(ok.is_success());
        assert_eq!(ok.to_string(), "SUCCESS");

        let no_tag = ReportedStatus::from_value(&OpcUaValue::Int32(8));
        assert!(!no_tag.is_success());

        let good = ReportedStatus::from_value(&OpcUaValue::StatusCode(0));
        assert!(good.is_success());

        let bad = ReportedStatus::from_value(&OpcUaValue::StatusCode(0x8034_0000));
        assert!(!bad.is_success());
        assert!(bad.to_string().starts_with("BadNodeIdUnknown"));

        let other = ReportedStatus::from_value(&OpcUaValue::String("statusOK".into()));
        assert_eq!(other.to_string(), "statusOK");
    }
}
