// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! AutoID companion data model and the RFU6xx device profile.
//!
//! The structures here are sent to and received from the device as
//! binary-bodied extension objects. Their encoding ids live in the AutoID
//! namespace, whose index is only known after connecting, so every
//! conversion takes the resolved namespace index as a parameter.

mod profile;
mod scan_data;
mod scan_settings;
mod status;

pub use profile::{DeviceProfile, AUTOID_NAMESPACE_URI, DI_NAMESPACE_URI, RFU6XX_NAMESPACE_URI};
pub use scan_data::{TagIdentifier, TagKind, TagValue, SCAN_DATA_ENCODING_ID};
pub use scan_settings::{ScanSettings, SCAN_SETTINGS_ENCODING_ID};
pub use status::{AutoIdOperationStatus, ReportedStatus};
