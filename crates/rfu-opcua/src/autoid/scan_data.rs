// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::client::ExtensionObject;
use crate::codec::{self, BinaryDecode, BinaryEncode};
use crate::error::DecodeError;
use crate::types::NodeId;

/// Numeric id (in the AutoID namespace) of the ScanData union and its
/// binary encoding.
pub const SCAN_DATA_ENCODING_ID: u32 = 5030;

// =============================================================================
// TagKind
// =============================================================================

/// Which payload a [`TagIdentifier`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    /// Raw identifier bytes.
    Raw,
    /// Plain text identifier.
    Text,
    /// EPC identifier text.
    Epc,
    /// Custom TID text.
    CustomTid,
}

impl TagKind {
    /// Returns the union switch field for this kind.
    pub const fn switch_field(self) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Text => 1,
            Self::Epc => 2,
            Self::CustomTid => 3,
        }
    }

    /// Maps a union switch field back to a kind.
    pub const fn from_switch_field(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Raw),
            1 => Some(Self::Text),
            2 => Some(Self::Epc),
            3 => Some(Self::CustomTid),
            _ => None,
        }
    }

    /// Returns the wire field name of the payload.
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Raw => "ByteString",
            Self::Text => "String",
            Self::Epc => "Epc",
            Self::CustomTid => "Custom:TID",
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

// =============================================================================
// TagValue
// =============================================================================

/// Caller-supplied tag payload before it is bound to a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    /// Byte payload.
    Bytes(Vec<u8>),
    /// Text payload.
    Text(String),
}

impl From<Vec<u8>> for TagValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

// =============================================================================
// TagIdentifier
// =============================================================================

/// Identifier of a scanned tag (the AutoID ScanData union).
///
/// Exactly one payload is active, selected by the variant. On the wire the
/// union is a `UInt32` switch field followed by that single payload field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TagIdentifier {
    /// Raw identifier bytes (switch field 0).
    Raw(Vec<u8>),
    /// Plain text identifier (switch field 1).
    Text(String),
    /// EPC identifier (switch field 2).
    Epc(String),
    /// Custom TID (switch field 3).
    CustomTid(String),
}

impl TagIdentifier {
    /// Builds an identifier from a raw `(switch_field, value)` pair.
    ///
    /// Fails when the switch field maps to no variant or when the value type
    /// does not fit the selected variant.
    pub fn from_parts(switch_field: u32, value: TagValue) -> Result<Self, DecodeError> {
        let kind = TagKind::from_switch_field(switch_field)
            .ok_or_else(|| DecodeError::unknown_discriminator("ScanData", switch_field))?;

        match (kind, value) {
            (TagKind::Raw, TagValue::Bytes(bytes)) => Ok(Self::Raw(bytes)),
            (TagKind::Text, TagValue::Text(text)) => Ok(Self::Text(text)),
            (TagKind::Epc, TagValue::Text(text)) => Ok(Self::Epc(text)),
            (TagKind::CustomTid, TagValue::Text(text)) => Ok(Self::CustomTid(text)),
            (TagKind::Raw, TagValue::Text(_)) => {
                Err(DecodeError::type_mismatch("ByteString", "String"))
            }
            (kind, TagValue::Bytes(_)) => Err(DecodeError::type_mismatch(
                format!("String ({})", kind.field_name()),
                "ByteString",
            )),
        }
    }

    /// Returns the payload kind.
    pub fn kind(&self) -> TagKind {
        match self {
            Self::Raw(_) => TagKind::Raw,
            Self::Text(_) => TagKind::Text,
            Self::Epc(_) => TagKind::Epc,
            Self::CustomTid(_) => TagKind::CustomTid,
        }
    }

    /// Returns the union switch field.
    #[inline]
    pub fn switch_field(&self) -> u32 {
        self.kind().switch_field()
    }

    /// Returns the payload as text; raw bytes are decoded lossily.
    pub fn display_text(&self) -> String {
        match self {
            Self::Raw(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Self::Text(text) | Self::Epc(text) | Self::CustomTid(text) => text.clone(),
        }
    }

    /// Wraps the encoded union in an extension object.
    pub fn to_extension_object(&self, autoid_namespace: u16) -> ExtensionObject {
        ExtensionObject::new(
            NodeId::numeric(autoid_namespace, SCAN_DATA_ENCODING_ID),
            self.to_bytes(),
        )
    }

    /// Decodes a ScanData extension object, checking its encoding id.
    pub fn from_extension_object(
        object: &ExtensionObject,
        autoid_namespace: u16,
    ) -> Result<Self, DecodeError> {
        let expected = NodeId::numeric(autoid_namespace, SCAN_DATA_ENCODING_ID);
        if object.type_id != expected {
            return Err(DecodeError::UnexpectedEncoding {
                expected: expected.to_string(),
                actual: object.type_id.to_string(),
            });
        }
        Self::from_bytes(&object.body)
    }
}

impl BinaryEncode for TagIdentifier {
    fn encoded_len(&self) -> usize {
        let payload = match self {
            Self::Raw(bytes) => bytes.len(),
            Self::Text(text) | Self::Epc(text) | Self::CustomTid(text) => text.len(),
        };
        4 + codec::prefixed_len(payload)
    }

    fn encode_to<B: BufMut>(&self, dst: &mut B) {
        codec::put_u32(dst, self.switch_field());
        match self {
            Self::Raw(bytes) => codec::put_byte_string(dst, Some(bytes.as_slice())),
            Self::Text(text) | Self::Epc(text) | Self::CustomTid(text) => {
                codec::put_string(dst, Some(text.as_str()))
            }
        }
    }
}

impl BinaryDecode for TagIdentifier {
    /// Reads the switch field, then only the payload field it selects.
    fn decode_from<B: Buf>(src: &mut B) -> Result<Self, DecodeError> {
        let switch_field = codec::get_u32(src, "SwitchField")?;
        let kind = TagKind::from_switch_field(switch_field)
            .ok_or_else(|| DecodeError::unknown_discriminator("ScanData", switch_field))?;

        let field = kind.field_name();
        Ok(match kind {
            TagKind::Raw => Self::Raw(codec::get_byte_string(src, field)?.unwrap_or_default()),
            TagKind::Text => Self::Text(codec::get_string(src, field)?.unwrap_or_default()),
            TagKind::Epc => Self::Epc(codec::get_string(src, field)?.unwrap_or_default()),
            TagKind::CustomTid => {
                Self::CustomTid(codec::get_string(src, field)?.unwrap_or_default())
            }
        })
    }
}

impl fmt::Display for TagIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raw(bytes) => write!(f, "Raw({})", hex::encode_upper(bytes)),
            Self::Text(text) => write!(f, "Text({})", text),
            Self::Epc(text) => write!(f, "Epc({})", text),
            Self::CustomTid(text) => write!(f, "CustomTid({})", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        assert_eq!(
            TagIdentifier::from_parts(2, "E200".into()).unwrap(),
            TagIdentifier::Epc("E200".into())
        );
        assert_eq!(
            TagIdentifier::from_parts(0, vec![0xAB].into()).unwrap(),
            TagIdentifier::Raw(vec![0xAB])
        );
    }

    #[test]
    fn test_from_parts_unmapped_switch_field() {
        let err = TagIdentifier::from_parts(4, "x".into()).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::UnknownDiscriminator { value: 4, .. }
        ));
    }

    #[test]
    fn test_from_parts_type_mismatch() {
        assert!(TagIdentifier::from_parts(0, "text".into()).is_err());
        assert!(TagIdentifier::from_parts(3, vec![1, 2].into()).is_err());
    }

    #[test]
    fn test_wire_layout_epc() {
        let tag = TagIdentifier::Epc("AB".into());
        assert_eq!(tag.to_bytes(), vec![2, 0, 0, 0, 2, 0, 0, 0, b'A', b'B']);
        assert_eq!(tag.encoded_len(), 10);
    }

    #[test]
    fn test_decode_reads_only_selected_field() {
        // Text union followed by unrelated bytes: decoding must stop after the
        // single payload field and leave the rest in the buffer.
        let mut data = TagIdentifier::Text("tag".into()).to_bytes();
        data.extend_from_slice(&[0xEE, 0xEE]);

        let mut src: &[u8] = &data;
        let tag = TagIdentifier::decode_from(&mut src).unwrap();
        assert_eq!(tag, TagIdentifier::Text("tag".into()));
        assert_eq!(src, &[0xEE, 0xEE]);
    }

    #[test]
    fn test_decode_single_field_payload() {
        // A body carrying only one payload field is complete; reading the
        // other three field slots would run past the end.
        let data = [3u8, 0, 0, 0, 1, 0, 0, 0, b'Z'];
        assert_eq!(
            TagIdentifier::from_bytes(&data).unwrap(),
            TagIdentifier::CustomTid("Z".into())
        );
    }

    #[test]
    fn test_decode_unknown_switch_field() {
        let data = [9u8, 0, 0, 0];
        assert!(matches!(
            TagIdentifier::from_bytes(&data),
            Err(DecodeError::UnknownDiscriminator { value: 9, .. })
        ));
    }

    #[test]
    fn test_extension_object_encoding_id() {
        let tag = TagIdentifier::Raw(vec![1, 2, 3]);
        let eo = tag.to_extension_object(5);
        assert_eq!(eo.type_id, NodeId::numeric(5, SCAN_DATA_ENCODING_ID));
        assert_eq!(TagIdentifier::from_extension_object(&eo, 5).unwrap(), tag);
        assert!(TagIdentifier::from_extension_object(&eo, 6).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TagIdentifier::Raw(vec![0xDE, 0xAD]).to_string(), "Raw(DEAD)");
        assert_eq!(TagIdentifier::Epc("E2".into()).display_text(), "E2");
    }
}
