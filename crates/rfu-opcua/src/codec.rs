// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OPC UA binary encoding for structured method arguments.
//!
//! Only the primitives the AutoID structures need are covered. All
//! multi-byte values are little-endian; strings and byte strings carry an
//! `Int32` length prefix where `-1` encodes null.

use bytes::{Buf, BufMut};

use crate::error::DecodeError;

/// Length prefix used for null strings and byte strings.
pub const NULL_LENGTH: i32 = -1;

/// Encodes a value into an OPC UA binary body.
pub trait BinaryEncode {
    /// Number of bytes `encode_to` will write.
    fn encoded_len(&self) -> usize;

    /// Appends the encoded value to `dst`.
    fn encode_to<B: BufMut>(&self, dst: &mut B);

    /// Encodes into a fresh buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_to(&mut buf);
        buf
    }
}

/// Decodes a value from an OPC UA binary body.
pub trait BinaryDecode: Sized {
    /// Reads one value from the front of `src`, leaving the rest untouched.
    fn decode_from<B: Buf>(src: &mut B) -> Result<Self, DecodeError>;

    /// Decodes from a byte slice, ignoring trailing bytes.
    fn from_bytes(mut bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_from(&mut bytes)
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Writes an `Int32`.
#[inline]
pub fn put_i32<B: BufMut>(dst: &mut B, value: i32) {
    dst.put_i32_le(value);
}

/// Writes a `UInt32`.
#[inline]
pub fn put_u32<B: BufMut>(dst: &mut B, value: u32) {
    dst.put_u32_le(value);
}

/// Writes a `Double`.
#[inline]
pub fn put_f64<B: BufMut>(dst: &mut B, value: f64) {
    dst.put_f64_le(value);
}

/// Writes a `Boolean` as a single byte.
#[inline]
pub fn put_bool<B: BufMut>(dst: &mut B, value: bool) {
    dst.put_u8(u8::from(value));
}

/// Writes a `ByteString`; `None` encodes null.
pub fn put_byte_string<B: BufMut>(dst: &mut B, value: Option<&[u8]>) {
    match value {
        Some(bytes) => {
            put_i32(dst, bytes.len() as i32);
            dst.put_slice(bytes);
        }
        None => put_i32(dst, NULL_LENGTH),
    }
}

/// Writes a `String`; `None` encodes null.
pub fn put_string<B: BufMut>(dst: &mut B, value: Option<&str>) {
    put_byte_string(dst, value.map(str::as_bytes));
}

/// Encoded size of a string or byte string with `len` payload bytes.
#[inline]
pub const fn prefixed_len(len: usize) -> usize {
    4 + len
}

// =============================================================================
// Readers
// =============================================================================

fn ensure<B: Buf>(src: &B, field: &'static str, needed: usize) -> Result<(), DecodeError> {
    if src.remaining() < needed {
        return Err(DecodeError::truncated(field, needed, src.remaining()));
    }
    Ok(())
}

/// Reads an `Int32`.
pub fn get_i32<B: Buf>(src: &mut B, field: &'static str) -> Result<i32, DecodeError> {
    ensure(src, field, 4)?;
    Ok(src.get_i32_le())
}

/// Reads a `UInt32`.
pub fn get_u32<B: Buf>(src: &mut B, field: &'static str) -> Result<u32, DecodeError> {
    ensure(src, field, 4)?;
    Ok(src.get_u32_le())
}

/// Reads a `Double`.
pub fn get_f64<B: Buf>(src: &mut B, field: &'static str) -> Result<f64, DecodeError> {
    ensure(src, field, 8)?;
    Ok(src.get_f64_le())
}

/// Reads a `Boolean`; any non-zero byte is true.
pub fn get_bool<B: Buf>(src: &mut B, field: &'static str) -> Result<bool, DecodeError> {
    ensure(src, field, 1)?;
    Ok(src.get_u8() != 0)
}

/// Reads a `ByteString`; null decodes to `None`.
pub fn get_byte_string<B: Buf>(
    src: &mut B,
    field: &'static str,
) -> Result<Option<Vec<u8>>, DecodeError> {
    let length = get_i32(src, field)?;
    if length == NULL_LENGTH {
        return Ok(None);
    }
    if length < 0 {
        return Err(DecodeError::InvalidLength { field, length });
    }

    let length = length as usize;
    ensure(src, field, length)?;
    let mut bytes = vec![0u8; length];
    src.copy_to_slice(&mut bytes);
    Ok(Some(bytes))
}

/// Reads a `String`; null decodes to `None`.
pub fn get_string<B: Buf>(
    src: &mut B,
    field: &'static str,
) -> Result<Option<String>, DecodeError> {
    get_byte_string(src, field)?
        .map(|bytes| String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { field }))
        .transpose()
}

// =============================================================================
// Tests
// =============================================================================
