//! Per-type value codec: pure, stateless, big-endian throughout.
//!
//! Nulls never reach this layer; they are recorded only in the column's
//! null bitmap and occupy no bytes in the value region.

use crate::data::{DataType, Value};
use crate::{ColfError, Result};

/// Append the encoding of one value to `buf`.
///
/// - Integer: 4 bytes two's-complement big-endian
/// - Boolean: exactly `0x00` or `0x01`
/// - String: u32 big-endian byte length, then the UTF-8 bytes
pub fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(v) => buf.extend_from_slice(&v.to_be_bytes()),
        Value::Boolean(b) => buf.push(*b as u8),
        Value::String(s) => {
            buf.extend_from_slice(&(s.len() as u32).to_be_bytes());
            buf.extend_from_slice(s.as_bytes());
        }
    }
}

/// Decode one value of `data_type` from `bytes` starting at `*pos`,
/// advancing `*pos` past the consumed bytes.
///
/// Every consumption is bounds-checked before any allocation. String length
/// prefixes are interpreted as signed: a negative length is a format error.
pub fn decode_value(bytes: &[u8], pos: &mut usize, data_type: DataType) -> Result<Value> {
    match data_type {
        DataType::Integer => {
            if *pos + 4 > bytes.len() {
                return Err(ColfError::DecodeTruncated);
            }
            let v = i32::from_be_bytes(bytes[*pos..*pos + 4].try_into().unwrap());
            *pos += 4;
            Ok(Value::Integer(v))
        }
        DataType::Boolean => {
            if *pos >= bytes.len() {
                return Err(ColfError::DecodeTruncated);
            }
            // tolerant: any non-zero byte decodes as true
            let b = bytes[*pos] != 0;
            *pos += 1;
            Ok(Value::Boolean(b))
        }
        DataType::String => {
            if *pos + 4 > bytes.len() {
                return Err(ColfError::DecodeTruncated);
            }
            let raw_len = i32::from_be_bytes(bytes[*pos..*pos + 4].try_into().unwrap());
            if raw_len < 0 {
                return Err(ColfError::DecodeNegativeLength);
            }
            *pos += 4;
            let len = raw_len as usize;
            if *pos + len > bytes.len() {
                return Err(ColfError::DecodeTruncated);
            }
            let s = std::str::from_utf8(&bytes[*pos..*pos + len])
                .map_err(|_| ColfError::DecodeInvalidUtf8)?;
            *pos += len;
            Ok(Value::String(s.to_string()))
        }
    }
}
