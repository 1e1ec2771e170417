//! File reader: random-access parser over a seekable CFF file.
//!
//! Every operation is independent and re-parses header, index, and the
//! metadata it needs; no state is cached between calls. The reader owns its
//! file handle exclusively and mutates the file position, so callers that
//! want parallelism open one reader per thread.

use super::codec;
use super::header::{read_column_meta, ColumnIndexEntry, FileHeader};
use super::{Compression, COLUMN_INDEX_ENTRY_SIZE};
use crate::data::{ColumnDef, DataType, NullBitmap, Row, Schema, Value};
use crate::{ColfError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// How to treat a value region that ends before all non-null rows are
/// decoded. Strict surfaces `DecodeTruncated`; lenient pads the remaining
/// non-null positions with null, matching legacy reader behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    #[default]
    Strict,
    Lenient,
}

/// Random-access reader over one CFF file.
pub struct ColumnReader {
    file: File,
    mode: DecodeMode,
}

impl ColumnReader {
    /// Open a file for reading. The handle is held until the reader drops.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            mode: DecodeMode::Strict,
        })
    }

    /// Select strict or lenient payload decoding
    pub fn with_decode_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// Number of rows stored in the file
    pub fn row_count(&mut self) -> Result<usize> {
        Ok(self.read_header()?.row_count as usize)
    }

    /// Column names in schema order
    pub fn column_names(&mut self) -> Result<Vec<String>> {
        let header = self.read_header()?;
        let index = self.read_index(header.column_count)?;
        let mut names = Vec::with_capacity(index.len());
        for entry in &index {
            names.push(self.read_meta_at(entry.metadata_offset)?.name);
        }
        Ok(names)
    }

    /// Reconstruct the schema from the file's metadata region
    pub fn schema(&mut self) -> Result<Schema> {
        let header = self.read_header()?;
        let index = self.read_index(header.column_count)?;
        let mut defs = Vec::with_capacity(index.len());
        for entry in &index {
            defs.push(self.read_meta_at(entry.metadata_offset)?);
        }
        Ok(Schema::new(defs)?.with_compression(header.compression))
    }

    /// Read one column by name, as `row_count` optional values.
    ///
    /// Touches only the header, index, metadata region, and the named
    /// column's own data block; other columns' data bytes are never read.
    pub fn read_column(&mut self, name: &str) -> Result<Vec<Option<Value>>> {
        let header = self.read_header()?;
        let index = self.read_index(header.column_count)?;

        for entry in &index {
            let def = self.read_meta_at(entry.metadata_offset)?;
            if def.name == name {
                let payload = self.read_payload(entry, header.compression)?;
                return decode_column(
                    &payload,
                    def.data_type,
                    header.row_count as usize,
                    self.mode,
                );
            }
        }

        Err(ColfError::ColumnNotFound(name.to_string()))
    }

    /// Read every column and materialize full rows in file order.
    ///
    /// Columns are decoded into vectors first, then rows are assembled by
    /// positional indexing — the per-row loop performs no name lookups.
    pub fn read_all(&mut self) -> Result<Vec<Row>> {
        let header = self.read_header()?;
        let index = self.read_index(header.column_count)?;
        let row_count = header.row_count as usize;

        let mut defs = Vec::with_capacity(index.len());
        for entry in &index {
            defs.push(self.read_meta_at(entry.metadata_offset)?);
        }

        let mut columns: Vec<Vec<Option<Value>>> = Vec::with_capacity(defs.len());
        for (def, entry) in defs.iter().zip(&index) {
            let payload = self.read_payload(entry, header.compression)?;
            columns.push(decode_column(&payload, def.data_type, row_count, self.mode)?);
        }

        let mut rows = Vec::with_capacity(row_count);
        for i in 0..row_count {
            let mut row = Row::new();
            for (def, column) in defs.iter().zip(&columns) {
                row.insert(def.name.clone(), column[i].clone());
            }
            rows.push(row);
        }
        Ok(rows)
    }

    // ========================================================================
    // Parsing internals
    // ========================================================================

    fn read_header(&mut self) -> Result<FileHeader> {
        self.file.seek(SeekFrom::Start(0))?;
        FileHeader::read_from(&mut self.file)
    }

    /// Read the column index; the file must be positioned at its start
    /// (immediately after `read_header`).
    fn read_index(&mut self, column_count: u32) -> Result<Vec<ColumnIndexEntry>> {
        let mut buf = vec![0u8; column_count as usize * COLUMN_INDEX_ENTRY_SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(buf
            .chunks_exact(COLUMN_INDEX_ENTRY_SIZE)
            .map(ColumnIndexEntry::from_bytes)
            .collect())
    }

    fn read_meta_at(&mut self, offset: u64) -> Result<ColumnDef> {
        self.file.seek(SeekFrom::Start(offset))?;
        read_column_meta(&mut self.file)
    }

    /// Seek to a column's data block, read its length-prefixed payload, and
    /// decompress it with the file's codec.
    fn read_payload(&mut self, entry: &ColumnIndexEntry, compression: Compression) -> Result<Vec<u8>> {
        self.file.seek(SeekFrom::Start(entry.data_offset))?;
        let size = self.file.read_u32::<BigEndian>()? as usize;
        let mut buf = vec![0u8; size];
        self.file.read_exact(&mut buf)?;
        compression.decompress(&buf)
    }
}

/// Split a decompressed payload into bitmap and value region, then decode
/// `row_count` optional values.
fn decode_column(
    payload: &[u8],
    data_type: DataType,
    row_count: usize,
    mode: DecodeMode,
) -> Result<Vec<Option<Value>>> {
    let bitmap_len = NullBitmap::bytes_for(row_count);
    if payload.len() < bitmap_len {
        return Err(ColfError::DecodeTruncated);
    }
    let bitmap = NullBitmap::from_bytes(payload[..bitmap_len].to_vec(), row_count);
    let encoded = &payload[bitmap_len..];

    let mut values = Vec::with_capacity(row_count);
    let mut pos = 0usize;
    let mut exhausted = false;
    for i in 0..row_count {
        if bitmap.is_null(i) {
            values.push(None);
            continue;
        }
        if exhausted {
            values.push(None);
            continue;
        }
        match codec::decode_value(encoded, &mut pos, data_type) {
            Ok(v) => values.push(Some(v)),
            Err(ColfError::DecodeTruncated) if mode == DecodeMode::Lenient => {
                exhausted = true;
                values.push(None);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_column_no_nulls() {
        // 3 ints, bitmap byte 0
        let mut payload = vec![0u8];
        for v in [1i32, 2, 3] {
            payload.extend_from_slice(&v.to_be_bytes());
        }
        let values = decode_column(&payload, DataType::Integer, 3, DecodeMode::Strict).unwrap();
        assert_eq!(
            values,
            vec![
                Some(Value::Integer(1)),
                Some(Value::Integer(2)),
                Some(Value::Integer(3)),
            ]
        );
    }

    #[test]
    fn test_decode_column_with_null_gap() {
        // row 1 null: bitmap 0b010, values are 30 then 25 with no gap bytes
        let mut payload = vec![0b0000_0010u8];
        payload.extend_from_slice(&30i32.to_be_bytes());
        payload.extend_from_slice(&25i32.to_be_bytes());
        let values = decode_column(&payload, DataType::Integer, 3, DecodeMode::Strict).unwrap();
        assert_eq!(
            values,
            vec![Some(Value::Integer(30)), None, Some(Value::Integer(25))]
        );
    }

    #[test]
    fn test_decode_column_all_null() {
        let payload = vec![0b0000_0111u8];
        let values = decode_column(&payload, DataType::String, 3, DecodeMode::Strict).unwrap();
        assert_eq!(values, vec![None, None, None]);
    }

    #[test]
    fn test_decode_column_empty() {
        let values = decode_column(&[], DataType::Integer, 0, DecodeMode::Strict).unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn test_strict_truncation_fails() {
        // 2 non-null rows declared, only one value present
        let mut payload = vec![0u8];
        payload.extend_from_slice(&7i32.to_be_bytes());
        let err = decode_column(&payload, DataType::Integer, 2, DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, ColfError::DecodeTruncated));
    }

    #[test]
    fn test_lenient_truncation_pads_with_null() {
        let mut payload = vec![0u8];
        payload.extend_from_slice(&7i32.to_be_bytes());
        let values = decode_column(&payload, DataType::Integer, 3, DecodeMode::Lenient).unwrap();
        assert_eq!(values, vec![Some(Value::Integer(7)), None, None]);
    }

    #[test]
    fn test_lenient_does_not_mask_bad_utf8() {
        let mut payload = vec![0u8]; // 1 row, not null
        payload.extend_from_slice(&2u32.to_be_bytes());
        payload.extend_from_slice(&[0xC0, 0x00]);
        let err = decode_column(&payload, DataType::String, 1, DecodeMode::Lenient).unwrap_err();
        assert!(matches!(err, ColfError::DecodeInvalidUtf8));
    }

    #[test]
    fn test_payload_shorter_than_bitmap() {
        let err = decode_column(&[], DataType::Integer, 4, DecodeMode::Strict).unwrap_err();
        assert!(matches!(err, ColfError::DecodeTruncated));
    }
}
