//! File header, column index entries, and the column metadata codec

use super::{Compression, COLUMN_INDEX_ENTRY_SIZE, FORMAT_VERSION, HEADER_SIZE_V1, HEADER_SIZE_V2, MAGIC};
use crate::data::{ColumnDef, DataType};
use crate::{ColfError, Result};
use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

/// File header.
///
/// Two layouts exist: version 1 has no codec byte (13 bytes, implicit
/// `Compression::None`); version 2 carries the codec byte at offset 5
/// (14 bytes). Readers dispatch on the version byte; the writer always
/// emits version 2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u8,
    pub compression: Compression,
    pub column_count: u32,
    pub row_count: u32,
}

impl FileHeader {
    /// Header for a file the writer is about to emit (current version)
    pub fn new(compression: Compression, column_count: u32, row_count: u32) -> Self {
        Self {
            version: FORMAT_VERSION,
            compression,
            column_count,
            row_count,
        }
    }

    /// Byte size of this header on disk
    pub fn size(&self) -> usize {
        if self.version >= 2 {
            HEADER_SIZE_V2
        } else {
            HEADER_SIZE_V1
        }
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size());
        buf.extend_from_slice(MAGIC);
        buf.push(self.version);
        if self.version >= 2 {
            buf.push(self.compression.codec_id());
        }
        buf.extend_from_slice(&self.column_count.to_be_bytes());
        buf.extend_from_slice(&self.row_count.to_be_bytes());
        buf
    }

    /// Parse a header from the start of a file.
    ///
    /// Fails with `InvalidMagic` on a non-CFF file, `UnsupportedVersion` on
    /// an unknown version byte, and `UnknownCompressionCodec` on an
    /// unregistered codec tag.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ColfError::InvalidMagic);
        }

        let version = r.read_u8()?;
        let compression = match version {
            1 => Compression::None,
            2 => {
                let id = r.read_u8()?;
                Compression::from_codec_id(id).ok_or(ColfError::UnknownCompressionCodec(id))?
            }
            other => return Err(ColfError::UnsupportedVersion(other)),
        };

        let column_count = r.read_u32::<BigEndian>()?;
        let row_count = r.read_u32::<BigEndian>()?;

        Ok(Self {
            version,
            compression,
            column_count,
            row_count,
        })
    }
}

// ============================================================================
// Column Index Entry (24 bytes per column)
// ============================================================================

/// Fixed-size record locating one column's metadata block and data block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnIndexEntry {
    pub metadata_offset: u64,
    pub data_offset: u64,
    /// Payload byte length, excluding the 4-byte size prefix in the file
    pub data_size: u32,
    /// Written as zero, tolerated on read
    pub reserved: u32,
}

impl ColumnIndexEntry {
    pub fn new(metadata_offset: u64, data_offset: u64, data_size: u32) -> Self {
        Self {
            metadata_offset,
            data_offset,
            data_size,
            reserved: 0,
        }
    }

    pub fn to_bytes(&self) -> [u8; COLUMN_INDEX_ENTRY_SIZE] {
        let mut buf = [0u8; COLUMN_INDEX_ENTRY_SIZE];
        buf[0..8].copy_from_slice(&self.metadata_offset.to_be_bytes());
        buf[8..16].copy_from_slice(&self.data_offset.to_be_bytes());
        buf[16..20].copy_from_slice(&self.data_size.to_be_bytes());
        buf[20..24].copy_from_slice(&self.reserved.to_be_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            metadata_offset: u64::from_be_bytes(bytes[0..8].try_into().unwrap()),
            data_offset: u64::from_be_bytes(bytes[8..16].try_into().unwrap()),
            data_size: u32::from_be_bytes(bytes[16..20].try_into().unwrap()),
            reserved: u32::from_be_bytes(bytes[20..24].try_into().unwrap()),
        }
    }
}

// ============================================================================
// Column metadata codec
// ============================================================================

/// Byte size of one column's metadata block
pub(crate) fn column_meta_size(def: &ColumnDef) -> usize {
    4 + def.name.len() + 1 + 1
}

/// Append one column's metadata block:
/// `[name_len: u32][name][type_code: u8][nullable: u8]`
pub(crate) fn write_column_meta(buf: &mut Vec<u8>, def: &ColumnDef) {
    buf.extend_from_slice(&(def.name.len() as u32).to_be_bytes());
    buf.extend_from_slice(def.name.as_bytes());
    buf.push(def.data_type.type_code());
    buf.push(def.nullable as u8);
}

/// Parse one column's metadata block
pub(crate) fn read_column_meta<R: Read>(r: &mut R) -> Result<ColumnDef> {
    let name_len = r.read_u32::<BigEndian>()? as usize;
    let mut name_buf = vec![0u8; name_len];
    r.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf).map_err(|_| ColfError::DecodeInvalidUtf8)?;

    let type_code = r.read_u8()?;
    let data_type =
        DataType::from_type_code(type_code).ok_or(ColfError::UnknownTypeCode(type_code))?;
    let nullable = r.read_u8()? != 0;

    Ok(ColumnDef {
        name,
        data_type,
        nullable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_v2_roundtrip() {
        let header = FileHeader::new(Compression::Snappy, 3, 100);
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), HEADER_SIZE_V2);
        assert_eq!(&bytes[0..4], b"COLF");
        assert_eq!(bytes[4], 2);
        assert_eq!(bytes[5], 1); // snappy codec byte

        let restored = FileHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(restored, header);
    }

    #[test]
    fn test_header_v1_has_no_codec_byte() {
        // hand-craft a v1 header: magic, version, counts
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"COLF");
        bytes.push(1);
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&7u32.to_be_bytes());
        assert_eq!(bytes.len(), HEADER_SIZE_V1);

        let header = FileHeader::read_from(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.compression, Compression::None);
        assert_eq!(header.column_count, 2);
        assert_eq!(header.row_count, 7);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = FileHeader::new(Compression::None, 1, 1).to_bytes();
        bytes[0] = b'X';
        let err = FileHeader::read_from(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, ColfError::InvalidMagic));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = FileHeader::new(Compression::None, 1, 1).to_bytes();
        bytes[4] = 9;
        let err = FileHeader::read_from(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, ColfError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_unknown_codec_id() {
        let mut bytes = FileHeader::new(Compression::None, 1, 1).to_bytes();
        bytes[5] = 42;
        let err = FileHeader::read_from(&mut Cursor::new(&bytes)).unwrap_err();
        assert!(matches!(err, ColfError::UnknownCompressionCodec(42)));
    }

    #[test]
    fn test_index_entry_roundtrip() {
        let entry = ColumnIndexEntry::new(38, 120, 4096);
        let bytes = entry.to_bytes();
        assert_eq!(bytes.len(), COLUMN_INDEX_ENTRY_SIZE);
        // reserved tail is zero
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);

        let restored = ColumnIndexEntry::from_bytes(&bytes);
        assert_eq!(restored, entry);
    }

    #[test]
    fn test_index_entry_reserved_tolerated() {
        let mut bytes = ColumnIndexEntry::new(1, 2, 3).to_bytes();
        bytes[20..24].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        let entry = ColumnIndexEntry::from_bytes(&bytes);
        assert_eq!(entry.metadata_offset, 1);
        assert_eq!(entry.data_offset, 2);
        assert_eq!(entry.data_size, 3);
    }

    #[test]
    fn test_column_meta_roundtrip() {
        let def = ColumnDef::new("age", DataType::Integer).nullable(false);
        let mut buf = Vec::new();
        write_column_meta(&mut buf, &def);
        assert_eq!(buf.len(), column_meta_size(&def));

        let restored = read_column_meta(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(restored, def);
    }

    #[test]
    fn test_column_meta_unknown_type_code() {
        let def = ColumnDef::new("x", DataType::Boolean);
        let mut buf = Vec::new();
        write_column_meta(&mut buf, &def);
        let type_pos = buf.len() - 2;
        buf[type_pos] = 99;
        let err = read_column_meta(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, ColfError::UnknownTypeCode(99)));
    }

    #[test]
    fn test_column_meta_non_ascii_name() {
        let def = ColumnDef::new("prix_café", DataType::String);
        let mut buf = Vec::new();
        write_column_meta(&mut buf, &def);
        let restored = read_column_meta(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(restored.name, "prix_café");
    }
}
