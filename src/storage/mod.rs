//! CFF: the compact columnar file format
//!
//! A self-describing, single-file columnar format with random per-column
//! access. Rows are transposed into per-column payloads at write time; a
//! fixed-size column index allows the reader to seek straight to any
//! column's metadata and data without touching the rest of the file.
//!
//! File Format (all integers big-endian):
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ Header (14 bytes at v2, 13 at v1)                  │
//! │   - Magic: "COLF" (4 bytes)                        │
//! │   - Version: u8                                    │
//! │   - Compression codec: u8  (v2 only)               │
//! │   - Column count: u32                              │
//! │   - Row count: u32                                 │
//! ├────────────────────────────────────────────────────┤
//! │ Column Index (24 bytes per column, schema order)   │
//! │   - Metadata offset: u64                           │
//! │   - Data offset: u64                               │
//! │   - Data size: u32  (payload, excluding prefix)    │
//! │   - Reserved: u32   (written 0, ignored on read)   │
//! ├────────────────────────────────────────────────────┤
//! │ Metadata Region (schema order, contiguous)         │
//! │   Per column:                                      │
//! │   - [name_len: u32][name: bytes][type: u8][null: u8]│
//! ├────────────────────────────────────────────────────┤
//! │ Data Region (schema order, contiguous)             │
//! │   Per column:                                      │
//! │   - Payload size: u32                              │
//! │   - Payload (decompressed):                        │
//! │       [null bitmap: ⌈rows/8⌉ bytes, LSB-first]     │
//! │       [encoded non-null values, row order]         │
//! └────────────────────────────────────────────────────┘
//! ```

pub mod codec;
pub mod compression;
pub mod header;
pub mod reader;
pub mod writer;


pub use compression::Compression;
pub use header::{ColumnIndexEntry, FileHeader};
pub use reader::{ColumnReader, DecodeMode};
pub use writer::ColumnWriter;

// ============================================================================
// Constants
// ============================================================================

pub const MAGIC: &[u8; 4] = b"COLF";
/// Version emitted by the writer (codec-bearing header layout)
pub const FORMAT_VERSION: u8 = 2;
/// Header size of the legacy, compression-less layout
pub const HEADER_SIZE_V1: usize = 13;
/// Header size once the codec byte is present
pub const HEADER_SIZE_V2: usize = 14;
pub const COLUMN_INDEX_ENTRY_SIZE: usize = 24;
