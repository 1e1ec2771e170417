//! colf — a compact, self-describing columnar file format.
//!
//! Rows are transposed into per-column payloads (null bitmap + encoded
//! values) behind a fixed-size column index, so any single column can be
//! read back without touching the rest of the file. A post-read query
//! evaluator offers filtering, projection, limiting, and scalar
//! aggregation over the decoded rows.
//!
//! ```no_run
//! use colf::{ColumnDef, ColumnReader, ColumnWriter, DataType, Predicate, Query, Row, Schema};
//!
//! # fn main() -> colf::Result<()> {
//! let schema = Schema::new(vec![
//!     ColumnDef::new("id", DataType::Integer).nullable(false),
//!     ColumnDef::new("name", DataType::String),
//! ])?;
//!
//! let mut row = Row::new();
//! row.set("id", 1);
//! row.set("name", "Alice");
//!
//! ColumnWriter::new(schema).write(&[row], "people.colf")?;
//!
//! let mut reader = ColumnReader::open("people.colf")?;
//! let adults = Query::over(&mut reader)?
//!     .filter(Predicate::greater_than("id", 0))
//!     .collect();
//! # let _ = adults;
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod query;
pub mod storage;

// Re-export main types
pub use data::{ColumnChunk, ColumnDef, DataType, NullBitmap, Row, Schema, Value};
pub use query::{CompareOp, Predicate, Query};
pub use storage::{ColumnReader, ColumnWriter, Compression, DecodeMode};

/// Storage engine error type
#[derive(Debug, thiserror::Error)]
pub enum ColfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file magic")]
    InvalidMagic,

    #[error("unsupported format version: {0}")]
    UnsupportedVersion(u8),

    #[error("unknown column type code: {0}")]
    UnknownTypeCode(u8),

    #[error("unknown compression codec: {0}")]
    UnknownCompressionCodec(u8),

    #[error("value region truncated")]
    DecodeTruncated,

    #[error("negative string length")]
    DecodeNegativeLength,

    #[error("invalid UTF-8 in string value")]
    DecodeInvalidUtf8,

    #[error("type mismatch in column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: &'static str,
    },

    #[error("invalid schema: {0}")]
    SchemaInvalid(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("compression error: {0}")]
    Compression(String),
}

pub type Result<T> = std::result::Result<T, ColfError>;
