//! File writer: transposes rows into column chunks, computes the full
//! layout up front, and emits the file in one pass.

use super::codec;
use super::header::{column_meta_size, write_column_meta, ColumnIndexEntry, FileHeader};
use super::COLUMN_INDEX_ENTRY_SIZE;
use crate::data::{ColumnChunk, ColumnDef, NullBitmap, Row, Schema, Value};
use crate::{ColfError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one CFF file per call, overwriting any existing content.
///
/// Writing the same schema and rows twice yields byte-identical files:
/// layout is a pure function of the input, and every region is emitted in
/// schema order.
pub struct ColumnWriter {
    schema: Schema,
}

impl ColumnWriter {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Write `rows` to `path`. A missing key in a row is a null.
    pub fn write<P: AsRef<Path>>(&self, rows: &[Row], path: P) -> Result<()> {
        let chunks = self.chunks_from_rows(rows)?;
        self.write_file(&chunks, rows.len(), path.as_ref())
    }

    /// Write parallel typed column vectors keyed by column name.
    ///
    /// All vectors must share one length; a column absent from the map is
    /// all-null. Equivalent to building rows and calling [`write`](Self::write).
    pub fn write_columns<P: AsRef<Path>>(
        &self,
        columns: &HashMap<String, Vec<Option<Value>>>,
        path: P,
    ) -> Result<()> {
        let (chunks, row_count) = self.chunks_from_columns(columns)?;
        self.write_file(&chunks, row_count, path.as_ref())
    }

    /// Emit the encoded file into any sink; exposed for byte-level tests.
    pub fn write_to<W: Write>(&self, rows: &[Row], out: &mut W) -> Result<()> {
        let chunks = self.chunks_from_rows(rows)?;
        self.emit(&chunks, rows.len(), out)
    }

    fn write_file(&self, chunks: &[ColumnChunk], row_count: usize, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut out = BufWriter::new(file);
        self.emit(chunks, row_count, &mut out)?;
        out.flush()?;
        Ok(())
    }

    // ========================================================================
    // Transposition
    // ========================================================================

    fn chunks_from_rows(&self, rows: &[Row]) -> Result<Vec<ColumnChunk>> {
        self.schema
            .columns()
            .iter()
            .map(|def| self.build_chunk(def, rows.iter().map(|row| row.get(&def.name)), rows.len()))
            .collect()
    }

    fn chunks_from_columns(
        &self,
        columns: &HashMap<String, Vec<Option<Value>>>,
    ) -> Result<(Vec<ColumnChunk>, usize)> {
        let mut row_count: Option<usize> = None;
        for (name, values) in columns {
            if self.schema.get_index(name).is_none() {
                return Err(ColfError::SchemaInvalid(format!(
                    "column not in schema: {}",
                    name
                )));
            }
            match row_count {
                None => row_count = Some(values.len()),
                Some(n) if n != values.len() => {
                    return Err(ColfError::SchemaInvalid(format!(
                        "column vectors differ in length: {} has {}, expected {}",
                        name,
                        values.len(),
                        n
                    )))
                }
                _ => {}
            }
        }
        let row_count = row_count.unwrap_or(0);

        let mut chunks = Vec::with_capacity(self.schema.column_count());
        for def in self.schema.columns() {
            let chunk = match columns.get(&def.name) {
                Some(values) => {
                    self.build_chunk(def, values.iter().map(|v| v.as_ref()), row_count)?
                }
                None => self.build_chunk(def, std::iter::repeat(None).take(row_count), row_count)?,
            };
            chunks.push(chunk);
        }
        Ok((chunks, row_count))
    }

    /// Build one column's chunk: null bitmap plus the concatenated encoded
    /// non-null values, then the schema's compression over the whole block.
    fn build_chunk<'a, I>(&self, def: &ColumnDef, values: I, row_count: usize) -> Result<ColumnChunk>
    where
        I: Iterator<Item = Option<&'a Value>>,
    {
        let mut bitmap = NullBitmap::new(row_count);
        let mut encoded = Vec::new();

        for (i, value) in values.enumerate() {
            match value {
                Some(v) => {
                    if v.data_type() != def.data_type {
                        return Err(ColfError::TypeMismatch {
                            column: def.name.clone(),
                            expected: def.data_type,
                            actual: v.type_name(),
                        });
                    }
                    codec::encode_value(v, &mut encoded);
                }
                None => {
                    if !def.nullable {
                        return Err(ColfError::TypeMismatch {
                            column: def.name.clone(),
                            expected: def.data_type,
                            actual: "null",
                        });
                    }
                    bitmap.set_null(i);
                }
            }
        }

        let mut payload = Vec::with_capacity(bitmap.as_bytes().len() + encoded.len());
        payload.extend_from_slice(bitmap.as_bytes());
        payload.extend_from_slice(&encoded);
        let payload = self.schema.compression().compress(&payload)?;

        Ok(ColumnChunk::new(def.clone(), payload, row_count))
    }

    // ========================================================================
    // Layout + emission
    // ========================================================================

    fn emit<W: Write>(&self, chunks: &[ColumnChunk], row_count: usize, out: &mut W) -> Result<()> {
        let header = FileHeader::new(
            self.schema.compression(),
            chunks.len() as u32,
            row_count as u32,
        );
        let header_bytes = header.to_bytes();

        // All offsets are fixed before any byte is written.
        let index_size = chunks.len() * COLUMN_INDEX_ENTRY_SIZE;
        let metadata_start = header_bytes.len() + index_size;
        let metadata_total: usize = chunks.iter().map(|c| column_meta_size(&c.def)).sum();
        let data_start = metadata_start + metadata_total;

        let mut entries = Vec::with_capacity(chunks.len());
        let mut metadata_offset = metadata_start as u64;
        let mut data_offset = data_start as u64;
        for chunk in chunks {
            entries.push(ColumnIndexEntry::new(
                metadata_offset,
                data_offset,
                chunk.payload.len() as u32,
            ));
            metadata_offset += column_meta_size(&chunk.def) as u64;
            data_offset += 4 + chunk.payload.len() as u64;
        }

        out.write_all(&header_bytes)?;

        for entry in &entries {
            out.write_all(&entry.to_bytes())?;
        }

        let mut meta_buf = Vec::with_capacity(metadata_total);
        for chunk in chunks {
            write_column_meta(&mut meta_buf, &chunk.def);
        }
        out.write_all(&meta_buf)?;

        for chunk in chunks {
            out.write_all(&(chunk.payload.len() as u32).to_be_bytes())?;
            out.write_all(&chunk.payload)?;
        }

        Ok(())
    }
}
