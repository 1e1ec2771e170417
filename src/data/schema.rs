//! Schema: the ordered column list plus the file's compression tag

use super::ColumnDef;
use crate::storage::Compression;
use crate::{ColfError, Result};
use std::collections::HashMap;

/// An ordered list of column definitions with unique names, plus the
/// compression codec applied to every column payload.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnDef>,
    name_to_idx: HashMap<String, usize>,
    compression: Compression,
}

impl Schema {
    /// Build a schema, rejecting empty schemas, empty column names, and
    /// duplicate names before anything touches a file.
    pub fn new(columns: Vec<ColumnDef>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ColfError::SchemaInvalid(
                "schema must have at least one column".to_string(),
            ));
        }
        let mut name_to_idx = HashMap::with_capacity(columns.len());
        for (idx, def) in columns.iter().enumerate() {
            if def.name.is_empty() {
                return Err(ColfError::SchemaInvalid(
                    "column name must not be empty".to_string(),
                ));
            }
            if name_to_idx.insert(def.name.clone(), idx).is_some() {
                return Err(ColfError::SchemaInvalid(format!(
                    "duplicate column name: {}",
                    def.name
                )));
            }
        }
        Ok(Self {
            columns,
            name_to_idx,
            compression: Compression::None,
        })
    }

    /// Set the compression codec
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Columns in schema order
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Ordinal position of a column name
    pub fn get_index(&self, name: &str) -> Option<usize> {
        self.name_to_idx.get(name).copied()
    }

    /// Look up a column definition by name
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.get_index(name).map(|idx| &self.columns[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataType;

    fn defs() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", DataType::Integer).nullable(false),
            ColumnDef::new("name", DataType::String),
        ]
    }

    #[test]
    fn test_schema_lookup() {
        let schema = Schema::new(defs()).unwrap();
        assert_eq!(schema.column_count(), 2);
        assert_eq!(schema.get_index("id"), Some(0));
        assert_eq!(schema.get_index("name"), Some(1));
        assert_eq!(schema.get_index("missing"), None);
        assert_eq!(schema.column("name").unwrap().data_type, DataType::String);
        assert_eq!(schema.compression(), Compression::None);
    }

    #[test]
    fn test_empty_schema_rejected() {
        assert!(matches!(
            Schema::new(Vec::new()),
            Err(ColfError::SchemaInvalid(_))
        ));
    }

    #[test]
    fn test_empty_column_name_rejected() {
        let result = Schema::new(vec![ColumnDef::new("", DataType::Integer)]);
        assert!(matches!(result, Err(ColfError::SchemaInvalid(_))));
    }

    #[test]
    fn test_duplicate_column_name_rejected() {
        let result = Schema::new(vec![
            ColumnDef::new("a", DataType::Integer),
            ColumnDef::new("a", DataType::String),
        ]);
        assert!(matches!(result, Err(ColfError::SchemaInvalid(_))));
    }

    #[test]
    fn test_with_compression() {
        let schema = Schema::new(defs()).unwrap().with_compression(Compression::Snappy);
        assert_eq!(schema.compression(), Compression::Snappy);
    }
}
