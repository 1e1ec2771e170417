//! Post-read query evaluator: filtering, projection, limiting, and scalar
//! aggregation over materialized rows.
//!
//! The evaluator consumes a [`ColumnReader`], materializes the row sequence
//! once, and applies every chained operation in memory. Terminal operations
//! never fail; the only fallible step is reading the file.

mod predicate;

pub use predicate::{CompareOp, Predicate};

use crate::data::{Row, Value};
use crate::storage::ColumnReader;
use crate::Result;
use ahash::AHashSet;
use std::collections::HashMap;

/// A fluent query over a decoded row sequence.
///
/// Rows keep the order they appear in the file, which is the order they
/// were supplied to the writer.
#[derive(Debug, Clone)]
pub struct Query {
    rows: Vec<Row>,
}

impl Query {
    /// Materialize all rows from a reader and start a query over them
    pub fn over(reader: &mut ColumnReader) -> Result<Self> {
        Ok(Self {
            rows: reader.read_all()?,
        })
    }

    /// Start a query over rows already in memory
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    // ========================================================================
    // Chained operations
    // ========================================================================

    /// Keep rows the predicate accepts
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.rows.retain(|row| predicate.matches(row));
        self
    }

    /// Restrict every row to the given columns; unknown names are dropped
    /// silently from the output.
    pub fn select<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keep: AHashSet<String> = names.into_iter().map(Into::into).collect();
        for row in &mut self.rows {
            row.retain_columns(|name| keep.contains(name));
        }
        self
    }

    /// Drop the first `n` rows
    pub fn skip(mut self, n: usize) -> Self {
        let n = n.min(self.rows.len());
        self.rows = self.rows.split_off(n);
        self
    }

    /// Keep at most `n` rows
    pub fn limit(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    // ========================================================================
    // Terminal operations
    // ========================================================================

    /// Materialize the resulting rows
    pub fn collect(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows in the result
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Number of rows whose value in `column` is present
    pub fn count_non_null(&self, column: &str) -> usize {
        self.rows.iter().filter(|row| row.get(column).is_some()).count()
    }

    /// Sum of an Integer column, nulls excluded; 0 over an empty input
    pub fn sum(&self, column: &str) -> i64 {
        self.integers(column).sum()
    }

    /// Mean of an Integer column, nulls excluded; absent when no values remain
    pub fn avg(&self, column: &str) -> Option<f64> {
        let mut sum = 0i64;
        let mut n = 0u32;
        for v in self.integers(column) {
            sum += v;
            n += 1;
        }
        if n == 0 {
            None
        } else {
            Some(sum as f64 / n as f64)
        }
    }

    /// Minimum of an Integer column, nulls excluded
    pub fn min(&self, column: &str) -> Option<i32> {
        self.integers(column).min().map(|v| v as i32)
    }

    /// Maximum of an Integer column, nulls excluded
    pub fn max(&self, column: &str) -> Option<i32> {
        self.integers(column).max().map(|v| v as i32)
    }

    /// Distinct values of a column (nulls included) in first-occurrence order
    pub fn distinct(&self, column: &str) -> Vec<Option<Value>> {
        let mut seen: AHashSet<Option<Value>> = AHashSet::new();
        let mut out = Vec::new();
        for row in &self.rows {
            if !row.contains(column) {
                continue;
            }
            let value = row.get(column).cloned();
            if seen.insert(value.clone()) {
                out.push(value);
            }
        }
        out
    }

    /// Count of rows per distinct value of a column (nulls included)
    pub fn group_by_count(&self, column: &str) -> HashMap<Option<Value>, usize> {
        let mut counts = HashMap::new();
        for row in &self.rows {
            if !row.contains(column) {
                continue;
            }
            *counts.entry(row.get(column).cloned()).or_insert(0) += 1;
        }
        counts
    }

    fn integers<'a>(&'a self, column: &'a str) -> impl Iterator<Item = i64> + 'a {
        self.rows.iter().filter_map(move |row| match row.get(column) {
            Some(Value::Integer(v)) => Some(*v as i64),
            _ => None,
        })
    }
}
