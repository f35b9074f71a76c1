use crate::db2::{Db2Column, Db2Value};
use crate::error::Error;
use std::sync::Arc;

/// A single result row: an ordered, record-like mapping of column names to values.
#[derive(Debug, Clone, PartialEq)]
pub struct Db2Row {
    pub(crate) columns: Arc<[Db2Column]>,
    pub(crate) values: Vec<Db2Value>,
}

impl Db2Row {
    /// Builds a row from its column metadata and one value per column.
    pub fn new(columns: Arc<[Db2Column]>, values: Vec<Db2Value>) -> Result<Self, Error> {
        if columns.len() != values.len() {
            return Err(Error::Protocol(format!(
                "row has {} values for {} columns",
                values.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[Db2Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Position of the named column. Exact matches win, then a case-insensitive match
    /// (DB2 reports unquoted identifiers in upper case).
    pub fn index_of(&self, name: &str) -> Result<usize, Error> {
        if let Some(pos) = self.columns.iter().position(|col| col.name == name) {
            return Ok(pos);
        }

        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::ColumnNotFound(name.into()))
    }

    pub fn try_get_raw(&self, name: &str) -> Result<&Db2Value, Error> {
        let idx = self.index_of(name)?;
        Ok(&self.values[idx])
    }

    pub fn get(&self, index: usize) -> Option<&Db2Value> {
        self.values.get(index)
    }

    /// Iterates `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Db2Value)> + '_ {
        self.columns
            .iter()
            .map(|col| col.name.as_str())
            .zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<Db2Value> {
        self.values
    }
}
