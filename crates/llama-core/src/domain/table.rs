use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::canonical_chain_name;

/// Column name whose values are canonicalized before a table is returned.
pub const CHAIN_COLUMN: &str = "chain";

/// Row-oriented tabular result.
///
/// Every row holds exactly one value per column, in column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a table from JSON objects; columns are the union of keys in
    /// first-seen order and absent keys become `null`.
    pub fn from_objects<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = &'a Map<String, Value>>,
    {
        let objects = objects.into_iter().collect::<Vec<_>>();
        let mut columns: Vec<String> = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if !columns.iter().any(|column| column == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = objects
            .iter()
            .map(|object| {
                columns
                    .iter()
                    .map(|column| object.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Stacks tables vertically, aligning columns by name.
    pub fn concat(tables: impl IntoIterator<Item = Table>) -> Self {
        let tables = tables.into_iter().collect::<Vec<_>>();
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for column in &table.columns {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
        }

        let mut combined = Self::new(columns);
        for table in tables {
            let positions = combined
                .columns
                .iter()
                .map(|column| table.column_index(column))
                .collect::<Vec<_>>();
            for row in table.rows {
                let aligned = positions
                    .iter()
                    .map(|position| position.map_or(Value::Null, |index| row[index].clone()))
                    .collect();
                combined.rows.push(aligned);
            }
        }
        combined
    }

    pub(crate) fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width must match columns");
        self.rows.push(row);
    }

    /// Appends a column holding the same value on every row.
    pub(crate) fn with_constant_column(mut self, name: &str, value: Value) -> Self {
        self.columns.push(name.to_owned());
        for row in &mut self.rows {
            row.push(value.clone());
        }
        self
    }

    /// Rewrites the `chain` column, if present, to canonical chain names.
    pub(crate) fn canonicalize_chains(mut self) -> Self {
        if let Some(index) = self.column_index(CHAIN_COLUMN) {
            for row in &mut self.rows {
                if let Value::String(name) = &row[index] {
                    row[index] = Value::String(canonical_chain_name(name));
                }
            }
        }
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|values| &values[index])
    }

    /// Rows as column-name → value maps.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}
