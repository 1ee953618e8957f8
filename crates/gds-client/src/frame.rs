//! Tabular results returned by procedure calls.
//!
//! Every procedure answers with a table: a list of column names and rows of
//! JSON values. [`DataFrame`] keeps that shape, and [`Row`] is a single
//! record keyed by column name.
//!
//! Property streams come in two encodings:
//!
//! - **long**: one row per `(entity, property)` pair, with a column naming
//!   the property and a `propertyValue` column,
//! - **wide**: one row per entity and one column per property.
//!
//! [`DataFrame::pivot`] turns long into wide, [`DataFrame::melt`] goes back.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A single record keyed by column name, in column order.
pub type Row = IndexMap<String, Value>;

/// A table of JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataFrame {
    /// Creates a frame from column names and row-major values.
    ///
    /// Fails if any row does not have exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(Error::InvalidArgument(format!(
                "row {idx} has {} values but the frame has {} columns",
                row.len(),
                columns.len()
            )));
        }

        Ok(Self { columns, rows })
    }

    /// Creates an empty frame with the given columns.
    #[must_use]
    pub fn empty<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Builds a frame from records.
    ///
    /// Columns are the union of all record keys in first-appearance order;
    /// a record without a key gets `null` in that column.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = Row>) -> Self {
        let records: Vec<Row> = records.into_iter().collect();
        let columns: IndexSet<String> = records
            .iter()
            .flat_map(|r| r.keys().cloned())
            .collect();

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self {
            columns: columns.into_iter().collect(),
            rows,
        }
    }

    /// Builds a frame from named columns of equal length.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Vec<Value>)>,
    ) -> Result<Self> {
        let mut names = Vec::new();
        let mut data: Vec<Vec<Value>> = Vec::new();
        for (name, values) in columns {
            names.push(name.into());
            data.push(values);
        }

        let height = data.first().map_or(0, Vec::len);
        if let Some(pos) = data.iter().position(|c| c.len() != height) {
            return Err(Error::InvalidArgument(format!(
                "column '{}' has {} values, expected {height}",
                names[pos],
                data[pos].len()
            )));
        }

        let mut columns_iter: Vec<_> = data.into_iter().map(Vec::into_iter).collect();
        let rows = (0..height)
            .map(|_| {
                columns_iter
                    .iter_mut()
                    .map(|c| c.next().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Ok(Self {
            columns: names,
            rows,
        })
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns `true` if the frame has a column called `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "column '{name}' not found, available columns: {:?}",
                self.columns
            ))
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| &r[idx]).collect())
    }

    /// Raw row-major values.
    #[must_use]
    pub fn values(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Row `i` as a record.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<Row> {
        self.rows.get(i).map(|values| {
            self.columns
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect()
        })
    }

    /// Iterates over all rows as records.
    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.rows.len()).filter_map(|i| self.row(i))
    }

    /// Appends a row; the row must have one value per column.
    pub fn push_row(&mut self, values: Vec<Value>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(Error::InvalidArgument(format!(
                "row has {} values but the frame has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(values);
        Ok(())
    }

    /// Sets every row of `name` to `value`, adding the column if needed.
    pub fn fill_column(&mut self, name: &str, value: &Value) {
        match self.column_index(name) {
            Some(idx) => {
                for row in &mut self.rows {
                    row[idx] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(value.clone());
                }
            }
        }
    }

    /// The only row of the frame.
    pub fn squeeze_row(&self) -> Result<Row> {
        match self.rows.len() {
            1 => self
                .row(0)
                .ok_or_else(|| Error::UnexpectedResult("frame lost its only row".to_string())),
            n => Err(Error::UnexpectedResult(format!(
                "expected exactly one row, got {n}"
            ))),
        }
    }

    /// The only row of the frame, or `None` when it is empty.
    pub fn squeeze_optional_row(&self) -> Result<Option<Row>> {
        if self.is_empty() {
            return Ok(None);
        }
        self.squeeze_row().map(Some)
    }

    /// The only value of a one-row, one-column frame.
    pub fn scalar(&self) -> Result<Value> {
        if self.columns.len() != 1 || self.rows.len() != 1 {
            return Err(Error::UnexpectedResult(format!(
                "expected a single value, got {} rows x {} columns",
                self.rows.len(),
                self.columns.len()
            )));
        }
        Ok(self.rows[0][0].clone())
    }

    /// Reshapes a long frame into a wide one.
    ///
    /// Rows sharing the same `index` values collapse into one row. Every
    /// distinct value of `columns` becomes a column holding the matching
    /// `values` entry. Groups and new columns keep first-appearance order and
    /// absent cells are `null`. Two rows with the same index and column value
    /// are an error.
    pub fn pivot(&self, index: &[&str], columns: &str, values: &str) -> Result<Self> {
        let index_pos = index
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>>>()?;
        let column_pos = self.require_column(columns)?;
        let value_pos = self.require_column(values)?;

        let mut new_columns: IndexSet<String> = IndexSet::new();
        let mut groups: IndexMap<String, (Vec<Value>, IndexMap<String, Value>)> = IndexMap::new();

        for row in &self.rows {
            let key_values: Vec<Value> = index_pos.iter().map(|&i| row[i].clone()).collect();
            let key = serde_json::to_string(&key_values)?;
            let column_name = value_as_label(&row[column_pos]);
            new_columns.insert(column_name.clone());

            let (_, cells) = groups
                .entry(key)
                .or_insert_with(|| (key_values, IndexMap::new()));
            if cells
                .insert(column_name.clone(), row[value_pos].clone())
                .is_some()
            {
                return Err(Error::InvalidArgument(format!(
                    "index contains duplicate entries for column '{column_name}', cannot reshape"
                )));
            }
        }

        let mut out_columns: Vec<String> = index.iter().map(|s| (*s).to_string()).collect();
        out_columns.extend(new_columns.iter().cloned());

        let rows = groups
            .into_values()
            .map(|(mut key_values, mut cells)| {
                key_values.extend(
                    new_columns
                        .iter()
                        .map(|c| cells.swap_remove(c).unwrap_or(Value::Null)),
                );
                key_values
            })
            .collect();

        Ok(Self {
            columns: out_columns,
            rows,
        })
    }

    /// Reshapes a wide frame into a long one.
    ///
    /// Every non-`id_vars` column is unpivoted into `(var_name, value_name)`
    /// pairs. Output is column-major: all rows for the first value column,
    /// then all rows for the second, and so on.
    pub fn melt(&self, id_vars: &[&str], var_name: &str, value_name: &str) -> Result<Self> {
        let id_pos = id_vars
            .iter()
            .map(|name| self.require_column(name))
            .collect::<Result<Vec<_>>>()?;

        let value_columns: Vec<(usize, &String)> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| !id_pos.contains(i))
            .collect();

        let mut out_columns: Vec<String> = id_vars.iter().map(|s| (*s).to_string()).collect();
        out_columns.push(var_name.to_string());
        out_columns.push(value_name.to_string());

        let mut rows = Vec::with_capacity(self.rows.len() * value_columns.len());
        for (pos, name) in value_columns {
            for row in &self.rows {
                let mut out: Vec<Value> = id_pos.iter().map(|&i| row[i].clone()).collect();
                out.push(Value::String(name.clone()));
                out.push(row[pos].clone());
                rows.push(out);
            }
        }

        Ok(Self {
            columns: out_columns,
            rows,
        })
    }
}

fn value_as_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
