//! In-memory tables of typed cells.
//!
//! A [`Table`] is a list of named columns plus rows of [`Cell`]s. Tables from
//! different sources are merged with [`Table::concat`] and deduplicated with
//! [`Table::dedup_except`].

use serde::{Serialize, Serializer};
use std::collections::HashSet;

/// A single typed table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value of the cell, if it holds a finite number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    fn key(&self) -> CellKey<'_> {
        match self {
            Cell::Null => CellKey::Null,
            Cell::Int(v) => CellKey::Int(*v),
            // -0.0 == 0.0, so both hash the same
            Cell::Float(v) if *v == 0.0 => CellKey::Float(0f64.to_bits()),
            Cell::Float(v) => CellKey::Float(v.to_bits()),
            Cell::Text(s) => CellKey::Text(s),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) => serializer.serialize_f64(*v),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Hashable view of a cell used for duplicate detection.
#[derive(Debug, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Null,
    Int(i64),
    Float(u64),
    Text(&'a str),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Appends a row. Short rows are padded with nulls, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
    }

    /// Appends a column, or replaces it if a column of that name exists.
    ///
    /// `values` is matched to rows by position; missing values are null.
    pub fn push_column(&mut self, name: &str, values: Vec<Cell>) {
        let mut values = values.into_iter();
        match self.column_index(name) {
            Some(i) => {
                for row in &mut self.rows {
                    row[i] = values.next().unwrap_or(Cell::Null);
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in &mut self.rows {
                    row.push(values.next().unwrap_or(Cell::Null));
                }
            }
        }
    }

    /// Appends a column holding the same value on every row.
    pub fn fill_column(&mut self, name: &str, value: Cell) {
        let values = vec![value; self.rows.len()];
        self.push_column(name, values);
    }

    /// Row-wise union of `tables`, in order.
    ///
    /// Columns are ordered by first appearance. A source lacking a column
    /// contributes nulls for it. A column that mixes integers and floats
    /// (and no text) is promoted to floats.
    pub fn concat<I>(tables: I) -> Table
    where
        I: IntoIterator<Item = Table>,
    {
        let tables: Vec<Table> = tables.into_iter().collect();

        let mut merged = Table::default();
        for table in &tables {
            for column in &table.columns {
                if merged.column_index(column).is_none() {
                    merged.columns.push(column.clone());
                }
            }
        }

        for table in tables {
            let mapping: Vec<usize> = table
                .columns
                .iter()
                .filter_map(|c| merged.column_index(c))
                .collect();

            for row in table.rows {
                let mut out = vec![Cell::Null; merged.columns.len()];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    out[target] = cell;
                }
                merged.rows.push(out);
            }
        }

        merged.promote_mixed_numeric();
        merged
    }

    fn promote_mixed_numeric(&mut self) {
        for i in 0..self.columns.len() {
            let (mut ints, mut floats, mut text) = (false, false, false);
            for row in &self.rows {
                match row[i] {
                    Cell::Int(_) => ints = true,
                    Cell::Float(_) => floats = true,
                    Cell::Text(_) => text = true,
                    Cell::Null => {}
                }
            }
            if ints && floats && !text {
                for row in &mut self.rows {
                    if let Cell::Int(v) = row[i] {
                        row[i] = Cell::Float(v as f64);
                    }
                }
            }
        }
    }

    /// Drops every row equal to an earlier row on all columns not named in
    /// `excluded`. Returns the number of rows dropped.
    pub fn dedup_except(&mut self, excluded: &[&str]) -> usize {
        let key_columns: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !excluded.contains(&c.as_str()))
            .map(|(i, _)| i)
            .collect();

        let mut keep = Vec::with_capacity(self.rows.len());
        {
            let mut seen = HashSet::new();
            for row in &self.rows {
                let key: Vec<CellKey<'_>> = key_columns.iter().map(|&i| row[i].key()).collect();
                keep.push(seen.insert(key));
            }
        }

        let before = self.rows.len();
        let mut flags = keep.into_iter();
        self.rows.retain(|_| flags.next().unwrap_or(false));
        before - self.rows.len()
    }
}
