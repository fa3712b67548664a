//! Tabular input and output types.
//!
//! An [`ObservationTable`] is what callers hand in: rows of loosely typed
//! cells keyed by column name. A [`ResultTable`] is what comes back: named,
//! numeric columns aligned row-for-row with the input.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Cells and numbers
// ============================================================================

/// A numeric value as sent to or received from the service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// The value as a float.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    /// The value as an integer, if it is one exactly.
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(f as i64),
            Self::Float(_) => None,
        }
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }

    /// Parse a number from text: integer syntax gives [`Number::Int`], anything
    /// else that parses as a finite float gives [`Number::Float`].
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Ok(i) = text.parse::<i64>() {
            return Some(Self::Int(i));
        }
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Self::Float)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A single input cell before validation.
///
/// `Text` covers values read from files or other loosely typed sources; it is
/// accepted only when it holds a number. `Missing` marks a cell that is present
/// in the row but has no value, which the service would not answer for.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Coerce the cell to a finite number.
    #[must_use]
    pub fn to_number(&self) -> Option<Number> {
        match self {
            Self::Int(i) => Some(Number::Int(*i)),
            Self::Float(f) if f.is_finite() => Some(Number::Float(*f)),
            Self::Float(_) => None,
            Self::Text(s) => Number::parse(s),
            Self::Missing => None,
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Missing, Into::into)
    }
}

// ============================================================================
// ObservationTable
// ============================================================================

/// One input row: a mapping from column name to cell.
///
/// A column the row does not contain is *absent* and will be sent as `0`.
/// A column present with [`Cell::Missing`] or blank text is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    cells: BTreeMap<String, Cell>,
}

impl Observation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Cell>) {
        self.cells.insert(column.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    /// Cells in column-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<Cell>> FromIterator<(K, V)> for Observation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Ordered input rows. Row order is preserved through the whole request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationTable {
    rows: Vec<Observation>,
}

impl ObservationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from column-major data: every column gets one value per row.
    ///
    /// Columns shorter than the longest one leave the remaining rows absent
    /// for that column.
    #[must_use]
    pub fn from_columns<K, V>(columns: Vec<(K, Vec<V>)>) -> Self
    where
        K: Into<String>,
        V: Into<Cell>,
    {
        let mut rows: Vec<Observation> = Vec::new();
        for (name, values) in columns {
            let name = name.into();
            for (i, v) in values.into_iter().enumerate() {
                if rows.len() <= i {
                    rows.resize_with(i + 1, Observation::new);
                }
                rows[i].set(name.clone(), v);
            }
        }
        Self { rows }
    }

    pub fn push(&mut self, row: Observation) {
        self.rows.push(row);
    }

    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every distinct column name that appears in any row, sorted.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rows
            .iter()
            .flat_map(|r| r.iter().map(|(k, _)| k.to_string()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

impl From<Vec<Observation>> for ObservationTable {
    fn from(rows: Vec<Observation>) -> Self {
        Self { rows }
    }
}

impl FromIterator<Observation> for ObservationTable {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// ResultTable
// ============================================================================

/// Whether a result column holds integers or floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Integer,
    Float,
}

/// Decoded service output, row-aligned with the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    kinds: Vec<ColumnKind>,
    rows: Vec<Vec<Number>>,
}

impl ResultTable {
    /// Build a table, unifying each column to a single kind.
    ///
    /// A column is [`ColumnKind::Integer`] only when every value in it is an
    /// integer; otherwise all its values become floats.
    ///
    /// # Panics
    ///
    /// Panics if a row's length differs from the number of columns.
    #[must_use]
    pub fn new(columns: Vec<String>, mut rows: Vec<Vec<Number>>) -> Self {
        for row in &rows {
            assert_eq!(row.len(), columns.len(), "row width must match column count");
        }
        let kinds: Vec<ColumnKind> = (0..columns.len())
            .map(|c| {
                if rows.iter().all(|r| matches!(r[c], Number::Int(_))) {
                    ColumnKind::Integer
                } else {
                    ColumnKind::Float
                }
            })
            .collect();
        for row in &mut rows {
            for (value, kind) in row.iter_mut().zip(&kinds) {
                if *kind == ColumnKind::Float {
                    *value = Number::Float(value.as_f64());
                }
            }
        }
        Self {
            columns,
            kinds,
            rows,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Number>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a named column, in row order.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<Number>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx]).collect())
    }

    /// A single value by row index and column name.
    #[must_use]
    pub fn get(&self, row: usize, name: &str) -> Option<Number> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx])
    }
}
