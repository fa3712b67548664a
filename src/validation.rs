//! Input validation against the TAXSIM 32 vocabulary.
//!
//! Validation happens before anything is encoded or sent. It never repairs
//! data: every unknown column and every cell that is not a number is reported,
//! and the request stops there.
//!
//! # Example
//!
//! ```
//! use taxsim::{Observation, ObservationTable};
//! use taxsim::validation::{validate, ValidationError};
//!
//! let table = ObservationTable::from(vec![
//!     Observation::new().with("year", 1980).with("lcgt", 100000),
//! ]);
//!
//! let errors = validate(&table).unwrap_err();
//! assert_eq!(
//!     errors.errors(),
//!     &[ValidationError::UnknownColumn("lcgt".to_string())]
//! );
//! ```

use crate::table::{Number, ObservationTable};
use crate::vocabulary::InputVariable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    /// The table has no rows.
    EmptyTable,
    /// A column name is not in the vocabulary (typos and case errors land here).
    UnknownColumn(String),
    /// A cell is present but is not a finite number (blank, missing, text).
    NonNumericValue { row: usize, column: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "table has no observations"),
            Self::UnknownColumn(name) => {
                write!(f, "[{name}] not a TAXSIM 32 input variable")
            }
            Self::NonNumericValue { row, column } => {
                write!(f, "[{column}] row {row}: value is not a number")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Every validation problem found in a table. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Unknown column names, in the order they were found.
    #[must_use]
    pub fn unknown_columns(&self) -> Vec<&str> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::UnknownColumn(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// `(row, column)` locations of non-numeric cells.
    #[must_use]
    pub fn non_numeric_cells(&self) -> Vec<(usize, &str)> {
        self.errors
            .iter()
            .filter_map(|e| match e {
                ValidationError::NonNumericValue { row, column } => Some((*row, column.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Export errors as JSON, e.g. for a report next to the input file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.errors)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} validation error(s): {joined}", self.errors.len())
    }
}

impl std::error::Error for ValidationErrors {}

/// A table that passed validation.
///
/// Columns are typed and held in canonical vocabulary order. Each row has one
/// slot per column; `None` means the row did not contain that column.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    columns: Vec<InputVariable>,
    rows: Vec<Vec<Option<Number>>>,
}

impl ValidatedTable {
    #[must_use]
    pub fn columns(&self) -> &[InputVariable] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<Number>>] {
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

    /// Value of `column` in `row`, if the row contains it.
    #[must_use]
    pub fn value(&self, row: usize, column: InputVariable) -> Option<Number> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.rows.get(row).and_then(|r| r[idx])
    }

    /// True when a `state` column exists and is nonzero in at least one row.
    #[must_use]
    pub fn has_nonzero_state(&self) -> bool {
        (0..self.rows.len()).any(|r| {
            self.value(r, InputVariable::State)
                .is_some_and(|v| !v.is_zero())
        })
    }
}

/// Validate a table against the TAXSIM 32 input vocabulary.
///
/// # Errors
///
/// Returns every problem found: [`ValidationError::EmptyTable`], one
/// [`ValidationError::UnknownColumn`] per distinct unknown name, and one
/// [`ValidationError::NonNumericValue`] per bad cell in a recognized column.
pub fn validate(table: &ObservationTable) -> Result<ValidatedTable, ValidationErrors> {
    if table.is_empty() {
        return Err(ValidationErrors {
            errors: vec![ValidationError::EmptyTable],
        });
    }

    let mut errors = Vec::new();
    let mut known = BTreeSet::new();
    for name in table.column_names() {
        match InputVariable::lookup(&name) {
            Some(var) => {
                known.insert(var);
            }
            None => errors.push(ValidationError::UnknownColumn(name)),
        }
    }
    let columns: Vec<InputVariable> = known.into_iter().collect();

    let mut rows = Vec::with_capacity(table.len());
    for (r, obs) in table.rows().iter().enumerate() {
        let mut slots = vec![None; columns.len()];
        for (c, var) in columns.iter().enumerate() {
            let Some(cell) = obs.get(var.name()) else {
                continue;
            };
            match cell.to_number() {
                Some(n) => slots[c] = Some(n),
                None => errors.push(ValidationError::NonNumericValue {
                    row: r,
                    column: var.name().to_string(),
                }),
            }
        }
        rows.push(slots);
    }

    if errors.is_empty() {
        Ok(ValidatedTable { columns, rows })
    } else {
        Err(ValidationErrors { errors })
    }
}

impl ObservationTable {
    /// See [`validate`].
    ///
    /// # Errors
    ///
    /// Returns the validation problems found in this table.
    pub fn validate(&self) -> Result<ValidatedTable, ValidationErrors> {
        validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Cell, Observation};

    #[test]
    fn columns_come_out_in_canonical_order() {
        let t = ObservationTable::from(vec![
            Observation::new()
                .with("ltcg", 100000)
                .with("year", 1980)
                .with("mstat", 2),
        ]);
        let v = validate(&t).unwrap();
        assert_eq!(
            v.columns(),
            &[InputVariable::Year, InputVariable::Mstat, InputVariable::Ltcg]
        );
    }

    #[test]
    fn absent_is_none_but_missing_is_error() {
        let t = ObservationTable::from(vec![
            Observation::new().with("year", 1980).with("state", 5),
            Observation::new().with("year", 1981),
        ]);
        let v = validate(&t).unwrap();
        assert_eq!(v.value(1, InputVariable::State), None);

        let t = ObservationTable::from(vec![
            Observation::new().with("year", 1980).with("state", Cell::Missing),
        ]);
        let e = validate(&t).unwrap_err();
        assert_eq!(e.non_numeric_cells(), vec![(0, "state")]);
    }

    #[test]
    fn nonzero_state_detection() {
        let zero = ObservationTable::from(vec![Observation::new().with("state", 0)]);
        assert!(!validate(&zero).unwrap().has_nonzero_state());
        let some = ObservationTable::from(vec![
            Observation::new().with("state", 0),
            Observation::new().with("state", 5),
        ]);
        assert!(validate(&some).unwrap().has_nonzero_state());
    }
}
