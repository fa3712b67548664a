//! Serialize a validated table into the service's CSV input format.
//!
//! Layout of the payload:
//!
//! ```text
//! taxsimid,year,state,mstat,ltcg,idtl
//! 1,1980,5,2,100000,0
//! 2,1981,0,1,0,0
//! ```
//!
//! - `taxsimid` is always the first column and carries the 1-based emission
//!   index, which identifies the row in the response.
//! - The remaining input columns follow in canonical vocabulary order.
//! - A row that does not contain a column gets `0`, the service's own default.
//! - `idtl` is appended last and selects the output detail level.
//!
//! All fields are plain numbers or fixed identifiers, so no quoting is ever
//! needed.

use crate::config::RequestOptions;
use crate::table::Number;
use crate::validation::ValidatedTable;
use crate::vocabulary::{IDTL, InputVariable};

/// Maps emission order back to the caller's rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowMap {
    original_index: Vec<usize>,
    caller_ids: Vec<Option<Number>>,
}

impl RowMap {
    /// Number of rows sent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.original_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original_index.is_empty()
    }

    /// Original row index of the row sent with wire id `wire_id` (1-based).
    #[must_use]
    pub fn original_row(&self, wire_id: i64) -> Option<usize> {
        let idx = usize::try_from(wire_id).ok()?.checked_sub(1)?;
        self.original_index.get(idx).copied()
    }

    /// The `taxsimid` the caller supplied for an original row, if any.
    #[must_use]
    pub fn caller_id(&self, original_row: usize) -> Option<Number> {
        self.caller_ids.get(original_row).copied().flatten()
    }
}

/// An encoded request.
#[derive(Debug, Clone)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub row_map: RowMap,
    /// Whether any row carries a nonzero `state`.
    pub state_supplied: bool,
}

impl Payload {
    /// The payload as text.
    #[must_use]
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Encode a validated table.
#[must_use]
pub fn encode(table: &ValidatedTable, options: &RequestOptions) -> Payload {
    let data_columns: Vec<(usize, InputVariable)> = table
        .columns()
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| *v != InputVariable::Taxsimid)
        .collect();

    let mut header = vec![InputVariable::Taxsimid.name()];
    header.extend(data_columns.iter().map(|(_, v)| v.name()));
    header.push(IDTL);

    let mut out = String::with_capacity(table.len().saturating_mul(16 * header.len()));
    out.push_str(&header.join(","));
    out.push('\n');

    let idtl = options.idtl();
    let mut original_index = Vec::with_capacity(table.len());
    let mut caller_ids = Vec::with_capacity(table.len());
    for (r, row) in table.rows().iter().enumerate() {
        let mut fields = Vec::with_capacity(header.len());
        fields.push((r + 1).to_string());
        fields.extend(
            data_columns
                .iter()
                .map(|(c, _)| row[*c].unwrap_or(Number::Int(0)).to_string()),
        );
        fields.push(idtl.to_string());
        out.push_str(&fields.join(","));
        out.push('\n');

        original_index.push(r);
        caller_ids.push(table.value(r, InputVariable::Taxsimid));
    }

    Payload {
        bytes: out.into_bytes(),
        row_map: RowMap {
            original_index,
            caller_ids,
        },
        state_supplied: table.has_nonzero_state(),
    }
}
