//! The TAXSIM 32 variable vocabulary.
//!
//! Input names are the exact, case-sensitive names from the Internet TAXSIM 32
//! variable list. Output variables are identified by their position `v1`..`v42`
//! and carry both a short (abbreviated) and a long (spelled-out) name.
//!
//! # Example
//!
//! ```
//! use taxsim::vocabulary::{InputVariable, output_name};
//!
//! assert_eq!(InputVariable::lookup("ltcg"), Some(InputVariable::Ltcg));
//! assert_eq!(InputVariable::lookup("LTCG"), None);
//! assert_eq!(output_name(4, false), Some("fiitax"));
//! assert_eq!(output_name(10, false), Some("v10"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the detail-level selector appended to every payload.
///
/// This is written by the encoder from [`RequestOptions::full`](crate::RequestOptions::full)
/// and is deliberately not part of the caller vocabulary.
pub const IDTL: &str = "idtl";

/// Number of output variables returned with `idtl = 0`.
pub const BASIC_OUTPUT_COUNT: usize = 9;

/// Number of output variables returned with `idtl = 2`.
pub const FULL_OUTPUT_COUNT: usize = 42;

/// First output variable that only exists when a state was supplied.
pub const FIRST_STATE_OUTPUT: usize = 30;

/// A recognized TAXSIM 32 input variable.
///
/// Variants are declared in the service's canonical column order, which is also
/// the order the encoder writes columns in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputVariable {
    Taxsimid,
    Year,
    State,
    Mstat,
    Page,
    Sage,
    Depx,
    Dep13,
    Dep17,
    Dep18,
    Pwages,
    Swages,
    Dividends,
    Intrec,
    Stcg,
    Ltcg,
    Otherprop,
    Nonprop,
    Pensions,
    Gssi,
    Ui,
    Transfers,
    Rentpaid,
    Proptax,
    Otheritem,
    Childcare,
    Mortgage,
    Scorp,
    Pbusinc,
    Pprofinc,
    Sbusinc,
    Sprofinc,
}

impl InputVariable {
    /// Every input variable, in canonical order.
    pub const ALL: [InputVariable; 32] = [
        Self::Taxsimid,
        Self::Year,
        Self::State,
        Self::Mstat,
        Self::Page,
        Self::Sage,
        Self::Depx,
        Self::Dep13,
        Self::Dep17,
        Self::Dep18,
        Self::Pwages,
        Self::Swages,
        Self::Dividends,
        Self::Intrec,
        Self::Stcg,
        Self::Ltcg,
        Self::Otherprop,
        Self::Nonprop,
        Self::Pensions,
        Self::Gssi,
        Self::Ui,
        Self::Transfers,
        Self::Rentpaid,
        Self::Proptax,
        Self::Otheritem,
        Self::Childcare,
        Self::Mortgage,
        Self::Scorp,
        Self::Pbusinc,
        Self::Pprofinc,
        Self::Sbusinc,
        Self::Sprofinc,
    ];

    /// The exact column name the service expects.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Taxsimid => "taxsimid",
            Self::Year => "year",
            Self::State => "state",
            Self::Mstat => "mstat",
            Self::Page => "page",
            Self::Sage => "sage",
            Self::Depx => "depx",
            Self::Dep13 => "dep13",
            Self::Dep17 => "dep17",
            Self::Dep18 => "dep18",
            Self::Pwages => "pwages",
            Self::Swages => "swages",
            Self::Dividends => "dividends",
            Self::Intrec => "intrec",
            Self::Stcg => "stcg",
            Self::Ltcg => "ltcg",
            Self::Otherprop => "otherprop",
            Self::Nonprop => "nonprop",
            Self::Pensions => "pensions",
            Self::Gssi => "gssi",
            Self::Ui => "ui",
            Self::Transfers => "transfers",
            Self::Rentpaid => "rentpaid",
            Self::Proptax => "proptax",
            Self::Otheritem => "otheritem",
            Self::Childcare => "childcare",
            Self::Mortgage => "mortgage",
            Self::Scorp => "scorp",
            Self::Pbusinc => "pbusinc",
            Self::Pprofinc => "pprofinc",
            Self::Sbusinc => "sbusinc",
            Self::Sprofinc => "sprofinc",
        }
    }

    /// Exact, case-sensitive lookup of a column name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.name() == name)
    }
}

impl fmt::Display for InputVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for InputVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| s.to_string())
    }
}

// ============================================================================
// Output variables
// ============================================================================

const SHORT_NAMES: [&str; BASIC_OUTPUT_COUNT] = [
    "taxsimid", "year", "state", "fiitax", "siitax", "fica", "frate", "srate", "ficar",
];

const LONG_NAMES: [&str; FULL_OUTPUT_COUNT] = [
    "Case ID",
    "Year",
    "State",
    "Federal income tax liability including capital gains rates, surtaxes, AMT and refundable and non-refundable credits",
    "State income tax liability",
    "FICA (OADSI and HI, sum of employee AND employer)",
    "federal marginal rate",
    "state marginal rate",
    "FICA rate",
    "Federal AGI",
    "UI in AGI",
    "Social Security in AGI",
    "Zero Bracket Amount",
    "Personal Exemptions",
    "Exemption Phaseout",
    "Deduction Phaseout",
    "Itemized Deductions in taxable income",
    "Federal Taxable Income",
    "Tax on Taxable Income (no special capital gains rates)",
    "Exemption Surtax",
    "General Tax Credit",
    "Child Tax Credit (as adjusted)",
    "Additional Child Tax Credit (refundable)",
    "Child Care Credit",
    "Earned Income Credit (total federal)",
    "Income for the Alternative Minimum Tax",
    "AMT Liability after credit for regular tax and other allowed credits",
    "Federal Income Tax Before Credits (includes special treatment of Capital gains, exemption surtax (1988-1996) and 15% rate phaseout (1988-1990) but not AMT)",
    "FICA",
    "State Household Income (imputation for property tax credit)",
    "State Rent Expense (imputation for property tax credit)",
    "State AGI",
    "State Exemption amount",
    "State Standard Deduction",
    "State Itemized Deduction",
    "State Taxable Income",
    "State Property Tax Credit",
    "State Child Care Credit",
    "State EIC",
    "State Total Credits",
    "State Bracket Rate",
    "Earned Self-Employment Income for FICA",
];

/// Name of output variable `v{index}` (1-based).
///
/// Short names are the service's abbreviations for `v1`..`v9` and the bare
/// positional name (`v10`, `v11`, ...) beyond that. Returns `None` when
/// `index` is outside `1..=42`.
#[must_use]
pub fn output_name(index: usize, long_names: bool) -> Option<&'static str> {
    if !(1..=FULL_OUTPUT_COUNT).contains(&index) {
        return None;
    }
    if long_names {
        return Some(LONG_NAMES[index - 1]);
    }
    Some(SHORT_NAMES.get(index - 1).copied().unwrap_or(POSITIONAL[index - 1]))
}

/// Leading output columns (`taxsimid`, `year`, `state`) whose header names the
/// decoder checks before trusting a response.
pub const IDENTIFYING_OUTPUTS: usize = 3;

/// Whether `header` names output variable `index` (1-based), by its short
/// name or as `v<index>`, ignoring case and surrounding whitespace.
#[must_use]
pub fn names_output(index: usize, header: &str) -> bool {
    let header = header.trim();
    let short = SHORT_NAMES.get(index.wrapping_sub(1)).copied();
    let positional = POSITIONAL.get(index.wrapping_sub(1)).copied();
    [short, positional]
        .into_iter()
        .flatten()
        .any(|name| name.eq_ignore_ascii_case(header))
}

const POSITIONAL: [&str; FULL_OUTPUT_COUNT] = [
    "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10", "v11", "v12", "v13", "v14",
    "v15", "v16", "v17", "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26", "v27",
    "v28", "v29", "v30", "v31", "v32", "v33", "v34", "v35", "v36", "v37", "v38", "v39", "v40",
    "v41", "v42",
];

/// The output columns a request is expected to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSchema {
    /// Number of leading output variables kept (`9`, `29` or `42`).
    pub width: usize,
    /// Whether column names are the long TAXSIM names.
    pub long_names: bool,
}

impl OutputSchema {
    /// Schema for a request with the given detail level and state presence.
    ///
    /// `v30`..`v42` are only part of the schema when `full` is set and a
    /// nonzero state was supplied.
    #[must_use]
    pub fn for_request(full: bool, state_supplied: bool, long_names: bool) -> Self {
        let width = match (full, state_supplied) {
            (false, _) => BASIC_OUTPUT_COUNT,
            (true, true) => FULL_OUTPUT_COUNT,
            (true, false) => FIRST_STATE_OUTPUT - 1,
        };
        Self { width, long_names }
    }

    /// Column names in output order.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        (1..=self.width)
            .filter_map(|i| output_name(i, self.long_names))
            .map(str::to_string)
            .collect()
    }

    /// Response widths the decoder accepts for this schema.
    ///
    /// A full response without state may still carry the state block; it is
    /// accepted and projected away.
    #[must_use]
    pub fn accepts_width(&self, width: usize) -> bool {
        width == self.width
            || (self.width == FIRST_STATE_OUTPUT - 1 && width == FULL_OUTPUT_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_names_round_trip_through_lookup() {
        for v in InputVariable::ALL {
            assert_eq!(InputVariable::lookup(v.name()), Some(v));
        }
    }

    #[test]
    fn canonical_order_matches_declaration_order() {
        let mut sorted = InputVariable::ALL;
        sorted.sort();
        assert_eq!(sorted, InputVariable::ALL);
    }

    #[test]
    fn output_names_cover_v1_to_v42() {
        assert_eq!(output_name(1, false), Some("taxsimid"));
        assert_eq!(output_name(9, false), Some("ficar"));
        assert_eq!(output_name(42, false), Some("v42"));
        assert_eq!(output_name(1, true), Some("Case ID"));
        assert_eq!(output_name(0, false), None);
        assert_eq!(output_name(43, true), None);
    }

    #[test]
    fn header_names_match_short_or_positional() {
        assert!(names_output(1, "taxsimid"));
        assert!(names_output(1, " V1 "));
        assert!(names_output(3, "state"));
        assert!(names_output(12, "v12"));
        assert!(!names_output(1, "year"));
        assert!(!names_output(0, "v0"));
        assert!(!names_output(43, "v43"));
    }

    #[test]
    fn schema_widths() {
        assert_eq!(OutputSchema::for_request(false, true, false).width, 9);
        assert_eq!(OutputSchema::for_request(true, true, false).width, 42);
        assert_eq!(OutputSchema::for_request(true, false, false).width, 29);
        assert!(OutputSchema::for_request(true, false, false).accepts_width(42));
        assert!(!OutputSchema::for_request(false, false, false).accepts_width(42));
    }
}
