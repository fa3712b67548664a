//! Testing utilities for code that talks to TAXSIM.
//!
//! Nothing here touches the network:
//!
//! - [`sample_observation_table`] - the single-row example used throughout the docs
//! - [`SyntheticServer`] - answers payloads in the service's output format
//! - [`fake_service`] - a [`FakeTransport`] backed by a default [`SyntheticServer`]
//!
//! # Quick Start
//!
//! ```
//! use taxsim::testing::*;
//! use taxsim::{RequestOptions, TaxsimClient};
//!
//! let client = TaxsimClient::default().with_transport(fake_service());
//! let result = client
//!     .run(&sample_observation_table(), &RequestOptions::default())
//!     .unwrap();
//! assert_eq!(result.columns().len(), 9);
//! ```

use crate::table::{Number, Observation, ObservationTable};
use crate::transport::FakeTransport;
use crate::vocabulary::{BASIC_OUTPUT_COUNT, FIRST_STATE_OUTPUT, FULL_OUTPUT_COUNT, output_name};

/// `{year: 1980, state: 5, mstat: 2, ltcg: 100000}`.
#[must_use]
pub fn sample_observation_table() -> ObservationTable {
    ObservationTable::from(vec![
        Observation::new()
            .with("year", 1980)
            .with("state", 5)
            .with("mstat", 2)
            .with("ltcg", 100_000),
    ])
}

/// Several rows with mixed states, including one without any state.
#[must_use]
pub fn sample_household_table() -> ObservationTable {
    ObservationTable::from(vec![
        Observation::new()
            .with("year", 2000)
            .with("state", 33)
            .with("mstat", 1)
            .with("pwages", 45_000),
        Observation::new()
            .with("year", 2005)
            .with("state", 0)
            .with("mstat", 2)
            .with("pwages", 80_000)
            .with("swages", 20_000.5),
        Observation::new()
            .with("year", 2010)
            .with("mstat", 2)
            .with("depx", 2)
            .with("dividends", 1_250),
    ])
}

/// Stand-in for the remote service.
///
/// Output width follows the service: `idtl = 0` gives `v1`..`v9`; `idtl = 2`
/// gives `v1`..`v42` when any row has a nonzero state and `v1`..`v29`
/// otherwise. `year` and `state` are echoed, `taxsimid` is echoed as sent,
/// and every other variable gets a deterministic value derived from the row.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticServer {
    /// Return rows in reverse order.
    pub reverse: bool,
    /// Leave this many rows off the end.
    pub drop_rows: usize,
    /// Always include `v30`..`v42` for full requests.
    pub always_state_block: bool,
}

impl SyntheticServer {
    /// Answer a payload. An unreadable payload gets a one-line error message,
    /// as the real service does.
    #[must_use]
    pub fn respond(&self, payload: &[u8]) -> Vec<u8> {
        self.try_respond(payload)
            .unwrap_or_else(|| b"TAXSIM: could not read input file\n".to_vec())
    }

    fn try_respond(&self, payload: &[u8]) -> Option<Vec<u8>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(payload);
        let headers: Vec<String> = rdr.headers().ok()?.iter().map(str::to_string).collect();
        let col = |name: &str| headers.iter().position(|h| h == name);

        let mut rows: Vec<Vec<Number>> = Vec::new();
        for rec in rdr.records() {
            let rec = rec.ok()?;
            let values: Option<Vec<Number>> = rec.iter().map(Number::parse).collect();
            rows.push(values?);
        }

        let get = |row: &[Number], name: &str| col(name).map_or(Number::Int(0), |i| row[i]);
        let full = rows.iter().any(|r| get(r.as_slice(), "idtl").as_f64() == 2.0);
        let state = rows.iter().any(|r| !get(r.as_slice(), "state").is_zero());
        let width = match (full, state || self.always_state_block) {
            (false, _) => BASIC_OUTPUT_COUNT,
            (true, true) => FULL_OUTPUT_COUNT,
            (true, false) => FIRST_STATE_OUTPUT - 1,
        };

        let mut out = (1..=width)
            .filter_map(|i| output_name(i, false))
            .collect::<Vec<_>>()
            .join(",");
        out.push('\n');

        let keep = rows.len().saturating_sub(self.drop_rows);
        let mut emitted: Vec<&Vec<Number>> = rows.iter().take(keep).collect();
        if self.reverse {
            emitted.reverse();
        }
        for row in emitted {
            let id = get(row.as_slice(), "taxsimid");
            let income: f64 = headers
                .iter()
                .zip(row.iter())
                .filter(|(h, _)| !matches!(h.as_str(), "taxsimid" | "year" | "state" | "mstat" | "idtl"))
                .map(|(_, v)| v.as_f64())
                .sum();
            let mut fields = vec![
                id.to_string(),
                get(row.as_slice(), "year").to_string(),
                get(row.as_slice(), "state").to_string(),
            ];
            for v in 4..=width {
                fields.push(format!("{:.2}", income * v as f64 / 1000.0));
            }
            out.push_str(&fields.join(","));
            out.push('\n');
        }
        Some(out.into_bytes())
    }
}

/// A fake transport answering like the service, immediately.
#[must_use]
pub fn fake_service() -> FakeTransport {
    fake_service_with(SyntheticServer::default())
}

/// A fake transport answering through `server`.
#[must_use]
pub fn fake_service_with(server: SyntheticServer) -> FakeTransport {
    FakeTransport::responding(move |payload| server.respond(payload))
}
