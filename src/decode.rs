//! Parse the service's CSV answer into a [`ResultTable`].
//!
//! The response has a header line followed by one line per row sent. The
//! decoder checks the width against the [`OutputSchema`] of the request and
//! the names of the leading identifier columns,
//! renames columns, uses the returned `taxsimid` to put every row back at its
//! original position, and finally swaps the wire id for the caller's own
//! `taxsimid` (or `0` when the caller did not supply one).

use crate::config::RequestOptions;
use crate::encode::{Payload, RowMap};
use crate::error::DecodeError;
use crate::table::{Number, ResultTable};
use crate::vocabulary::{IDENTIFYING_OUTPUTS, OutputSchema, names_output, output_name};
use tracing::debug;

/// Longest excerpt of an unparseable response quoted in an error.
const EXCERPT_LEN: usize = 120;

/// Decode a response for the request described by `payload` and `options`.
///
/// # Errors
///
/// Returns [`DecodeError::PartialResponse`] when fewer rows come back than
/// were sent, and [`DecodeError::MalformedResponse`] for anything else that
/// does not fit the request.
pub fn decode(
    response: &[u8],
    payload: &Payload,
    options: &RequestOptions,
) -> Result<ResultTable, DecodeError> {
    let schema = OutputSchema::for_request(options.full, payload.state_supplied, options.long_names);
    decode_with_schema(response, &payload.row_map, &schema)
}

/// Decode against an explicit schema.
///
/// # Errors
///
/// See [`decode`].
pub fn decode_with_schema(
    response: &[u8],
    row_map: &RowMap,
    schema: &OutputSchema,
) -> Result<ResultTable, DecodeError> {
    if response.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::malformed("empty response"));
    }

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(response);

    let header = rdr
        .headers()
        .map_err(|e| DecodeError::malformed(format!("unreadable header: {e}")))?
        .clone();
    let width = header.len();
    if !schema.accepts_width(width) {
        return Err(DecodeError::malformed(format!(
            "expected {} columns, got {width}: {}",
            schema.width,
            excerpt(response)
        )));
    }
    for (i, name) in header.iter().take(IDENTIFYING_OUTPUTS).enumerate() {
        if !names_output(i + 1, name) {
            return Err(DecodeError::malformed(format!(
                "column {} is '{name}', expected {} or v{}",
                i + 1,
                output_name(i + 1, false).unwrap_or_default(),
                i + 1
            )));
        }
    }

    let expected = row_map.len();
    let mut slots: Vec<Option<Vec<Number>>> = vec![None; expected];
    let mut received = 0usize;

    for (i, rec) in rdr.records().enumerate() {
        let line = i + 2;
        let rec = rec.map_err(|e| DecodeError::malformed(format!("line {line}: {e}")))?;
        if rec.len() != width {
            return Err(DecodeError::malformed(format!(
                "line {line}: expected {width} fields, got {}",
                rec.len()
            )));
        }

        let mut values = Vec::with_capacity(schema.width);
        for (c, field) in rec.iter().take(schema.width).enumerate() {
            let n = Number::parse(field).ok_or_else(|| {
                DecodeError::malformed(format!(
                    "line {line}, column {}: '{field}' is not a number",
                    c + 1
                ))
            })?;
            values.push(n);
        }

        received += 1;
        if received > expected {
            return Err(DecodeError::malformed(format!(
                "more rows than the {expected} sent"
            )));
        }

        let wire_id = values[0]
            .as_i64()
            .ok_or_else(|| DecodeError::malformed(format!("line {line}: non-integral taxsimid")))?;
        let original = row_map.original_row(wire_id).ok_or_else(|| {
            DecodeError::malformed(format!("line {line}: taxsimid {wire_id} was never sent"))
        })?;
        if slots[original].is_some() {
            return Err(DecodeError::malformed(format!(
                "line {line}: taxsimid {wire_id} returned twice"
            )));
        }
        values[0] = row_map.caller_id(original).unwrap_or(Number::Int(0));
        slots[original] = Some(values);
    }

    if received < expected {
        return Err(DecodeError::PartialResponse { expected, received });
    }

    let rows: Vec<Vec<Number>> = slots.into_iter().flatten().collect();
    debug!(rows = rows.len(), columns = schema.width, "decoded response");
    Ok(ResultTable::new(schema.column_names(), rows))
}

fn excerpt(response: &[u8]) -> String {
    let text = String::from_utf8_lossy(response);
    let text = text.trim();
    match text.char_indices().nth(EXCERPT_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
