//! Tests for response decoding.

use taxsim::decode::decode;
use taxsim::encode::{Payload, encode};
use taxsim::testing::{SyntheticServer, sample_household_table, sample_observation_table};
use taxsim::*;

fn payload_for(table: &ObservationTable, opts: &RequestOptions) -> Payload {
    encode(&table.validate().unwrap(), opts)
}

#[test]
fn test_basic_columns_and_echoed_values() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = SyntheticServer::default().respond(&p.bytes);

    let r = decode(&resp, &p, &opts).unwrap();
    assert_eq!(r.len(), 1);
    assert_eq!(
        r.columns(),
        &["taxsimid", "year", "state", "fiitax", "siitax", "fica", "frate", "srate", "ficar"]
    );
    assert_eq!(r.get(0, "year"), Some(Number::Int(1980)));
    assert_eq!(r.get(0, "state"), Some(Number::Int(5)));
    assert_eq!(r.get(0, "taxsimid"), Some(Number::Int(0)));
    assert_eq!(r.kinds()[3], ColumnKind::Float);
}

#[test]
fn test_full_with_state_has_42_columns() {
    let opts = RequestOptions::default().with_full(true);
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = SyntheticServer::default().respond(&p.bytes);

    let r = decode(&resp, &p, &opts).unwrap();
    assert_eq!(r.columns().len(), 42);
    assert_eq!(r.columns()[41], "v42");
}

#[test]
fn test_no_state_block_without_state() {
    let table = ObservationTable::from(vec![
        Observation::new().with("year", 1990).with("pwages", 30_000),
        Observation::new().with("year", 1991).with("state", 0),
    ]);
    let opts = RequestOptions::default().with_full(true);
    let p = payload_for(&table, &opts);

    // The server may or may not include the block; neither shows up.
    for server in [
        SyntheticServer::default(),
        SyntheticServer {
            always_state_block: true,
            ..Default::default()
        },
    ] {
        let r = decode(&server.respond(&p.bytes), &p, &opts).unwrap();
        assert_eq!(r.columns().len(), 29);
        assert!(r.column_index("v30").is_none());
        assert!(r.column_index("v42").is_none());
    }
}

#[test]
fn test_long_names() {
    let opts = RequestOptions::default().with_full(true).with_long_names(true);
    let p = payload_for(&sample_observation_table(), &opts);
    let r = decode(&SyntheticServer::default().respond(&p.bytes), &p, &opts).unwrap();
    assert_eq!(r.columns()[0], "Case ID");
    assert_eq!(r.columns()[4], "State income tax liability");
    assert_eq!(r.columns()[40], "State Bracket Rate");
}

#[test]
fn test_reordered_response_is_restored() {
    let table = sample_household_table();
    let opts = RequestOptions::default();
    let p = payload_for(&table, &opts);
    let server = SyntheticServer {
        reverse: true,
        ..Default::default()
    };

    let r = decode(&server.respond(&p.bytes), &p, &opts).unwrap();
    let years: Vec<Number> = r.column("year").unwrap();
    assert_eq!(
        years,
        vec![Number::Int(2000), Number::Int(2005), Number::Int(2010)]
    );
}

#[test]
fn test_caller_taxsimid_is_restored() {
    let table = ObservationTable::from(vec![
        Observation::new().with("taxsimid", 11).with("year", 1980),
        Observation::new().with("taxsimid", 12).with("year", 1981),
    ]);
    let opts = RequestOptions::default();
    let p = payload_for(&table, &opts);
    let server = SyntheticServer {
        reverse: true,
        ..Default::default()
    };
    let r = decode(&server.respond(&p.bytes), &p, &opts).unwrap();
    assert_eq!(
        r.column("taxsimid").unwrap(),
        vec![Number::Int(11), Number::Int(12)]
    );
}

#[test]
fn test_partial_response_names_missing_rows() {
    let table = sample_household_table();
    let opts = RequestOptions::default();
    let p = payload_for(&table, &opts);
    let server = SyntheticServer {
        drop_rows: 2,
        ..Default::default()
    };

    let err = decode(&server.respond(&p.bytes), &p, &opts).unwrap_err();
    assert_eq!(
        err,
        DecodeError::PartialResponse {
            expected: 3,
            received: 1
        }
    );
    assert_eq!(err.missing_rows(), Some(2));
}

#[test]
fn test_extra_rows_are_malformed() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = "taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar\n\
                1,1980,5,1,1,1,1,1,1\n\
                2,1980,5,1,1,1,1,1,1\n";
    let err = decode(resp.as_bytes(), &p, &opts).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedResponse { .. }));
}

#[test]
fn test_wrong_width_is_malformed() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = "taxsimid,year,state\n1,1980,5\n";
    let err = decode(resp.as_bytes(), &p, &opts).unwrap_err();
    match err {
        DecodeError::MalformedResponse { reason } => assert!(reason.contains("expected 9 columns")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_error_text_is_malformed() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let err = decode(b"TAXSIM: could not read input file\n", &p, &opts).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedResponse { .. }));
    assert!(err.to_string().contains("could not read input file"));

    let err = decode(b"  \n", &p, &opts).unwrap_err();
    assert!(matches!(err, DecodeError::MalformedResponse { .. }));
}

#[test]
fn test_unknown_or_duplicate_ids_are_malformed() {
    let table = sample_household_table();
    let opts = RequestOptions::default();
    let p = payload_for(&table, &opts);
    let header = "taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar\n";

    let dup = format!("{header}1,2000,33,1,1,1,1,1,1\n1,2000,33,1,1,1,1,1,1\n3,2010,0,1,1,1,1,1,1\n");
    assert!(matches!(
        decode(dup.as_bytes(), &p, &opts),
        Err(DecodeError::MalformedResponse { .. })
    ));

    let unknown = format!("{header}1,2000,33,1,1,1,1,1,1\n2,2005,0,1,1,1,1,1,1\n9,2010,0,1,1,1,1,1,1\n");
    assert!(matches!(
        decode(unknown.as_bytes(), &p, &opts),
        Err(DecodeError::MalformedResponse { .. })
    ));
}

#[test]
fn test_non_numeric_cell_is_malformed() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = "taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar\n1,1980,5,abc,1,1,1,1,1\n";
    let err = decode(resp.as_bytes(), &p, &opts).unwrap_err();
    assert!(err.to_string().contains("'abc' is not a number"));
}

#[test]
fn test_header_only_response_is_partial() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);
    let resp = "taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar\n";
    assert_eq!(
        decode(resp.as_bytes(), &p, &opts).unwrap_err(),
        DecodeError::PartialResponse {
            expected: 1,
            received: 0
        }
    );
}

#[test]
fn test_row_of_empty_fields_is_malformed() {
    let table = sample_household_table();
    let opts = RequestOptions::default();
    let p = payload_for(&table, &opts);
    let resp = "taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar\n\
                1,2000,33,1,1,1,1,1,1\n\
                ,,,,,,,,\n\
                3,2010,0,1,1,1,1,1,1\n";
    let err = decode(resp.as_bytes(), &p, &opts).unwrap_err();
    match err {
        DecodeError::MalformedResponse { reason } => assert!(reason.contains("line 3")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_identifier_header_names_are_checked() {
    let opts = RequestOptions::default();
    let p = payload_for(&sample_observation_table(), &opts);

    let swapped = "year,taxsimid,state,fiitax,siitax,fica,frate,srate,ficar\n1980,1,5,1,1,1,1,1,1\n";
    let err = decode(swapped.as_bytes(), &p, &opts).unwrap_err();
    match err {
        DecodeError::MalformedResponse { reason } => {
            assert!(reason.contains("column 1 is 'year'"));
        }
        other => panic!("unexpected {other:?}"),
    }

    let positional = "V1,v2,v3,v4,v5,v6,v7,v8,v9\n1,1980,5,1,1,1,1,1,1\n";
    let r = decode(positional.as_bytes(), &p, &opts).unwrap();
    assert_eq!(r.columns()[0], "taxsimid");
    assert_eq!(r.get(0, "year"), Some(Number::Int(1980)));
}
