//! Tests for payload encoding.

use taxsim::encode::encode;
use taxsim::*;

fn validated(rows: Vec<Observation>) -> ValidatedTable {
    ObservationTable::from(rows).validate().unwrap()
}

#[test]
fn test_sample_row_layout() {
    let t = validated(vec![
        Observation::new()
            .with("year", 1980)
            .with("state", 5)
            .with("mstat", 2)
            .with("ltcg", 100_000),
    ]);
    let p = encode(&t, &RequestOptions::default());
    assert_eq!(
        p.as_text(),
        "taxsimid,year,state,mstat,ltcg,idtl\n1,1980,5,2,100000,0\n"
    );
    assert!(p.state_supplied);
}

#[test]
fn test_absent_columns_are_zero_filled() {
    let t = validated(vec![
        Observation::new().with("year", 1980).with("pwages", 1000),
        Observation::new().with("year", 1981).with("swages", 2000),
    ]);
    let p = encode(&t, &RequestOptions::default());
    let lines: Vec<String> = p.as_text().lines().map(str::to_string).collect();
    assert_eq!(lines[0], "taxsimid,year,pwages,swages,idtl");
    assert_eq!(lines[1], "1,1980,1000,0,0");
    assert_eq!(lines[2], "2,1981,0,2000,0");
}

#[test]
fn test_full_sets_idtl() {
    let t = validated(vec![Observation::new().with("year", 1980)]);
    let p = encode(&t, &RequestOptions::default().with_full(true));
    assert!(p.as_text().ends_with(",2\n"));
    assert!(!p.state_supplied);
}

#[test]
fn test_caller_taxsimid_is_replaced_by_emission_index() {
    let t = validated(vec![
        Observation::new().with("taxsimid", 900).with("year", 1980),
        Observation::new().with("taxsimid", 901).with("year", 1981),
    ]);
    let p = encode(&t, &RequestOptions::default());
    let text = p.as_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "taxsimid,year,idtl");
    assert_eq!(lines[1], "1,1980,0");
    assert_eq!(lines[2], "2,1981,0");
    assert_eq!(p.row_map.caller_id(1), Some(Number::Int(901)));
}

#[test]
fn test_zero_state_everywhere_is_not_supplied() {
    let t = validated(vec![
        Observation::new().with("year", 1980).with("state", 0),
        Observation::new().with("year", 1981).with("state", 0.0),
    ]);
    assert!(!encode(&t, &RequestOptions::default()).state_supplied);
}
