//! Reading observation files and writing result files.

use std::fs;
use taxsim::testing::*;
use taxsim::*;

#[test]
fn test_read_observations_csv() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.csv");
    fs::write(&path, "year,state,mstat,pwages\n1980,5,2,30000\n1985, 6 ,1,1234.5\n")?;

    let table = read_observations_csv(&path)?;
    assert_eq!(table.len(), 2);
    assert_eq!(table.rows()[0].get("year"), Some(&Cell::Int(1980)));
    assert_eq!(table.rows()[1].get("state"), Some(&Cell::Int(6)));
    assert_eq!(table.rows()[1].get("pwages"), Some(&Cell::Float(1234.5)));

    let validated = table.validate()?;
    assert_eq!(validated.len(), 2);
    Ok(())
}

#[test]
fn test_blank_field_is_reported_by_validation() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("input.csv");
    fs::write(&path, "year,state\n1980,5\n1981,\n")?;

    let table = read_observations_csv(&path)?;
    let err = table.validate().unwrap_err();
    assert_eq!(err.non_numeric_cells(), vec![(1, "state")]);
    Ok(())
}

#[test]
fn test_missing_file_mentions_path() {
    let err = read_observations_csv("/nonexistent/taxsim/input.csv").unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/taxsim/input.csv"));
}

#[test]
fn test_write_results_csv() -> anyhow::Result<()> {
    let client = TaxsimClient::default().with_transport(fake_service());
    let result = client.run(&sample_household_table(), &RequestOptions::default())?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("out").join("results.csv");
    let n = write_results_csv(&path, &result)?;
    assert_eq!(n, 3);

    let text = fs::read_to_string(&path)?;
    let mut lines = text.lines();
    assert_eq!(
        lines.next(),
        Some("taxsimid,year,state,fiitax,siitax,fica,frate,srate,ficar")
    );
    assert!(lines.next().is_some_and(|l| l.starts_with("0,2000,33,")));
    assert_eq!(text.lines().count(), 4);
    Ok(())
}
