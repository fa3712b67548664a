//! # taxsim
//!
//! A client for the NBER **Internet TAXSIM 32** tax calculator. Hand it a table
//! of tax filing scenarios; it checks the table against the TAXSIM variable
//! list, uploads it over FTP or SSH, waits for the service and returns the
//! computed taxes as a typed table aligned row-for-row with the input.
//!
//! ## Key Features
//!
//! - **Strict validation** - unknown column names (typos, case errors) and
//!   blank or non-numeric cells are rejected before anything is sent
//! - **Explicit defaults** - variables a row does not mention are sent as `0`,
//!   the service's own default
//! - **Order-preserving** - results come back in input order even if the
//!   service reorders them
//! - **Two transports** - anonymous FTP drop or SSH remote execution, behind
//!   one small [`Transport`] trait
//! - **Bounded waits** - timeouts and cancellation with all-or-nothing results
//! - **Typed errors** - bad input, transport failures and unusable responses are
//!   distinct [`TaxsimError`] variants
//!
//! ## Quick Start
//!
//! ```no_run
//! use taxsim::*;
//!
//! # fn main() -> Result<(), TaxsimError> {
//! let table = ObservationTable::from(vec![
//!     Observation::new()
//!         .with("year", 1980)
//!         .with("state", 5)
//!         .with("mstat", 2)
//!         .with("ltcg", 100000),
//! ]);
//!
//! // v1..v9 with abbreviated names over FTP
//! let basic = taxsim32(&table, &RequestOptions::default())?;
//! assert_eq!(basic.columns()[3], "fiitax");
//!
//! // v1..v42 with long names over SSH
//! let opts = RequestOptions::default()
//!     .with_connection(Connection::Ssh)
//!     .with_full(true)
//!     .with_long_names(true);
//! let full = taxsim32(&table, &opts)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Output Shape
//!
//! - `full = false` - `taxsimid, year, state, fiitax, siitax, fica, frate, srate, ficar`
//! - `full = true` - `v1`..`v42`; `v30`..`v42` only when the input has a
//!   `state` column that is nonzero somewhere
//! - `taxsimid` in the output is the caller's own `taxsimid`, or `0`
//!
//! Integer columns stay integers (`year`, `state`); all others are floats.
//!
//! ## Testing Without the Network
//!
//! ```
//! use taxsim::*;
//! use taxsim::testing::*;
//!
//! let client = TaxsimClient::default().with_transport(fake_service());
//! let result = client.run(&sample_observation_table(), &RequestOptions::default()).unwrap();
//! assert_eq!(result.get(0, "year"), Some(Number::Int(1980)));
//! ```
//!
//! ## Feature Flags
//!
//! - `ftp` - FTP transport (via `suppaftp`)
//! - `ssh` - SSH transport (via the system `ssh` client)
//! - `parallel` - run independent requests concurrently in [`TaxsimClient::run_many`]
//!
//! ## Module Overview
//!
//! - [`vocabulary`] - input and output variable names
//! - [`table`] - observation and result tables
//! - [`validation`] - input checks
//! - [`encode`] / [`decode`] - payload and response formats
//! - [`transport`] - the transport trait, FTP/SSH/fake implementations, deadlines, retry
//! - [`client`] - end-to-end requests
//! - [`io`] - CSV files
//! - [`testing`] - fixtures and a synthetic server

pub mod client;
pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod io;
pub mod table;
pub mod testing;
pub mod transport;
pub mod validation;
pub mod vocabulary;

pub use client::{TaxsimClient, execute, taxsim32};
pub use config::{Connection, FtpConfig, RequestOptions, ServiceConfig, SshConfig};
pub use error::{DecodeError, TaxsimError};
pub use io::{read_observations_csv, write_results_csv};
pub use table::{Cell, ColumnKind, Number, Observation, ObservationTable, ResultTable};
pub use transport::{
    CancelToken, Deadline, JobHandle, RetryConfig, Transport, TransportError, TransportErrorKind,
    retry_with_backoff,
};
pub use validation::{ValidatedTable, ValidationError, ValidationErrors};
pub use vocabulary::InputVariable;
