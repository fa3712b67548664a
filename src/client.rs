//! Running a request end to end.
//!
//! [`TaxsimClient`] wires the stages together:
//!
//! 1. [`validate`](crate::validation::validate) the table (no network activity on failure)
//! 2. [`encode`] it into a payload
//! 3. send it through a [`Transport`] and wait, bounded by a [`Deadline`]
//! 4. [`decode`] the response into a [`ResultTable`]
//!
//! Every stage either succeeds completely or fails the whole request; a
//! partially decoded table is never returned.

use crate::config::{Connection, RequestOptions, ServiceConfig};
use crate::decode::decode;
use crate::encode::encode;
use crate::error::{Result, TaxsimError};
use crate::table::{ObservationTable, ResultTable};
use crate::transport::{Deadline, Transport, TransportError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Runs TAXSIM requests against a configured service.
///
/// # Example
///
/// ```no_run
/// use taxsim::{Observation, ObservationTable, RequestOptions, TaxsimClient};
///
/// # fn main() -> Result<(), taxsim::TaxsimError> {
/// let table = ObservationTable::from(vec![
///     Observation::new()
///         .with("year", 1980)
///         .with("state", 5)
///         .with("mstat", 2)
///         .with("ltcg", 100000),
/// ]);
/// let client = TaxsimClient::from_env();
/// let result = client.run(&table, &RequestOptions::default())?;
/// assert_eq!(result.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Default)]
pub struct TaxsimClient {
    config: ServiceConfig,
    transport: Option<Arc<dyn Transport>>,
}

impl TaxsimClient {
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Client for the default endpoints with `TAXSIM_*` environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    /// Use `transport` for every request, whatever the requested connection.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The transport used for `connection`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` when support for `connection` was not compiled in.
    pub fn transport_for(&self, connection: Connection) -> Result<Arc<dyn Transport>> {
        if let Some(t) = &self.transport {
            return Ok(Arc::clone(t));
        }
        match connection {
            #[cfg(feature = "ftp")]
            Connection::Ftp => Ok(Arc::new(crate::transport::FtpTransport::new(
                self.config.ftp.clone(),
            ))),
            #[cfg(feature = "ssh")]
            Connection::Ssh => Ok(Arc::new(crate::transport::SshTransport::new(
                self.config.ssh.clone(),
            ))),
            #[allow(unreachable_patterns)]
            other => Err(TransportError::unavailable(format!(
                "{other:?} support is not enabled in this build"
            ))
            .into()),
        }
    }

    /// Run one request.
    ///
    /// # Errors
    ///
    /// Returns [`TaxsimError::Validation`] before any network activity when the
    /// table is rejected, [`TaxsimError::Transport`] when the transfer fails or
    /// times out, and [`TaxsimError::Decode`] when the response does not fit.
    pub fn run(&self, table: &ObservationTable, options: &RequestOptions) -> Result<ResultTable> {
        let validated = table.validate().inspect_err(|e| {
            warn!(errors = e.errors().len(), error = %e, "input rejected");
        })?;
        let transport = self.transport_for(options.connection)?;
        execute_validated(transport.as_ref(), &validated, options)
    }

    /// Run independent requests, concurrently when the `parallel` feature is on.
    ///
    /// Results are returned in the order of `tables`; one failing request does
    /// not affect the others.
    #[must_use]
    pub fn run_many(
        &self,
        tables: &[ObservationTable],
        options: &RequestOptions,
    ) -> Vec<Result<ResultTable>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            tables.par_iter().map(|t| self.run(t, options)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            tables.iter().map(|t| self.run(t, options)).collect()
        }
    }
}

/// Run one request through an explicit transport.
///
/// # Errors
///
/// See [`TaxsimClient::run`].
pub fn execute(
    transport: &dyn Transport,
    table: &ObservationTable,
    options: &RequestOptions,
) -> Result<ResultTable> {
    let validated = table.validate()?;
    execute_validated(transport, &validated, options)
}

fn execute_validated(
    transport: &dyn Transport,
    table: &crate::validation::ValidatedTable,
    options: &RequestOptions,
) -> Result<ResultTable> {
    let started = Instant::now();
    let payload = encode(table, options);
    info!(
        transport = transport.name(),
        rows = table.len(),
        columns = table.columns().len(),
        full = options.full,
        "submitting request"
    );

    let deadline = Deadline::after(options.timeout(), options.poll_interval())
        .with_cancel(options.cancel.clone());
    let response = transport
        .send(&payload.bytes)
        .and_then(|job| transport.await_completion(job, &deadline))
        .map_err(|e| {
            warn!(transport = transport.name(), error = %e, "transport failed");
            TaxsimError::from(e)
        })?;

    let result = decode(&response, &payload, options).map_err(|e| {
        warn!(bytes = response.len(), error = %e, "response rejected");
        TaxsimError::from(e)
    })?;
    info!(
        rows = result.len(),
        columns = result.columns().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request complete"
    );
    Ok(result)
}

/// Run one request with a client built from the environment.
///
/// This is the crate's main entry point: validate `table`, upload it over
/// `options.connection`, wait for TAXSIM 32 to answer and return its output
/// aligned row-for-row with `table`.
///
/// # Errors
///
/// See [`TaxsimClient::run`].
pub fn taxsim32(table: &ObservationTable, options: &RequestOptions) -> Result<ResultTable> {
    TaxsimClient::from_env().run(table, options)
}
