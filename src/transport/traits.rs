//! The transport contract the request core depends on.
//!
//! A transport moves one payload to the service and brings one response back.
//! The interface is synchronous; implementations block for network I/O and
//! must honor the [`Deadline`] they are given while waiting.

use crate::transport::helpers::Deadline;
use std::error::Error;
use std::fmt;

// ============================================================================
// Core Error Type
// ============================================================================

/// Error raised by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The service or the local client could not be reached or started.
    Unavailable,
    /// The deadline passed before a result arrived.
    Timeout,
    /// The service answered with an error.
    Remote,
    /// The caller cancelled the wait.
    Cancelled,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for TransportError {}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unavailable, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Remote, message)
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

// ============================================================================
// Jobs
// ============================================================================

/// Identifies a submitted payload until its result is collected.
///
/// Handles are not `Clone`: a job's result is collected at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct JobHandle {
    id: String,
}

impl JobHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Send a payload to the service and wait for its response.
pub trait Transport: Send + Sync {
    /// Short name used in logs (`"ftp"`, `"ssh"`, ...).
    fn name(&self) -> &'static str;

    /// Submit a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot be reached or refuses the upload.
    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle>;

    /// Block until the job's response is available and return it.
    ///
    /// # Errors
    ///
    /// Returns [`TransportErrorKind::Timeout`] or
    /// [`TransportErrorKind::Cancelled`] when `deadline` says to stop waiting,
    /// and other kinds when the transfer or the service fails.
    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle> {
        (**self).send(payload)
    }

    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>> {
        (**self).await_completion(job, deadline)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle> {
        (**self).send(payload)
    }

    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>> {
        (**self).await_completion(job, deadline)
    }
}
