//! Error taxonomy for a TAXSIM request.
//!
//! A request can fail in three distinct ways and callers are expected to tell
//! them apart:
//!
//! - [`TaxsimError::Validation`] - the input table was rejected before any
//!   network activity
//! - [`TaxsimError::Transport`] - the transfer failed, timed out or was cancelled
//! - [`TaxsimError::Decode`] - the service answered with something that does
//!   not match the request

use crate::transport::{TransportError, TransportErrorKind};
use crate::validation::ValidationErrors;
use std::error::Error;
use std::fmt;

/// The service response could not be turned into a result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Unparseable text, unexpected width or row identities that do not match
    /// the rows sent.
    MalformedResponse { reason: String },
    /// Fewer rows came back than were sent.
    PartialResponse { expected: usize, received: usize },
}

impl DecodeError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Number of rows missing from a partial response.
    #[must_use]
    pub fn missing_rows(&self) -> Option<usize> {
        match self {
            Self::PartialResponse { expected, received } => Some(expected - received),
            Self::MalformedResponse { .. } => None,
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedResponse { reason } => write!(f, "malformed response: {reason}"),
            Self::PartialResponse { expected, received } => write!(
                f,
                "partial response: {} of {expected} rows missing",
                expected - received
            ),
        }
    }
}

impl Error for DecodeError {}

/// Any failure of a TAXSIM request.
#[derive(Debug, Clone)]
pub enum TaxsimError {
    Validation(ValidationErrors),
    Transport(TransportError),
    Decode(DecodeError),
}

impl TaxsimError {
    /// The transport error kind, if this is a transport failure.
    #[must_use]
    pub fn transport_kind(&self) -> Option<&TransportErrorKind> {
        match self {
            Self::Transport(e) => Some(&e.kind),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.transport_kind(), Some(TransportErrorKind::Timeout))
    }
}

impl fmt::Display for TaxsimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "invalid input: {e}"),
            Self::Transport(e) => write!(f, "transport failed: {e}"),
            Self::Decode(e) => write!(f, "could not decode response: {e}"),
        }
    }
}

impl Error for TaxsimError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(e) => Some(e),
            Self::Transport(e) => Some(e),
            Self::Decode(e) => Some(e),
        }
    }
}

impl From<ValidationErrors> for TaxsimError {
    fn from(e: ValidationErrors) -> Self {
        Self::Validation(e)
    }
}

impl From<TransportError> for TaxsimError {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<DecodeError> for TaxsimError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

pub type Result<T> = std::result::Result<T, TaxsimError>;
