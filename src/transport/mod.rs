//! Moving payloads to the TAXSIM service and results back.
//!
//! The request core only knows the [`Transport`] trait. Implementations:
//!
//! - [`FtpTransport`] - anonymous FTP drop (feature `ftp`)
//! - [`SshTransport`] - remote execution through the system `ssh` client (feature `ssh`)
//! - [`FakeTransport`] - in-memory, for tests
//!
//! ## Error Handling
//!
//! Transports return [`TransportError`], categorized by [`TransportErrorKind`]:
//! - `Unavailable` - the service or local client could not be reached
//! - `Timeout` / `Cancelled` - the [`Deadline`] stopped the wait
//! - `Remote` - the service reported a failure
//!
//! Nothing is retried automatically. Callers who know their requests are safe
//! to repeat can wrap them in [`retry_with_backoff`].

pub mod fake;
pub mod helpers;
pub mod traits;

#[cfg_attr(docsrs, doc(cfg(feature = "ftp")))]
#[cfg(feature = "ftp")]
pub mod ftp;

#[cfg_attr(docsrs, doc(cfg(feature = "ssh")))]
#[cfg(feature = "ssh")]
pub mod ssh;

pub use fake::{FakeBehavior, FakeTransport};
pub use helpers::{CancelToken, Deadline, RetryConfig, job_name, retry_with_backoff};
pub use traits::*;

#[cfg(feature = "ftp")]
pub use ftp::FtpTransport;

#[cfg(feature = "ssh")]
pub use ssh::SshTransport;
