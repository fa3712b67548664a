//! Request options and service configuration.
//!
//! [`RequestOptions`] is per request: which transport to use, how much output
//! to ask for and how long to wait. [`ServiceConfig`] says where the service
//! lives; its defaults point at the public NBER endpoints and can be replaced
//! from a JSON file or environment variables.

use crate::transport::CancelToken;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Transport used to reach the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Connection {
    /// Anonymous FTP drop: upload a file, then fetch the result file.
    #[default]
    Ftp,
    /// Remote execution over SSH: payload on stdin, result on stdout.
    Ssh,
}

impl std::str::FromStr for Connection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "FTP" => Ok(Self::Ftp),
            "SSH" => Ok(Self::Ssh),
            other => Err(format!("unknown connection '{other}', expected FTP or SSH")),
        }
    }
}

/// Options for a single request.
///
/// # Example
///
/// ```
/// use taxsim::{Connection, RequestOptions};
///
/// let opts = RequestOptions::default()
///     .with_connection(Connection::Ssh)
///     .with_full(true)
///     .with_long_names(true);
/// assert!(opts.full);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    pub connection: Connection,
    /// Request `v1`..`v42` instead of `v1`..`v9`.
    pub full: bool,
    /// Name output columns with their long TAXSIM names.
    pub long_names: bool,
    /// Upper bound on waiting for the result.
    pub timeout_secs: u64,
    /// Delay between polls for a result that is not ready yet.
    pub poll_interval_ms: u64,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            connection: Connection::Ftp,
            full: false,
            long_names: false,
            timeout_secs: 300,
            poll_interval_ms: 2000,
            cancel: None,
        }
    }
}

impl RequestOptions {
    #[must_use]
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = connection;
        self
    }

    #[must_use]
    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    #[must_use]
    pub fn with_long_names(mut self, long_names: bool) -> Self {
        self.long_names = long_names;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Attach a token that aborts the wait when cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The wait bound, never shorter than one second.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The `idtl` value sent to the service.
    #[must_use]
    pub fn idtl(&self) -> u8 {
        if self.full { 2 } else { 0 }
    }
}

// ============================================================================
// Service endpoints
// ============================================================================

/// FTP endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Remote directory payloads are dropped into.
    pub directory: String,
    /// Appended to the job name to form the result file name.
    pub result_suffix: String,
    /// Bounds connecting, logging in and uploading.
    pub connect_timeout_secs: u64,
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            host: "taxsimftp.nber.org".to_string(),
            port: 21,
            user: "taxsim".to_string(),
            password: "02138".to_string(),
            directory: "tmp".to_string(),
            result_suffix: ".txm32".to_string(),
            connect_timeout_secs: 20,
        }
    }
}

/// SSH endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// The ssh client binary.
    pub program: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub connect_timeout_secs: u64,
    pub strict_host_key_checking: bool,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: "ssh".to_string(),
            host: "taxsimssh.nber.org".to_string(),
            port: 22,
            user: "taxsimssh".to_string(),
            connect_timeout_secs: 20,
            strict_host_key_checking: false,
        }
    }
}

impl SshConfig {
    /// Arguments passed to the ssh client.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        let strict = if self.strict_host_key_checking { "yes" } else { "no" };
        vec![
            "-T".to_string(),
            "-p".to_string(),
            self.port.to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout_secs),
            "-o".to_string(),
            format!("StrictHostKeyChecking={strict}"),
            format!("{}@{}", self.user, self.host),
        ]
    }
}

/// Where the service lives, per transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub ftp: FtpConfig,
    pub ssh: SshConfig,
}

impl ServiceConfig {
    /// Load from a JSON file. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parse {}", path.display()))
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `TAXSIM_*` overrides looked up through `lookup`.
    ///
    /// Recognized keys: `TAXSIM_FTP_HOST`, `TAXSIM_FTP_USER`,
    /// `TAXSIM_FTP_PASSWORD`, `TAXSIM_SSH_HOST`, `TAXSIM_SSH_USER`.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.is_empty()) {
                *target = v;
            }
        };
        set(&mut self.ftp.host, "TAXSIM_FTP_HOST");
        set(&mut self.ftp.user, "TAXSIM_FTP_USER");
        set(&mut self.ftp.password, "TAXSIM_FTP_PASSWORD");
        set(&mut self.ssh.host, "TAXSIM_SSH_HOST");
        set(&mut self.ssh.user, "TAXSIM_SSH_USER");
        self
    }
}
