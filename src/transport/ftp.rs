//! FTP drop transport.
//!
//! The payload is uploaded into the service's drop directory under a unique
//! job name; the service writes its answer next to it as
//! `<job><result_suffix>`, which is polled for and downloaded.
//!
//! Every session runs on a worker thread and the caller waits on it through
//! the [`Deadline`], so a server that stops talking cannot hold the request
//! past its timeout. Control-socket timeouts are reset from the deadline
//! before each command so the worker gives up as well.

use crate::config::FtpConfig;
use crate::transport::helpers::{Deadline, job_name};
use crate::transport::traits::{
    JobHandle, Transport, TransportError, TransportErrorKind, TransportResult,
};
use std::io::{self, Cursor};
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use suppaftp::{FtpError, FtpStream, Status};
use tracing::{debug, info};

/// Shortest socket timeout handed to the OS; zero means "block forever" there.
const MIN_IO_TIMEOUT: Duration = Duration::from_millis(1);

/// Upload polling granularity while waiting on the worker.
const SEND_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct FtpTransport {
    config: FtpConfig,
}

impl FtpTransport {
    #[must_use]
    pub fn new(config: FtpConfig) -> Self {
        Self { config }
    }
}

fn io_timeout(deadline: &Deadline) -> Duration {
    deadline.remaining().max(MIN_IO_TIMEOUT)
}

fn resolve(config: &FtpConfig) -> TransportResult<SocketAddr> {
    (config.host.as_str(), config.port)
        .to_socket_addrs()
        .map_err(|e| TransportError::unavailable(format!("resolve {}: {e}", config.host)))?
        .next()
        .ok_or_else(|| TransportError::unavailable(format!("no address for {}", config.host)))
}

/// Bound the control socket's reads and writes by what is left of `deadline`.
fn arm(ftp: &FtpStream, deadline: &Deadline) -> TransportResult<()> {
    let t = Some(io_timeout(deadline));
    let stream = ftp.get_ref();
    stream
        .set_read_timeout(t)
        .and_then(|()| stream.set_write_timeout(t))
        .map_err(|e| map_error(FtpError::ConnectionError(e)))
}

/// Connect, log in and change into the drop directory.
fn session(config: &FtpConfig, deadline: &Deadline) -> TransportResult<FtpStream> {
    let addr = resolve(config)?;
    let mut ftp = FtpStream::connect_timeout(addr, io_timeout(deadline)).map_err(map_error)?;
    arm(&ftp, deadline)?;
    ftp.login(&config.user, &config.password).map_err(map_error)?;
    if !config.directory.is_empty() {
        arm(&ftp, deadline)?;
        ftp.cwd(&config.directory).map_err(map_error)?;
    }
    Ok(ftp)
}

/// Run `work` on its own thread and wait for it no longer than `deadline`.
fn bounded<T, F>(deadline: &Deadline, wait: Duration, work: F) -> TransportResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> TransportResult<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(work());
    });
    loop {
        deadline.check()?;
        match rx.recv_timeout(wait.min(deadline.remaining()).max(MIN_IO_TIMEOUT)) {
            Ok(res) => return res,
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                return Err(TransportError::remote("ftp worker exited without a result"));
            }
        }
    }
}

impl Transport for FtpTransport {
    fn name(&self) -> &'static str {
        "ftp"
    }

    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle> {
        let name = job_name();
        let deadline = Deadline::after(
            Duration::from_secs(self.config.connect_timeout_secs.max(1)),
            SEND_POLL,
        );
        let config = self.config.clone();
        let body = payload.to_vec();
        let file = name.clone();
        let worker_deadline = deadline.clone();

        let written = bounded(&deadline, SEND_POLL, move || {
            let mut ftp = session(&config, &worker_deadline)?;
            arm(&ftp, &worker_deadline)?;
            let written = ftp
                .put_file(&file, &mut Cursor::new(body))
                .map_err(map_error)?;
            let _ = ftp.quit();
            Ok(written)
        })?;
        info!(host = %self.config.host, job = %name, bytes = written, "uploaded payload");
        Ok(JobHandle::new(name))
    }

    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>> {
        deadline.check()?;
        let result_file = format!("{}{}", job.id(), self.config.result_suffix);
        let config = self.config.clone();
        let worker_deadline = deadline.clone();

        bounded(deadline, deadline.poll_interval(), move || {
            let mut ftp = session(&config, &worker_deadline)?;
            let body = worker_deadline.poll(|| {
                arm(&ftp, &worker_deadline)?;
                match ftp.retr_as_buffer(&result_file) {
                    Ok(cursor) => Ok(Some(cursor.into_inner())),
                    Err(FtpError::UnexpectedResponse(resp))
                        if resp.status == Status::FileUnavailable =>
                    {
                        debug!(file = %result_file, "result not ready");
                        Ok(None)
                    }
                    Err(e) => Err(map_error(e)),
                }
            });
            let _ = ftp.quit();
            body
        })
    }
}

fn map_error(e: FtpError) -> TransportError {
    match e {
        FtpError::ConnectionError(io)
            if matches!(io.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
        {
            TransportError::new(TransportErrorKind::Timeout, format!("ftp stalled: {io}"))
        }
        FtpError::ConnectionError(io) => TransportError::unavailable(io.to_string()),
        other => TransportError::remote(other.to_string()),
    }
}
