//! SSH remote-execution transport.
//!
//! Runs the system `ssh` client against the service host. The payload is
//! streamed to the remote command's stdin and the result is read from its
//! stdout. The child is killed if the deadline passes or the request is
//! cancelled.

use crate::config::SshConfig;
use crate::transport::helpers::{Deadline, job_name};
use crate::transport::traits::{
    JobHandle, Transport, TransportError, TransportErrorKind, TransportResult,
};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info, warn};

struct SshJob {
    child: Child,
    stdout: Receiver<std::io::Result<Vec<u8>>>,
    stderr: Receiver<std::io::Result<Vec<u8>>>,
}

pub struct SshTransport {
    config: SshConfig,
    jobs: Mutex<HashMap<String, SshJob>>,
}

impl SshTransport {
    #[must_use]
    pub fn new(config: SshConfig) -> Self {
        Self {
            config,
            jobs: Mutex::new(HashMap::new()),
        }
    }

    fn take_job(&self, job: &JobHandle) -> TransportResult<SshJob> {
        self.jobs
            .lock()
            .map_err(|_| TransportError::remote("job table poisoned"))?
            .remove(job.id())
            .ok_or_else(|| TransportError::remote(format!("unknown job {job}")))
    }
}

/// Drain a pipe on its own thread so the child never blocks on a full buffer.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> Receiver<std::io::Result<Vec<u8>>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let res = pipe.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(res);
    });
    rx
}

impl Transport for SshTransport {
    fn name(&self) -> &'static str {
        "ssh"
    }

    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle> {
        let args = self.config.args();
        debug!(program = %self.config.program, ?args, "spawning ssh");
        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TransportError::unavailable(format!("cannot start {}: {e}", self.config.program))
            })?;

        let (Some(mut stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let _ = child.kill();
            return Err(TransportError::unavailable("ssh pipes unavailable"));
        };

        let body = payload.to_vec();
        let bytes = body.len();
        thread::spawn(move || {
            // Dropping stdin at the end signals EOF to the remote command.
            if let Err(e) = stdin.write_all(&body) {
                warn!(error = %e, "writing payload to ssh failed");
            }
        });

        let id = job_name();
        let job = SshJob {
            child,
            stdout: drain(stdout),
            stderr: drain(stderr),
        };
        self.jobs
            .lock()
            .map_err(|_| TransportError::remote("job table poisoned"))?
            .insert(id.clone(), job);
        info!(host = %self.config.host, job = %id, bytes, "streamed payload over ssh");
        Ok(JobHandle::new(id))
    }

    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>> {
        let mut state = self.take_job(&job)?;

        let waited = deadline.poll(|| {
            state
                .child
                .try_wait()
                .map_err(|e| TransportError::remote(format!("waiting for ssh: {e}")))
        });
        let status = match waited {
            Ok(status) => status,
            Err(e) => {
                let _ = state.child.kill();
                let _ = state.child.wait();
                return Err(e);
            }
        };

        let read = |rx: &Receiver<std::io::Result<Vec<u8>>>| -> TransportResult<Vec<u8>> {
            rx.recv()
                .map_err(|_| TransportError::remote("ssh output reader vanished"))?
                .map_err(|e| TransportError::remote(format!("reading ssh output: {e}")))
        };
        let stdout = read(&state.stdout)?;
        let stderr = read(&state.stderr)?;

        if status.success() {
            return Ok(stdout);
        }
        let message = String::from_utf8_lossy(&stderr).trim().to_string();
        // ssh itself exits with 255 when the connection cannot be made.
        let kind = if status.code() == Some(255) {
            TransportErrorKind::Unavailable
        } else {
            TransportErrorKind::Remote
        };
        Err(TransportError::new(
            kind,
            format!("ssh exited with {status}: {message}"),
        ))
    }
}
