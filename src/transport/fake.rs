//! In-memory transport for testing.
//!
//! [`FakeTransport`] never touches the network. It records every payload it is
//! given and answers according to a scripted [`FakeBehavior`], which makes it
//! easy to exercise the success path, transport failures and timeouts.

use crate::transport::helpers::Deadline;
use crate::transport::traits::{JobHandle, Transport, TransportError, TransportResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Responder = Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// How a [`FakeTransport`] answers.
#[derive(Clone)]
pub enum FakeBehavior {
    /// Compute the response from the payload once `polls` polls have passed.
    Respond { responder: Responder, polls: u32 },
    /// Refuse the upload.
    FailSend(TransportError),
    /// Accept the upload, then fail while waiting.
    FailAwait(TransportError),
    /// Accept the upload and never produce a result.
    Hang,
}

#[derive(Clone)]
pub struct FakeTransport {
    behavior: FakeBehavior,
    pending: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    next_id: Arc<AtomicU64>,
}

impl FakeTransport {
    #[must_use]
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            pending: Arc::new(Mutex::new(HashMap::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Answer every payload with `responder(payload)` immediately.
    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        Self::new(FakeBehavior::Respond {
            responder: Arc::new(responder),
            polls: 0,
        })
    }

    /// Answer with `responder(payload)` after `polls` unsuccessful polls.
    pub fn responding_after<F>(polls: u32, responder: F) -> Self
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        Self::new(FakeBehavior::Respond {
            responder: Arc::new(responder),
            polls,
        })
    }

    /// Payloads received so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the mutex protecting the log is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }

    #[must_use]
    pub fn send_count(&self) -> usize {
        self.sent().len()
    }
}

impl Transport for FakeTransport {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn send(&self, payload: &[u8]) -> TransportResult<JobHandle> {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push(payload.to_vec());
        if let FakeBehavior::FailSend(err) = &self.behavior {
            return Err(err.clone());
        }
        let id = format!("fake-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pending
            .lock()
            .expect("pending mutex poisoned")
            .insert(id.clone(), payload.to_vec());
        Ok(JobHandle::new(id))
    }

    fn await_completion(&self, job: JobHandle, deadline: &Deadline) -> TransportResult<Vec<u8>> {
        let payload = self
            .pending
            .lock()
            .expect("pending mutex poisoned")
            .remove(job.id())
            .ok_or_else(|| TransportError::remote(format!("unknown job {job}")))?;

        match &self.behavior {
            FakeBehavior::Respond { responder, polls } => {
                let mut remaining = *polls;
                deadline.poll(|| {
                    if remaining == 0 {
                        Ok(Some(responder(&payload)))
                    } else {
                        remaining -= 1;
                        Ok(None)
                    }
                })
            }
            FakeBehavior::FailAwait(err) => {
                deadline.check()?;
                Err(err.clone())
            }
            FakeBehavior::Hang => deadline.poll(|| Ok(None)),
            FakeBehavior::FailSend(err) => Err(err.clone()),
        }
    }
}
