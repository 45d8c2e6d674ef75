//! Serialized access to a session from async code.
//!
//! One worker task owns the session. Every operation is sent to it over an
//! unbounded channel at the moment it is submitted, and the worker runs them
//! one at a time, in send order, on tokio's blocking pool. Results come back
//! over a oneshot channel, so the order in which callers await their futures
//! does not affect the order operations reach the device.
//!
//! Cancellation is cooperative. [`SessionScheduler::cancel_all`] drops every
//! operation submitted before it that has not started yet, and
//! [`SessionScheduler::shutdown`] additionally refuses new ones and hands the
//! session back. An operation that already reached the device always runs to
//! completion.

use crate::capabilities::CapabilityRecord;
use crate::capture::CaptureArtifact;
use crate::driver::DeviceHandle;
use crate::errors::{CameraError, Result};
use crate::session::CameraSession;
use crate::settings::{ConfigNode, GenericValue};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// A queued operation. `None` means it was cancelled and must only report so.
type Job<H> = Box<dyn FnOnce(Option<&mut CameraSession<H>>) + Send>;

enum Message<H: DeviceHandle> {
    Run { ticket: u64, job: Job<H> },
    Shutdown(oneshot::Sender<Option<CameraSession<H>>>),
}

pub struct SessionScheduler<H: DeviceHandle> {
    sender: mpsc::UnboundedSender<Message<H>>,
    generation: Arc<AtomicU64>,
    shut_down: Arc<AtomicBool>,
}

impl<H: DeviceHandle> Clone for SessionScheduler<H> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            generation: Arc::clone(&self.generation),
            shut_down: Arc::clone(&self.shut_down),
        }
    }
}

impl<H> SessionScheduler<H>
where
    H: DeviceHandle + Send + 'static,
{
    /// Start the worker on the current tokio runtime.
    pub fn new(session: CameraSession<H>) -> Result<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CameraError::Scheduler(format!("No tokio runtime: {}", e)))?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let generation = Arc::new(AtomicU64::new(0));
        runtime.spawn(worker(session, receiver, Arc::clone(&generation)));

        Ok(Self {
            sender,
            generation,
            shut_down: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    /// Queue `op` behind every operation submitted before this call and run
    /// it on the blocking pool. `Ok(None)` means it was cancelled before it
    /// started.
    pub fn run<F, T>(&self, op: F) -> impl Future<Output = Result<Option<T>>> + Send + 'static
    where
        F: FnOnce(&mut CameraSession<H>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply, result) = oneshot::channel();
        let job: Job<H> = Box::new(move |session: Option<&mut CameraSession<H>>| {
            let outcome = match session {
                Some(session) => op(session).map(Some),
                None => Ok(None),
            };
            let _ = reply.send(outcome);
        });

        let queued = !self.is_shut_down()
            && self
                .sender
                .send(Message::Run {
                    ticket: self.generation.load(Ordering::SeqCst),
                    job,
                })
                .is_ok();

        async move {
            if !queued {
                return Ok(None);
            }
            result.await.map_err(|_| {
                CameraError::Scheduler("Camera operation ended without a result".to_string())
            })?
        }
    }

    /// Drop every queued operation that has not started.
    pub fn cancel_all(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!(
            "Cancelled pending camera operations (generation {})",
            generation
        );
    }

    /// Cancel pending work, wait for the running operation, then take the
    /// session out. Later operations resolve to `Ok(None)`; only the first
    /// call returns the session.
    pub async fn shutdown(&self) -> Option<CameraSession<H>> {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return None;
        }
        self.cancel_all();

        let (reply, session) = oneshot::channel();
        if self.sender.send(Message::Shutdown(reply)).is_err() {
            return None;
        }
        let session = session.await.ok().flatten();
        log::info!("Camera scheduler shut down");
        session
    }

    pub fn config_tree(&self) -> impl Future<Output = Result<Option<ConfigNode>>> + Send + 'static {
        self.run(|session| session.config_tree())
    }

    pub fn set_config_value(
        &self,
        name: &str,
        value: impl Into<GenericValue>,
    ) -> impl Future<Output = Result<Option<()>>> + Send + 'static {
        let name = name.to_string();
        let value = value.into();
        self.run(move |session| session.set_config_value(&name, value))
    }

    pub fn capture_preview(
        &self,
    ) -> impl Future<Output = Result<Option<CaptureArtifact<'static>>>> + Send + 'static {
        self.run(|session| {
            session
                .capture_preview()
                .map(CaptureArtifact::into_owned)
        })
    }

    pub fn capture_image(
        &self,
    ) -> impl Future<Output = Result<Option<CaptureArtifact<'static>>>> + Send + 'static {
        self.run(|session| session.capture_image().map(CaptureArtifact::into_owned))
    }

    pub fn consume_events(&self) -> impl Future<Output = Result<Option<bool>>> + Send + 'static {
        self.run(|session| session.consume_events())
    }

    pub fn supported_ops(
        &self,
    ) -> impl Future<Output = Result<Option<CapabilityRecord>>> + Send + 'static {
        self.run(|session| session.supported_ops())
    }
}

async fn worker<H>(
    session: CameraSession<H>,
    mut receiver: mpsc::UnboundedReceiver<Message<H>>,
    generation: Arc<AtomicU64>,
) where
    H: DeviceHandle + Send + 'static,
{
    let mut session = Some(session);

    while let Some(message) = receiver.recv().await {
        match message {
            Message::Run { ticket, job } => {
                if generation.load(Ordering::SeqCst) != ticket {
                    log::debug!("Dropping cancelled camera operation");
                    job(None);
                    continue;
                }
                let Some(mut current) = session.take() else {
                    job(None);
                    continue;
                };

                let finished = tokio::task::spawn_blocking(move || {
                    job(Some(&mut current));
                    current
                })
                .await;
                match finished {
                    Ok(current) => session = Some(current),
                    Err(e) => {
                        log::error!("Camera operation failed to complete, session lost: {}", e)
                    }
                }
            }
            Message::Shutdown(reply) => {
                let _ = reply.send(session.take());
                break;
            }
        }
    }
    log::debug!("Camera scheduler worker stopped");
}
