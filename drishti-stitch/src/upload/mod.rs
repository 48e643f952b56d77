//! Stitch request upload.
//!
//! One request per session: probe the service's health, then submit the
//! metadata and image parts. The whole exchange runs on a worker thread and is
//! bounded by a deadline and a cancel token.
//!
//! ```text
//!   StitchJob ──▶ StitchRequest ──▶ worker: health ─▶ submit
//!                                          │
//!   caller: select! { result | cancel | deadline }
//! ```

mod http;
mod metadata;
mod multipart;
mod service;

pub use http::HttpStitchService;
pub use metadata::{
    HealthStatus, ImagePart, SPHERICAL_CAPTURE, StitchMetadata, StitchRequest, StitchResponse,
};
pub use multipart::MultipartBody;
pub use service::{LocalStitchService, SPHERICAL_CAPABILITY, StitchService};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crossbeam_channel::{Receiver, Sender, after, bounded, select};
use parking_lot::Mutex;

use drishti_capture::StitchJob;

use crate::error::{StitchFailure, UploadError};

/// Cancels an upload from another thread.
///
/// Cancelling drops the token's sender, which wakes every waiter.
#[derive(Clone)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    state: Arc<Mutex<TokenState>>,
    receiver: Receiver<()>,
}

struct TokenState {
    sender: Option<Sender<()>>,
    committed: bool,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded(0);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            state: Arc::new(Mutex::new(TokenState {
                sender: Some(tx),
                committed: false,
            })),
            receiver: rx,
        }
    }

    /// Cancel the token. Waits for a [`commit`](Self::commit) in progress.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        self.cancelled.store(true, Ordering::SeqCst);
        state.sender.take();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Run a side effect that must not happen after cancellation.
    ///
    /// Returns `None` without running `f` if the token is already cancelled.
    /// Once `cancel` returns, a commit has either finished or will never run.
    pub fn commit<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
        let mut state = self.state.lock();
        if self.is_cancelled() {
            return None;
        }
        state.committed = true;
        Some(f())
    }

    /// True once a commit has run.
    pub fn is_committed(&self) -> bool {
        self.state.lock().committed
    }

    fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

/// Submits finished sessions to a stitch service under a deadline.
///
/// At most one stitch worker runs per uploader: a new upload first waits for
/// the worker of an aborted one to exit, and so does drop.
pub struct Uploader {
    service: Arc<dyn StitchService>,
    deadline: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Uploader {
    pub fn new(service: Arc<dyn StitchService>, deadline: Duration) -> Self {
        Self {
            service,
            deadline,
            worker: Mutex::new(None),
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Upload a session and return the output reference.
    ///
    /// A failed health probe aborts before any image data is sent. On timeout
    /// or cancel the worker is told to stop, and nothing is persisted after
    /// this returns an error.
    pub fn upload(&self, job: &StitchJob, cancel: &CancelToken) -> Result<String, UploadError> {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let mut worker = self.worker.lock();
        if let Some(previous) = worker.take() {
            if !previous.is_finished() {
                tracing::info!("Waiting for the previous stitch worker to stop");
            }
            if previous.join().is_err() {
                tracing::error!("Previous stitch worker panicked");
            }
        }

        let request = StitchRequest::from_job(job, unix_millis());
        tracing::info!(
            "Uploading session {} ({} photos, coverage {:.3})",
            job.epoch,
            request.metadata.photo_count,
            job.coverage_ratio
        );

        let started = Instant::now();
        let (result_tx, result_rx) = bounded(1);
        let service = Arc::clone(&self.service);
        let abort = CancelToken::new();
        let worker_abort = abort.clone();

        *worker = Some(
            thread::Builder::new()
                .name("stitch-upload".into())
                .spawn(move || {
                    let result = exchange(service.as_ref(), &request, &worker_abort);
                    // Receiver is gone after a timeout or cancel
                    let _ = result_tx.send(result);
                })?,
        );

        let response = select! {
            recv(result_rx) -> msg => match msg {
                Ok(result) => result,
                Err(_) => Err(UploadError::Network("upload worker exited".to_string())),
            },
            recv(cancel.receiver()) -> _ => stop_worker(&abort, &result_rx, UploadError::Cancelled),
            recv(after(self.deadline)) -> _ => stop_worker(
                &abort,
                &result_rx,
                UploadError::Timeout {
                    after_ms: self.deadline.as_millis() as u64,
                },
            ),
        };

        match response.and_then(into_output_ref) {
            Ok(output_ref) => {
                tracing::info!(
                    "Stitch output {} after {} ms",
                    output_ref,
                    started.elapsed().as_millis()
                );
                Ok(output_ref)
            }
            Err(e) => {
                tracing::warn!("Upload failed: {}", e);
                Err(e)
            }
        }
    }
}

impl Drop for Uploader {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take()
            && worker.join().is_err()
        {
            tracing::error!("Stitch worker panicked");
        }
    }
}

/// Tell the worker to stop. If it already committed its output, its result
/// stands; otherwise `reason` is returned and the worker commits nothing.
fn stop_worker(
    abort: &CancelToken,
    result_rx: &Receiver<Result<StitchResponse, UploadError>>,
    reason: UploadError,
) -> Result<StitchResponse, UploadError> {
    abort.cancel();
    if !abort.is_committed() {
        return Err(reason);
    }
    tracing::debug!("Stitch output committed before {}, keeping it", reason);
    result_rx.recv().unwrap_or(Err(reason))
}

/// Health probe then submit. Runs on the upload worker.
fn exchange(
    service: &dyn StitchService,
    request: &StitchRequest,
    cancel: &CancelToken,
) -> Result<StitchResponse, UploadError> {
    let health = service.health()?;
    if !health.is_ok() {
        return Err(UploadError::Network(format!(
            "stitch service reports status '{}'",
            health.status
        )));
    }
    tracing::debug!("Stitch service healthy: {:?}", health.capabilities);

    if cancel.is_cancelled() {
        return Err(UploadError::Cancelled);
    }
    service.submit(request, cancel)
}

fn into_output_ref(response: StitchResponse) -> Result<String, UploadError> {
    match response {
        StitchResponse {
            success: true,
            output_ref: Some(output_ref),
            ..
        } => Ok(output_ref),
        StitchResponse { success: true, .. } => Err(UploadError::Rejected(
            "success without outputRef".to_string(),
        )),
        StitchResponse { error, .. } => {
            let error = error.unwrap_or_else(|| "unknown error".to_string());
            Err(match StitchFailure::from_code(&error) {
                Some(failure) => UploadError::Stitch(failure),
                None => UploadError::Rejected(error),
            })
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
