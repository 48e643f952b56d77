//! Background camera worker.
//!
//! Runs the blocking shutter call off the orientation/tick thread. The job
//! queue holds a single ticket; the scheduler's in-flight flag guarantees it
//! is never asked for a second one.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, unbounded};

use super::camera::{Camera, ImageRef};
use super::machine::CaptureTicket;
use crate::error::CaptureError;

/// A finished shutter call.
#[derive(Debug)]
pub struct CaptureResult {
    pub ticket: CaptureTicket,
    pub result: Result<ImageRef, CaptureError>,
}

/// Handle to the camera thread.
pub struct CaptureWorker {
    jobs: Option<Sender<CaptureTicket>>,
    results: Receiver<CaptureResult>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Spawn the worker thread around a camera.
    pub fn spawn<C: Camera + 'static>(mut camera: C, quality: u8) -> std::io::Result<Self> {
        let (job_tx, job_rx) = bounded::<CaptureTicket>(1);
        let (result_tx, result_rx) = unbounded();

        let handle = thread::Builder::new()
            .name("camera".into())
            .spawn(move || {
                tracing::debug!("Camera worker started");
                for ticket in job_rx {
                    let result = camera.take_picture(quality);
                    if result_tx.send(CaptureResult { ticket, result }).is_err() {
                        break;
                    }
                }
                tracing::debug!("Camera worker stopped");
            })?;

        Ok(Self {
            jobs: Some(job_tx),
            results: result_rx,
            handle: Some(handle),
        })
    }

    /// Hand a ticket to the camera.
    ///
    /// Returns false if the worker is busy or gone; the ticket should then be
    /// completed as failed.
    pub fn submit(&self, ticket: CaptureTicket) -> bool {
        let Some(jobs) = self.jobs.as_ref() else {
            return false;
        };
        match jobs.try_send(ticket) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!("Camera worker busy, capture dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Camera worker gone");
                false
            }
        }
    }

    /// Next finished capture, if any.
    pub fn try_result(&self) -> Option<CaptureResult> {
        self.results.try_recv().ok()
    }

    /// Wait up to `timeout` for a finished capture.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<CaptureResult> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Result channel, for use in `select!`.
    pub fn results(&self) -> &Receiver<CaptureResult> {
        &self.results
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.jobs.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("Camera worker panicked");
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
