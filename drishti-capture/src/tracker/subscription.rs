//! Cancellable orientation stream subscription.
//!
//! The producer side ([`OrientationFeed`]) lives with whatever reads the
//! motion sensor; the consumer side ([`OrientationSubscription`]) is owned by
//! the tracker. Dropping or cancelling the subscription stops the feed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError, bounded};

use crate::core::RawRotation;
use crate::error::OrientationUnavailable;

/// Create a connected feed/subscription pair.
///
/// `capacity` bounds the number of undelivered samples; when the tracker falls
/// behind, the oldest pending sample is dropped so the newest always arrives.
pub fn orientation_channel(capacity: usize) -> (OrientationFeed, OrientationSubscription) {
    let (tx, rx) = bounded(capacity.max(1));
    let cancelled = Arc::new(AtomicBool::new(false));
    (
        OrientationFeed {
            tx,
            stale: rx.clone(),
            cancelled: Arc::clone(&cancelled),
        },
        OrientationSubscription { rx, cancelled },
    )
}

/// Producer half of the orientation stream.
#[derive(Clone, Debug)]
pub struct OrientationFeed {
    tx: Sender<RawRotation>,
    /// Used only to evict the oldest sample when the queue is full
    stale: Receiver<RawRotation>,
    cancelled: Arc<AtomicBool>,
}

impl OrientationFeed {
    /// Publish one sample.
    ///
    /// Returns false once the subscription is cancelled or dropped; the
    /// producer should stop at that point.
    pub fn publish(&self, sample: RawRotation) -> bool {
        if self.is_cancelled() {
            return false;
        }
        let mut pending = sample;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return true,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(oldest) = self.stale.try_recv() {
                        tracing::trace!(
                            "Orientation queue full, dropping sample from {} ms",
                            oldest.timestamp_ms
                        );
                    }
                    pending = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }

    /// True once the consumer has cancelled or gone away.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Consumer half of the orientation stream.
#[derive(Debug)]
pub struct OrientationSubscription {
    rx: Receiver<RawRotation>,
    cancelled: Arc<AtomicBool>,
}

impl OrientationSubscription {
    /// Take the next pending sample without blocking.
    ///
    /// `Ok(None)` means nothing is pending; an error means every feed is gone
    /// and no further samples will arrive.
    pub fn try_next(&self) -> Result<Option<RawRotation>, OrientationUnavailable> {
        match self.rx.try_recv() {
            Ok(sample) => Ok(Some(sample)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(OrientationUnavailable),
        }
    }

    /// Stop the stream. Pending samples are discarded.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        while self.rx.try_recv().is_ok() {}
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Drop for OrientationSubscription {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
