//! Orientation tracking relative to the session reference heading.
//!
//! The tracker turns [`RawRotation`] samples into [`Orientation`] values:
//!
//! - the first heading seen becomes the zero reference (yaw₀)
//! - `yaw = wrap360(-(alpha - yaw₀))`, so turning right increases yaw
//! - `pitch = clamp(beta - 90)`, since the raw tilt reads 90 when the device
//!   is held upright facing the horizon
//! - `roll = gamma`
//!
//! Angular rate comes straight from the sample's rotation rate with no
//! smoothing. While the stream cannot deliver a heading the tracker is
//! *degraded*: it reports [`Orientation::FALLBACK`] and callers hold
//! auto-capture.

mod subscription;

pub use subscription::{OrientationFeed, OrientationSubscription, orientation_channel};

use crate::core::{AngularRate, Orientation, RawRotation, clamp_pitch, wrap_yaw};
use crate::error::OrientationUnavailable;

/// Snapshot of the tracker state handed to the scheduler each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationSample {
    pub orientation: Orientation,
    pub rate: AngularRate,
    pub degraded: bool,
}

impl OrientationSample {
    /// A healthy sample, mostly for driving the scheduler directly.
    pub fn steady(orientation: Orientation) -> Self {
        Self {
            orientation,
            rate: AngularRate::ZERO,
            degraded: false,
        }
    }

    /// A healthy sample with the given rotation rate.
    pub fn moving(orientation: Orientation, rate: AngularRate) -> Self {
        Self {
            orientation,
            rate,
            degraded: false,
        }
    }

    /// The sample reported while the stream is unavailable.
    pub fn unavailable() -> Self {
        Self {
            orientation: Orientation::FALLBACK,
            rate: AngularRate::ZERO,
            degraded: true,
        }
    }
}

/// Converts the raw rotation stream into session-relative orientation.
#[derive(Debug)]
pub struct OrientationTracker {
    /// Raw heading that maps to yaw 0
    reference_heading: Option<f32>,
    /// Most recent raw heading, used by recalibrate
    last_heading: Option<f32>,
    current: Orientation,
    rate: AngularRate,
    degraded: bool,
    subscription: Option<OrientationSubscription>,
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationTracker {
    /// Create a tracker with no reference heading.
    ///
    /// It stays degraded until the first sample with a heading arrives.
    pub fn new() -> Self {
        Self {
            reference_heading: None,
            last_heading: None,
            current: Orientation::FALLBACK,
            rate: AngularRate::ZERO,
            degraded: true,
            subscription: None,
        }
    }

    /// Create a tracker that owns the given subscription.
    pub fn with_subscription(subscription: OrientationSubscription) -> Self {
        let mut tracker = Self::new();
        tracker.attach(subscription);
        tracker
    }

    /// Take ownership of a stream subscription, replacing any previous one.
    pub fn attach(&mut self, subscription: OrientationSubscription) {
        if let Some(old) = self.subscription.replace(subscription) {
            old.cancel();
        }
    }

    /// Release the stream subscription. The feed stops publishing.
    pub fn detach(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.cancel();
            tracing::debug!("Orientation subscription released");
        }
        self.mark_unavailable();
    }

    /// True while a subscription is attached.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Apply one raw sample.
    ///
    /// Returns the new orientation, or the fallback orientation if the sample
    /// carries no heading.
    pub fn update(&mut self, raw: &RawRotation) -> Orientation {
        let Some(alpha) = raw.alpha else {
            self.mark_unavailable();
            return self.current();
        };

        let reference = *self.reference_heading.get_or_insert(alpha);
        self.last_heading = Some(alpha);

        self.current = Orientation {
            yaw: wrap_yaw(-(alpha - reference)),
            pitch: clamp_pitch(raw.beta - 90.0),
            roll: raw.gamma,
            timestamp_ms: raw.timestamp_ms,
        };
        self.rate = raw
            .rotation_rate
            .map(|r| AngularRate::new(r.alpha, r.beta))
            .unwrap_or(AngularRate::ZERO);

        if self.degraded {
            tracing::info!("Orientation stream available");
        }
        self.degraded = false;
        self.current
    }

    /// Drain the subscription and return the newest orientation.
    ///
    /// `Ok(None)` means no new samples arrived. An error means the tracker is
    /// degraded: no subscription, a disconnected feed, or a sample without a
    /// heading.
    pub fn poll(&mut self) -> Result<Option<Orientation>, OrientationUnavailable> {
        let Some(sub) = self.subscription.as_ref() else {
            self.mark_unavailable();
            return Err(OrientationUnavailable);
        };

        let mut pending = Vec::new();
        let mut disconnected = false;
        loop {
            match sub.try_next() {
                Ok(Some(raw)) => pending.push(raw),
                Ok(None) => break,
                Err(OrientationUnavailable) => {
                    disconnected = true;
                    break;
                }
            }
        }

        let mut latest = None;
        for raw in &pending {
            latest = Some(self.update(raw));
        }

        if disconnected {
            self.subscription = None;
            self.mark_unavailable();
        }

        if self.degraded {
            Err(OrientationUnavailable)
        } else {
            Ok(latest)
        }
    }

    /// Make the current raw heading the new yaw zero.
    ///
    /// Coverage state lives elsewhere and is untouched.
    pub fn recalibrate(&mut self) {
        if let Some(heading) = self.last_heading {
            self.reference_heading = Some(heading);
            self.current.yaw = 0.0;
            tracing::debug!("Recalibrated yaw reference to raw heading {:.1}", heading);
        }
    }

    /// Forget the reference heading so the next sample starts a new frame.
    pub fn reset(&mut self) {
        self.reference_heading = None;
        self.last_heading = None;
        self.current = Orientation::FALLBACK;
        self.rate = AngularRate::ZERO;
        self.degraded = true;
    }

    /// Enter degraded mode.
    pub fn mark_unavailable(&mut self) {
        if !self.degraded {
            tracing::warn!("{}", OrientationUnavailable);
        }
        self.degraded = true;
        self.rate = AngularRate::ZERO;
    }

    /// Current orientation; the fallback orientation while degraded.
    pub fn current(&self) -> Orientation {
        if self.degraded {
            Orientation::FALLBACK
        } else {
            self.current
        }
    }

    /// Last reported angular rate.
    pub fn angular_rate(&self) -> AngularRate {
        self.rate
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Snapshot for the scheduler tick.
    pub fn sample(&self) -> OrientationSample {
        OrientationSample {
            orientation: self.current(),
            rate: self.rate,
            degraded: self.degraded,
        }
    }
}

impl Drop for OrientationTracker {
    fn drop(&mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.cancel();
        }
    }
}
