//! Angle helpers in degrees.

/// Wrap a yaw angle into `[0, 360)`.
#[inline]
pub fn wrap_yaw(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Clamp a pitch angle into `[-90, 90]`.
#[inline]
pub fn clamp_pitch(angle: f32) -> f32 {
    angle.clamp(-90.0, 90.0)
}

/// Signed shortest yaw difference `to - from`, in `(-180, 180]`.
///
/// Handles wraparound, e.g. from 350° to 10° is +20°, not -340°.
#[inline]
pub fn yaw_delta(from: f32, to: f32) -> f32 {
    let d = wrap_yaw(to - from);
    if d > 180.0 { d - 360.0 } else { d }
}

/// Round a value to the nearest multiple of `step`.
#[inline]
pub fn round_to_step(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

/// Great-circle distance between two (yaw, pitch) directions, in degrees.
///
/// Uses the haversine formula, which stays accurate for the small
/// separations the guide deduplication cares about.
pub fn angular_distance(yaw_a: f32, pitch_a: f32, yaw_b: f32, pitch_b: f32) -> f32 {
    let phi_a = pitch_a.to_radians();
    let phi_b = pitch_b.to_radians();
    let d_phi = phi_b - phi_a;
    let d_lambda = yaw_delta(yaw_a, yaw_b).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    let central = 2.0 * h.sqrt().min(1.0).asin();
    central.to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_yaw() {
        assert_relative_eq!(wrap_yaw(370.0), 10.0, epsilon = 1e-4);
        assert_relative_eq!(wrap_yaw(-10.0), 350.0, epsilon = 1e-4);
        assert_eq!(wrap_yaw(360.0), 0.0);
        assert!(wrap_yaw(-1e-9) < 360.0);
    }

    #[test]
    fn test_yaw_delta_wraps() {
        assert_relative_eq!(yaw_delta(350.0, 10.0), 20.0, epsilon = 1e-4);
        assert_relative_eq!(yaw_delta(10.0, 350.0), -20.0, epsilon = 1e-4);
        assert_relative_eq!(yaw_delta(0.0, 180.0), 180.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clamp_pitch() {
        assert_eq!(clamp_pitch(95.0), 90.0);
        assert_eq!(clamp_pitch(-95.0), -90.0);
        assert_eq!(clamp_pitch(12.5), 12.5);
    }

    #[test]
    fn test_angular_distance() {
        assert_relative_eq!(angular_distance(0.0, 0.0, 90.0, 0.0), 90.0, epsilon = 1e-3);
        assert_relative_eq!(angular_distance(350.0, 0.0, 10.0, 0.0), 20.0, epsilon = 1e-3);
        assert_relative_eq!(angular_distance(0.0, 0.0, 0.0, 45.0), 45.0, epsilon = 1e-3);
        // Every yaw is the same point at the pole
        assert!(angular_distance(0.0, 90.0, 180.0, 90.0) < 1e-2);
    }

    #[test]
    fn test_round_to_step() {
        assert_eq!(round_to_step(44.0, 30.0), 30.0);
        assert_eq!(round_to_step(46.0, 30.0), 60.0);
        assert_eq!(round_to_step(-16.0, 30.0), -30.0);
    }
}
