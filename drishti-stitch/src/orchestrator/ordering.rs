//! Stitch ordering and pitch buckets.

use std::ops::Range;

use drishti_capture::core::round_to_step;

/// Pitch bucket of a photo: pitch rounded to the nearest `bucket_deg`.
#[inline]
pub fn pitch_bucket(pitch: f32, bucket_deg: f32) -> i32 {
    round_to_step(pitch, bucket_deg).round() as i32
}

/// Sort keys by (pitch bucket ascending, yaw ascending).
///
/// Returns the permutation to apply; the sort is stable so photos with equal
/// keys keep capture order.
pub fn stitch_order(orientations: &[(f32, f32)], bucket_deg: f32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..orientations.len()).collect();
    order.sort_by(|&a, &b| {
        let (yaw_a, pitch_a) = orientations[a];
        let (yaw_b, pitch_b) = orientations[b];
        pitch_bucket(pitch_a, bucket_deg)
            .cmp(&pitch_bucket(pitch_b, bucket_deg))
            .then(yaw_a.total_cmp(&yaw_b))
    });
    order
}

/// Contiguous bucket ranges over pitches already in stitch order.
///
/// Returned in descending pitch order, top row first.
pub fn row_buckets(sorted_pitches: &[f32], bucket_deg: f32) -> Vec<(i32, Range<usize>)> {
    let mut rows: Vec<(i32, Range<usize>)> = Vec::new();
    for (i, &pitch) in sorted_pitches.iter().enumerate() {
        let bucket = pitch_bucket(pitch, bucket_deg);
        match rows.last_mut() {
            Some((b, range)) if *b == bucket => range.end = i + 1,
            _ => rows.push((bucket, i..i + 1)),
        }
    }
    rows.reverse();
    rows
}
