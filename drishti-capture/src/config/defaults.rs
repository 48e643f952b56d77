//! Default value functions for serde deserialization.

pub fn cell_size_deg() -> f32 {
    5.0
}

pub fn min_pitch() -> f32 {
    -90.0
}

pub fn max_pitch() -> f32 {
    90.0
}

pub fn h_fov_deg() -> f32 {
    60.0
}

pub fn v_fov_deg() -> f32 {
    80.0
}

pub fn jpeg_quality() -> u8 {
    92
}

pub fn yaw_span_deg() -> f32 {
    30.0
}

pub fn pitch_span_deg() -> f32 {
    40.0
}

pub fn target_coverage() -> f32 {
    0.85
}

pub fn min_photos() -> usize {
    6
}

pub fn stability_threshold_dps() -> f32 {
    15.0
}

pub fn cooldown_ms() -> u64 {
    1500
}

pub fn min_covered_samples() -> usize {
    1
}

pub fn min_uncovered_samples() -> usize {
    2
}

pub fn fov_sample_spread() -> f32 {
    0.3
}

pub fn tick_interval_ms() -> u64 {
    100
}

pub fn axis_probe_factor() -> f32 {
    0.75
}

pub fn diagonal_probe_factor() -> f32 {
    0.6
}

pub fn global_azimuths() -> usize {
    8
}

pub fn global_elevations() -> Vec<f32> {
    vec![-60.0, -30.0, 0.0, 30.0, 60.0]
}

pub fn dedup_radius_deg() -> f32 {
    30.0
}
