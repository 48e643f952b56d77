//! File-backed cameras for the simulator.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use parking_lot::Mutex;

use drishti_capture::{Camera, CaptureError, ImageRef, Orientation};

/// Serves pre-recorded frames from a directory in file name order.
pub struct DirectoryCamera {
    frames: Vec<PathBuf>,
    next: usize,
}

impl DirectoryCamera {
    /// Index every `.jpg`, `.jpeg` and `.png` file in `dir`.
    pub fn open(dir: &Path) -> std::io::Result<Self> {
        let mut frames: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|e| e.to_str())
                    .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
                    .unwrap_or(false)
            })
            .collect();
        frames.sort();
        tracing::info!("Directory camera: {} frames in {:?}", frames.len(), dir);
        Ok(Self { frames, next: 0 })
    }
}

impl Camera for DirectoryCamera {
    fn take_picture(&mut self, _quality: u8) -> Result<ImageRef, CaptureError> {
        let frame = self
            .frames
            .get(self.next)
            .ok_or_else(|| CaptureError::Shutter("no frames left".to_string()))?;
        self.next += 1;
        Ok(ImageRef::new(frame.clone()))
    }
}

/// Where the synthetic camera is pointing.
///
/// The driver sets it before each shutter call.
pub type Aim = Arc<Mutex<Orientation>>;

/// Renders a gradient frame for the current aim.
///
/// Hue follows yaw, brightness follows pitch, so stitched output shows where
/// each frame landed.
pub struct SyntheticCamera {
    dir: PathBuf,
    aim: Aim,
    width: u32,
    height: u32,
    taken: u32,
}

impl SyntheticCamera {
    pub fn new(dir: impl Into<PathBuf>, aim: Aim) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            aim,
            width: 320,
            height: 240,
            taken: 0,
        })
    }

    fn render(&self, orientation: &Orientation) -> RgbImage {
        let base = hue_to_rgb(orientation.yaw);
        let level = 0.55 + 0.4 * (orientation.pitch / 90.0);
        RgbImage::from_fn(self.width, self.height, |x, y| {
            // Horizontal gradient, with a marker column every 40 px
            let shade = 0.6 + 0.4 * (x as f32 / self.width as f32);
            let marker = if x % 40 == 0 || y % 60 == 0 { 0.5 } else { 1.0 };
            let scale = level * shade * marker;
            Rgb(base.map(|c| (c * scale * 255.0).clamp(16.0, 255.0) as u8))
        })
    }
}

impl Camera for SyntheticCamera {
    fn take_picture(&mut self, quality: u8) -> Result<ImageRef, CaptureError> {
        let orientation = *self.aim.lock();
        self.taken += 1;
        let path = self.dir.join(format!("frame_{:03}.jpg", self.taken));

        let frame = self.render(&orientation);
        encode_jpeg(std::fs::File::create(&path)?, &frame, quality)?;

        tracing::debug!(
            "Synthetic frame {} at yaw {:.1} pitch {:.1}",
            path.display(),
            orientation.yaw,
            orientation.pitch
        );
        Ok(ImageRef::new(path))
    }
}

/// Encode through a buffered writer, surfacing the final flush error.
fn encode_jpeg<W: Write>(sink: W, frame: &RgbImage, quality: u8) -> Result<(), CaptureError> {
    let mut writer = std::io::BufWriter::new(sink);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(frame)
        .map_err(|e| CaptureError::Shutter(e.to_string()))?;
    writer.flush()?;
    Ok(())
}

/// Fully saturated color for a hue in degrees, channels in [0, 1].
fn hue_to_rgb(hue: f32) -> [f32; 3] {
    let h = hue.rem_euclid(360.0) / 60.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    match h as u32 {
        0 => [1.0, x, 0.0],
        1 => [x, 1.0, 0.0],
        2 => [0.0, 1.0, x],
        3 => [0.0, x, 1.0],
        4 => [x, 0.0, 1.0],
        _ => [1.0, 0.0, x],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_camera_serves_frames_in_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.jpg", "a.png", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let mut camera = DirectoryCamera::open(dir.path()).unwrap();

        let first = camera.take_picture(90).unwrap();
        let second = camera.take_picture(90).unwrap();
        assert!(first.path().ends_with("a.png"));
        assert!(second.path().ends_with("b.jpg"));
        assert!(matches!(
            camera.take_picture(90),
            Err(CaptureError::Shutter(_))
        ));
    }

    #[test]
    fn test_synthetic_camera_writes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let aim: Aim = Arc::new(Mutex::new(Orientation::looking_at(120.0, 10.0, 0)));
        let mut camera = SyntheticCamera::new(dir.path().join("frames"), Arc::clone(&aim)).unwrap();

        let a = camera.take_picture(85).unwrap();
        *aim.lock() = Orientation::looking_at(240.0, -10.0, 0);
        let b = camera.take_picture(85).unwrap();

        assert_ne!(a, b);
        let frame = image::open(a.path()).unwrap().into_rgb8();
        assert_eq!(frame.dimensions(), (320, 240));
        // Yaw 120 renders green-dominant
        let px = frame.get_pixel(210, 110);
        assert!(px[1] > px[0] && px[1] > px[2]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_jpeg_flush_error_is_reported() {
        // Small enough to stay in the buffer until the flush
        let frame = RgbImage::new(8, 8);
        let full = std::fs::OpenOptions::new()
            .write(true)
            .open("/dev/full")
            .unwrap();
        assert!(encode_jpeg(full, &frame, 90).is_err());

        let mut sink = Vec::new();
        encode_jpeg(&mut sink, &frame, 90).unwrap();
        assert_eq!(&sink[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_hue_wheel() {
        assert_eq!(hue_to_rgb(0.0), [1.0, 0.0, 0.0]);
        assert_eq!(hue_to_rgb(120.0), [0.0, 1.0, 0.0]);
        assert_eq!(hue_to_rgb(240.0), [0.0, 0.0, 1.0]);
    }
}
