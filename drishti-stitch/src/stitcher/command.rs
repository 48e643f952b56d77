//! Binding to an external stitcher program.
//!
//! Each call gets a fresh temporary working directory:
//!
//! ```text
//! <scratch>/drishti-stitch-XXXXXX/
//!   input_000.png
//!   input_001.png
//!   ...
//!   output.png        (written by the program)
//! ```
//!
//! The program is invoked as `<program> <args...> --output <output.png>
//! <inputs...>`. Exit status 0 means success; 1, 2 and 3 map to the typed
//! failures. The directory is removed when the call returns, whatever the
//! outcome.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;

use super::SphericalStitcher;
use crate::config::CommandConfig;
use crate::error::{CapabilityError, StitchFailure};

/// Runs an external stitcher program per call.
#[derive(Clone, Debug)]
pub struct CommandStitcher {
    program: PathBuf,
    args: Vec<String>,
    scratch_dir: Option<PathBuf>,
    name: String,
}

impl CommandStitcher {
    pub fn new(config: &CommandConfig) -> Self {
        let name = config
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "command".to_string());
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            scratch_dir: config.scratch_dir.clone(),
            name,
        }
    }

    fn working_dir(&self) -> std::io::Result<tempfile::TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("drishti-stitch-");
        match &self.scratch_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)
            }
            None => builder.tempdir(),
        }
    }

    fn run(&self, dir: &Path, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        let mut inputs = Vec::with_capacity(images.len());
        for (i, img) in images.iter().enumerate() {
            let path = dir.join(format!("input_{i:03}.png"));
            img.save(&path)?;
            inputs.push(path);
        }
        let output = dir.join("output.png");

        tracing::debug!(
            "Running {} on {} inputs in {}",
            self.program.display(),
            inputs.len(),
            dir.display()
        );
        let result = Command::new(&self.program)
            .args(&self.args)
            .arg("--output")
            .arg(&output)
            .args(&inputs)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                CapabilityError::Unavailable(format!("{}: {}", self.program.display(), e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(match result.status.code().and_then(StitchFailure::from_exit_code) {
                Some(failure) => {
                    tracing::debug!("Stitcher reported {}: {}", failure.code(), stderr.trim());
                    CapabilityError::Failed(failure)
                }
                None => CapabilityError::Unavailable(format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    result.status,
                    stderr.trim()
                )),
            });
        }

        Ok(image::open(&output)?.into_rgb8())
    }
}

impl SphericalStitcher for CommandStitcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn stitch(&self, images: &[RgbImage]) -> Result<RgbImage, CapabilityError> {
        let dir = self.working_dir()?;
        let result = self.run(dir.path(), images);

        let path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
        result
    }
}
