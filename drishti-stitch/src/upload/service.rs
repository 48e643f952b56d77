//! Stitch service boundary and its in-process implementation.

use drishti_capture::Orientation;

use super::CancelToken;
use super::metadata::{HealthStatus, StitchRequest, StitchResponse};
use crate::error::{StitchError, UploadError};
use crate::orchestrator::{LoadedPhoto, StitchOrchestrator};
use crate::output::OutputStore;

/// Capability advertised by every service that can stitch spheres.
pub const SPHERICAL_CAPABILITY: &str = "spherical-stitch";

/// A service that accepts stitch requests.
///
/// `health` is always probed before `submit`. Once `cancel` fires, `submit`
/// must not persist any output; durable side effects go through
/// [`CancelToken::commit`].
pub trait StitchService: Send + Sync {
    fn health(&self) -> Result<HealthStatus, UploadError>;

    fn submit(
        &self,
        request: &StitchRequest,
        cancel: &CancelToken,
    ) -> Result<StitchResponse, UploadError>;
}

/// Runs the orchestrator in-process and persists the output.
pub struct LocalStitchService {
    orchestrator: StitchOrchestrator,
    store: OutputStore,
}

impl LocalStitchService {
    pub fn new(orchestrator: StitchOrchestrator, store: OutputStore) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    fn load(request: &StitchRequest) -> Result<Vec<LoadedPhoto>, UploadError> {
        if request.images.len() != request.metadata.orientations.len() {
            return Err(UploadError::Rejected(format!(
                "{} images but {} orientations",
                request.images.len(),
                request.metadata.orientations.len()
            )));
        }

        request
            .images
            .iter()
            .zip(&request.metadata.orientations)
            .map(|(part, record)| {
                let image = image::open(&part.path)
                    .map_err(|e| {
                        UploadError::Rejected(format!("{}: {}", part.path.display(), e))
                    })?
                    .into_rgb8();
                Ok(LoadedPhoto {
                    id: record.id,
                    orientation: Orientation::new(
                        record.yaw,
                        record.pitch,
                        record.roll,
                        record.timestamp,
                    ),
                    image,
                })
            })
            .collect()
    }
}

impl StitchService for LocalStitchService {
    fn health(&self) -> Result<HealthStatus, UploadError> {
        Ok(HealthStatus {
            status: "ok".to_string(),
            capabilities: vec![
                SPHERICAL_CAPABILITY.to_string(),
                self.orchestrator.stitcher_name().to_string(),
            ],
        })
    }

    fn submit(
        &self,
        request: &StitchRequest,
        cancel: &CancelToken,
    ) -> Result<StitchResponse, UploadError> {
        let photos = Self::load(request)?;
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }
        tracing::debug!(
            "Local stitch of {} photos ({})",
            photos.len(),
            request.metadata.capture_type
        );

        match self.orchestrator.stitch_loaded(photos) {
            Ok(output) => {
                let Some(persisted) = cancel.commit(|| self.store.persist(&output.jpeg)) else {
                    tracing::info!(
                        "Stitch cancelled, discarding {} byte panorama",
                        output.jpeg.len()
                    );
                    return Err(UploadError::Cancelled);
                };
                Ok(StitchResponse::succeeded(persisted?.id))
            }
            Err(StitchError::Failure(failure)) => Ok(StitchResponse::failed(failure.code())),
            Err(e) => {
                tracing::error!("Local stitch error: {}", e);
                Ok(StitchResponse::failed(e.to_string()))
            }
        }
    }
}
