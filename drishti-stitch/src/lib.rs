//! # Drishti Stitch
//!
//! Turns the photos of a finished capture session into one equirectangular
//! (2:1) panorama.
//!
//! ## Overview
//!
//! - **Stitching capability**: a black-box [`SphericalStitcher`], either an
//!   external program ([`CommandStitcher`]) or a deterministic in-memory
//!   stand-in ([`FakeStitcher`])
//! - **Orchestration**: whole-sphere attempt first, row-grouped fallback when
//!   it fails, then crop and resize onto a fixed 2:1 canvas
//! - **Output store**: persisted JPEGs under generated identifiers
//! - **Upload**: health probe plus stitch request against a local or HTTP
//!   service, bounded by a deadline and a cancel token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use drishti_stitch::{
//!     CancelToken, FakeStitcher, LocalStitchService, OutputStore, StitchConfig,
//!     StitchOrchestrator, Uploader,
//! };
//!
//! let orchestrator = StitchOrchestrator::new(Box::new(FakeStitcher::succeeding()), StitchConfig::default());
//! let service = LocalStitchService::new(orchestrator, OutputStore::new("panoramas"));
//! let uploader = Uploader::new(Arc::new(service), Duration::from_secs(60));
//!
//! let output_ref = uploader.upload(&scheduler.stitch_job()?, &CancelToken::new())?;
//! scheduler.stitch_succeeded(output_ref)?;
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod stitcher;
pub mod upload;

pub use config::{CommandConfig, StitchConfig};
pub use error::{
    CapabilityError, Result, StitchConfigError, StitchError, StitchFailure, UploadError,
};
pub use orchestrator::{
    EquirectangularImage, LoadedPhoto, StitchOrchestrator, StitchReport, StitchStrategy,
};
pub use output::{OutputRef, OutputStore};
pub use stitcher::{CommandStitcher, FailurePolicy, FakeStitcher, SphericalStitcher};
pub use upload::{
    CancelToken, HealthStatus, HttpStitchService, ImagePart, LocalStitchService, StitchMetadata,
    StitchRequest, StitchResponse, StitchService, Uploader,
};
