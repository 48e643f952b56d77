//! Drishti - spherical capture simulator and stitch driver
//!
//! Replays a device orientation stream through a capture session, shooting
//! with a file-backed camera, and hands the finished session to a stitch
//! service.
//!
//! ## Subcommands
//!
//! - **simulate**: run a capture session from a JSON Lines recording (or a
//!   synthetic horizon sweep), write the session manifest, then stitch
//! - **stitch**: stitch a session manifest written by an earlier run
//!
//! ```text
//! drishti --config configs/drishti.toml simulate --sweep 6
//! drishti simulate --replay walk.jsonl --frames ./frames
//! drishti stitch output/session-0001.json
//! ```

mod camera;
mod config;
mod error;
mod replay;
mod session;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use drishti_capture::{Orientation, StitchJob};
use drishti_stitch::{
    CancelToken, CommandStitcher, FakeStitcher, HttpStitchService, LocalStitchService,
    OutputStore, SphericalStitcher, StitchOrchestrator, StitchService, Uploader,
};

use camera::{Aim, DirectoryCamera, SyntheticCamera};
use config::{DrishtiConfig, UploadMode};
use error::Result;
use replay::SweepPlan;
use session::SessionDriver;

#[derive(Parser, Debug)]
#[command(name = "drishti", version, about = "Spherical capture simulator and stitch driver")]
struct Cli {
    /// Configuration file (default: drishti.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a capture session and stitch the result
    Simulate {
        /// JSON Lines orientation recording
        #[arg(long, conflicts_with = "sweep")]
        replay: Option<PathBuf>,

        /// Synthetic horizon sweep with this many positions
        #[arg(long, default_value_t = 6)]
        sweep: usize,

        /// Seed for the synthetic sweep's hand tremor
        #[arg(long, default_value_t = 7)]
        seed: u64,

        /// Serve pre-recorded frames from this directory instead of rendering
        #[arg(long)]
        frames: Option<PathBuf>,

        /// Stop after writing the session manifest
        #[arg(long)]
        no_stitch: bool,
    },

    /// Stitch a session manifest
    Stitch {
        /// Manifest written by `simulate`
        manifest: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("drishti=info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    info!("Drishti v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Simulate {
            replay,
            sweep,
            seed,
            frames,
            no_stitch,
        } => {
            let samples = match replay {
                Some(path) => replay::load_recording(&path)?,
                None => {
                    info!("Synthetic sweep: {} positions, seed {}", sweep, seed);
                    SweepPlan::horizon(sweep, seed).samples()
                }
            };

            let mut driver = match frames {
                Some(dir) => {
                    SessionDriver::new(config.capture.clone(), DirectoryCamera::open(&dir)?, None)?
                }
                None => {
                    let aim: Aim = Arc::new(Mutex::new(Orientation::FALLBACK));
                    let camera =
                        SyntheticCamera::new(&config.output.frames_dir, Arc::clone(&aim))?;
                    SessionDriver::new(config.capture.clone(), camera, Some(aim))?
                }
            };

            let summary = driver.run(&samples)?;
            let stats = &summary.stats;
            info!(
                "Replayed {} samples over {} ticks ({} degraded), {}",
                stats.samples,
                stats.ticks,
                stats.degraded_ticks,
                if stats.completed {
                    "coverage target reached"
                } else {
                    "finished at end of stream"
                }
            );
            session::write_manifest(&config.output.dir, &summary.job)?;
            if no_stitch {
                return Ok(());
            }

            match stitch_job(&config, &summary.job) {
                Ok(output_ref) => {
                    driver.scheduler_mut().stitch_succeeded(output_ref)?;
                    info!(
                        "Session done, output {}",
                        driver.scheduler().output_ref().unwrap_or("-")
                    );
                    Ok(())
                }
                Err(e) => {
                    driver.scheduler_mut().stitch_failed(&e.to_string())?;
                    Err(e)
                }
            }
        }

        Command::Stitch { manifest } => {
            let job = session::read_manifest(&manifest)?;
            info!(
                "Stitching session {} from {:?} ({} photos)",
                job.epoch,
                manifest,
                job.photos.len()
            );
            stitch_job(&config, &job).map(|_| ())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DrishtiConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            DrishtiConfig::load(path)
        }
        None if Path::new("drishti.toml").exists() => {
            info!("Loading configuration from drishti.toml");
            DrishtiConfig::load(Path::new("drishti.toml"))
        }
        None => {
            info!("Using default configuration");
            Ok(DrishtiConfig::default())
        }
    }
}

/// Send a finished session to the configured stitch service.
fn stitch_job(config: &DrishtiConfig, job: &StitchJob) -> Result<String> {
    let service: Arc<dyn StitchService> = match config.upload.mode {
        UploadMode::Local => {
            let stitcher: Box<dyn SphericalStitcher> = match &config.stitch.command {
                Some(command) => Box::new(CommandStitcher::new(command)),
                None => {
                    warn!("No stitcher program configured, using the concatenating stand-in");
                    Box::new(FakeStitcher::succeeding())
                }
            };
            let orchestrator = StitchOrchestrator::new(stitcher, config.stitch.clone());
            let store = OutputStore::new(&config.output.dir);
            Arc::new(LocalStitchService::new(orchestrator, store))
        }
        UploadMode::Http => {
            info!("Using stitch service at {}", config.upload.base_url);
            Arc::new(HttpStitchService::new(
                config.upload.base_url.clone(),
                Duration::from_millis(config.upload.deadline_ms),
            ))
        }
    };

    let uploader = Uploader::new(service, Duration::from_millis(config.upload.deadline_ms));
    let output_ref = uploader.upload(job, &CancelToken::new())?;
    info!("Panorama ready: {}", output_ref);
    Ok(output_ref)
}
