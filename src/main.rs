use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pose_crosshair::args::Args;
use pose_crosshair::camera::{self, CameraSource};
use pose_crosshair::capture_loop::{CaptureLoop, ExitReason};
use pose_crosshair::config::AppConfig;
use pose_crosshair::inference::BlazePosePipeline;
use pose_crosshair::output::WindowOutput;
use pose_crosshair::pipeline::PoseModel;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.list {
        return camera::list_cameras();
    }

    // 0. Load Config
    let mut config = AppConfig::load_from(&args.config)?;
    if let Some(index) = args.cam_index {
        config.camera.index = index;
    }
    if let Some(model) = args.model {
        config.model.path = model;
    }

    // 1. Setup Inference
    let model = BlazePosePipeline::new(&config.model.path, config.model.options)
        .context("Failed to initialise pose model")?;
    println!("{}", format!("Active model: {}", model.name()).green());

    // 2. Setup Camera
    let camera = CameraSource::new(config.camera.index as usize)?;
    info!(camera = %camera.name(), width = camera.width(), height = camera.height(), "camera ready");

    // 3. Setup Output
    let window = WindowOutput::new(&config.window.title, camera.width() as usize, camera.height() as usize)?;

    println!("Press [q] in the window to quit.");

    // 4. Loop
    let stats = CaptureLoop::new(camera, model, window)
        .with_key_wait(Duration::from_millis(config.window.key_wait_ms))
        .run()?;

    match stats.exit {
        ExitReason::SourceExhausted => println!("{}", "Camera stopped delivering frames.".yellow()),
        ExitReason::QuitRequested => println!("Bye."),
    }
    info!(frames = stats.frames, crosshairs = stats.crosshairs, "done");

    Ok(())
}
