use anyhow::{bail, Result};
use colored::*;
use image::{ImageBuffer, Rgb};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use pose_crosshair::config::AppConfig;
use pose_crosshair::inference::{BlazePosePipeline, INPUT_SIZE, MODEL_LANDMARKS, VALUES_PER_LANDMARK};
use pose_crosshair::pipeline::PoseOptions;
use std::env;

/// Checks that an ONNX file looks like a BlazePose landmark model: lists its
/// tensors, then runs one grey frame and reports the landmark and presence
/// outputs.
/// Usage: inspect_model [path_to_model.onnx]
fn main() -> Result<()> {
    let model_path = env::args().nth(1).unwrap_or_else(|| AppConfig::default().model.path);
    println!("Inspecting model: {}", model_path);

    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level1)?
        .with_intra_threads(1)?
        .commit_from_file(&model_path)?;

    println!("\n--- Tensors ---");
    for input in &session.inputs {
        println!("in  {:<12} {:?}", input.name, input.input_type);
    }
    for output in &session.outputs {
        println!("out {:<12} {:?}", output.name, output.output_type);
    }
    if session.outputs.len() < 2 {
        bail!("expected a landmark output and a presence output, found {}", session.outputs.len());
    }
    drop(session);

    println!("\n--- Dry run ({0}x{0} grey frame) ---", INPUT_SIZE);
    let mut pipeline = BlazePosePipeline::new(&model_path, PoseOptions::default())?;
    let grey = ImageBuffer::from_pixel(INPUT_SIZE, INPUT_SIZE, Rgb([128u8, 128, 128]));
    let (raw, presence) = pipeline.run_raw(&grey)?;

    let expected = MODEL_LANDMARKS * VALUES_PER_LANDMARK;
    println!("landmark values: {} (expected {})", raw.len(), expected);
    println!("presence score:  {:.3}", presence);

    if raw.len() == expected && (0.0..=1.0).contains(&presence) {
        println!("{}", "Model output matches the BlazePose landmark layout.".green());
    } else {
        println!("{}", "Model output does not match the BlazePose landmark layout.".yellow());
    }
    Ok(())
}
