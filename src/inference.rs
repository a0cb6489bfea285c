use anyhow::{anyhow, Context, Result};
use image::{imageops::FilterType, RgbImage};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use tracing::{debug, info};

use crate::pipeline::{PoseModel, PoseOptions};
use crate::types::{Landmark, PoseLandmark, PoseLandmarks};

/// BlazePose landmark model input edge (square, NHWC).
pub const INPUT_SIZE: u32 = 256;
/// The model emits 33 body landmarks plus 6 auxiliary ones.
pub const MODEL_LANDMARKS: usize = 39;
/// x, y, z, visibility, presence
pub const VALUES_PER_LANDMARK: usize = 5;
/// ROI padding around the previous pose, relative to its larger side.
const ROI_SCALE: f32 = 1.25;
/// Smallest ROI edge worth tracking, in pixels.
const MIN_ROI_SIZE: f32 = 8.0;

/// Region of the frame fed to the landmark model, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Roi {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Roi {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Padded square around the body landmarks, clipped to the frame.
    pub fn around(landmarks: &PoseLandmarks, width: u32, height: u32) -> Option<Self> {
        let body = landmarks.points.iter().take(PoseLandmark::COUNT);
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in body {
            let px = p.x * width as f32;
            let py = p.y * height as f32;
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        if min_x > max_x {
            return None;
        }

        let side = (max_x - min_x).max(max_y - min_y) * ROI_SCALE;
        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;

        let x0 = (cx - side / 2.0).max(0.0);
        let y0 = (cy - side / 2.0).max(0.0);
        let x1 = (cx + side / 2.0).min(width as f32);
        let y1 = (cy + side / 2.0).min(height as f32);

        if x1 - x0 < MIN_ROI_SIZE || y1 - y0 < MIN_ROI_SIZE {
            return None;
        }

        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Converts raw model output (input-pixel space of the ROI crop) into
/// landmarks normalised to the full frame.
pub fn decode_landmarks(raw: &[f32], roi: Roi, frame_width: u32, frame_height: u32) -> Option<PoseLandmarks> {
    if raw.len() < PoseLandmark::COUNT * VALUES_PER_LANDMARK {
        return None;
    }
    let sx = roi.width as f32 / INPUT_SIZE as f32;
    let sy = roi.height as f32 / INPUT_SIZE as f32;

    let points = raw
        .chunks_exact(VALUES_PER_LANDMARK)
        .take(PoseLandmark::COUNT)
        .map(|v| Landmark {
            x: (roi.x as f32 + v[0] * sx) / frame_width as f32,
            y: (roi.y as f32 + v[1] * sy) / frame_height as f32,
            z: v[2] / INPUT_SIZE as f32,
            visibility: sigmoid(v[3]),
        })
        .collect();

    Some(PoseLandmarks::new(points))
}

/// ROI and presence threshold chosen for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePlan {
    pub roi: Roi,
    pub tracked: bool,
    pub threshold: f32,
}

/// Carries the region of interest from one frame to the next.
///
/// Untracked frames are fed whole and must reach the detection threshold.
/// Tracked frames use the ROI around the previous pose and the tracking
/// threshold. A miss drops tracking; static mode never keeps an ROI.
#[derive(Debug, Clone)]
pub struct RoiTracker {
    options: PoseOptions,
    roi: Option<Roi>,
}

impl RoiTracker {
    pub fn new(options: PoseOptions) -> Self {
        Self { options, roi: None }
    }

    pub fn is_tracking(&self) -> bool {
        self.roi.is_some()
    }

    pub fn plan(&self, width: u32, height: u32) -> FramePlan {
        // A stale ROI from a larger frame is not reused.
        let roi = self
            .roi
            .filter(|r| !self.options.static_image_mode && r.x + r.width <= width && r.y + r.height <= height);
        match roi {
            Some(roi) => FramePlan {
                roi,
                tracked: true,
                threshold: self.options.threshold(true),
            },
            None => FramePlan {
                roi: Roi::full(width, height),
                tracked: false,
                threshold: self.options.threshold(false),
            },
        }
    }

    /// Applies the presence score of the frame run under `plan`. Returns
    /// whether the pose counts; on a miss tracking is dropped.
    pub fn accept(&mut self, plan: &FramePlan, presence: f32) -> bool {
        if presence < plan.threshold {
            self.roi = None;
            return false;
        }
        true
    }

    /// Seeds the next frame's ROI from an accepted pose.
    pub fn follow(&mut self, landmarks: Option<&PoseLandmarks>, width: u32, height: u32) {
        self.roi = match landmarks {
            Some(lm) if !self.options.static_image_mode => Roi::around(lm, width, height),
            _ => None,
        };
    }
}

/// Single-person BlazePose landmark model running on onnxruntime.
pub struct BlazePosePipeline {
    session: Session,
    tracker: RoiTracker,
}

impl BlazePosePipeline {
    pub fn new(model_path: &str, options: PoseOptions) -> Result<Self> {
        options.validate()?;
        if !Path::new(model_path).exists() {
            return Err(anyhow!("pose model not found at {}", model_path));
        }

        info!(path = model_path, "loading pose landmark model");
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CoreMLExecutionProvider::default().build(),
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path)
            .with_context(|| format!("failed to load pose model {}", model_path))?;

        Ok(Self {
            session,
            tracker: RoiTracker::new(options),
        })
    }

    /// Raw landmark values and presence score for one crop, before any
    /// thresholding or decoding.
    pub fn run_raw(&mut self, crop: &RgbImage) -> Result<(Vec<f32>, f32)> {
        let resized = image::imageops::resize(crop, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let mut input_data = Vec::with_capacity((INPUT_SIZE * INPUT_SIZE * 3) as usize);
        for pixel in resized.pixels() {
            input_data.push(pixel[0] as f32 / 255.0);
            input_data.push(pixel[1] as f32 / 255.0);
            input_data.push(pixel[2] as f32 / 255.0);
        }

        let shape = vec![1i64, INPUT_SIZE as i64, INPUT_SIZE as i64, 3];
        let input = Tensor::from_array((shape, input_data))?;
        let outputs = self.session.run(ort::inputs![input])?;
        if outputs.len() < 2 {
            return Err(anyhow!("pose model must expose landmark and presence outputs, got {}", outputs.len()));
        }

        let (_shape, landmarks) = outputs[0].try_extract_tensor::<f32>()?;
        let (_shape, flag) = outputs[1].try_extract_tensor::<f32>()?;

        if landmarks.len() < MODEL_LANDMARKS * VALUES_PER_LANDMARK {
            return Err(anyhow!(
                "unexpected landmark output length {} (want {})",
                landmarks.len(),
                MODEL_LANDMARKS * VALUES_PER_LANDMARK
            ));
        }
        let presence = flag.first().copied().unwrap_or(0.0);
        Ok((landmarks.to_vec(), presence))
    }
}

impl PoseModel for BlazePosePipeline {
    fn name(&self) -> String {
        "BlazePose Landmarks (33 pts)".to_string()
    }

    fn infer(&mut self, rgb: &RgbImage) -> Result<Option<PoseLandmarks>> {
        let (width, height) = rgb.dimensions();
        let plan = self.tracker.plan(width, height);

        let crop = if plan.tracked {
            image::imageops::crop_imm(rgb, plan.roi.x, plan.roi.y, plan.roi.width, plan.roi.height).to_image()
        } else {
            rgb.clone()
        };

        let (raw, presence) = self.run_raw(&crop)?;
        if !self.tracker.accept(&plan, presence) {
            debug!(presence, threshold = plan.threshold, tracked = plan.tracked, "pose below threshold");
            return Ok(None);
        }

        let landmarks = decode_landmarks(&raw, plan.roi, width, height);
        self.tracker.follow(landmarks.as_ref(), width, height);
        Ok(landmarks)
    }
}
