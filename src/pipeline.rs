use crate::types::PoseLandmarks;
use anyhow::{bail, Result};
use image::RgbImage;
use serde::{Deserialize, Serialize};

/// A pose estimator the frame processor can drive.
///
/// Implementations receive an RGB image and report either nothing (no person
/// found) or one landmark set with coordinates normalised to that image.
pub trait PoseModel {
    fn name(&self) -> String;
    fn infer(&mut self, rgb: &RgbImage) -> Result<Option<PoseLandmarks>>;
}

impl<M: PoseModel + ?Sized> PoseModel for Box<M> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn infer(&mut self, rgb: &RgbImage) -> Result<Option<PoseLandmarks>> {
        (**self).infer(rgb)
    }
}

/// Session settings for a pose estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseOptions {
    /// Treat every frame as unrelated. When false the previous pose seeds the
    /// region of interest for the next frame.
    pub static_image_mode: bool,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for PoseOptions {
    fn default() -> Self {
        Self {
            static_image_mode: false,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl PoseOptions {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{} must be within [0, 1], got {}", name, value);
            }
        }
        Ok(())
    }

    /// Presence score a frame has to reach. Tracked frames use the (usually
    /// looser) tracking threshold.
    pub fn threshold(&self, tracked: bool) -> f32 {
        if tracked {
            self.min_tracking_confidence
        } else {
            self.min_detection_confidence
        }
    }
}
