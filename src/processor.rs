use anyhow::Result;
use tracing::debug;

use crate::frame::Frame;
use crate::overlay::Crosshair;
use crate::pipeline::PoseModel;

/// What happened to a frame in `process_frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The model found no person; the frame is untouched.
    NoPose,
    /// A pose came back without both inner eye landmarks (or with non-finite
    /// ones); the frame is untouched.
    MissingEyes,
    /// Crosshair drawn at this position.
    Crosshair(Crosshair),
}

impl FrameOutcome {
    pub fn crosshair(&self) -> Option<Crosshair> {
        match self {
            FrameOutcome::Crosshair(c) => Some(*c),
            _ => None,
        }
    }
}

/// Runs the pose model on `frame` and draws the eye crosshair onto it in place.
///
/// The model sees an RGB copy; the crosshair is drawn on the original
/// buffer, in its un-mirrored orientation.
pub fn process_frame(frame: &mut Frame, model: &mut dyn PoseModel) -> Result<FrameOutcome> {
    let rgb = frame.to_rgb();

    let Some(landmarks) = model.infer(&rgb)? else {
        return Ok(FrameOutcome::NoPose);
    };

    match Crosshair::from_landmarks(&landmarks, frame.width(), frame.height()) {
        Some(crosshair) => {
            crosshair.draw(frame);
            Ok(FrameOutcome::Crosshair(crosshair))
        }
        None => {
            debug!(landmarks = landmarks.len(), "pose without usable inner eye landmarks, skipping overlay");
            Ok(FrameOutcome::MissingEyes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::ChannelOrder;
    use crate::overlay::CROSSHAIR_COLOR;
    use crate::types::{Landmark, PixelPoint, PoseLandmark, PoseLandmarks};
    use anyhow::anyhow;
    use image::RgbImage;

    /// Returns the same answer for every frame and remembers what it was fed.
    struct FixedPose {
        landmarks: Option<PoseLandmarks>,
        seen: Vec<RgbImage>,
    }

    impl FixedPose {
        fn eyes(left: (f32, f32), right: (f32, f32)) -> Self {
            let mut points = vec![Landmark::default(); PoseLandmark::COUNT];
            points[PoseLandmark::LeftEyeInner.index()] = Landmark::new(left.0, left.1);
            points[PoseLandmark::RightEyeInner.index()] = Landmark::new(right.0, right.1);
            Self {
                landmarks: Some(PoseLandmarks::new(points)),
                seen: Vec::new(),
            }
        }

        fn nobody() -> Self {
            Self {
                landmarks: None,
                seen: Vec::new(),
            }
        }
    }

    impl PoseModel for FixedPose {
        fn name(&self) -> String {
            "fixed".to_string()
        }

        fn infer(&mut self, rgb: &RgbImage) -> Result<Option<PoseLandmarks>> {
            self.seen.push(rgb.clone());
            Ok(self.landmarks.clone())
        }
    }

    struct Failing;

    impl PoseModel for Failing {
        fn name(&self) -> String {
            "failing".to_string()
        }

        fn infer(&mut self, _rgb: &RgbImage) -> Result<Option<PoseLandmarks>> {
            Err(anyhow!("session lost"))
        }
    }

    fn white_columns(frame: &Frame) -> Vec<u32> {
        (0..frame.width())
            .filter(|&x| (0..frame.height()).all(|y| frame.rgb_at(x, y) == CROSSHAIR_COLOR))
            .collect()
    }

    fn white_rows(frame: &Frame) -> Vec<u32> {
        (0..frame.height())
            .filter(|&y| (0..frame.width()).all(|x| frame.rgb_at(x, y) == CROSSHAIR_COLOR))
            .collect()
    }

    #[test]
    fn test_no_pose_leaves_frame_identical() {
        let mut frame = Frame::filled(32, 24, [12, 34, 56], ChannelOrder::Bgr);
        frame.put_rgb(5, 5, [200, 100, 0]);
        let before = frame.clone();

        let outcome = process_frame(&mut frame, &mut FixedPose::nobody()).unwrap();
        assert_eq!(outcome, FrameOutcome::NoPose);
        assert_eq!(frame.pixels.as_raw(), before.pixels.as_raw());
    }

    #[test]
    fn test_model_receives_rgb() {
        let mut frame = Frame::filled(4, 4, [1, 2, 3], ChannelOrder::Bgr);
        let mut model = FixedPose::nobody();
        process_frame(&mut frame, &mut model).unwrap();
        assert_eq!(model.seen.len(), 1);
        assert_eq!(model.seen[0].dimensions(), (4, 4));
        assert!(model.seen[0].pixels().all(|p| p.0 == [3, 2, 1]));
    }

    #[test]
    fn test_crosshair_100x100_scenario() {
        let mut frame = Frame::filled(100, 100, [0, 0, 0], ChannelOrder::Bgr);
        let mut model = FixedPose::eyes((0.4, 0.5), (0.6, 0.5));

        let outcome = process_frame(&mut frame, &mut model).unwrap();
        assert_eq!(outcome.crosshair().map(|c| c.center), Some(PixelPoint::new(50, 50)));

        assert_eq!(white_columns(&frame), vec![50]);
        assert_eq!(white_rows(&frame), vec![50]);
        for y in 0..100 {
            for x in 0..100 {
                if x != 50 && y != 50 {
                    assert_eq!(frame.rgb_at(x, y), [0, 0, 0], "stray pixel at ({}, {})", x, y);
                }
            }
        }
    }

    #[test]
    fn test_non_square_frame_uses_width_and_height() {
        let mut frame = Frame::filled(200, 50, [0, 0, 0], ChannelOrder::Rgb);
        // x: 0.1*200=20, 0.375*200=75 -> 47 ; y: 0.2*50=10, 0.5*50=25 -> 17
        let mut model = FixedPose::eyes((0.1, 0.2), (0.375, 0.5));
        let outcome = process_frame(&mut frame, &mut model).unwrap();
        assert_eq!(outcome.crosshair().map(|c| c.center), Some(PixelPoint::new(47, 17)));
        assert_eq!(white_columns(&frame), vec![47]);
        assert_eq!(white_rows(&frame), vec![17]);
    }

    #[test]
    fn test_missing_eyes_skips_overlay() {
        let mut frame = Frame::filled(10, 10, [9, 9, 9], ChannelOrder::Rgb);
        let before = frame.clone();
        let mut model = FixedPose {
            landmarks: Some(PoseLandmarks::new(vec![Landmark::new(0.5, 0.5); 2])),
            seen: Vec::new(),
        };
        let outcome = process_frame(&mut frame, &mut model).unwrap();
        assert_eq!(outcome, FrameOutcome::MissingEyes);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_nan_eye_skips_overlay() {
        let mut frame = Frame::filled(10, 10, [9, 9, 9], ChannelOrder::Rgb);
        let before = frame.clone();
        let mut model = FixedPose::eyes((f32::NAN, f32::NAN), (f32::NAN, f32::NAN));
        let outcome = process_frame(&mut frame, &mut model).unwrap();
        assert_eq!(outcome, FrameOutcome::MissingEyes);
        assert_eq!(frame, before);
    }

    #[test]
    fn test_second_pass_draws_another_crosshair() {
        let mut frame = Frame::filled(100, 100, [0, 0, 0], ChannelOrder::Rgb);
        process_frame(&mut frame, &mut FixedPose::eyes((0.4, 0.5), (0.6, 0.5))).unwrap();
        let outcome =
            process_frame(&mut frame, &mut FixedPose::eyes((0.1, 0.2), (0.3, 0.2))).unwrap();

        assert_eq!(outcome.crosshair().map(|c| c.center), Some(PixelPoint::new(20, 20)));
        assert_eq!(white_columns(&frame), vec![20, 50]);
        assert_eq!(white_rows(&frame), vec![20, 50]);
    }

    #[test]
    fn test_model_error_propagates() {
        let mut frame = Frame::filled(8, 8, [0, 0, 0], ChannelOrder::Rgb);
        let before = frame.clone();
        assert!(process_frame(&mut frame, &mut Failing).is_err());
        assert_eq!(frame, before);
    }
}
