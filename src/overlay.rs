use crate::frame::Frame;
use crate::types::{PixelPoint, PoseLandmark, PoseLandmarks};

/// Crosshair colour (RGB).
pub const CROSSHAIR_COLOR: [u8; 3] = [255, 255, 255];

/// Centre of the crosshair in un-mirrored pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crosshair {
    pub center: PixelPoint,
}

impl Crosshair {
    /// Midpoint of the two inner eye landmarks, or `None` if either is
    /// missing from the set or has a non-finite coordinate.
    pub fn from_landmarks(landmarks: &PoseLandmarks, width: u32, height: u32) -> Option<Self> {
        let left = landmarks.get(PoseLandmark::LeftEyeInner).filter(|l| l.is_finite())?;
        let right = landmarks.get(PoseLandmark::RightEyeInner).filter(|l| l.is_finite())?;
        Some(Self {
            center: left.to_pixel(width, height).midpoint(right.to_pixel(width, height)),
        })
    }

    /// Vertical line over the full height at `center.x` and horizontal line
    /// over the full width at `center.y`, 1 px wide. Pixels outside the
    /// frame are clipped.
    pub fn draw(&self, frame: &mut Frame) {
        let (w, h) = (frame.width() as i64, frame.height() as i64);
        let (cx, cy) = (self.center.x as i64, self.center.y as i64);

        // Endpoints are inclusive (y = h, x = w), the clip drops them.
        for y in 0..=h {
            frame.put_rgb(cx, y, CROSSHAIR_COLOR);
        }
        for x in 0..=w {
            frame.put_rgb(x, cy, CROSSHAIR_COLOR);
        }
    }
}
