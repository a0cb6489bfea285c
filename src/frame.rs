use image::{imageops, ImageBuffer, Rgb, RgbImage};

/// Byte order of the three channels stored in a `Frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// One captured video frame in the capture device's native channel order.
///
/// The pixel container is always a 3 x u8 buffer; `order` says how the three
/// bytes are to be read.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub pixels: ImageBuffer<Rgb<u8>, Vec<u8>>,
    pub order: ChannelOrder,
}

impl Frame {
    pub fn new(pixels: ImageBuffer<Rgb<u8>, Vec<u8>>, order: ChannelOrder) -> Self {
        Self { pixels, order }
    }

    /// Solid frame, mostly useful for tests and fake sources.
    pub fn filled(width: u32, height: u32, color: [u8; 3], order: ChannelOrder) -> Self {
        Self {
            pixels: ImageBuffer::from_pixel(width, height, Rgb(color)),
            order,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Copy converted to RGB, the layout pose models consume. No resize, no crop.
    pub fn to_rgb(&self) -> RgbImage {
        match self.order {
            ChannelOrder::Rgb => self.pixels.clone(),
            ChannelOrder::Bgr => {
                let mut rgb = self.pixels.clone();
                for pixel in rgb.pixels_mut() {
                    pixel.0.swap(0, 2);
                }
                rgb
            }
        }
    }

    /// Left-right flip for the selfie view.
    pub fn mirror(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.pixels);
    }

    /// Writes `color` (given as RGB) at (x, y) in the frame's own channel order.
    /// Out-of-bounds coordinates are ignored.
    pub fn put_rgb(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let native = match self.order {
            ChannelOrder::Rgb => color,
            ChannelOrder::Bgr => [color[2], color[1], color[0]],
        };
        self.pixels.put_pixel(x as u32, y as u32, Rgb(native));
    }

    /// Pixel at (x, y) read back as RGB.
    pub fn rgb_at(&self, x: u32, y: u32) -> [u8; 3] {
        let p = self.pixels.get_pixel(x, y).0;
        match self.order {
            ChannelOrder::Rgb => p,
            ChannelOrder::Bgr => [p[2], p[1], p[0]],
        }
    }
}
