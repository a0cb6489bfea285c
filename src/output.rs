use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::frame::{ChannelOrder, Frame};

/// Keyboard (or window) events the capture loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Char(char),
    WindowClosed,
}

/// Trait for presenting processed frames and reading user input back.
pub trait OutputSink {
    fn show(&mut self, frame: &Frame) -> Result<()>;
    /// Waits at most `wait` for input. `None` if nothing was pressed.
    fn poll_key(&mut self, wait: Duration) -> Option<KeyPress>;
    fn close(&mut self);
}

pub struct WindowOutput {
    window: Option<minifb::Window>,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl WindowOutput {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                ..minifb::WindowOptions::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;

        // The camera paces the loop; a rate limit here would stall every update.
        window.limit_update_rate(None);

        Ok(Self {
            window: Some(window),
            buffer: vec![0; width * height],
            width,
            height,
        })
    }
}

/// Maps window state and freshly pressed keys to the loop's input.
pub fn key_press(open: bool, pressed: &[minifb::Key]) -> Option<KeyPress> {
    if !open {
        return Some(KeyPress::WindowClosed);
    }
    if pressed.contains(&minifb::Key::Q) {
        return Some(KeyPress::Char('q'));
    }
    None
}

fn read_key(window: &minifb::Window) -> Option<KeyPress> {
    key_press(window.is_open(), &window.get_keys_pressed(minifb::KeyRepeat::No))
}

/// Packs a frame into minifb's 0RGB u32 layout.
pub fn pack_argb(frame: &Frame, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.extend(frame.pixels.pixels().map(|p| {
        let [r, g, b] = match frame.order {
            ChannelOrder::Rgb => p.0,
            ChannelOrder::Bgr => [p[2], p[1], p[0]],
        };
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }));
}

impl OutputSink for WindowOutput {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        let Some(window) = self.window.as_mut() else {
            return Err(anyhow::anyhow!("window already closed"));
        };

        self.width = frame.width() as usize;
        self.height = frame.height() as usize;
        pack_argb(frame, &mut self.buffer);

        window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| anyhow::anyhow!("Window update failed: {}", e))
    }

    fn poll_key(&mut self, wait: Duration) -> Option<KeyPress> {
        let window = self.window.as_mut()?;
        // Keys delivered by the update in `show` come first; pumping events
        // again would drop them.
        if let Some(key) = read_key(window) {
            return Some(key);
        }
        if wait.is_zero() {
            return None;
        }
        std::thread::sleep(wait);
        window.update();
        read_key(window)
    }

    fn close(&mut self) {
        // minifb closes the native window on drop
        if self.window.take().is_some() {
            info!("window closed");
        }
    }
}
