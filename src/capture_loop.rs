//! Read → process → mirror → show → poll, until the camera runs dry or the
//! user presses `q`.

use anyhow::Result;
use std::time::Duration;
use tracing::{debug, info};

use crate::camera::FrameSource;
use crate::output::{KeyPress, OutputSink};
use crate::pipeline::PoseModel;
use crate::processor::process_frame;

pub const QUIT_KEY: char = 'q';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Initializing,
    Running,
    ShuttingDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The frame source failed to deliver a frame.
    SourceExhausted,
    /// Quit key pressed or window closed.
    QuitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub crosshairs: u64,
    pub exit: ExitReason,
}

/// Owns the camera, the pose model and the window for the lifetime of the
/// loop. Source and output are released exactly once when the loop is
/// dropped, whichever way `run` ends.
pub struct CaptureLoop<S: FrameSource, M: PoseModel, O: OutputSink> {
    source: S,
    model: M,
    output: O,
    key_wait: Duration,
    state: LoopState,
}

impl<S: FrameSource, M: PoseModel, O: OutputSink> CaptureLoop<S, M, O> {
    pub fn new(source: S, model: M, output: O) -> Self {
        Self {
            source,
            model,
            output,
            key_wait: Duration::from_millis(1),
            state: LoopState::Initializing,
        }
    }

    pub fn with_key_wait(mut self, wait: Duration) -> Self {
        self.key_wait = wait;
        self
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn run(mut self) -> Result<LoopStats> {
        self.state = LoopState::Running;
        info!(model = %self.model.name(), "capture loop running");

        let mut frames = 0u64;
        let mut crosshairs = 0u64;

        let exit = loop {
            let mut frame = match self.source.read_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    info!("frame source ended: {e:#}");
                    break ExitReason::SourceExhausted;
                }
            };

            let outcome = process_frame(&mut frame, &mut self.model)?;
            frames += 1;
            if let Some(c) = outcome.crosshair() {
                crosshairs += 1;
                debug!(x = c.center.x, y = c.center.y, "crosshair");
            }

            // Drawn in camera orientation, shown as a selfie view.
            frame.mirror();
            self.output.show(&frame)?;

            match self.output.poll_key(self.key_wait) {
                Some(KeyPress::Char(QUIT_KEY)) => break ExitReason::QuitRequested,
                Some(KeyPress::WindowClosed) => break ExitReason::QuitRequested,
                _ => {}
            }
        };

        info!(frames, crosshairs, ?exit, "capture loop stopped");
        Ok(LoopStats {
            frames,
            crosshairs,
            exit,
        })
    }

    fn shutdown(&mut self) {
        if self.state == LoopState::ShuttingDown {
            return;
        }
        self.state = LoopState::ShuttingDown;
        self.source.release();
        self.output.close();
    }
}

impl<S: FrameSource, M: PoseModel, O: OutputSink> Drop for CaptureLoop<S, M, O> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
