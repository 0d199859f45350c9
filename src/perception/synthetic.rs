//! Simulation collaborators for development and tests. The default binary
//! runs against these so the whole loop can be exercised without a camera
//! or the detection models installed.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::Utc;
use image::DynamicImage;

use crate::capture::FrameSource;
use crate::common::Frame;
use crate::error::AppError;
use crate::perception::depth::{DepthEstimator, DepthMap};
use crate::perception::hand::{HandDetector, HandPose, Landmark, LANDMARK_COUNT};

/// A full 21-point pose with every landmark at the same normalized
/// position. Good enough for anything that only reads a reference point.
pub fn uniform_pose(x: f32, y: f32) -> HandPose {
    HandPose::new(vec![Landmark { x, y, z: 0.0 }; LANDMARK_COUNT])
}

/// Emits solid frames at a fixed size and rate, forever.
pub struct SyntheticSource {
    width: u32,
    height: u32,
    interval: Duration,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            interval: Duration::from_millis(33),
        }
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, AppError> {
        std::thread::sleep(self.interval);
        Ok(Some(Frame::new(
            DynamicImage::new_rgb8(self.width, self.height),
            Utc::now(),
        )))
    }

    fn release(&mut self) {}

    fn name(&self) -> &'static str {
        "synthetic-source"
    }
}

/// One simulated hand sweeping left to right across the frame, wrapping at
/// the edge.
pub struct SweepingHandDetector {
    position: f32,
    step: f32,
}

impl SweepingHandDetector {
    pub fn new() -> Self {
        Self {
            position: 0.0,
            step: 0.01,
        }
    }
}

impl Default for SweepingHandDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl HandDetector for SweepingHandDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<HandPose> {
        self.position = (self.position + self.step) % 1.0;
        vec![uniform_pose(self.position, 0.5)]
    }

    fn name(&self) -> &'static str {
        "sweeping-hand"
    }
}

/// Replays a prepared per-frame script of landmark sets; frames beyond the
/// script detect nothing.
pub struct ScriptedHandDetector {
    script: VecDeque<Vec<HandPose>>,
}

impl ScriptedHandDetector {
    pub fn new(script: Vec<Vec<HandPose>>) -> Self {
        Self {
            script: script.into(),
        }
    }
}

impl HandDetector for ScriptedHandDetector {
    fn detect(&mut self, _frame: &Frame) -> Vec<HandPose> {
        self.script.pop_front().unwrap_or_default()
    }

    fn name(&self) -> &'static str {
        "scripted-hand"
    }
}

/// Flat depth map at a constant raw value.
pub struct UniformDepthEstimator {
    value: u8,
}

impl UniformDepthEstimator {
    pub fn new(value: u8) -> Self {
        Self { value }
    }
}

impl DepthEstimator for UniformDepthEstimator {
    fn estimate(&mut self, frame: &Frame) -> DepthMap {
        DepthMap::from_raw(
            frame.width(),
            frame.height(),
            vec![self.value; (frame.width() * frame.height()) as usize],
        )
        .expect("buffer sized from frame dimensions")
    }

    fn name(&self) -> &'static str {
        "uniform-depth"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point;

    fn frame() -> Frame {
        Frame::new(DynamicImage::new_rgb8(64, 48), Utc::now())
    }

    #[test]
    fn scripted_detector_replays_then_goes_quiet() {
        let mut detector =
            ScriptedHandDetector::new(vec![vec![uniform_pose(0.5, 0.5)], Vec::new()]);
        assert_eq!(detector.detect(&frame()).len(), 1);
        assert!(detector.detect(&frame()).is_empty());
        assert!(detector.detect(&frame()).is_empty());
    }

    #[test]
    fn uniform_depth_matches_frame_dimensions() {
        let mut estimator = UniformDepthEstimator::new(102);
        let depth = estimator.estimate(&frame());
        assert_eq!((depth.width(), depth.height()), (64, 48));
        let value = depth.value_at(Point::new(10, 10)).unwrap();
        assert!((value - 0.4).abs() < 1e-2);
    }
}
