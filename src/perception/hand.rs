use crate::common::{Frame, Point};

// MediaPipe-style 21-point hand layout; only the knuckle row and wrist are
// consumed here.
pub const WRIST: usize = 0;
pub const INDEX_MCP: usize = 5;
pub const MIDDLE_MCP: usize = 9;
pub const RING_MCP: usize = 13;
pub const PINKY_MCP: usize = 17;

pub const LANDMARK_COUNT: usize = 21;

/// One landmark in normalized image coordinates (x, y in [0, 1]; z is the
/// detector's relative depth estimate and unused by the gate).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Ordered landmark set for one detected hand in one frame.
#[derive(Debug, Clone, Default)]
pub struct HandPose {
    landmarks: Vec<Landmark>,
}

impl HandPose {
    pub fn new(landmarks: Vec<Landmark>) -> Self {
        Self { landmarks }
    }

    pub fn landmark(&self, index: usize) -> Option<Landmark> {
        self.landmarks.get(index).copied()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }
}

/// Per-frame hand landmark detection boundary. Zero results mean "no hand
/// this frame", which is not an error.
pub trait HandDetector: Send + Sync {
    fn detect(&mut self, frame: &Frame) -> Vec<HandPose>;
    fn name(&self) -> &'static str;
}

/// Strategy for projecting a hand's reference point into frame pixel
/// coordinates. Swappable without touching the evaluator's control flow.
pub trait ReferencePoint: Send + Sync {
    fn locate(&self, pose: &HandPose, width: u32, height: u32) -> Option<Point>;
    fn name(&self) -> &'static str;
}

/// Default reference point: the middle-finger base joint.
pub struct MiddleKnuckle;

impl ReferencePoint for MiddleKnuckle {
    fn locate(&self, pose: &HandPose, width: u32, height: u32) -> Option<Point> {
        let lm = pose.landmark(MIDDLE_MCP)?;
        Some(Point::new(
            (lm.x * width as f32) as i32,
            (lm.y * height as f32) as i32,
        ))
    }

    fn name(&self) -> &'static str {
        "middle-knuckle"
    }
}

/// Alternative reference point: centroid of the wrist and the four finger
/// base joints, steadier against single-landmark jitter.
pub struct PalmCentroid;

impl ReferencePoint for PalmCentroid {
    fn locate(&self, pose: &HandPose, width: u32, height: u32) -> Option<Point> {
        let indices = [WRIST, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];
        let mut x = 0.0;
        let mut y = 0.0;
        for index in indices {
            let lm = pose.landmark(index)?;
            x += lm.x;
            y += lm.y;
        }
        let n = indices.len() as f32;
        Some(Point::new(
            (x / n * width as f32) as i32,
            (y / n * height as f32) as i32,
        ))
    }

    fn name(&self) -> &'static str {
        "palm-centroid"
    }
}
