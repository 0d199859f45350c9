pub mod depth;
pub mod hand;
pub mod synthetic;

pub use depth::{DepthEstimator, DepthMap};
pub use hand::{HandDetector, HandPose, Landmark, MiddleKnuckle, PalmCentroid, ReferencePoint};
