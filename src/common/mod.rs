pub mod frame;
pub mod geometry;

pub use frame::Frame;
pub use geometry::{in_zone_at_depth, Point, Rect};
