use crate::common::Point;

/// Pointer gestures driving the zone-draw lifecycle, delivered from the
/// display layer over a channel and drained once per orchestration cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Pressed(Point),
    Moved(Point),
    Released(Point),
}
