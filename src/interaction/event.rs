use chrono::{DateTime, Utc};

/// Result of a hand satisfying a zone's containment+depth gate in one
/// frame. Consumed synchronously by feedback and the status display, never
/// queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    pub zone: String,
    pub correct: bool,
    pub at: DateTime<Utc>,
}

impl TouchEvent {
    pub fn new(zone: String, correct: bool, at: DateTime<Utc>) -> Self {
        Self { zone, correct, at }
    }
}
