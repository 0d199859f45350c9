use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::debug;

use crate::common::{Point, Rect};
use crate::interaction::zone::{zone_label, Zone};

/// Coarse session state derived from the registry contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoZonesDefined,
    AwaitingTarget,
    Complete,
}

/// In-progress rectangle authoring state. Exists only between a press and a
/// release; never outlives the gesture.
#[derive(Debug, Clone, Copy)]
struct DrawSession {
    anchor: Point,
    cursor: Point,
}

/// Owns the set of interaction zones, the current target, the draw session
/// and the completion-published flag. Insertion order is creation order and
/// the deterministic iteration order everywhere zones are scanned.
pub struct ZoneRegistry {
    zones: IndexMap<String, Zone>,
    target: Option<String>,
    completion_published: bool,
    draw: Option<DrawSession>,
    max_zones: usize,
}

impl ZoneRegistry {
    pub fn new(max_zones: usize) -> Self {
        Self {
            zones: IndexMap::new(),
            target: None,
            completion_published: false,
            draw: None,
            max_zones,
        }
    }

    /// Begin a draw session anchored at (x, y). No-op while already drawing,
    /// at zone capacity, or after the session has completed (completion is
    /// terminal until reset).
    pub fn start_draw(&mut self, x: i32, y: i32) {
        if self.draw.is_none() && self.zones.len() < self.max_zones && !self.completion_published {
            let anchor = Point::new(x, y);
            self.draw = Some(DrawSession {
                anchor,
                cursor: anchor,
            });
        }
    }

    /// Track the cursor while drawing and return the live preview rectangle.
    pub fn update_draw(&mut self, x: i32, y: i32) -> Option<Rect> {
        let session = self.draw.as_mut()?;
        session.cursor = Point::new(x, y);
        Some(Rect::from_corners(session.anchor, session.cursor))
    }

    /// The preview rectangle of the in-progress draw session, if any.
    pub fn draw_preview(&self) -> Option<Rect> {
        self.draw
            .map(|session| Rect::from_corners(session.anchor, session.cursor))
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_some()
    }

    /// Finish the draw session, allocating a new untouched zone with a
    /// generated label. Returns the label, or None when not drawing or at
    /// capacity (the session is discarded either way).
    pub fn finish_draw(&mut self, x: i32, y: i32) -> Option<String> {
        let session = self.draw.take()?;
        if self.zones.len() >= self.max_zones {
            return None;
        }
        let name = zone_label(self.zones.len())?;
        let rect = Rect::from_corners(session.anchor, Point::new(x, y));
        self.zones.insert(name.clone(), Zone::new(name.clone(), rect));
        Some(name)
    }

    /// First zone (in creation order) strictly containing the point.
    pub fn zone_at(&self, x: i32, y: i32) -> Option<&str> {
        let point = Point::new(x, y);
        self.zones
            .values()
            .find(|zone| zone.rect.contains(point))
            .map(|zone| zone.name.as_str())
    }

    /// Set the target zone. Fails (false) for names not present in the
    /// registry, leaving the current target unchanged.
    pub fn set_target(&mut self, name: &str) -> bool {
        if self.zones.contains_key(name) {
            self.target = Some(name.to_string());
            true
        } else {
            debug!("Rejected target {:?}: no such zone", name);
            false
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn is_target(&self, name: &str) -> bool {
        self.target.as_deref() == Some(name)
    }

    /// Flip a zone to touched. Returns true only on the transition, so the
    /// caller fires feedback exactly once per zone.
    pub fn mark_touched(&mut self, name: &str) -> bool {
        match self.zones.get_mut(name) {
            Some(zone) if !zone.touched => {
                zone.touched = true;
                true
            }
            _ => false,
        }
    }

    /// Touched percentage in [0, 100]; 0 when no zones exist.
    pub fn progress(&self) -> f32 {
        if self.zones.is_empty() {
            return 0.0;
        }
        let touched = self.zones.values().filter(|zone| zone.touched).count();
        touched as f32 / self.zones.len() as f32 * 100.0
    }

    /// True iff every zone is touched. Vacuously true with zero zones;
    /// completion publication is additionally gated on zone count.
    pub fn is_complete(&self) -> bool {
        self.zones.values().all(|zone| zone.touched)
    }

    pub fn completion_published(&self) -> bool {
        self.completion_published
    }

    /// Returns true exactly once per session: the first observation where at
    /// least one zone exists and all zones are touched. Sets the published
    /// flag in the same step.
    pub fn try_mark_completion_published(&mut self) -> bool {
        if !self.zones.is_empty() && self.is_complete() && !self.completion_published {
            self.completion_published = true;
            true
        } else {
            false
        }
    }

    /// Discard all zones, the target, the completion flag and any draw
    /// session, returning to the initial state.
    pub fn reset(&mut self) {
        self.zones.clear();
        self.target = None;
        self.completion_published = false;
        self.draw = None;
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Zone names in creation order.
    pub fn zone_names(&self) -> Vec<String> {
        self.zones.keys().cloned().collect()
    }

    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zones.get(name)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.zones.is_empty() {
            SessionPhase::NoZonesDefined
        } else if self.completion_published && self.is_complete() {
            SessionPhase::Complete
        } else {
            SessionPhase::AwaitingTarget
        }
    }
}

/// Mutex-guarded handle to the registry. Both the frame loop and the broker
/// command path mutate registry state, so every entry point goes through
/// this lock; operations are dictionary work and never held across an await.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<Mutex<ZoneRegistry>>,
}

impl SharedRegistry {
    pub fn new(max_zones: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ZoneRegistry::new(max_zones))),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, ZoneRegistry> {
        self.inner.lock().expect("zone registry lock poisoned")
    }
}
