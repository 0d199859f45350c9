use chrono::{DateTime, Utc};
use tracing::debug;

use crate::common::in_zone_at_depth;
use crate::interaction::event::TouchEvent;
use crate::interaction::registry::ZoneRegistry;
use crate::perception::depth::DepthMap;
use crate::perception::hand::{HandPose, MiddleKnuckle, ReferencePoint};

/// Evaluates one frame's hand poses against the untouched zones. Zones that
/// transition to touched mid-pass are excluded for the rest of the pass, so
/// each zone yields at most one event per session.
pub struct InteractionEvaluator {
    reference_point: Box<dyn ReferencePoint>,
    depth_near: f32,
    depth_far: f32,
}

impl InteractionEvaluator {
    pub fn new(depth_near: f32, depth_far: f32) -> Self {
        Self {
            reference_point: Box::new(MiddleKnuckle),
            depth_near,
            depth_far,
        }
    }

    pub fn with_reference_point(mut self, strategy: Box<dyn ReferencePoint>) -> Self {
        self.reference_point = strategy;
        self
    }

    pub fn evaluate(
        &self,
        registry: &mut ZoneRegistry,
        hands: &[HandPose],
        depth: &DepthMap,
        captured_at: DateTime<Utc>,
    ) -> Vec<TouchEvent> {
        let mut events = Vec::new();
        for pose in hands {
            let point = match self.reference_point.locate(pose, depth.width(), depth.height()) {
                Some(point) => point,
                None => continue,
            };
            // Out-of-frame reference point: no interaction this frame.
            let depth_value = match depth.value_at(point) {
                Some(value) => value,
                None => continue,
            };

            for name in registry.zone_names() {
                let rect = match registry.zone(&name) {
                    Some(zone) if !zone.touched => zone.rect,
                    _ => continue,
                };
                if !in_zone_at_depth(point, &rect, depth_value, self.depth_near, self.depth_far) {
                    continue;
                }
                if registry.mark_touched(&name) {
                    let correct = registry.is_target(&name);
                    debug!(
                        "Zone {} touched at {:?} depth {:.2} (correct: {})",
                        name, point, depth_value, correct
                    );
                    events.push(TouchEvent::new(name, correct, captured_at));
                }
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::synthetic::uniform_pose;

    const NEAR: f32 = 0.20;
    const FAR: f32 = 0.63;

    // 100x100 frame; depth value 102 -> 0.4, inside the window.
    fn depth_in_window() -> DepthMap {
        DepthMap::from_raw(100, 100, vec![102; 100 * 100]).unwrap()
    }

    fn depth_at(raw: u8) -> DepthMap {
        DepthMap::from_raw(100, 100, vec![raw; 100 * 100]).unwrap()
    }

    fn evaluator() -> InteractionEvaluator {
        InteractionEvaluator::new(NEAR, FAR)
    }

    fn three_zone_registry() -> ZoneRegistry {
        let mut registry = ZoneRegistry::new(3);
        registry.start_draw(0, 0);
        registry.finish_draw(30, 100);
        registry.start_draw(35, 0);
        registry.finish_draw(65, 100);
        registry.start_draw(70, 0);
        registry.finish_draw(100, 100);
        registry
    }

    #[test]
    fn hand_inside_zone_at_valid_depth_emits_event() {
        let mut registry = three_zone_registry();
        let events = evaluator().evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].zone, "Box A");
        assert!(!events[0].correct);
        assert!(registry.zone("Box A").unwrap().touched);
    }

    #[test]
    fn correctness_follows_current_target() {
        let mut registry = three_zone_registry();
        registry.set_target("Box B");
        let events = evaluator().evaluate(
            &mut registry,
            &[uniform_pose(0.5, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].zone, "Box B");
        assert!(events[0].correct);
    }

    #[test]
    fn touch_without_target_is_incorrect() {
        let mut registry = three_zone_registry();
        let events = evaluator().evaluate(
            &mut registry,
            &[uniform_pose(0.5, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert_eq!(events.len(), 1);
        assert!(!events[0].correct);
    }

    #[test]
    fn touched_zones_are_skipped_on_later_frames() {
        let mut registry = three_zone_registry();
        let gate = evaluator();
        let first = gate.evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert_eq!(first.len(), 1);
        let second = gate.evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert!(second.is_empty());
    }

    #[test]
    fn zone_touched_by_first_hand_is_excluded_for_second_hand() {
        let mut registry = three_zone_registry();
        let events = evaluator().evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5), uniform_pose(0.15, 0.6)],
            &depth_in_window(),
            Utc::now(),
        );
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn depth_outside_window_emits_nothing() {
        let mut registry = three_zone_registry();
        let gate = evaluator();
        // 26 -> ~0.10, nearer than the window allows.
        let near_miss = gate.evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5)],
            &depth_at(26),
            Utc::now(),
        );
        assert!(near_miss.is_empty());
        // 230 -> ~0.90, lost in the background.
        let far_miss = gate.evaluate(
            &mut registry,
            &[uniform_pose(0.15, 0.5)],
            &depth_at(230),
            Utc::now(),
        );
        assert!(far_miss.is_empty());
        assert!(!registry.zone("Box A").unwrap().touched);
    }

    #[test]
    fn no_hands_means_no_events() {
        let mut registry = three_zone_registry();
        let events = evaluator().evaluate(&mut registry, &[], &depth_in_window(), Utc::now());
        assert!(events.is_empty());
    }

    #[test]
    fn reference_point_off_frame_is_ignored() {
        let mut registry = three_zone_registry();
        let events = evaluator().evaluate(
            &mut registry,
            &[uniform_pose(1.5, 0.5)],
            &depth_in_window(),
            Utc::now(),
        );
        assert!(events.is_empty());
    }

    #[test]
    fn full_session_touches_every_zone_once() {
        let mut registry = three_zone_registry();
        registry.set_target("Box B");
        let gate = evaluator();
        let depth = depth_in_window();

        let mut all = Vec::new();
        for x in [0.15, 0.5, 0.85] {
            all.extend(gate.evaluate(&mut registry, &[uniform_pose(x, 0.5)], &depth, Utc::now()));
        }

        assert_eq!(all.len(), 3);
        assert_eq!(
            all.iter().map(|e| e.correct).collect::<Vec<_>>(),
            vec![false, true, false]
        );
        assert!(registry.is_complete());
        assert!(registry.try_mark_completion_published());
        assert!(!registry.try_mark_completion_published());
    }
}
