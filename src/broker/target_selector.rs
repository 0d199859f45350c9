use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::interaction::registry::ZoneRegistry;

/// Maps externally published step numbers onto zone labels through a static
/// configured table and applies the result to the registry. Zone labels in
/// the table must match the generated creation labels exactly; a step whose
/// label has not been drawn yet fails silently apart from a debug line.
pub struct TargetSelector {
    bindings: IndexMap<String, u32>,
}

impl TargetSelector {
    pub fn new(bindings: IndexMap<String, u32>) -> Self {
        Self { bindings }
    }

    /// Parse a UTF-8 decimal step payload.
    pub fn parse_step(payload: &str) -> Option<u32> {
        payload.trim().parse().ok()
    }

    /// First zone label bound to the given step number.
    pub fn zone_for_step(&self, step: u32) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == step)
            .map(|(label, _)| label.as_str())
    }

    /// Full inbound path: parse the payload, resolve the label, update the
    /// registry target. Returns the label that became the target.
    pub fn apply(&self, registry: &mut ZoneRegistry, payload: &str) -> Option<String> {
        let step = match Self::parse_step(payload) {
            Some(step) => step,
            None => {
                warn!("Invalid step number received: {:?}", payload);
                return None;
            }
        };
        let label = match self.zone_for_step(step) {
            Some(label) => label.to_string(),
            None => {
                debug!("No zone bound to step {}", step);
                return None;
            }
        };
        if registry.set_target(&label) {
            info!("Target zone updated: {}", label);
            Some(label)
        } else {
            debug!("Step {} names zone {:?} which is not drawn yet", step, label);
            None
        }
    }
}
