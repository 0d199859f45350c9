use crate::common::Rect;
use crate::config::OverlayConfig;
use crate::interaction::event::TouchEvent;
use crate::interaction::registry::{SessionPhase, ZoneRegistry};

pub const DRAW_INSTRUCTION: &str = "Draw interaction zones by clicking and dragging";
pub const COMPLETION_STATUS: &str = "All boxes touched! Task completed!";

/// Colors and stroke widths the renderer applies. RGB triples.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub target_color: [u8; 3],
    pub non_target_color: [u8; 3],
    pub text_color: [u8; 3],
    pub line_thickness: u32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::from(&OverlayConfig::default())
    }
}

impl From<&OverlayConfig> for OverlayStyle {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            target_color: config.target_color,
            non_target_color: config.non_target_color,
            text_color: config.text_color,
            line_thickness: config.line_thickness,
        }
    }
}

/// One zone as the renderer should draw it.
#[derive(Debug, Clone)]
pub struct ZoneOverlay {
    pub name: String,
    pub rect: Rect,
    pub touched: bool,
    pub is_target: bool,
    pub color: [u8; 3],
}

/// Display-ready overlay instructions for one processed frame. The renderer
/// consumes this value as-is; the core does no drawing.
#[derive(Debug, Clone)]
pub struct OverlayPlan {
    pub phase: SessionPhase,
    pub zones: Vec<ZoneOverlay>,
    pub draw_preview: Option<Rect>,
    pub progress_percent: f32,
    pub status: Option<String>,
    pub instruction: Option<String>,
    pub hand_detected: bool,
    pub fps: f32,
}

impl OverlayPlan {
    pub fn build(
        registry: &ZoneRegistry,
        style: &OverlayStyle,
        status: Option<String>,
        hand_detected: bool,
        fps: f32,
    ) -> Self {
        let zones: Vec<ZoneOverlay> = registry
            .zones()
            .map(|zone| {
                let is_target = registry.is_target(&zone.name);
                ZoneOverlay {
                    name: zone.name.clone(),
                    rect: zone.rect,
                    touched: zone.touched,
                    is_target,
                    color: if is_target {
                        style.target_color
                    } else {
                        style.non_target_color
                    },
                }
            })
            .collect();

        let instruction = if zones.is_empty() {
            Some(DRAW_INSTRUCTION.to_string())
        } else {
            None
        };

        Self {
            phase: registry.phase(),
            zones,
            draw_preview: registry.draw_preview(),
            progress_percent: registry.progress(),
            status,
            instruction,
            hand_detected,
            fps,
        }
    }
}

/// Status line for a touch event.
pub fn touch_status(event: &TouchEvent) -> String {
    format!(
        "{} touched {}",
        event.zone,
        if event.correct {
            "correctly!"
        } else {
            "incorrectly."
        }
    )
}
