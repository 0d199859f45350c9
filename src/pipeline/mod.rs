pub mod metrics;
pub mod orchestrator;
pub mod overlay;

pub use metrics::{FpsTracker, FrameMetrics};
pub use orchestrator::{FrameOrchestrator, FrameOrchestratorBuilder};
pub use overlay::{OverlayPlan, OverlayStyle, ZoneOverlay};
