use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::broker::notifier::CompletionNotifier;
use crate::broker::target_selector::TargetSelector;
use crate::common::Frame;
use crate::error::AppError;
use crate::feedback::{CueKind, FeedbackSink, LogFeedback};
use crate::input::PointerEvent;
use crate::interaction::evaluator::InteractionEvaluator;
use crate::interaction::registry::SharedRegistry;
use crate::pipeline::metrics::{FpsTracker, FrameMetrics};
use crate::pipeline::overlay::{self, OverlayPlan, OverlayStyle};
use crate::perception::depth::DepthEstimator;
use crate::perception::hand::HandDetector;

const FPS_WINDOW_SIZE: usize = 30;

/// Per-frame driver: drains the inbound command channels, runs perception
/// and the interaction evaluator, feeds touch events to feedback and the
/// completion notifier, and emits a display-ready overlay plan.
pub struct FrameOrchestrator {
    registry: SharedRegistry,
    evaluator: InteractionEvaluator,
    hand_detector: Box<dyn HandDetector>,
    depth_estimator: Box<dyn DepthEstimator>,
    target_selector: TargetSelector,
    notifier: CompletionNotifier,
    feedback: Box<dyn FeedbackSink>,
    style: OverlayStyle,
    step_rx: mpsc::Receiver<String>,
    pointer_rx: mpsc::Receiver<PointerEvent>,
    fps: FpsTracker,
}

impl FrameOrchestrator {
    pub fn builder(registry: SharedRegistry) -> FrameOrchestratorBuilder {
        FrameOrchestratorBuilder::new(registry)
    }

    /// Process a single frame. Expected per-frame conditions (no hands, no
    /// zones, unknown steps) never surface as errors.
    pub async fn process_frame(&mut self, frame: Frame) -> OverlayPlan {
        let frame_start = Instant::now();
        let mut metrics = FrameMetrics::new();

        self.drain_pointer_events();
        self.drain_step_commands();

        let perception_start = Instant::now();
        let hands = self.hand_detector.detect(&frame);
        let depth = self.depth_estimator.estimate(&frame);
        metrics.perception_duration_us = perception_start.elapsed().as_micros() as u64;

        let hand_detected = !hands.is_empty();

        let evaluation_start = Instant::now();
        let events = {
            let mut registry = self.registry.lock();
            self.evaluator
                .evaluate(&mut registry, &hands, &depth, frame.captured_at())
        };
        metrics.evaluation_duration_us = evaluation_start.elapsed().as_micros() as u64;

        let mut status = None;
        for event in &events {
            let cue = if event.correct {
                CueKind::Target
            } else {
                CueKind::NonTarget
            };
            self.feedback.play(cue);
            status = Some(overlay::touch_status(event));
        }

        if self.notifier.observe(&self.registry).await {
            info!("All zones touched; session complete");
            status = Some(overlay::COMPLETION_STATUS.to_string());
        }

        let fps = self.fps.tick(Instant::now());
        let plan = {
            let registry = self.registry.lock();
            OverlayPlan::build(&registry, &self.style, status, hand_detected, fps)
        };

        metrics.finalize(frame_start);
        debug!(
            "Frame {} processed in {}us (perception {}us, evaluation {}us)",
            frame.frame_id(),
            metrics.total_processing_duration_us,
            metrics.perception_duration_us,
            metrics.evaluation_duration_us
        );

        plan
    }

    fn drain_pointer_events(&mut self) {
        while let Ok(event) = self.pointer_rx.try_recv() {
            let mut registry = self.registry.lock();
            match event {
                PointerEvent::Pressed(p) => registry.start_draw(p.x, p.y),
                PointerEvent::Moved(p) => {
                    registry.update_draw(p.x, p.y);
                }
                PointerEvent::Released(p) => {
                    if let Some(name) = registry.finish_draw(p.x, p.y) {
                        info!("Zone created: {}", name);
                    }
                }
            }
        }
    }

    fn drain_step_commands(&mut self) {
        while let Ok(payload) = self.step_rx.try_recv() {
            let mut registry = self.registry.lock();
            self.target_selector.apply(&mut registry, &payload);
        }
    }

    /// Consume frames until cancellation or the capture side closes. Overlay
    /// plans are dropped when the renderer falls behind.
    pub async fn start_processing(
        mut self,
        mut frame_rx: mpsc::Receiver<Frame>,
        overlay_tx: mpsc::Sender<OverlayPlan>,
        cancel_token: CancellationToken,
    ) {
        info!("Frame orchestrator started - waiting for frames...");
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                maybe_frame = frame_rx.recv() => match maybe_frame {
                    Some(frame) => {
                        let plan = self.process_frame(frame).await;
                        if overlay_tx.try_send(plan).is_err() {
                            debug!("Overlay channel full or closed, dropping plan");
                        }
                    }
                    None => break,
                }
            }
        }
        info!("Frame orchestrator stopped");
    }
}

pub struct FrameOrchestratorBuilder {
    registry: SharedRegistry,
    evaluator: Option<InteractionEvaluator>,
    hand_detector: Option<Box<dyn HandDetector>>,
    depth_estimator: Option<Box<dyn DepthEstimator>>,
    target_selector: Option<TargetSelector>,
    notifier: Option<CompletionNotifier>,
    feedback: Box<dyn FeedbackSink>,
    style: OverlayStyle,
    step_rx: Option<mpsc::Receiver<String>>,
    pointer_rx: Option<mpsc::Receiver<PointerEvent>>,
}

impl FrameOrchestratorBuilder {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            evaluator: None,
            hand_detector: None,
            depth_estimator: None,
            target_selector: None,
            notifier: None,
            feedback: Box::new(LogFeedback),
            style: OverlayStyle::default(),
            step_rx: None,
            pointer_rx: None,
        }
    }

    pub fn evaluator(mut self, evaluator: InteractionEvaluator) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn hand_detector(mut self, detector: Box<dyn HandDetector>) -> Self {
        self.hand_detector = Some(detector);
        self
    }

    pub fn depth_estimator(mut self, estimator: Box<dyn DepthEstimator>) -> Self {
        self.depth_estimator = Some(estimator);
        self
    }

    pub fn target_selector(mut self, selector: TargetSelector) -> Self {
        self.target_selector = Some(selector);
        self
    }

    pub fn notifier(mut self, notifier: CompletionNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }

    pub fn channels(
        mut self,
        step_rx: mpsc::Receiver<String>,
        pointer_rx: mpsc::Receiver<PointerEvent>,
    ) -> Self {
        self.step_rx = Some(step_rx);
        self.pointer_rx = Some(pointer_rx);
        self
    }

    pub fn build(self) -> Result<FrameOrchestrator, AppError> {
        let missing = |what: &str| AppError::Pipeline(format!("{} not set", what));
        Ok(FrameOrchestrator {
            registry: self.registry,
            evaluator: self.evaluator.ok_or_else(|| missing("evaluator"))?,
            hand_detector: self.hand_detector.ok_or_else(|| missing("hand detector"))?,
            depth_estimator: self
                .depth_estimator
                .ok_or_else(|| missing("depth estimator"))?,
            target_selector: self
                .target_selector
                .ok_or_else(|| missing("target selector"))?,
            notifier: self.notifier.ok_or_else(|| missing("completion notifier"))?,
            feedback: self.feedback,
            style: self.style,
            step_rx: self.step_rx.ok_or_else(|| missing("step channel"))?,
            pointer_rx: self.pointer_rx.ok_or_else(|| missing("pointer channel"))?,
            fps: FpsTracker::new(FPS_WINDOW_SIZE),
        })
    }
}
