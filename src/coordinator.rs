use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::broker::mqtt::MqttLink;
use crate::broker::notifier::{CompletionNotifier, CompletionPublisher, NullPublisher};
use crate::broker::target_selector::TargetSelector;
use crate::capture::{CaptureClient, FrameSource};
use crate::config::Configuration;
use crate::error::AppError;
use crate::feedback::FeedbackSink;
use crate::input::PointerEvent;
use crate::interaction::evaluator::InteractionEvaluator;
use crate::interaction::registry::SharedRegistry;
use crate::perception::depth::DepthEstimator;
use crate::perception::hand::{HandDetector, ReferencePoint};
use crate::pipeline::orchestrator::FrameOrchestrator;
use crate::pipeline::overlay::{OverlayPlan, OverlayStyle};

/// Owns the running tasks: the capture thread, the broker link and the
/// orchestrator loop. Dropping or stopping the coordinator cancels all of
/// them and releases the camera.
pub struct Coordinator {
    registry: SharedRegistry,
    pointer_tx: mpsc::Sender<PointerEvent>,
    overlay_rx: Option<mpsc::Receiver<OverlayPlan>>,
    orchestrator_task: tokio::task::JoinHandle<()>,
    capture: CaptureClient,
    mqtt: Option<MqttLink>,
    cancel_token: CancellationToken,
}

impl Coordinator {
    /// Shared handle to the zone registry, e.g. for a display layer that
    /// hit-tests zones directly.
    pub fn registry(&self) -> SharedRegistry {
        self.registry.clone()
    }

    /// Sender for pointer gestures from the display layer.
    pub fn pointer_sender(&self) -> mpsc::Sender<PointerEvent> {
        self.pointer_tx.clone()
    }

    /// Overlay plan stream for the renderer; available once.
    pub fn take_overlay_receiver(&mut self) -> Option<mpsc::Receiver<OverlayPlan>> {
        self.overlay_rx.take()
    }

    pub fn stop(&mut self) {
        self.cancel_token.cancel();
        self.capture.stop();
        if let Some(mqtt) = &self.mqtt {
            mqtt.stop();
        }
        self.orchestrator_task.abort();
        info!("Coordinator stopped");
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

pub struct CoordinatorBuilder {
    configuration: Configuration,
    frame_source: Option<Box<dyn FrameSource>>,
    hand_detector: Option<Box<dyn HandDetector>>,
    depth_estimator: Option<Box<dyn DepthEstimator>>,
    feedback: Option<Box<dyn FeedbackSink>>,
    reference_point: Option<Box<dyn ReferencePoint>>,
    style: Option<OverlayStyle>,
    broker_enabled: bool,
}

impl CoordinatorBuilder {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            frame_source: None,
            hand_detector: None,
            depth_estimator: None,
            feedback: None,
            reference_point: None,
            style: None,
            broker_enabled: true,
        }
    }

    pub fn frame_source(mut self, source: Box<dyn FrameSource>) -> Self {
        self.frame_source = Some(source);
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

    pub fn feedback(mut self, feedback: Box<dyn FeedbackSink>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn reference_point(mut self, strategy: Box<dyn ReferencePoint>) -> Self {
        self.reference_point = Some(strategy);
        self
    }

    /// Override the overlay colors from configuration.
    pub fn style(mut self, style: OverlayStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Run without the broker: target selection and completion publication
    /// become unavailable, local touch detection keeps working.
    pub fn without_broker(mut self) -> Self {
        self.broker_enabled = false;
        self
    }

    pub fn build(self) -> Result<Coordinator, AppError> {
        let configuration = self.configuration;
        configuration.validate().map_err(AppError::Config)?;

        let cancel_token = CancellationToken::new();
        let (frame_tx, frame_rx) = mpsc::channel(configuration.frame_buffer_size);
        let (step_tx, step_rx) = mpsc::channel(configuration.command_buffer_size);
        let (pointer_tx, pointer_rx) = mpsc::channel(configuration.command_buffer_size);
        let (overlay_tx, overlay_rx) = mpsc::channel(configuration.frame_buffer_size);

        let registry = SharedRegistry::new(configuration.max_zones);

        let source = self
            .frame_source
            .ok_or_else(|| AppError::Pipeline("frame source not set".to_string()))?;
        // Camera open failures abort startup here.
        let capture = CaptureClient::start(source, frame_tx)?;

        let (publisher, mqtt): (Box<dyn CompletionPublisher>, Option<MqttLink>) =
            if self.broker_enabled {
                let link = MqttLink::connect(
                    &configuration.broker,
                    step_tx,
                    cancel_token.child_token(),
                );
                let publisher = link.completion_publisher(&configuration.broker.completion_topic);
                (Box::new(publisher), Some(link))
            } else {
                (Box::new(NullPublisher), None)
            };

        let mut evaluator =
            InteractionEvaluator::new(configuration.depth_near, configuration.depth_far);
        if let Some(strategy) = self.reference_point {
            evaluator = evaluator.with_reference_point(strategy);
        }

        let mut orchestrator_builder = FrameOrchestrator::builder(registry.clone())
            .evaluator(evaluator)
            .hand_detector(
                self.hand_detector
                    .ok_or_else(|| AppError::Pipeline("hand detector not set".to_string()))?,
            )
            .depth_estimator(
                self.depth_estimator
                    .ok_or_else(|| AppError::Pipeline("depth estimator not set".to_string()))?,
            )
            .target_selector(TargetSelector::new(configuration.step_mapping.clone()))
            .notifier(CompletionNotifier::new(
                publisher,
                configuration.broker.completion_message.clone(),
            ))
            .style(
                self.style
                    .unwrap_or_else(|| OverlayStyle::from(&configuration.overlay)),
            )
            .channels(step_rx, pointer_rx);
        if let Some(feedback) = self.feedback {
            orchestrator_builder = orchestrator_builder.feedback(feedback);
        }
        let orchestrator = orchestrator_builder.build()?;

        let orchestrator_task = tokio::spawn(orchestrator.start_processing(
            frame_rx,
            overlay_tx,
            cancel_token.child_token(),
        ));

        Ok(Coordinator {
            registry,
            pointer_tx,
            overlay_rx: Some(overlay_rx),
            orchestrator_task,
            capture,
            mqtt,
            cancel_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point;
    use crate::perception::synthetic::{
        ScriptedHandDetector, SyntheticSource, UniformDepthEstimator,
    };

    fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new(Configuration::default())
            .frame_source(Box::new(SyntheticSource::new(100, 100)))
            .hand_detector(Box::new(ScriptedHandDetector::new(Vec::new())))
            .depth_estimator(Box::new(UniformDepthEstimator::new(102)))
            .without_broker()
    }

    #[tokio::test]
    async fn overlay_plans_flow_until_stop() {
        let mut coordinator = builder().build().expect("coordinator should start");
        let mut overlay_rx = coordinator.take_overlay_receiver().unwrap();
        assert!(overlay_rx.recv().await.is_some());
        assert!(coordinator.take_overlay_receiver().is_none());
        coordinator.stop();
    }

    #[tokio::test]
    async fn pointer_events_reach_the_registry() {
        let mut coordinator = builder().build().expect("coordinator should start");
        let registry = coordinator.registry();
        let pointer = coordinator.pointer_sender();

        pointer
            .send(PointerEvent::Pressed(Point::new(0, 0)))
            .await
            .unwrap();
        pointer
            .send(PointerEvent::Released(Point::new(50, 50)))
            .await
            .unwrap();

        let mut overlay_rx = coordinator.take_overlay_receiver().unwrap();
        let mut zones = 0;
        for _ in 0..10 {
            if let Some(plan) = overlay_rx.recv().await {
                zones = plan.zones.len();
                if zones == 1 {
                    break;
                }
            }
        }
        assert_eq!(zones, 1);
        assert_eq!(registry.lock().zone_count(), 1);
        coordinator.stop();
    }

    #[tokio::test]
    async fn missing_frame_source_fails_to_build() {
        let result = CoordinatorBuilder::new(Configuration::default())
            .hand_detector(Box::new(ScriptedHandDetector::new(Vec::new())))
            .depth_estimator(Box::new(UniformDepthEstimator::new(102)))
            .without_broker()
            .build();
        assert!(result.is_err());
    }
}
