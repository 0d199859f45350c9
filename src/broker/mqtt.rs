use std::time::Duration;

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::broker::notifier::CompletionPublisher;
use crate::config::BrokerConfig;
use crate::error::AppError;

const RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// MQTT side of the pub/sub boundary: forwards inbound step payloads to the
/// orchestrator's command channel and publishes the completion message.
/// Broker trouble never stops the frame loop; the event task keeps retrying
/// in the background while touch detection runs without target updates.
pub struct MqttLink {
    client: AsyncClient,
    event_task: JoinHandle<()>,
}

impl MqttLink {
    pub fn connect(
        config: &BrokerConfig,
        step_tx: mpsc::Sender<String>,
        cancel_token: CancellationToken,
    ) -> Self {
        let mut options =
            MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keepalive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 16);
        let subscriber = client.clone();
        let step_topic = config.step_topic.clone();

        let event_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel_token.cancelled() => break,
                    event = eventloop.poll() => match event {
                        Ok(Event::Incoming(Packet::ConnAck(_))) => {
                            info!("Connected to broker");
                            if let Err(e) = subscriber.subscribe(step_topic.clone(), QoS::AtMostOnce).await {
                                warn!("Failed to subscribe to {}: {}", step_topic, e);
                            }
                        }
                        Ok(Event::Incoming(Packet::Publish(publish))) => {
                            if publish.topic == step_topic {
                                let payload = String::from_utf8_lossy(&publish.payload).to_string();
                                debug!("Step payload received: {:?}", payload);
                                if step_tx.try_send(payload).is_err() {
                                    warn!("Dropping step command: channel full or closed");
                                }
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            warn!("Broker connection error, retrying: {}", e);
                            tokio::time::sleep(RECONNECT_DELAY).await;
                        }
                    }
                }
            }
            let _ = subscriber.disconnect().await;
            info!("Broker link closed");
        });

        Self { client, event_task }
    }

    pub fn completion_publisher(&self, topic: &str) -> MqttCompletionPublisher {
        MqttCompletionPublisher {
            client: self.client.clone(),
            topic: topic.to_string(),
        }
    }

    pub fn stop(&self) {
        self.event_task.abort();
    }
}

pub struct MqttCompletionPublisher {
    client: AsyncClient,
    topic: String,
}

#[async_trait]
impl CompletionPublisher for MqttCompletionPublisher {
    async fn publish_completion(&self, message: &str) -> Result<(), AppError> {
        self.client
            .publish(self.topic.clone(), QoS::AtMostOnce, false, message.as_bytes())
            .await?;
        info!("Completion published to {}", self.topic);
        Ok(())
    }
}
