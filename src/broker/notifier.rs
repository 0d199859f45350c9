use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::AppError;
use crate::interaction::registry::SharedRegistry;

/// Outbound completion boundary. Delivery is fire-and-forget, at most once.
#[async_trait]
pub trait CompletionPublisher: Send + Sync {
    async fn publish_completion(&self, message: &str) -> Result<(), AppError>;
}

/// Publisher for broker-less (degraded) operation.
pub struct NullPublisher;

#[async_trait]
impl CompletionPublisher for NullPublisher {
    async fn publish_completion(&self, message: &str) -> Result<(), AppError> {
        info!("Completion (no broker attached): {}", message);
        Ok(())
    }
}

/// Watches the registry after every evaluator pass and publishes the
/// completion notification on the first frame where every zone is touched.
/// The published flag is claimed in the same registry observation, so the
/// publish is attempted at most once per session even when it fails.
pub struct CompletionNotifier {
    publisher: Box<dyn CompletionPublisher>,
    message: String,
}

impl CompletionNotifier {
    pub fn new(publisher: Box<dyn CompletionPublisher>, message: String) -> Self {
        Self { publisher, message }
    }

    /// Returns true on the single firing observation of the session.
    pub async fn observe(&mut self, registry: &SharedRegistry) -> bool {
        let fire = registry.lock().try_mark_completion_published();
        if fire {
            if let Err(e) = self.publisher.publish_completion(&self.message).await {
                warn!("Completion publish failed, continuing without broker: {}", e);
            }
        }
        fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingPublisher {
        published: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CompletionPublisher for CountingPublisher {
        async fn publish_completion(&self, _message: &str) -> Result<(), AppError> {
            self.published.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingPublisher;

    #[async_trait]
    impl CompletionPublisher for FailingPublisher {
        async fn publish_completion(&self, _message: &str) -> Result<(), AppError> {
            Err(AppError::Broker("connection lost".to_string()))
        }
    }

    fn completed_registry() -> SharedRegistry {
        let registry = SharedRegistry::new(3);
        {
            let mut guard = registry.lock();
            guard.start_draw(0, 0);
            guard.finish_draw(50, 50);
            guard.mark_touched("Box A");
        }
        registry
    }

    #[tokio::test]
    async fn publishes_exactly_once_across_repeated_observations() {
        let published = Arc::new(AtomicUsize::new(0));
        let mut notifier = CompletionNotifier::new(
            Box::new(CountingPublisher {
                published: published.clone(),
            }),
            "All targeted boxes touched.".to_string(),
        );
        let registry = completed_registry();

        assert!(notifier.observe(&registry).await);
        for _ in 0..5 {
            assert!(!notifier.observe(&registry).await);
        }
        assert_eq!(published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_registry_never_publishes() {
        let published = Arc::new(AtomicUsize::new(0));
        let mut notifier = CompletionNotifier::new(
            Box::new(CountingPublisher {
                published: published.clone(),
            }),
            "done".to_string(),
        );
        let registry = SharedRegistry::new(3);
        assert!(!notifier.observe(&registry).await);
        assert_eq!(published.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn publish_failure_does_not_retrigger() {
        let mut notifier =
            CompletionNotifier::new(Box::new(FailingPublisher), "done".to_string());
        let registry = completed_registry();
        assert!(notifier.observe(&registry).await);
        assert!(!notifier.observe(&registry).await);
        assert!(registry.lock().completion_published());
    }
}
