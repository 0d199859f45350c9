pub mod mqtt;
pub mod notifier;
pub mod target_selector;

pub use mqtt::MqttLink;
pub use notifier::{CompletionNotifier, CompletionPublisher, NullPublisher};
pub use target_selector::TargetSelector;
