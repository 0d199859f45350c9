use thiserror::Error;

// Main application error type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Camera error: {0}")]
    Camera(String),
    #[error("Broker error: {0}")]
    Broker(String),
    #[error("Channel error: {0}")]
    Channel(String),
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<rumqttc::ClientError> for AppError {
    fn from(err: rumqttc::ClientError) -> Self {
        AppError::Broker(err.to_string())
    }
}
