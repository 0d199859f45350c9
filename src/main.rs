use depthtouch::config::Configuration;
use depthtouch::coordinator::CoordinatorBuilder;
use depthtouch::error::AppError;
use depthtouch::perception::synthetic::{SweepingHandDetector, SyntheticSource, UniformDepthEstimator};
use tracing::{info, Level};

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    init_logging();
    let configuration = Configuration::load()?;

    // Simulation collaborators by default; deployments swap in their camera
    // and model integrations through the same builder seams.
    let mut coordinator = CoordinatorBuilder::new(configuration)
        .frame_source(Box::new(SyntheticSource::new(640, 480)))
        .hand_detector(Box::new(SweepingHandDetector::new()))
        .depth_estimator(Box::new(UniformDepthEstimator::new(102)))
        .build()?;

    info!("depthtouch running; press Ctrl-C to quit");
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| AppError::Channel(e.to_string()))?;

    coordinator.stop();
    Ok(())
}
