pub mod broker;
pub mod capture;
pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod feedback;
pub mod input;
pub mod interaction;
pub mod perception;
pub mod pipeline;

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::AppError;
pub use interaction::{SessionPhase, SharedRegistry, TouchEvent, ZoneRegistry};
pub use pipeline::{OverlayPlan, OverlayStyle};
