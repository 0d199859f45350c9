use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::AppError;

/// Process-wide configuration, loaded once at startup. Defaults cover a
/// working local setup; an optional `depthtouch.toml` and `DEPTHTOUCH_*`
/// environment variables override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub max_zones: usize,
    pub depth_near: f32,
    pub depth_far: f32,
    pub camera_index: u32,
    pub frame_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Zone label -> externally published step number.
    pub step_mapping: IndexMap<String, u32>,
    pub broker: BrokerConfig,
    pub overlay: OverlayConfig,
}

/// Colors and stroke width the renderer applies to the overlay. RGB triples.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub target_color: [u8; 3],
    pub non_target_color: [u8; 3],
    pub text_color: [u8; 3],
    pub line_thickness: u32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            target_color: [0, 255, 0],
            non_target_color: [255, 0, 0],
            text_color: [255, 255, 255],
            line_thickness: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub host: String,
    pub port: u16,
    pub keepalive_secs: u64,
    pub client_id: String,
    pub step_topic: String,
    pub completion_topic: String,
    pub completion_message: String,
}

impl Default for Configuration {
    fn default() -> Self {
        let mut step_mapping = IndexMap::new();
        step_mapping.insert("Box A".to_string(), 1);
        step_mapping.insert("Box B".to_string(), 3);
        step_mapping.insert("Box C".to_string(), 5);
        Self {
            max_zones: 3,
            depth_near: 0.20,
            depth_far: 0.63,
            camera_index: 0,
            frame_buffer_size: 30,
            command_buffer_size: 16,
            step_mapping,
            broker: BrokerConfig::default(),
            overlay: OverlayConfig::default(),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: "broker.emqx.io".to_string(),
            port: 1883,
            keepalive_secs: 60,
            client_id: "depthtouch".to_string(),
            step_topic: "step_click".to_string(),
            completion_topic: "conf_mes".to_string(),
            completion_message: "All targeted boxes touched.".to_string(),
        }
    }
}

impl Configuration {
    /// Load configuration from the optional `depthtouch` file and the
    /// environment, falling back to defaults for anything unset.
    pub fn load() -> Result<Self, AppError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("depthtouch").required(false))
            .add_source(config::Environment::with_prefix("DEPTHTOUCH").separator("__"))
            .build()?;
        let configuration: Configuration = settings.try_deserialize()?;
        configuration.validate().map_err(AppError::Config)?;
        Ok(configuration)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_zones == 0 || self.max_zones > 26 {
            return Err("max_zones must be between 1 and 26".to_string());
        }
        if !(0.0..=1.0).contains(&self.depth_near) || !(0.0..=1.0).contains(&self.depth_far) {
            return Err("depth thresholds must be between 0.0 and 1.0".to_string());
        }
        if self.depth_near >= self.depth_far {
            return Err("depth_near must be below depth_far".to_string());
        }
        if self.step_mapping.is_empty() {
            return Err("step_mapping must not be empty".to_string());
        }
        if self.frame_buffer_size == 0 || self.command_buffer_size == 0 {
            return Err("channel buffer sizes must be greater than 0".to_string());
        }
        if self.overlay.line_thickness == 0 {
            return Err("overlay line_thickness must be greater than 0".to_string());
        }
        Ok(())
    }

    // Overrides the maximum number of zones from the default configuration.
    pub fn with_max_zones(mut self, max_zones: usize) -> Self {
        self.max_zones = max_zones;
        self
    }

    // Overrides the accepted depth window from the default configuration.
    pub fn with_depth_window(mut self, near: f32, far: f32) -> Self {
        self.depth_near = near;
        self.depth_far = far;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let configuration = Configuration::default();
        assert!(configuration.validate().is_ok());
        assert_eq!(configuration.max_zones, 3);
        assert_eq!(configuration.broker.port, 1883);
    }

    #[test]
    fn inverted_depth_window_is_rejected() {
        let configuration = Configuration::default().with_depth_window(0.8, 0.2);
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn zone_cap_is_bounded_by_label_alphabet() {
        assert!(Configuration::default().with_max_zones(27).validate().is_err());
        assert!(Configuration::default().with_max_zones(0).validate().is_err());
        assert!(Configuration::default().with_max_zones(26).validate().is_ok());
    }

    #[test]
    fn zero_line_thickness_is_rejected() {
        let mut configuration = Configuration::default();
        configuration.overlay.line_thickness = 0;
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn default_step_mapping_covers_generated_labels() {
        let configuration = Configuration::default();
        assert_eq!(configuration.step_mapping.get("Box A"), Some(&1));
        assert_eq!(configuration.step_mapping.get("Box B"), Some(&3));
        assert_eq!(configuration.step_mapping.get("Box C"), Some(&5));
    }
}
