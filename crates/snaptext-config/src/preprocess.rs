use serde::{Deserialize, Serialize};

fn default_grayscale() -> bool {
    true
}

fn default_threshold() -> u8 {
    150
}

fn default_resize_factor() -> u32 {
    2
}

/// How pixels are prepared before the binary threshold is applied.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    /// Threshold the raw values
    #[default]
    Fixed,
    /// Stretch contrast first, clipping `cutoff_percent` of pixels at each end
    AutoContrast { cutoff_percent: u8 },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PreprocessConfig {
    #[serde(default = "default_grayscale")]
    pub grayscale: bool,
    pub threshold_mode: ThresholdMode,
    /// Values strictly above this become white, the rest black
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    /// Integer upscale factor, 1 disables resizing
    #[serde(default = "default_resize_factor")]
    pub resize_factor: u32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grayscale: default_grayscale(),
            threshold_mode: ThresholdMode::default(),
            threshold: default_threshold(),
            resize_factor: default_resize_factor(),
        }
    }
}
