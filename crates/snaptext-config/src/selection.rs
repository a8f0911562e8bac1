use std::env;

use serde::{Deserialize, Serialize};

fn default_min_size() -> u32 {
    5
}

fn default_overlay_delay_ms() -> u64 {
    100
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_overlay_opacity() -> f32 {
    0.35
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Smallest accepted width and height in device pixels
    #[serde(default = "default_min_size")]
    pub min_size: u32,
    /// Pause between hiding the main window and showing the overlay
    #[serde(default = "default_overlay_delay_ms")]
    pub overlay_delay_ms: u64,
    /// Pause between tearing down the overlay and grabbing pixels
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: f32,
}

impl SelectionConfig {
    pub fn new() -> Self {
        let settle_delay_ms = env::var("SNAPTEXT_SETTLE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_settle_delay_ms);

        Self {
            settle_delay_ms,
            ..Self::default()
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            overlay_delay_ms: default_overlay_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            overlay_opacity: default_overlay_opacity(),
        }
    }
}
