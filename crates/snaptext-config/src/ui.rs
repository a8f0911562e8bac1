use std::env;

use serde::{Deserialize, Serialize};

fn default_hotkey_enabled() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Ctrl+Shift+S starts a selection
    #[serde(default = "default_hotkey_enabled")]
    pub hotkey_enabled: bool,
}

impl UiConfig {
    pub fn new() -> Self {
        let hotkey_enabled = env::var("SNAPTEXT_HOTKEY")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off"))
            .unwrap_or_else(|_| default_hotkey_enabled());

        Self { hotkey_enabled }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            hotkey_enabled: default_hotkey_enabled(),
        }
    }
}
