use serde::{Deserialize, Serialize};

use self::ocr::OcrConfig;
use self::preprocess::{PreprocessConfig, ThresholdMode};
use self::selection::SelectionConfig;
use self::ui::UiConfig;

pub mod ocr;
pub mod preprocess;
pub mod selection;
pub mod ui;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub ocr: OcrConfig,
    pub preprocess: PreprocessConfig,
    pub selection: SelectionConfig,
    pub ui: UiConfig,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("resize factor must be at least 1")]
    ZeroResizeFactor,

    #[error("auto-contrast cutoff must be below 50%, got {0}%")]
    CutoffTooLarge(u8),

    #[error("minimum selection size must be at least 1 pixel")]
    ZeroMinSize,

    #[error("overlay opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),

    #[error("OCR language must not be empty")]
    EmptyLanguage,

    #[error("invalid engine mode (--oem {0})")]
    InvalidOem(u8),

    #[error("invalid page segmentation mode (--psm {0})")]
    InvalidPsm(u8),
}

impl Config {
    /// Defaults plus the optional environment overrides
    pub fn new() -> Self {
        Config {
            ocr: OcrConfig::new(),
            preprocess: PreprocessConfig::default(),
            selection: SelectionConfig::new(),
            ui: UiConfig::new(),
        }
    }

    /// Checks every field once; the returned value is never mutated afterwards.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.preprocess.resize_factor == 0 {
            return Err(ConfigError::ZeroResizeFactor);
        }
        if let ThresholdMode::AutoContrast { cutoff_percent } = self.preprocess.threshold_mode
            && cutoff_percent >= 50
        {
            return Err(ConfigError::CutoffTooLarge(cutoff_percent));
        }
        if self.selection.min_size == 0 {
            return Err(ConfigError::ZeroMinSize);
        }
        if !(0.0..=1.0).contains(&self.selection.overlay_opacity) {
            return Err(ConfigError::InvalidOpacity(self.selection.overlay_opacity));
        }
        if self.ocr.language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        if self.ocr.oem > 3 {
            return Err(ConfigError::InvalidOem(self.ocr.oem));
        }
        if self.ocr.psm > 13 {
            return Err(ConfigError::InvalidPsm(self.ocr.psm));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.oem, 3);
        assert_eq!(config.ocr.psm, 6);
        assert_eq!(config.ocr.bundled_dir, "Tesseract-OCR");
        assert!(config.preprocess.grayscale);
        assert_eq!(config.preprocess.threshold, 150);
        assert_eq!(config.preprocess.threshold_mode, ThresholdMode::Fixed);
        assert_eq!(config.preprocess.resize_factor, 2);
        assert_eq!(config.selection.min_size, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "preprocess": { "threshold_mode": { "auto_contrast": { "cutoff_percent": 10 } } },
            "selection": { "min_size": 8 }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.preprocess.threshold_mode,
            ThresholdMode::AutoContrast { cutoff_percent: 10 }
        );
        assert_eq!(config.preprocess.threshold, 150);
        assert_eq!(config.selection.min_size, 8);
        assert_eq!(config.selection.overlay_delay_ms, 100);
        assert_eq!(config.ocr.psm, 6);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.preprocess.resize_factor = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroResizeFactor));

        let mut config = Config::default();
        config.preprocess.threshold_mode = ThresholdMode::AutoContrast { cutoff_percent: 50 };
        assert_eq!(config.validate(), Err(ConfigError::CutoffTooLarge(50)));

        let mut config = Config::default();
        config.selection.min_size = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinSize));

        let mut config = Config::default();
        config.selection.overlay_opacity = 1.5;
        assert_eq!(config.validate(), Err(ConfigError::InvalidOpacity(1.5)));

        let mut config = Config::default();
        config.ocr.language = "  ".to_string();
        assert_eq!(config.validate(), Err(ConfigError::EmptyLanguage));

        let mut config = Config::default();
        config.ocr.psm = 14;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPsm(14)));
    }
}
