use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_bundled_dir() -> String {
    "Tesseract-OCR".to_string()
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_oem() -> u8 {
    3
}

/// Assume a single uniform block of text
fn default_psm() -> u8 {
    6
}

fn default_fallback_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(windows) {
        &[
            r"C:\Program Files\Tesseract-OCR\tesseract.exe",
            r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &["/opt/homebrew/bin/tesseract", "/usr/local/bin/tesseract"]
    } else {
        &["/usr/bin/tesseract", "/usr/local/bin/tesseract"]
    };

    paths.iter().map(PathBuf::from).collect()
}

/// Tesseract engine settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OcrConfig {
    /// Explicit engine path, checked before anything else
    pub override_path: Option<PathBuf>,
    /// Subdirectory of the application directory holding a bundled engine
    #[serde(default = "default_bundled_dir")]
    pub bundled_dir: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_oem")]
    pub oem: u8,
    #[serde(default = "default_psm")]
    pub psm: u8,
    /// Platform-conventional install locations, checked last
    #[serde(default = "default_fallback_paths")]
    pub fallback_paths: Vec<PathBuf>,
}

impl OcrConfig {
    pub fn new() -> Self {
        let override_path = env::var_os("SNAPTEXT_TESSERACT_CMD")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        Self {
            override_path,
            ..Self::default()
        }
    }

    /// Platform-specific engine executable name
    pub fn executable_name(&self) -> &'static str {
        if cfg!(windows) {
            "tesseract.exe"
        } else {
            "tesseract"
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            override_path: None,
            bundled_dir: default_bundled_dir(),
            language: default_language(),
            oem: default_oem(),
            psm: default_psm(),
            fallback_paths: default_fallback_paths(),
        }
    }
}
