mod capture;
mod locate;
mod ocr;

pub use capture::{XcapCapture, capture_screen_region};
pub use locate::{EngineLocation, Locator, locate};
pub use ocr::TesseractEngine;
