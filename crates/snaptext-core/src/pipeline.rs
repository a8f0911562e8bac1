use image::DynamicImage;
use snaptext_types::{CycleReport, ScreenRect};

use crate::error::{CaptureError, CycleError, RecognizeError};
use crate::preprocess::Preprocessor;

/// Grabs the pixels of a screen-absolute rectangle, across all displays.
pub trait ScreenCapture: Send + Sync {
    fn capture(&self, rect: ScreenRect) -> Result<DynamicImage, CaptureError>;
}

/// Turns a prepared image into text.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<String, RecognizeError>;
}

/// Receives recognized text.
pub trait ClipboardSink: Send {
    fn set_text(&mut self, text: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Capturing,
    Preprocessing,
    Recognizing,
}

impl Stage {
    pub fn status(&self) -> &'static str {
        match self {
            Stage::Capturing => "Capturing region...",
            Stage::Preprocessing => "Processing image...",
            Stage::Recognizing => "Performing OCR...",
        }
    }
}

#[derive(Debug)]
pub enum RecognitionOutcome {
    Text(String),
    /// The engine ran fine but returned only whitespace
    NothingDetected,
    Failed(CycleError),
}

/// Capture, preprocess, recognize. No retries.
pub struct Pipeline {
    capture: Box<dyn ScreenCapture>,
    recognizer: Box<dyn TextRecognizer>,
    preprocessor: Preprocessor,
}

impl Pipeline {
    pub fn new(
        capture: Box<dyn ScreenCapture>,
        recognizer: Box<dyn TextRecognizer>,
        preprocessor: Preprocessor,
    ) -> Self {
        Self {
            capture,
            recognizer,
            preprocessor,
        }
    }

    pub fn process(&self, rect: ScreenRect) -> RecognitionOutcome {
        self.process_with(rect, |_| {})
    }

    /// Like [`Pipeline::process`], calling `on_stage` as each step begins.
    pub fn process_with(&self, rect: ScreenRect, mut on_stage: impl FnMut(Stage)) -> RecognitionOutcome {
        on_stage(Stage::Capturing);
        let screenshot = match self.capture.capture(rect) {
            Ok(image) => image,
            Err(e) => {
                tracing::error!("Error grabbing screenshot: {e}");
                return RecognitionOutcome::Failed(e.into());
            }
        };
        tracing::debug!(
            "Captured {}x{} from {:?}",
            screenshot.width(),
            screenshot.height(),
            rect
        );

        on_stage(Stage::Preprocessing);
        let processed = self.preprocessor.process(&screenshot);

        on_stage(Stage::Recognizing);
        match self.recognizer.recognize(&processed) {
            Ok(text) => finalize(&text),
            Err(e) => {
                tracing::error!("OCR failed: {e}");
                RecognitionOutcome::Failed(e.into())
            }
        }
    }
}

pub fn finalize(raw: &str) -> RecognitionOutcome {
    let text = raw.trim();
    if text.is_empty() {
        RecognitionOutcome::NothingDetected
    } else {
        RecognitionOutcome::Text(text.to_string())
    }
}

/// Renders an outcome for the UI, copying non-empty text to the clipboard.
pub fn report(outcome: RecognitionOutcome, clipboard: &mut dyn ClipboardSink) -> CycleReport {
    match outcome {
        RecognitionOutcome::Text(text) => {
            let (status, copied) = match clipboard.set_text(&text) {
                Ok(()) => ("Text extracted and copied to clipboard.", true),
                Err(e) => {
                    tracing::warn!("Error copying to clipboard: {e:#}");
                    ("Text extracted (clipboard error).", false)
                }
            };
            CycleReport {
                text: Some(text),
                status: status.to_string(),
                dialog: None,
                copied,
            }
        }
        RecognitionOutcome::NothingDetected => CycleReport {
            text: Some(String::new()),
            status: "OCR finished, but no text detected.".to_string(),
            dialog: None,
            copied: false,
        },
        RecognitionOutcome::Failed(e) => e.report(),
    }
}
