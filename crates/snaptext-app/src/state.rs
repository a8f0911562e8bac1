use std::sync::{Arc, Mutex, PoisonError};

use snaptext_config::Config;
use snaptext_core::pipeline::{ClipboardSink, Pipeline, RecognitionOutcome, report};
use snaptext_core::preprocess::Preprocessor;
use snaptext_io::SystemClipboard;
use snaptext_ocr::{TesseractEngine, XcapCapture};
use snaptext_types::CycleReport;

use crate::status::AppStatus;

pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Pipeline,
    pub clipboard: Mutex<Box<dyn ClipboardSink>>,
    pub status: AppStatus,
}

impl AppState {
    pub fn new(config: Arc<Config>, engine: TesseractEngine) -> Self {
        let pipeline = Pipeline::new(
            Box::new(XcapCapture),
            Box::new(engine),
            Preprocessor::new(config.preprocess.clone()),
        );
        Self::with_parts(config, pipeline, Box::new(SystemClipboard::new()))
    }

    pub fn with_parts(
        config: Arc<Config>,
        pipeline: Pipeline,
        clipboard: Box<dyn ClipboardSink>,
    ) -> Self {
        Self {
            config,
            pipeline,
            clipboard: Mutex::new(clipboard),
            status: AppStatus::new(),
        }
    }

    /// Publishes an outcome through the clipboard. Blocking.
    pub fn publish(&self, outcome: RecognitionOutcome) -> CycleReport {
        let mut clipboard = self.clipboard.lock().unwrap_or_else(PoisonError::into_inner);
        report(outcome, clipboard.as_mut())
    }
}
