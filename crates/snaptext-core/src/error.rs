use snaptext_types::{CycleReport, ErrorDialog};

/// Failure of the screen-capture capability.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Failed to enumerate monitors: {0}")]
    Monitors(String),

    #[error("No monitor covers the selected region")]
    OutsideDisplays,

    #[error("Failed to capture monitor '{monitor}': {reason}")]
    Monitor { monitor: String, reason: String },
}

/// Failure of the OCR engine capability.
#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("OCR engine not found or inaccessible")]
    EngineNotFound,

    #[error("{0}")]
    Invocation(String),

    #[error("IO error talking to the OCR engine: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-cycle failures. Each one aborts the current cycle only.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Failed to capture the screen region: {0}")]
    Capture(#[from] CaptureError),

    #[error("Tesseract executable not found or inaccessible")]
    EngineNotFound,

    #[error("An error occurred during text recognition: {0}")]
    EngineInvocation(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl From<RecognizeError> for CycleError {
    fn from(err: RecognizeError) -> Self {
        match err {
            RecognizeError::EngineNotFound => CycleError::EngineNotFound,
            RecognizeError::Invocation(message) => CycleError::EngineInvocation(message),
            RecognizeError::Io(e) => CycleError::EngineInvocation(e.to_string()),
        }
    }
}

impl CycleError {
    pub fn dialog(&self) -> ErrorDialog {
        let (title, message) = match self {
            CycleError::Capture(_) => ("Capture Error", self.to_string()),
            CycleError::EngineNotFound => (
                "Tesseract Error",
                "Tesseract executable not found or inaccessible.\n\
                 Please ensure it's installed correctly."
                    .to_string(),
            ),
            CycleError::EngineInvocation(_) => ("OCR Error", self.to_string()),
            CycleError::Unexpected(_) => ("Error", self.to_string()),
        };

        ErrorDialog {
            title: title.to_string(),
            message,
        }
    }

    pub fn status(&self) -> String {
        match self {
            CycleError::Capture(_) => "Error during capture.".to_string(),
            CycleError::EngineNotFound => "Error: Tesseract not found.".to_string(),
            CycleError::EngineInvocation(_) => "Error during OCR.".to_string(),
            CycleError::Unexpected(_) => "Error: unexpected failure.".to_string(),
        }
    }

    /// Report for a cycle that ended in this error. Existing text is kept.
    pub fn report(&self) -> CycleReport {
        CycleReport {
            text: None,
            status: self.status(),
            dialog: Some(self.dialog()),
            copied: false,
        }
    }
}

/// Fatal configuration problems found before the main window appears.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(
        "Tesseract OCR executable could not be located.\n\n\
         Please ensure:\n\
         1. Tesseract was installed alongside the application, or\n\
         2. Tesseract is in your system PATH.\n\n\
         The application cannot function without Tesseract."
    )]
    EngineNotFound,

    #[error(
        "Tesseract was found in your system PATH, but the application could not access it.\n\n\
         Details: {0}\n\n\
         The application cannot function without accessible Tesseract."
    )]
    EngineInaccessible(String),
}

impl StartupError {
    pub fn dialog(&self) -> ErrorDialog {
        ErrorDialog {
            title: "Tesseract Configuration Error".to_string(),
            message: self.to_string(),
        }
    }
}
