//! Application shell state machine.
//!
//! The shell owns the ready / selecting / recognizing cycle and talks to
//! the windowing layer only through [`ShellView`], and to the recognition
//! backend only through [`CycleBackend`]. Main window and overlay are never
//! visible together, and every path out of a cycle ends in
//! [`ShellView::show_main`].

use std::mem;

use snaptext_types::{CycleReport, ErrorDialog, Point, ScreenRect};

use crate::error::CycleError;
use crate::pipeline::Stage;
use crate::selection::{CancelReason, Outline, SelectionOutcome, SelectionSession};

pub const READY_STATUS: &str = "Ready.";
pub const SELECTING_STATUS: &str = "Click and drag to select region. Press Esc to cancel.";

/// Window operations the shell needs from the UI toolkit.
pub trait ShellView {
    fn hide_main(&mut self);
    /// Shows and focuses the main window
    fn show_main(&mut self);
    /// Creates the fullscreen overlay and returns its screen origin
    fn open_overlay(&mut self) -> anyhow::Result<Point>;
    fn draw_outline(&mut self, outline: Outline);
    /// Destroys the overlay and everything drawn on it; a no-op when closed
    fn close_overlay(&mut self);
    fn set_status(&mut self, status: &str);
    fn set_text(&mut self, text: &str);
    fn set_busy(&mut self, busy: bool);
    fn show_error(&mut self, dialog: &ErrorDialog);
}

/// Runs capture and recognition for a finished selection. The result comes
/// back later through [`Shell::cycle_finished`].
pub trait CycleBackend {
    fn submit(&mut self, rect: ScreenRect) -> anyhow::Result<()>;
}

#[derive(Debug)]
pub enum Phase {
    Ready,
    /// Main window hidden, overlay not shown yet
    Arming,
    Selecting(SelectionSession),
    Recognizing,
}

pub struct Shell<V, B> {
    view: V,
    backend: B,
    min_size: u32,
    phase: Phase,
}

impl<V: ShellView, B: CycleBackend> Shell<V, B> {
    pub fn new(mut view: V, backend: B, min_size: u32) -> Self {
        view.set_status(READY_STATUS);
        Self {
            view,
            backend,
            min_size,
            phase: Phase::Ready,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready)
    }

    /// Hides the main window. The caller shows the overlay after a short
    /// delay with [`Shell::open_overlay`]. Returns `false` while a cycle
    /// is already running.
    pub fn start_selection(&mut self) -> bool {
        if !self.is_ready() {
            tracing::debug!("Selection requested while busy, ignoring");
            return false;
        }

        self.view.set_busy(true);
        self.view.hide_main();
        self.phase = Phase::Arming;
        true
    }

    pub fn open_overlay(&mut self) {
        if !matches!(self.phase, Phase::Arming) {
            return;
        }

        match self.view.open_overlay() {
            Ok(origin) => {
                tracing::debug!(?origin, "Overlay shown");
                self.phase = Phase::Selecting(SelectionSession::new(origin, self.min_size));
                self.view.set_status(SELECTING_STATUS);
            }
            Err(e) => {
                tracing::error!("Error creating selection window: {e:#}");
                self.view.close_overlay();
                self.view.show_error(&ErrorDialog {
                    title: "Window Error".to_string(),
                    message: "Could not create selection overlay.\n\
                              Ensure your graphics environment supports transparency."
                        .to_string(),
                });
                self.finish(SelectionOutcome::Cancelled(CancelReason::OverlayFailed(
                    e.to_string(),
                )));
            }
        }
    }

    pub fn pointer_down(&mut self, local: Point) {
        if let Phase::Selecting(session) = &mut self.phase {
            let outline = session.pointer_down(local);
            self.view.draw_outline(outline);
        }
    }

    pub fn pointer_move(&mut self, local: Point) {
        if let Phase::Selecting(session) = &mut self.phase
            && let Some(outline) = session.pointer_move(local)
        {
            self.view.draw_outline(outline);
        }
    }

    pub fn pointer_up(&mut self, local: Point) {
        match mem::replace(&mut self.phase, Phase::Recognizing) {
            Phase::Selecting(session) => self.finish(session.pointer_up(local)),
            other => self.phase = other,
        }
    }

    /// Escape key or the overlay being dismissed by the window system.
    pub fn cancel(&mut self) {
        match mem::replace(&mut self.phase, Phase::Recognizing) {
            Phase::Selecting(session) => self.finish(session.cancel()),
            Phase::Arming => self.finish(SelectionOutcome::Cancelled(CancelReason::UserCancelled)),
            other => self.phase = other,
        }
    }

    /// Stage progress from the backend while recognizing.
    pub fn status_update(&mut self, status: &str) {
        if matches!(self.phase, Phase::Recognizing) {
            self.view.set_status(status);
        }
    }

    pub fn cycle_finished(&mut self, report: CycleReport) {
        if !matches!(self.phase, Phase::Recognizing) {
            tracing::warn!("Cycle report received outside of a cycle");
        }

        if let Some(text) = &report.text {
            self.view.set_text(text);
        }
        self.view.set_status(&report.status);
        if let Some(dialog) = &report.dialog {
            self.view.show_error(dialog);
        }
        self.restore();
    }

    fn finish(&mut self, outcome: SelectionOutcome) {
        // Capturing with the overlay still up would grab the overlay itself
        self.view.close_overlay();

        match outcome {
            SelectionOutcome::Completed(rect) => {
                tracing::info!(?rect, "Region selected");
                self.phase = Phase::Recognizing;
                self.view.set_status(Stage::Capturing.status());

                if let Err(e) = self.backend.submit(rect) {
                    let err = CycleError::Unexpected(format!("{e:#}"));
                    tracing::error!("Failed to start recognition: {err}");
                    self.cycle_finished(err.report());
                }
            }
            SelectionOutcome::Cancelled(reason) => {
                tracing::debug!(?reason, "Selection cancelled");
                self.view.set_status(reason.status());
                self.restore();
            }
        }
    }

    fn restore(&mut self) {
        self.phase = Phase::Ready;
        self.view.set_busy(false);
        self.view.show_main();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use image::{DynamicImage, RgbaImage};
    use snaptext_config::preprocess::PreprocessConfig;

    use super::*;
    use crate::error::{CaptureError, RecognizeError};
    use crate::pipeline::{ClipboardSink, Pipeline, ScreenCapture, TextRecognizer, report};
    use crate::preprocess::Preprocessor;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    struct RecordingView {
        log: Log,
        main_visible: bool,
        overlay_visible: bool,
        fail_overlay: bool,
        status: String,
        text: String,
        outlines: Vec<Outline>,
        errors: Vec<ErrorDialog>,
    }

    impl RecordingView {
        fn new(log: Log) -> Self {
            Self {
                log,
                main_visible: true,
                overlay_visible: false,
                fail_overlay: false,
                status: String::new(),
                text: String::new(),
                outlines: Vec::new(),
                errors: Vec::new(),
            }
        }
    }

    impl ShellView for RecordingView {
        fn hide_main(&mut self) {
            push(&self.log, "hide_main");
            self.main_visible = false;
        }

        fn show_main(&mut self) {
            assert!(!self.overlay_visible, "main shown over a live overlay");
            push(&self.log, "show_main");
            self.main_visible = true;
        }

        fn open_overlay(&mut self) -> anyhow::Result<Point> {
            assert!(!self.main_visible, "overlay shown over the main window");
            if self.fail_overlay {
                anyhow::bail!("transparency not supported");
            }
            push(&self.log, "open_overlay");
            self.overlay_visible = true;
            Ok(Point::new(0, 0))
        }

        fn draw_outline(&mut self, outline: Outline) {
            self.outlines.push(outline);
        }

        fn close_overlay(&mut self) {
            push(&self.log, "close_overlay");
            self.overlay_visible = false;
        }

        fn set_status(&mut self, status: &str) {
            self.status = status.to_string();
        }

        fn set_text(&mut self, text: &str) {
            self.text = text.to_string();
        }

        fn set_busy(&mut self, _busy: bool) {}

        fn show_error(&mut self, dialog: &ErrorDialog) {
            push(&self.log, format!("error:{}", dialog.title));
            self.errors.push(dialog.clone());
        }
    }

    struct LoggingCapture(Log);

    impl ScreenCapture for LoggingCapture {
        fn capture(&self, rect: ScreenRect) -> Result<DynamicImage, CaptureError> {
            push(&self.0, "capture");
            Ok(DynamicImage::ImageRgba8(RgbaImage::new(rect.width(), rect.height())))
        }
    }

    struct Hello;

    impl TextRecognizer for Hello {
        fn recognize(&self, _: &DynamicImage) -> Result<String, RecognizeError> {
            Ok("Hello\n".to_string())
        }
    }

    #[derive(Default, Clone)]
    struct SharedClipboard(Arc<Mutex<Option<String>>>);

    impl ClipboardSink for SharedClipboard {
        fn set_text(&mut self, text: &str) -> anyhow::Result<()> {
            *self.0.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    /// Runs the pipeline inline and parks the report for the test to deliver.
    struct InlineBackend {
        pipeline: Pipeline,
        clipboard: SharedClipboard,
        reports: Vec<CycleReport>,
        refuse: bool,
    }

    impl CycleBackend for InlineBackend {
        fn submit(&mut self, rect: ScreenRect) -> anyhow::Result<()> {
            if self.refuse {
                anyhow::bail!("backend gone");
            }
            let outcome = self.pipeline.process(rect);
            self.reports.push(report(outcome, &mut self.clipboard));
            Ok(())
        }
    }

    fn shell(log: &Log) -> Shell<RecordingView, InlineBackend> {
        let backend = InlineBackend {
            pipeline: Pipeline::new(
                Box::new(LoggingCapture(log.clone())),
                Box::new(Hello),
                Preprocessor::new(PreprocessConfig::default()),
            ),
            clipboard: SharedClipboard::default(),
            reports: Vec::new(),
            refuse: false,
        };
        Shell::new(RecordingView::new(log.clone()), backend, 5)
    }

    fn deliver(shell: &mut Shell<RecordingView, InlineBackend>) {
        let report = shell.backend.reports.pop().expect("no report produced");
        shell.cycle_finished(report);
    }

    #[test]
    fn test_successful_cycle() {
        let log = Log::default();
        let mut shell = shell(&log);
        assert_eq!(shell.view().status, READY_STATUS);

        assert!(shell.start_selection());
        shell.open_overlay();
        assert_eq!(shell.view().status, SELECTING_STATUS);

        shell.pointer_down(Point::new(300, 200));
        shell.pointer_move(Point::new(250, 150));
        shell.pointer_move(Point::new(100, 100));
        shell.pointer_up(Point::new(100, 100));
        assert!(matches!(shell.phase(), Phase::Recognizing));

        deliver(&mut shell);

        assert!(shell.is_ready());
        assert_eq!(shell.view().text, "Hello");
        assert_eq!(shell.view().status, "Text extracted and copied to clipboard.");
        assert_eq!(shell.backend.clipboard.0.lock().unwrap().as_deref(), Some("Hello"));
        assert_eq!(shell.view().outlines.len(), 3);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["hide_main", "open_overlay", "close_overlay", "capture", "show_main"]
        );
    }

    #[test]
    fn test_overlay_closed_before_capture() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.start_selection();
        shell.open_overlay();
        shell.pointer_down(Point::new(10, 10));
        shell.pointer_up(Point::new(90, 60));

        let log = log.lock().unwrap();
        let closed = log.iter().position(|e| e == "close_overlay").unwrap();
        let captured = log.iter().position(|e| e == "capture").unwrap();
        assert!(closed < captured);
    }

    #[test]
    fn test_too_small_selection_restores_main() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.start_selection();
        shell.open_overlay();
        shell.pointer_down(Point::new(100, 100));
        shell.pointer_up(Point::new(100, 100));

        assert!(shell.is_ready());
        assert_eq!(shell.view().status, "Selection too small, please try again.");
        assert!(shell.backend.reports.is_empty());
        assert_eq!(
            *log.lock().unwrap(),
            vec!["hide_main", "open_overlay", "close_overlay", "show_main"]
        );
    }

    #[test]
    fn test_escape_while_dragging() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.start_selection();
        shell.open_overlay();
        shell.pointer_down(Point::new(0, 0));
        shell.pointer_move(Point::new(400, 400));
        shell.cancel();

        assert!(shell.is_ready());
        assert_eq!(shell.view().status, "Selection cancelled.");
        assert!(!log.lock().unwrap().contains(&"capture".to_string()));
        assert!(shell.view().main_visible);
    }

    #[test]
    fn test_cancel_before_overlay_appears() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.start_selection();
        shell.cancel();
        // the delayed overlay must not show up afterwards
        shell.open_overlay();

        assert!(shell.is_ready());
        assert!(!log.lock().unwrap().contains(&"open_overlay".to_string()));
        assert!(shell.view().main_visible);
    }

    #[test]
    fn test_overlay_failure_keeps_app_running() {
        let log = Log::default();
        let mut shell = shell(&log);
        shell.view_mut().fail_overlay = true;

        shell.start_selection();
        shell.open_overlay();

        assert!(shell.is_ready());
        assert_eq!(shell.view().errors[0].title, "Window Error");
        assert!(shell.view().main_visible);
        assert!(shell.start_selection());
    }

    #[test]
    fn test_busy_shell_ignores_new_selection() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.start_selection();
        shell.open_overlay();
        assert!(!shell.start_selection());

        shell.pointer_down(Point::new(0, 0));
        shell.pointer_up(Point::new(50, 50));
        assert!(!shell.start_selection());

        deliver(&mut shell);
        assert!(shell.start_selection());
    }

    #[test]
    fn test_backend_refusal_restores_main() {
        let log = Log::default();
        let mut shell = shell(&log);
        shell.backend.refuse = true;

        shell.start_selection();
        shell.open_overlay();
        shell.pointer_down(Point::new(0, 0));
        shell.pointer_up(Point::new(50, 50));

        assert!(shell.is_ready());
        assert_eq!(shell.view().errors[0].title, "Error");
        assert!(shell.view().main_visible);
    }

    #[test]
    fn test_failed_cycle_leaves_text_untouched() {
        let log = Log::default();
        let mut shell = shell(&log);
        shell.view_mut().text = "previous".to_string();

        shell.start_selection();
        shell.open_overlay();
        shell.pointer_down(Point::new(0, 0));
        shell.pointer_up(Point::new(50, 50));
        shell.backend.reports.clear();

        shell.cycle_finished(CycleError::EngineNotFound.report());

        assert_eq!(shell.view().text, "previous");
        assert_eq!(shell.view().status, "Error: Tesseract not found.");
        assert_eq!(shell.view().errors[0].title, "Tesseract Error");
        assert!(shell.is_ready());
    }

    #[test]
    fn test_status_updates_only_while_recognizing() {
        let log = Log::default();
        let mut shell = shell(&log);

        shell.status_update("Performing OCR...");
        assert_eq!(shell.view().status, READY_STATUS);
    }
}
