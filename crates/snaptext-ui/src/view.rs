use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use slint::{ComponentHandle, Timer, Weak};
use snaptext_config::selection::SelectionConfig;
use snaptext_core::selection::Outline;
use snaptext_core::shell::ShellView;
use snaptext_types::{ErrorDialog, Point};

use crate::{ErrorPopup, MainWindow, OverlayWindow};

/// Pointer and key input from the overlay, in overlay-local device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayInput {
    Down(Point),
    Moved(Point),
    Up(Point),
    Cancel,
}

pub type OverlaySink = Rc<dyn Fn(OverlayInput)>;

/// [`ShellView`] backed by the Slint windows.
pub struct SlintView {
    main: Weak<MainWindow>,
    overlay: Option<OverlayWindow>,
    /// Device pixels per logical pixel of the current overlay
    scale: f32,
    opacity: f32,
    overlay_delay: Duration,
    popups: Vec<ErrorPopup>,
    sink: Option<OverlaySink>,
}

impl SlintView {
    pub fn new(main: Weak<MainWindow>, config: &SelectionConfig) -> Self {
        Self {
            main,
            overlay: None,
            scale: 1.0,
            opacity: config.overlay_opacity,
            overlay_delay: Duration::from_millis(config.overlay_delay_ms),
            popups: Vec::new(),
            sink: None,
        }
    }

    /// Pause between hiding the main window and showing the overlay
    pub fn overlay_delay(&self) -> Duration {
        self.overlay_delay
    }

    /// Where overlay input is delivered. Set once the shell owning this
    /// view exists.
    pub fn set_sink(&mut self, sink: OverlaySink) {
        self.sink = Some(sink);
    }

    fn wire_overlay(&self, overlay: &OverlayWindow) {
        let Some(sink) = self.sink.clone() else {
            tracing::warn!("[SLINT] Overlay has no input sink");
            return;
        };
        let scale = self.scale;

        let s = sink.clone();
        overlay.on_pointer_down(move |x, y| s(OverlayInput::Down(to_device(x, y, scale))));
        let s = sink.clone();
        overlay.on_pointer_moved(move |x, y| s(OverlayInput::Moved(to_device(x, y, scale))));
        let s = sink.clone();
        overlay.on_pointer_up(move |x, y| s(OverlayInput::Up(to_device(x, y, scale))));
        let s = sink.clone();
        overlay.on_cancelled(move || s(OverlayInput::Cancel));

        overlay.window().on_close_requested(move || {
            sink(OverlayInput::Cancel);
            slint::CloseRequestResponse::KeepWindowShown
        });
    }
}

impl ShellView for SlintView {
    fn hide_main(&mut self) {
        if let Some(w) = self.main.upgrade() {
            let _ = w.hide();
            tracing::debug!("[SLINT] Main window hidden");
        }
    }

    fn show_main(&mut self) {
        if let Some(w) = self.main.upgrade() {
            if let Err(e) = w.show() {
                tracing::error!("[SLINT] Failed to show main window: {e}");
            }
            w.window().set_minimized(false);
            tracing::debug!("[SLINT] Main window shown");
        }
    }

    fn open_overlay(&mut self) -> anyhow::Result<Point> {
        self.close_overlay();

        let overlay = OverlayWindow::new().context("Failed to create overlay window")?;
        overlay.set_opacity_level(self.opacity);
        overlay.window().set_fullscreen(true);
        overlay.show().context("Failed to show overlay window")?;

        self.scale = overlay.window().scale_factor();
        self.wire_overlay(&overlay);

        let position = overlay.window().position();
        self.overlay = Some(overlay);
        Ok(Point::new(position.x, position.y))
    }

    fn draw_outline(&mut self, outline: Outline) {
        let Some(overlay) = &self.overlay else {
            return;
        };
        let left = outline.start.x.min(outline.current.x);
        let top = outline.start.y.min(outline.current.y);
        let width = outline.start.x.abs_diff(outline.current.x);
        let height = outline.start.y.abs_diff(outline.current.y);

        overlay.set_sel_x(left as f32 / self.scale);
        overlay.set_sel_y(top as f32 / self.scale);
        overlay.set_sel_width(width as f32 / self.scale);
        overlay.set_sel_height(height as f32 / self.scale);
        overlay.set_sel_visible(true);
    }

    fn close_overlay(&mut self) {
        let Some(overlay) = self.overlay.take() else {
            return;
        };
        overlay.set_sel_visible(false);
        let _ = overlay.hide();
        tracing::debug!("[SLINT] Overlay closed");

        // Closing usually happens from inside one of the overlay's own callbacks
        Timer::single_shot(Duration::ZERO, move || drop(overlay));
    }

    fn set_status(&mut self, status: &str) {
        if let Some(w) = self.main.upgrade() {
            w.set_status(status.into());
        }
    }

    fn set_text(&mut self, text: &str) {
        if let Some(w) = self.main.upgrade() {
            w.set_output_text(text.into());
        }
    }

    fn set_busy(&mut self, busy: bool) {
        if let Some(w) = self.main.upgrade() {
            w.set_busy(busy);
        }
    }

    fn show_error(&mut self, dialog: &ErrorDialog) {
        self.popups.retain(|p| p.window().is_visible());

        let popup = match ErrorPopup::new() {
            Ok(popup) => popup,
            Err(e) => {
                tracing::error!("[SLINT] Could not create error dialog: {e}");
                return;
            }
        };
        popup.set_heading(dialog.title.as_str().into());
        popup.set_message(dialog.message.as_str().into());

        let weak = popup.as_weak();
        popup.on_dismissed(move || {
            if let Some(p) = weak.upgrade() {
                let _ = p.hide();
            }
        });

        if let Err(e) = popup.show() {
            tracing::error!("[SLINT] Could not show error dialog: {e}");
            return;
        }
        self.popups.push(popup);
    }
}

fn to_device(x: f32, y: f32, scale: f32) -> Point {
    Point::new((x * scale).round() as i32, (y * scale).round() as i32)
}
