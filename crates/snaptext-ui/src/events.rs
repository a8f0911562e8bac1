use std::cell::RefCell;
use std::rc::Rc;

use snaptext_core::shell::{READY_STATUS, ShellView};
use snaptext_types::AppEvent;

use crate::AppShell;
use crate::view::OverlayInput;

/// Applies a backend event to the shell. Runs on the UI thread.
pub fn handle_events(event: AppEvent, shell: &Rc<RefCell<AppShell>>) {
    match event {
        AppEvent::OcrStatusUpdate { status } => {
            tracing::debug!("[SLINT] OCR status: {}", status);
            shell.borrow_mut().status_update(&status);
        }
        AppEvent::CycleFinished(report) => {
            tracing::debug!(
                "[SLINT] Cycle finished: {} (copied: {})",
                report.status,
                report.copied
            );
            shell.borrow_mut().cycle_finished(report);
        }
        AppEvent::BackendReady => {
            tracing::debug!("[SLINT] Backend ready");
            let mut shell = shell.borrow_mut();
            if shell.is_ready() {
                shell.view_mut().set_status(READY_STATUS);
            }
        }
        AppEvent::TriggerOcr(_) => {}
    }
}

/// Routes overlay input into the shell.
pub fn handle_overlay_input(input: OverlayInput, shell: &RefCell<AppShell>) {
    let Ok(mut shell) = shell.try_borrow_mut() else {
        tracing::warn!("[SLINT] Overlay input {:?} dropped, shell busy", input);
        return;
    };

    match input {
        OverlayInput::Down(point) => shell.pointer_down(point),
        OverlayInput::Moved(point) => shell.pointer_move(point),
        OverlayInput::Up(point) => shell.pointer_up(point),
        OverlayInput::Cancel => shell.cancel(),
    }
}
