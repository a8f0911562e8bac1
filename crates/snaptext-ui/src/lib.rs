use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use kanal::{AsyncReceiver, AsyncSender};
use slint::{ComponentHandle, Timer, TimerMode};
use snaptext_config::Config;
use snaptext_core::shell::{CycleBackend, Shell, ShellView};
use snaptext_io::HotkeyManager;
use snaptext_types::{AppEvent, ErrorDialog, ScreenRect};

mod events;
mod view;

pub use events::handle_events;
pub use view::{OverlayInput, SlintView};

slint::include_modules!();

pub type AppShell = Shell<SlintView, ChannelBackend>;

const HOTKEY_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Hands finished selections to the backend event loop.
pub struct ChannelBackend {
    tx: AsyncSender<AppEvent>,
}

impl ChannelBackend {
    pub fn new(tx: AsyncSender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl CycleBackend for ChannelBackend {
    fn submit(&mut self, rect: ScreenRect) -> anyhow::Result<()> {
        match self.tx.try_send(AppEvent::TriggerOcr(rect)) {
            Ok(true) => Ok(()),
            Ok(false) => anyhow::bail!("Recognition queue is full"),
            Err(e) => Err(anyhow::anyhow!("Backend is not running: {e}")),
        }
    }
}

/// Runs the UI on the calling thread until the main window is closed.
pub fn ui_loop(
    config: Arc<Config>,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let main = MainWindow::new()?;

    let view = SlintView::new(main.as_weak(), &config.selection);
    let shell = Rc::new(RefCell::new(Shell::new(
        view,
        ChannelBackend::new(ui_to_app_tx),
        config.selection.min_size,
    )));

    // Overlay input
    {
        let weak = Rc::downgrade(&shell);
        shell
            .borrow_mut()
            .view_mut()
            .set_sink(Rc::new(move |input: OverlayInput| {
                if let Some(shell) = weak.upgrade() {
                    events::handle_overlay_input(input, &shell);
                }
            }));
    }

    // Select button
    {
        let weak = Rc::downgrade(&shell);
        main.on_start_selection(move || {
            if let Some(shell) = weak.upgrade() {
                start_selection(&shell);
            }
        });
    }

    // Global hotkey, polled on the UI thread that owns the registration
    let hotkey_timer = Timer::default();
    let _hotkey = if config.ui.hotkey_enabled {
        match HotkeyManager::new() {
            Ok(hotkey) => {
                let hotkey = Rc::new(hotkey);
                let polled = hotkey.clone();
                let weak = Rc::downgrade(&shell);
                hotkey_timer.start(TimerMode::Repeated, HOTKEY_POLL_INTERVAL, move || {
                    if polled.poll()
                        && let Some(shell) = weak.upgrade()
                    {
                        tracing::info!("Hotkey triggered selection");
                        start_selection(&shell);
                    }
                });
                tracing::info!("Registered Ctrl+Shift+S hotkey");
                Some(hotkey)
            }
            Err(e) => {
                tracing::warn!("Global hotkey unavailable: {e:#}");
                None
            }
        }
    } else {
        None
    };

    // Spawn a task to receive events from the app
    {
        let shell = shell.clone();
        slint::spawn_local(async move {
            while let Ok(event) = app_to_ui_rx.recv().await {
                handle_events(event, &shell);
            }
            tracing::debug!("[SLINT] Backend channel closed");
            slint::quit_event_loop().ok();
        })
        .context("Failed to spawn UI event receiver")?;
    }

    main.window().on_close_requested(|| {
        slint::quit_event_loop().ok();
        slint::CloseRequestResponse::HideWindow
    });

    main.show()?;

    // The main window is hidden during every selection, so the loop must not
    // end when no window is visible
    slint::run_event_loop_until_quit()?;

    hotkey_timer.stop();
    teardown(&shell);
    tracing::info!("UI loop exited");
    Ok(())
}

/// Drops a selection left open when the loop quit mid-drag.
fn teardown(shell: &RefCell<AppShell>) {
    let mut shell = shell.borrow_mut();
    if !shell.is_ready() {
        tracing::debug!("[SLINT] Quitting during a cycle, phase {:?}", shell.phase());
    }
    shell.view_mut().close_overlay();
}

/// Hides the main window now and shows the overlay once it is gone.
pub(crate) fn start_selection(shell: &Rc<RefCell<AppShell>>) {
    let delay = {
        let Ok(mut shell) = shell.try_borrow_mut() else {
            return;
        };
        if !shell.start_selection() {
            return;
        }
        shell.view().overlay_delay()
    };

    let weak = Rc::downgrade(shell);
    Timer::single_shot(delay, move || {
        if let Some(shell) = weak.upgrade() {
            shell.borrow_mut().open_overlay();
        }
    });
}

/// Blocking dialog for startup failures, shown before the main loop runs.
pub fn show_fatal_error(dialog: &ErrorDialog) -> anyhow::Result<()> {
    let popup = ErrorPopup::new()?;
    popup.set_heading(dialog.title.as_str().into());
    popup.set_message(dialog.message.as_str().into());

    let weak = popup.as_weak();
    popup.on_dismissed(move || {
        if let Some(p) = weak.upgrade() {
            let _ = p.hide();
        }
    });

    popup.run()?;
    Ok(())
}
