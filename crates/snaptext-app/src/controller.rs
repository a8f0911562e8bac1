use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use snaptext_types::AppEvent;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::ocr_context::OcrContext;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(64), // stage updates and reports
            ui_to_app: kanal::bounded_async(8),  // one selection at a time
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks(&self, handle: &Handle) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        let ctx = OcrContext::new(self.state.clone(), self.channels.app_to_ui.0.clone());
        tasks.spawn_on(
            event_loop(
                ctx,
                self.channels.ui_to_app.1.clone(),
                self.cancel_token.child_token(),
            ),
            handle,
        );

        tasks
    }

    /// Receiver and sender for the UI side
    pub fn ui_channels(&self) -> (AsyncReceiver<AppEvent>, AsyncSender<AppEvent>) {
        (
            self.channels.app_to_ui.1.clone(),
            self.channels.ui_to_app.0.clone(),
        )
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
