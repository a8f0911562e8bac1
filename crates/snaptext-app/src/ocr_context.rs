use std::sync::Arc;

use kanal::AsyncSender;
use snaptext_types::AppEvent;

use crate::state::AppState;

/// Shared dependencies of a capture cycle, cheap to clone into tasks.
#[derive(Clone)]
pub struct OcrContext {
    pub state: Arc<AppState>,
    pub event_tx: AsyncSender<AppEvent>,
}

impl OcrContext {
    pub fn new(state: Arc<AppState>, event_tx: AsyncSender<AppEvent>) -> Self {
        Self { state, event_tx }
    }

    /// Status line update; dropped if the UI is not keeping up.
    pub fn send_status(&self, status: &str) {
        let event = AppEvent::OcrStatusUpdate {
            status: status.to_string(),
        };
        if !matches!(self.event_tx.try_send(event), Ok(true)) {
            tracing::debug!("Status update '{}' dropped", status);
        }
    }
}
