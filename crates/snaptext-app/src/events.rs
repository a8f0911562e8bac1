use kanal::AsyncReceiver;
use snaptext_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::ocr_context::OcrContext;

pub mod trigger_ocr;

use trigger_ocr::handle_ocr_trigger;

/// App's main loop
pub async fn event_loop(
    ctx: OcrContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if ctx.event_tx.send(AppEvent::BackendReady).await.is_err() {
        tracing::warn!("[EVENT_LOOP] UI gone before backend was ready");
    }

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Shutdown requested");
                return Ok(());
            }
            event = ui_to_app_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => {
                    tracing::info!("[EVENT_LOOP] UI channel closed");
                    return Ok(());
                }
            },
        };

        tracing::debug!(
            "[EVENT_LOOP] Event received: {:?}",
            std::mem::discriminant(&event)
        );
        handle_events(&ctx, event).await?;
    }
}

async fn handle_events(ctx: &OcrContext, event: AppEvent) -> anyhow::Result<()> {
    match event {
        AppEvent::TriggerOcr(rect) => {
            tracing::debug!(">>> [OCR] Triggered for {:?}", rect);
            handle_ocr_trigger(ctx, rect).await?;
        }
        AppEvent::OcrStatusUpdate { .. } | AppEvent::CycleFinished(_) | AppEvent::BackendReady => {
            // UI-only events, ignore in backend
        }
    }

    Ok(())
}
