use std::time::Duration;

use snaptext_core::error::CycleError;
use snaptext_types::{AppEvent, ScreenRect};

use crate::ocr_context::OcrContext;

/// Runs one capture cycle for `rect` and always answers with
/// [`AppEvent::CycleFinished`], whatever happens on the way.
pub async fn handle_ocr_trigger(ctx: &OcrContext, rect: ScreenRect) -> anyhow::Result<()> {
    // Let the compositor drop the overlay before grabbing pixels
    let settle = Duration::from_millis(ctx.state.config.selection.settle_delay_ms);
    if !settle.is_zero() {
        tokio::time::sleep(settle).await;
    }

    let task_ctx = ctx.clone();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = task_ctx
            .state
            .pipeline
            .process_with(rect, |stage| task_ctx.send_status(stage.status()));
        task_ctx.state.publish(outcome)
    })
    .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(">>> [OCR] Task error: {}", e);
            CycleError::Unexpected(e.to_string()).report()
        }
    };

    tracing::info!(">>> [OCR] {}", report.status);
    {
        let mut stats = ctx.state.status.cycles.write().await;
        stats.record(&report);
        tracing::debug!(
            "Cycles: {} total, {} failed, {} copied",
            stats.cycle_count,
            stats.error_count,
            stats.copied_count
        );
    }

    if ctx.event_tx.send(AppEvent::CycleFinished(report)).await.is_err() {
        tracing::warn!(">>> [OCR] UI closed before the result arrived");
    }
    Ok(())
}
