use std::sync::Arc;

use anyhow::Context;
use snaptext_config::Config;
use snaptext_ocr::TesseractEngine;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod events;
mod ocr_context;
mod state;
mod status;


use self::controller::AppController;
use self::state::AppState;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "snaptext=info,snaptext_core=info,snaptext_ocr=info,snaptext_ui=info,snaptext_io=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::new().validate().context("Invalid configuration")?);
    tracing::debug!(?config, "Configuration loaded");

    let location = snaptext_ocr::locate(&config.ocr);
    let engine = match TesseractEngine::from_location(&location, &config.ocr) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!("{e}");
            if let Err(ui_err) = snaptext_ui::show_fatal_error(&e.dialog()) {
                tracing::error!("Could not show startup error dialog: {ui_err:#}");
            }
            std::process::exit(1);
        }
    };
    match engine.version() {
        Ok(version) => tracing::info!("Using {} ({})", version, engine.program().display()),
        Err(e) => tracing::warn!("Could not query Tesseract version: {e}"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("snaptext-worker")
        .build()
        .context("Failed to start async runtime")?;

    let state = Arc::new(AppState::new(config.clone(), engine));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(runtime.handle());

    // The UI owns the main thread until the window is closed
    let (app_to_ui_rx, ui_to_app_tx) = controller.ui_channels();
    let ui_result = snaptext_ui::ui_loop(config, app_to_ui_rx, ui_to_app_tx);

    tracing::info!("Shutting down");
    controller.shutdown();
    runtime.block_on(async {
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!("Backend task failed: {e:#}"),
                Err(e) => tracing::error!("Backend task panicked: {e}"),
            }
        }
    });

    ui_result
}
