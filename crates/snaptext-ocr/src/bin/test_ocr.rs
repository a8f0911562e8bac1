//! Simple OCR test - run with: cargo run -p snaptext-ocr --bin test_ocr

use anyhow::Result;
use snaptext_config::Config;
use snaptext_core::pipeline::{Pipeline, RecognitionOutcome};
use snaptext_core::preprocess::Preprocessor;
use snaptext_ocr::{TesseractEngine, XcapCapture};
use snaptext_types::ScreenRect;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "test_ocr=debug,snaptext_ocr=debug,snaptext_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("=== OCR Test ===");
    let config = Config::new().validate()?;

    // 1. Resolve the engine
    let location = snaptext_ocr::locate(&config.ocr);
    tracing::info!("1. Engine location: {:?}", location);
    let engine = TesseractEngine::from_location(&location, &config.ocr)?;
    match engine.version() {
        Ok(version) => tracing::info!("   {}", version),
        Err(e) => tracing::warn!("   Version query failed: {}", e),
    }

    // 2. Capture a fixed region
    let rect = ScreenRect {
        left: 0,
        top: 0,
        right: 800,
        bottom: 600,
    };
    tracing::info!("2. Capturing {:?}...", rect);
    let start = std::time::Instant::now();
    let raw = snaptext_ocr::capture_screen_region(rect)?;
    tracing::info!("   {}x{} in {:?}", raw.width(), raw.height(), start.elapsed());
    raw.save("test_capture.png")?;
    tracing::info!("   Saved to test_capture.png");

    // 3. Full pipeline
    tracing::info!("3. Running pipeline...");
    let pipeline = Pipeline::new(
        Box::new(XcapCapture),
        Box::new(engine),
        Preprocessor::new(config.preprocess.clone()),
    );
    let start = std::time::Instant::now();
    match pipeline.process_with(rect, |stage| tracing::info!("   {}", stage.status())) {
        RecognitionOutcome::Text(text) => {
            tracing::info!("   {:?} - {} chars", start.elapsed(), text.len());
            for line in text.lines().take(5) {
                tracing::info!("   > {}", line);
            }
        }
        RecognitionOutcome::NothingDetected => tracing::info!("   No text detected"),
        RecognitionOutcome::Failed(e) => tracing::error!("   Failed: {}", e),
    }

    tracing::info!("=== Done ===");
    Ok(())
}
