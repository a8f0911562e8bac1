use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use snaptext_core::error::CaptureError;
use snaptext_core::pipeline::ScreenCapture;
use snaptext_types::ScreenRect;
use xcap::Monitor;

/// Screen capture through xcap, stitching together every monitor the
/// requested rectangle touches.
#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl ScreenCapture for XcapCapture {
    fn capture(&self, rect: ScreenRect) -> Result<DynamicImage, CaptureError> {
        capture_screen_region(rect).map(DynamicImage::ImageRgba8)
    }
}

/// Monitor rectangle in device pixels, the unit selections arrive in.
fn monitor_bounds(monitor: &Monitor) -> ScreenRect {
    device_bounds(
        monitor.x(),
        monitor.y(),
        monitor.width(),
        monitor.height(),
        coordinate_scale(monitor),
    )
}

/// xcap reports macOS monitors in points
#[cfg(target_os = "macos")]
fn coordinate_scale(monitor: &Monitor) -> f32 {
    monitor.scale_factor()
}

#[cfg(not(target_os = "macos"))]
fn coordinate_scale(_monitor: &Monitor) -> f32 {
    1.0
}

fn device_bounds(x: i32, y: i32, width: u32, height: u32, scale: f32) -> ScreenRect {
    let scale = f64::from(scale);
    let left = (f64::from(x) * scale).round() as i32;
    let top = (f64::from(y) * scale).round() as i32;

    ScreenRect {
        left,
        top,
        right: left + (f64::from(width) * scale).round() as i32,
        bottom: top + (f64::from(height) * scale).round() as i32,
    }
}

/// Capture a screen-absolute region; parts not covered by any monitor stay black.
pub fn capture_screen_region(rect: ScreenRect) -> Result<RgbaImage, CaptureError> {
    let monitors = Monitor::all().map_err(|e| CaptureError::Monitors(e.to_string()))?;

    let mut canvas = RgbaImage::from_pixel(rect.width(), rect.height(), Rgba([0, 0, 0, 255]));
    let mut covered = false;

    for monitor in &monitors {
        let bounds = monitor_bounds(monitor);
        let Some(part) = rect.intersect(&bounds) else {
            continue;
        };
        tracing::debug!("Capturing {:?} from monitor '{}'", part, monitor.name());

        let shot = monitor.capture_image().map_err(|e| CaptureError::Monitor {
            monitor: monitor.name().to_string(),
            reason: e.to_string(),
        })?;
        let (shot_width, shot_height) = (shot.width(), shot.height());
        let shot = RgbaImage::from_raw(shot_width, shot_height, shot.into_raw()).ok_or_else(|| {
            CaptureError::Monitor {
                monitor: monitor.name().to_string(),
                reason: "buffer size does not match dimensions".to_string(),
            }
        })?;

        let piece = crop_scaled(&shot, &bounds, &part);
        imageops::overlay(
            &mut canvas,
            &piece,
            i64::from(part.left - rect.left),
            i64::from(part.top - rect.top),
        );
        covered = true;
    }

    if !covered {
        return Err(CaptureError::OutsideDisplays);
    }
    Ok(canvas)
}

/// Cuts `part` out of a monitor screenshot. HiDPI monitors may return more
/// pixels than their reported size; those crops are scaled back so the
/// result lines up with screen coordinates.
fn crop_scaled(shot: &RgbaImage, bounds: &ScreenRect, part: &ScreenRect) -> RgbaImage {
    let scale_x = f64::from(shot.width()) / f64::from(bounds.width().max(1));
    let scale_y = f64::from(shot.height()) / f64::from(bounds.height().max(1));

    let x = (f64::from(part.left - bounds.left) * scale_x) as u32;
    let y = (f64::from(part.top - bounds.top) * scale_y) as u32;
    let width = ((f64::from(part.width()) * scale_x) as u32).min(shot.width().saturating_sub(x));
    let height = ((f64::from(part.height()) * scale_y) as u32).min(shot.height().saturating_sub(y));

    if width == 0 || height == 0 {
        return RgbaImage::from_pixel(part.width(), part.height(), Rgba([0, 0, 0, 255]));
    }

    let cropped = imageops::crop_imm(shot, x, y, width, height).to_image();
    if (width, height) == (part.width(), part.height()) {
        cropped
    } else {
        imageops::resize(&cropped, part.width(), part.height(), FilterType::Triangle)
    }
}
