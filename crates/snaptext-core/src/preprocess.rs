use image::DynamicImage;
use image::imageops::FilterType;
use snaptext_config::preprocess::{PreprocessConfig, ThresholdMode};

/// Largest edge we are willing to upscale to.
const MAX_EDGE: u32 = 16_384;

/// Fixed image cleanup applied before OCR: grayscale, binarize, upscale.
///
/// Every step is a pure transform, so the same image and config always
/// produce the same bytes.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn process(&self, image: &DynamicImage) -> DynamicImage {
        let processed = if self.config.grayscale {
            let mut buf = image.to_luma8();
            self.threshold(&mut buf, 1);
            DynamicImage::ImageLuma8(buf)
        } else {
            let mut buf = image.to_rgb8();
            self.threshold(&mut buf, 3);
            DynamicImage::ImageRgb8(buf)
        };

        match upscale(&processed, self.config.resize_factor) {
            Ok(resized) => resized,
            Err(reason) => {
                tracing::warn!("Error resizing image, continuing without it: {reason}");
                processed
            }
        }
    }

    /// Both modes end in the same binary threshold.
    fn threshold(&self, raw: &mut [u8], channels: usize) {
        if let ThresholdMode::AutoContrast { cutoff_percent } = self.config.threshold_mode {
            autocontrast(raw, channels, cutoff_percent);
        }
        binarize(raw, self.config.threshold);
    }
}

/// Maps every value above `threshold` to 255 and the rest to 0.
pub fn binarize(raw: &mut [u8], threshold: u8) {
    for value in raw.iter_mut() {
        *value = if *value > threshold { 255 } else { 0 };
    }
}

/// Stretches each channel so its histogram spans 0..=255, ignoring
/// `cutoff_percent` of the pixels at both the dark and the bright end.
pub fn autocontrast(raw: &mut [u8], channels: usize, cutoff_percent: u8) {
    for channel in 0..channels {
        let mut histogram = [0u64; 256];
        for value in raw.iter().skip(channel).step_by(channels) {
            histogram[usize::from(*value)] += 1;
        }

        let lut = stretch_table(histogram, cutoff_percent);
        for value in raw.iter_mut().skip(channel).step_by(channels) {
            *value = lut[usize::from(*value)];
        }
    }
}

fn stretch_table(mut histogram: [u64; 256], cutoff_percent: u8) -> [u8; 256] {
    let total: u64 = histogram.iter().sum();
    let cut = total * u64::from(cutoff_percent) / 100;

    clip(histogram.iter_mut(), cut);
    clip(histogram.iter_mut().rev(), cut);

    let lo = histogram.iter().position(|&n| n > 0);
    let hi = histogram.iter().rposition(|&n| n > 0);

    let mut lut = [0u8; 256];
    match (lo, hi) {
        (Some(lo), Some(hi)) if hi > lo => {
            let scale = 255.0 / (hi - lo) as f64;
            let offset = -(lo as f64) * scale;
            for (ix, entry) in lut.iter_mut().enumerate() {
                *entry = (ix as f64 * scale + offset).clamp(0.0, 255.0) as u8;
            }
        }
        _ => {
            for (ix, entry) in lut.iter_mut().enumerate() {
                *entry = ix as u8;
            }
        }
    }
    lut
}

fn clip<'a>(bins: impl Iterator<Item = &'a mut u64>, mut remaining: u64) {
    for bin in bins {
        if remaining == 0 {
            break;
        }
        let taken = remaining.min(*bin);
        *bin -= taken;
        remaining -= taken;
    }
}

fn upscale(image: &DynamicImage, factor: u32) -> Result<DynamicImage, String> {
    if factor <= 1 {
        return Ok(image.clone());
    }

    let (width, height) = (image.width(), image.height());
    let target = width
        .checked_mul(factor)
        .zip(height.checked_mul(factor))
        .filter(|&(w, h)| w <= MAX_EDGE && h <= MAX_EDGE);

    let Some((new_width, new_height)) = target else {
        return Err(format!("{width}x{height} scaled by {factor} is too large"));
    };

    // Input is already two-level; an interpolating filter would bring back gray edges
    Ok(image.resize_exact(new_width, new_height, FilterType::Nearest))
}
