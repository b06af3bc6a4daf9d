use image::{Rgba, RgbaImage};
use imageproc::map::map_colors;
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, CardRatio, CropPolicy};

/// Contrast multiplier applied to the normalized card
pub const CONTRAST: f64 = 1.05;

/// Brightness multiplier applied to the normalized card
pub const BRIGHTNESS: f64 = 1.02;

/// Canvas background under the resampled card
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Multiplicative tone adjustment in the manner of CSS `contrast()` and `brightness()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub contrast: f64,
    pub brightness: f64,
}

impl Default for Tone {
    fn default() -> Self {
        Self {
            contrast: CONTRAST,
            brightness: BRIGHTNESS,
        }
    }
}

impl Tone {
    fn adjust(&self, value: u8) -> u8 {
        let v = value as f64 / 255.0;
        let v = (v - 0.5) * self.contrast + 0.5;
        let v = v * self.brightness;
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Composite a premultiplied sample over the opaque background
fn over_background(premultiplied: [f64; 4]) -> Rgba<u8> {
    let coverage = 1.0 - (premultiplied[3] / 255.0).clamp(0.0, 1.0);
    let channel = |c: usize| {
        (premultiplied[c] + BACKGROUND[c] as f64 * coverage)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba([channel(0), channel(1), channel(2), BACKGROUND[3]])
}

/// Premultiplied RGBA of a source pixel
fn premultiplied(pixel: &Rgba<u8>) -> [f64; 4] {
    let alpha = pixel[3] as f64 / 255.0;
    [
        pixel[0] as f64 * alpha,
        pixel[1] as f64 * alpha,
        pixel[2] as f64 * alpha,
        pixel[3] as f64,
    ]
}

/// Bilinear sample at region coordinates `(x, y)`, reading the four taps
/// straight from `img` and clamping them to `bounds`
fn sample_bilinear(img: &RgbaImage, bounds: &BoundingBox, x: f64, y: f64) -> [f64; 4] {
    let tap = |offset: u32, size: u32, pos: f64| -> u32 {
        offset + (pos.max(0.0) as u32).min(size - 1)
    };

    let (width, height) = (bounds.width(), bounds.height());
    let x_floor = x.floor();
    let y_floor = y.floor();
    let x_frac = x - x_floor;
    let y_frac = y - y_floor;

    let x0 = tap(bounds.min_x, width, x_floor);
    let x1 = tap(bounds.min_x, width, x_floor + 1.0);
    let y0 = tap(bounds.min_y, height, y_floor);
    let y1 = tap(bounds.min_y, height, y_floor + 1.0);

    let p00 = premultiplied(img.get_pixel(x0, y0));
    let p10 = premultiplied(img.get_pixel(x1, y0));
    let p01 = premultiplied(img.get_pixel(x0, y1));
    let p11 = premultiplied(img.get_pixel(x1, y1));

    std::array::from_fn(|c| {
        let top = p00[c] + (p10[c] - p00[c]) * x_frac;
        let bottom = p01[c] + (p11[c] - p01[c]) * x_frac;
        top + (bottom - top) * y_frac
    })
}

/// Resample the region `bounds` of `img` so it fills a `width` x `height`
/// canvas, drawn over an opaque white background. `bounds` must be non-empty.
fn resample_region(
    img: &RgbaImage,
    bounds: &BoundingBox,
    width: u32,
    height: u32,
) -> RgbaImage {
    let scale_x = width as f64 / bounds.width() as f64;
    let scale_y = height as f64 / bounds.height() as f64;

    let mut output = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (out_x, out_y, pixel) in output.enumerate_pixels_mut() {
        // Map output pixel centres into region coordinates
        let src_x = (out_x as f64 + 0.5) / scale_x - 0.5;
        let src_y = (out_y as f64 + 0.5) / scale_y - 0.5;

        *pixel = over_background(sample_bilinear(img, bounds, src_x, src_y));
    }

    output
}

/// Apply the contrast and brightness adjustment to every colour channel
pub fn apply_tone(img: &RgbaImage, tone: &Tone) -> RgbaImage {
    map_colors(img, |p| {
        Rgba([
            tone.adjust(p[0]),
            tone.adjust(p[1]),
            tone.adjust(p[2]),
            p[3],
        ])
    })
}

/// Crop `bounds` out of `img`, resample it to `width` x `height` and apply the
/// default tone adjustment.
///
/// Under [`CropPolicy::Stretch`] the box is stretched to fill the canvas and
/// `ratio` only feeds a diagnostic; [`CropPolicy::ConstrainAspect`] first
/// shrinks the box to `ratio` about its centre.
pub fn normalize(
    img: &RgbaImage,
    bounds: &BoundingBox,
    width: u32,
    height: u32,
    ratio: &CardRatio,
    policy: CropPolicy,
) -> Result<RgbaImage> {
    normalize_with_tone(img, bounds, width, height, ratio, policy, &Tone::default())
}

/// [`normalize`] with an explicit tone adjustment
pub fn normalize_with_tone(
    img: &RgbaImage,
    bounds: &BoundingBox,
    width: u32,
    height: u32,
    ratio: &CardRatio,
    policy: CropPolicy,
    tone: &Tone,
) -> Result<RgbaImage> {
    let (src_width, src_height) = img.dimensions();

    if bounds.is_degenerate() || !bounds.fits_within(src_width, src_height) {
        return Err(Error::DegenerateBoundary {
            bounds: *bounds,
            width: src_width,
            height: src_height,
        });
    }

    if width == 0 || height == 0 {
        return Err(Error::InvalidParameter {
            name: "output size".to_string(),
            reason: format!("{}x{} has no pixels", width, height),
        });
    }

    let region = match policy {
        CropPolicy::Stretch => {
            // The card ratio is not applied here, so the box is distorted to the canvas
            let (fit_width, fit_height) =
                ratio.constrain(bounds.width() as f64, bounds.height() as f64);
            debug!(
                box_width = bounds.width(),
                box_height = bounds.height(),
                fit_width,
                fit_height,
                "Stretching crop box without card ratio"
            );
            *bounds
        }
        CropPolicy::ConstrainAspect => {
            let constrained = bounds.constrain_to(ratio);
            debug!(?constrained, "Constrained crop box to card ratio");
            constrained
        }
    };

    let resampled = resample_region(img, &region, width, height);
    Ok(apply_tone(&resampled, tone))
}
