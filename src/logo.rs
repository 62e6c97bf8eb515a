//! Centered logo compositing.
//!
//! The raster path resizes the logo to a square, masks it with a soft-edged circle and
//! blends it over the canvas center. Failures here never abort a render: [`apply_logo`]
//! logs them and leaves the canvas untouched.

use std::io::Cursor;

use base64::Engine as _;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, RgbaImage};

use crate::error::{Error, Result};

/// Sigma of the blur applied to the circular mask edge.
const MASK_BLUR_SIGMA: f32 = 1.0;

/// Divisor of the canvas side bounding the logo: 5 for short content, 6 from 100 chars on.
pub fn logo_scale(content_len: usize) -> u32 {
    if content_len < 100 {
        5
    } else {
        6
    }
}

/// Side of the square logo: `min(width, height, canvas / scale)`.
pub fn logo_side(canvas_side: u32, logo_width: u32, logo_height: u32, content_len: usize) -> u32 {
    let max_side = canvas_side / logo_scale(content_len);
    logo_width.min(logo_height).min(max_side)
}

/// Decodes logo bytes in any format supported by `image`.
pub fn decode_logo(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::LogoLoad(e.to_string()))
}

/// Soft circular alpha mask of `side × side` pixels.
fn circle_mask(side: u32) -> GrayImage {
    let r = f64::from(side) / 2.0;
    let mask = GrayImage::from_fn(side, side, |x, y| {
        let dx = f64::from(x) + 0.5 - r;
        let dy = f64::from(y) + 0.5 - r;
        if dx * dx + dy * dy <= r * r {
            Luma([255])
        } else {
            Luma([0])
        }
    });
    imageops::blur(&mask, MASK_BLUR_SIGMA)
}

/// Resizes, masks and blends `logo` onto the center of `canvas`.
pub fn composite_logo(canvas: &mut RgbaImage, logo: &DynamicImage, content_len: usize) -> Result<()> {
    let side = logo_side(canvas.width(), logo.width(), logo.height(), content_len);
    if side == 0 {
        return Err(Error::LogoLoad(format!(
            "logo of {}x{} cannot be fitted on a {}px canvas",
            logo.width(),
            logo.height(),
            canvas.width()
        )));
    }

    let resized = imageops::resize(&logo.to_rgba8(), side, side, FilterType::Lanczos3);
    let mask = circle_mask(side);
    let left = (canvas.width() - side) / 2;
    let top = (canvas.height() - side) / 2;

    for (x, y, src) in resized.enumerate_pixels() {
        let coverage = f32::from(mask.get_pixel(x, y).0[0]) / 255.0;
        let alpha = coverage * f32::from(src.0[3]) / 255.0;
        if alpha <= 0.0 {
            continue;
        }
        let dst = canvas.get_pixel_mut(left + x, top + y);
        let dst_alpha = f32::from(dst.0[3]) / 255.0;
        let out_alpha = alpha + dst_alpha * (1.0 - alpha);
        for c in 0..3 {
            let blended = (f32::from(src.0[c]) * alpha
                + f32::from(dst.0[c]) * dst_alpha * (1.0 - alpha))
                / out_alpha;
            dst.0[c] = blended.round().clamp(0.0, 255.0) as u8;
        }
        dst.0[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    }
    Ok(())
}

/// Composites `logo` if present, logging and skipping it on failure.
///
/// Returns whether a logo was drawn.
pub fn apply_logo(canvas: &mut RgbaImage, logo: Option<&DynamicImage>, content_len: usize) -> bool {
    let Some(logo) = logo else {
        return false;
    };
    match composite_logo(canvas, logo, content_len) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("rendering without logo: {e}");
            false
        }
    }
}

/// PNG-encodes `logo` as a `data:` URI for embedding in SVG.
pub fn png_data_uri(logo: &DynamicImage) -> Result<String> {
    let mut bytes: Vec<u8> = Vec::new();
    logo.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:image/png;base64,{b64}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn red_logo(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn test_logo_side_bounds() {
        assert_eq!(logo_side(388, 500, 400, 5), 77);
        assert_eq!(logo_side(388, 500, 400, 100), 64);
        assert_eq!(logo_side(388, 30, 50, 5), 30);
        for canvas in [350, 388, 1000] {
            for len in [0, 99, 100, 500] {
                let side = logo_side(canvas, 4000, 4000, len);
                assert!(side <= canvas / if len < 100 { 5 } else { 6 });
            }
        }
    }

    #[test]
    fn test_logo_is_centered_and_round() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([255, 255, 255, 255]));
        assert!(apply_logo(&mut canvas, Some(&red_logo(40, 40)), 5));
        // 100 / 5 = 20px logo at (40, 40).
        let center = canvas.get_pixel(50, 50).0;
        assert!(center[0] == 255 && center[1] <= 2 && center[2] <= 2, "{center:?}");
        // Square corner of the logo is outside the circle mask.
        assert_eq!(*canvas.get_pixel(40, 40), Rgba([255, 255, 255, 255]));
        assert_eq!(*canvas.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_logo_over_transparent_canvas() {
        let mut canvas = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 0]));
        apply_logo(&mut canvas, Some(&red_logo(40, 40)), 5);
        let center = canvas.get_pixel(50, 50).0;
        assert!(center[0] == 255 && center[3] >= 250, "{center:?}");
        assert_eq!(canvas.get_pixel(40, 40).0[3], 0);
        assert_eq!(canvas.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_unfittable_logo_is_skipped() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let before = canvas.clone();
        assert!(!apply_logo(&mut canvas, Some(&red_logo(10, 10)), 5));
        assert_eq!(canvas, before);
        assert!(!apply_logo(&mut canvas, None, 5));
    }

    #[test]
    fn test_decode_failure_is_logo_error() {
        assert!(matches!(decode_logo(b"not an image"), Err(Error::LogoLoad(_))));
    }

    #[test]
    fn test_png_data_uri() {
        let uri = png_data_uri(&red_logo(2, 2)).unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
