//! SVG rendering.
//!
//! Vector output uses uniform shapes: unlike the raster path there is no finder special
//! casing, and an embedded logo is drawn as an unmasked square.

use image::DynamicImage;

use crate::color::{Background, HexColor};
use crate::gradient::GradientConfig;
use crate::logo::png_data_uri;
use crate::matrix::QrMatrix;
use crate::raster::{QrStyle, StyleConfig};
use crate::size::Geometry;

/// Fraction of the canvas side covered by an embedded logo.
pub const LOGO_FRACTION: f64 = 0.2;

/// Formats a coordinate with at most two decimals and no trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Side of the SVG canvas: `(matrix + 2·border)·module`.
pub fn svg_canvas_side(geometry: &Geometry, matrix_size: usize) -> u32 {
    geometry.total_rendered_size(matrix_size)
}

fn module_element(style: QrStyle, x0: f64, y0: f64, m: f64, fill: HexColor) -> String {
    match style {
        QrStyle::Classic => format!(
            "\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
            num(x0),
            num(y0),
            num(m),
            num(m),
            fill
        ),
        QrStyle::Rounded => {
            let pad = m * 0.05;
            let side = m * 0.9;
            let r = side * 0.3;
            format!(
                "\t<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"{}\"/>\n",
                num(x0 + pad),
                num(y0 + pad),
                num(side),
                num(side),
                num(r),
                num(r),
                fill
            )
        }
        QrStyle::Circle => format!(
            "\t<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\"/>\n",
            num(x0 + m / 2.0),
            num(y0 + m / 2.0),
            num(m * 0.45),
            fill
        ),
    }
}

fn logo_element(logo: &DynamicImage, side: u32) -> Option<String> {
    let uri = match png_data_uri(logo) {
        Ok(uri) => uri,
        Err(e) => {
            log::warn!("skipping SVG logo: {e}");
            return None;
        }
    };
    let logo_side = f64::from(side) * LOGO_FRACTION;
    let pos = (f64::from(side) - logo_side) / 2.0;
    Some(format!(
        "\t<image x=\"{0}\" y=\"{0}\" width=\"{1}\" height=\"{1}\" xlink:href=\"{2}\"/>\n",
        num(pos),
        num(logo_side),
        uri
    ))
}

fn build<F>(
    matrix: &QrMatrix,
    style: QrStyle,
    geometry: &Geometry,
    background: Background,
    logo: Option<&DynamicImage>,
    row_fill: F,
) -> String
where
    F: Fn(usize) -> HexColor,
{
    let side = svg_canvas_side(geometry, matrix.size());
    let m = f64::from(geometry.module_px);
    let offset = f64::from(geometry.border_modules) * m;

    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\">\n",
        side
    );
    if let Background::Solid(color) = background {
        result += &format!(
            "\t<rect x=\"0\" y=\"0\" width=\"{0}\" height=\"{0}\" fill=\"{1}\"/>\n",
            side, color
        );
    }
    for (x, y) in matrix.dark_modules() {
        let x0 = offset + x as f64 * m;
        let y0 = offset + y as f64 * m;
        result += &module_element(style, x0, y0, m, row_fill(y));
    }
    if let Some(element) = logo.and_then(|logo| logo_element(logo, side)) {
        result += &element;
    }
    result += "</svg>\n";
    result
}

/// Renders `matrix` as an SVG 1.1 document.
///
/// The canvas side comes from the module size and border; `canvas_size` is ignored.
/// A transparent background omits the background rectangle.
///
/// # Example
///
/// ```rust
/// use qrstyle::matrix::{DefaultEncoder, QrEncoder};
/// use qrstyle::raster::StyleConfig;
/// use qrstyle::svg::render_svg;
///
/// let matrix = DefaultEncoder.encode("HELLO", 1).unwrap();
/// let svg = render_svg(&matrix, &StyleConfig::default(), None);
/// assert!(svg.contains("viewBox=\"0 0 348 348\""));
/// ```
pub fn render_svg(matrix: &QrMatrix, config: &StyleConfig, logo: Option<&DynamicImage>) -> String {
    let fill = config.foreground;
    build(
        matrix,
        config.style,
        &config.geometry,
        config.background,
        logo,
        |_| fill,
    )
}

/// Renders `matrix` as classic SVG squares with per-row gradient fills.
pub fn render_gradient_svg(
    matrix: &QrMatrix,
    config: &GradientConfig,
    logo: Option<&DynamicImage>,
) -> String {
    let size = matrix.size();
    build(
        matrix,
        QrStyle::Classic,
        &config.geometry,
        config.background,
        logo,
        |row| config.row_color(row, size),
    )
}
