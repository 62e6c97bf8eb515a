//! Vertical two-color gradient rendering.

use image::RgbaImage;

use crate::color::{Background, HexColor};
use crate::matrix::QrMatrix;
use crate::raster::{blank_canvas, paint_modules, ModuleContext, ModulePainter, Shape};
use crate::size::Geometry;

/// Immutable configuration of a gradient render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradientConfig {
    /// Color of the first row.
    pub start: HexColor,
    /// Color approached by the last row.
    pub end: HexColor,
    pub background: Background,
    pub geometry: Geometry,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            start: HexColor::new(0x1E, 0x88, 0xE5),
            end: HexColor::new(0x8B, 0xC3, 0x4A),
            background: Background::default(),
            geometry: Geometry::default(),
        }
    }
}

impl GradientConfig {
    /// Color of matrix row `row`: `start·(1 − r) + end·r` with `r = row / matrix_size`.
    ///
    /// `r` is always below 1, so the last row never quite reaches `end`.
    pub fn row_color(&self, row: usize, matrix_size: usize) -> HexColor {
        let ratio = row as f64 / matrix_size as f64;
        self.start.lerp(self.end, ratio)
    }
}

/// Squares scaled like the rounded style but with sharp corners.
struct GradientSquare;

impl ModulePainter for GradientSquare {
    fn shape(&self, ctx: &ModuleContext) -> Shape {
        let side = crate::raster::scaled_square_side(ctx.module_px, ctx.matrix_size);
        Shape::Square {
            half: (side / 2.0).floor() as i64,
        }
    }
}

/// Renders `matrix` as squares colored by row.
///
/// # Example
///
/// ```rust
/// use qrstyle::gradient::{render_gradient, GradientConfig};
/// use qrstyle::matrix::{DefaultEncoder, QrEncoder};
///
/// let matrix = DefaultEncoder.encode("HELLO", 1).unwrap();
/// let img = render_gradient(&matrix, &GradientConfig::default());
/// assert_eq!(img.width(), 350);
/// ```
pub fn render_gradient(matrix: &QrMatrix, config: &GradientConfig) -> RgbaImage {
    let mut canvas = blank_canvas(config.geometry.canvas_size, config.background);
    let size = matrix.size();
    paint_modules(&mut canvas, matrix, &config.geometry, &GradientSquare, |row| {
        config.row_color(row, size).to_rgba()
    });
    canvas
}
