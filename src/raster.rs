//! Raster rendering of a [`QrMatrix`] onto an RGBA canvas.
//!
//! Modules are laid out with a 0.95 spacing factor so neighbours overlap slightly and no
//! hairline gaps show between them. The shape of each module comes from a [`ModulePainter`],
//! which keeps the pixel loop independent of the style.

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};

use crate::color::{Background, HexColor};
use crate::finder::is_finder;
use crate::matrix::QrMatrix;
use crate::size::Geometry;

/// Distance between module centers, as a fraction of the module size.
pub const SPACING_FACTOR: f64 = 0.95;

/// Visual style of the modules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum QrStyle {
    /// Plain squares.
    Classic,
    /// Squares with rounded corners.
    #[default]
    Rounded,
    /// Filled circles.
    Circle,
}

impl QrStyle {
    /// Looks up a style by name, falling back to [`QrStyle::Classic`] for anything unknown.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstyle::raster::QrStyle;
    ///
    /// assert_eq!(QrStyle::from_name("circle"), QrStyle::Circle);
    /// assert_eq!(QrStyle::from_name("sparkly"), QrStyle::Classic);
    /// ```
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::debug!("unsupported style {name:?}, falling back to classic");
            QrStyle::Classic
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            QrStyle::Classic => "classic",
            QrStyle::Rounded => "rounded",
            QrStyle::Circle => "circle",
        }
    }
}

impl FromStr for QrStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(QrStyle::Classic),
            "rounded" => Ok(QrStyle::Rounded),
            "circle" => Ok(QrStyle::Circle),
            other => Err(format!("unknown style '{other}'")),
        }
    }
}

impl fmt::Display for QrStyle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable configuration of a styled render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleConfig {
    pub style: QrStyle,
    pub foreground: HexColor,
    pub background: Background,
    pub geometry: Geometry,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            style: QrStyle::default(),
            foreground: HexColor::BLACK,
            background: Background::default(),
            geometry: Geometry::default(),
        }
    }
}

/// Shape of one module, in whole pixels around its center pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    Square { half: i64 },
    RoundedSquare { half: i64, radius: i64 },
    Circle { radius: f64 },
}

impl Shape {
    /// Half-extent of the bounding box.
    fn reach(&self) -> i64 {
        match *self {
            Shape::Square { half } | Shape::RoundedSquare { half, .. } => half,
            Shape::Circle { radius } => radius.ceil() as i64,
        }
    }

    /// Whether the pixel at offset `(dx, dy)` from the center is covered.
    pub fn covers(&self, dx: i64, dy: i64) -> bool {
        match *self {
            Shape::Square { half } => dx.abs() <= half && dy.abs() <= half,
            Shape::RoundedSquare { half, radius } => {
                if dx.abs() > half || dy.abs() > half {
                    return false;
                }
                let inner = half - radius;
                let ex = (dx.abs() - inner).max(0);
                let ey = (dy.abs() - inner).max(0);
                ex * ex + ey * ey <= radius * radius + radius
            }
            Shape::Circle { radius } => {
                let (dx, dy) = (dx as f64, dy as f64);
                dx * dx + dy * dy <= (radius + 0.5) * (radius + 0.5)
            }
        }
    }
}

/// Where a module sits, for painters that vary their shape.
#[derive(Clone, Copy, Debug)]
pub struct ModuleContext {
    pub module_px: u32,
    pub matrix_size: usize,
    pub is_finder: bool,
}

/// Supplies the shape drawn for each dark module.
pub trait ModulePainter {
    fn shape(&self, ctx: &ModuleContext) -> Shape;

    /// Whether [`ModuleContext::is_finder`] affects the shape. Skips the lookup when not.
    fn uses_finder(&self) -> bool {
        false
    }
}

/// `clamp(18 / matrix_size, 0.9, 1.0)`: keeps rounded squares from shrinking too far.
pub fn rect_size_factor(matrix_size: usize) -> f64 {
    (18.0 / matrix_size as f64).clamp(0.9, 1.0)
}

/// `clamp(16 / matrix_size, 0.85, 1.0)`: keeps circles from shrinking too far.
pub fn circle_radius_factor(matrix_size: usize) -> f64 {
    (16.0 / matrix_size as f64).clamp(0.85, 1.0)
}

/// `floor(value / step)`. Shape floors are whole pixels, like the `module_px / 2` halves.
pub(crate) fn whole_steps(value: f64, step: f64) -> f64 {
    (value / step).floor()
}

/// Side of a square scaled by [`rect_size_factor`], never below `floor(module_px / 1.2)`.
pub(crate) fn scaled_square_side(module_px: u32, matrix_size: usize) -> f64 {
    let m = f64::from(module_px);
    let scaled = (f64::from(module_px.saturating_sub(1)) * rect_size_factor(matrix_size)).floor();
    whole_steps(m, 1.2).max(scaled)
}

fn half_of(side: f64) -> i64 {
    (side / 2.0).floor() as i64
}

impl ModulePainter for QrStyle {
    fn shape(&self, ctx: &ModuleContext) -> Shape {
        let m = f64::from(ctx.module_px);
        match self {
            QrStyle::Classic => {
                let side = whole_steps(m, 1.2).max(m - 1.0);
                Shape::Square { half: half_of(side) }
            }
            QrStyle::Rounded => {
                let side = scaled_square_side(ctx.module_px, ctx.matrix_size);
                let radius = if ctx.is_finder {
                    1
                } else {
                    ((3.0 * rect_size_factor(ctx.matrix_size)).round() as i64).max(2)
                };
                let half = half_of(side);
                Shape::RoundedSquare {
                    half,
                    radius: radius.min(half.max(0)),
                }
            }
            QrStyle::Circle => {
                let nominal = f64::from(ctx.module_px / 2);
                let radius = if ctx.is_finder {
                    nominal
                } else {
                    whole_steps(m, 2.5).max((nominal * circle_radius_factor(ctx.matrix_size)).floor())
                };
                Shape::Circle { radius }
            }
        }
    }

    fn uses_finder(&self) -> bool {
        !matches!(self, QrStyle::Classic)
    }
}

/// Pixel placement of module centers on a canvas.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Layout {
    origin: i64,
    module_px: u32,
}

impl Layout {
    /// Centers the whole `matrix + border` block in the canvas.
    pub(crate) fn centered(geometry: &Geometry, matrix_size: usize) -> Self {
        let total = i64::from(geometry.total_rendered_size(matrix_size));
        let canvas = i64::from(geometry.canvas_size);
        let border_px = i64::from(geometry.border_modules) * i64::from(geometry.module_px);
        Self {
            origin: (canvas - total).div_euclid(2) + border_px,
            module_px: geometry.module_px,
        }
    }

    /// Center pixel of module index `i` along one axis.
    pub(crate) fn center(&self, i: usize) -> i64 {
        let m = f64::from(self.module_px);
        let offset = i as f64 * m * SPACING_FACTOR + f64::from(self.module_px / 2);
        self.origin + offset.round() as i64
    }
}

/// Blank canvas pre-filled with the background (fully transparent for the sentinel).
pub(crate) fn blank_canvas(side: u32, background: Background) -> RgbaImage {
    RgbaImage::from_pixel(side, side, background.to_rgba())
}

/// Paints every dark module with `painter`, coloring each by row with `row_color`.
pub(crate) fn paint_modules<P, F>(
    canvas: &mut RgbaImage,
    matrix: &QrMatrix,
    geometry: &Geometry,
    painter: &P,
    row_color: F,
) where
    P: ModulePainter + ?Sized,
    F: Fn(usize) -> Rgba<u8>,
{
    let size = matrix.size();
    let layout = Layout::centered(geometry, size);
    let check_finder = painter.uses_finder();
    for (x, y) in matrix.dark_modules() {
        let ctx = ModuleContext {
            module_px: geometry.module_px,
            matrix_size: size,
            is_finder: check_finder && is_finder(x, y, size),
        };
        let shape = painter.shape(&ctx);
        fill_shape(canvas, layout.center(x), layout.center(y), &shape, row_color(y));
    }
}

fn fill_shape(canvas: &mut RgbaImage, cx: i64, cy: i64, shape: &Shape, color: Rgba<u8>) {
    let reach = shape.reach();
    let (w, h) = (i64::from(canvas.width()), i64::from(canvas.height()));
    let (x0, x1) = ((cx - reach).max(0), (cx + reach).min(w - 1));
    let (y0, y1) = ((cy - reach).max(0), (cy + reach).min(h - 1));
    for py in y0..=y1 {
        for px in x0..=x1 {
            if shape.covers(px - cx, py - cy) {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Renders `matrix` with the configured style.
///
/// The canvas side is `config.geometry.canvas_size`; callers going through
/// [`crate::helper::generate`] get it already fitted to the matrix.
///
/// # Example
///
/// ```rust
/// use qrstyle::matrix::{DefaultEncoder, QrEncoder};
/// use qrstyle::raster::{render, QrStyle, StyleConfig};
///
/// let matrix = DefaultEncoder.encode("HELLO", 1).unwrap();
/// let config = StyleConfig { style: QrStyle::Circle, ..StyleConfig::default() };
/// let img = render(&matrix, &config);
/// assert_eq!(img.dimensions(), (350, 350));
/// ```
pub fn render(matrix: &QrMatrix, config: &StyleConfig) -> RgbaImage {
    let mut canvas = blank_canvas(config.geometry.canvas_size, config.background);
    let fill = config.foreground.to_rgba();
    paint_modules(&mut canvas, matrix, &config.geometry, &config.style, |_| fill);
    canvas
}
