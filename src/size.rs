//! Sizing heuristics: version hint, border, module size and final canvas size.

use crate::error::{Error, Result};

/// Largest canvas side accepted, in pixels. Bounds the `canvas²` allocation per render.
pub const MAX_CANVAS_SIZE: u32 = 4096;

/// Extra pixels kept around the rendered code when the canvas is grown.
pub const CANVAS_MARGIN: u32 = 40;

/// Requested geometry of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Raster pixels per module edge.
    pub module_px: u32,
    /// Quiet zone around the matrix, in modules.
    pub border_modules: u32,
    /// Side of the square output canvas, in pixels.
    pub canvas_size: u32,
    /// Scale border, module size and canvas to the content length.
    pub auto_adjust: bool,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            module_px: 12,
            border_modules: 4,
            canvas_size: 350,
            auto_adjust: true,
        }
    }
}

impl Geometry {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.module_px == 0 || self.module_px > MAX_CANVAS_SIZE {
            return Err(Error::invalid_geometry("module_px", self.module_px));
        }
        if self.border_modules > MAX_CANVAS_SIZE {
            return Err(Error::invalid_geometry("border_modules", self.border_modules));
        }
        if self.canvas_size == 0 || self.canvas_size > MAX_CANVAS_SIZE {
            return Err(Error::invalid_geometry("canvas_size", self.canvas_size));
        }
        Ok(())
    }

    /// Pixel size of the matrix plus its border: `matrix·m + 2·border·m`.
    pub fn total_rendered_size(&self, matrix_size: usize) -> u32 {
        let modules = matrix_size as u32 + 2 * self.border_modules;
        modules * self.module_px
    }

    /// Returns this geometry with the canvas grown to fit a matrix of `matrix_size`.
    ///
    /// The canvas only grows when `auto_adjust` is set. Fails if the result exceeds
    /// [`MAX_CANVAS_SIZE`].
    pub fn fitted_to(&self, matrix_size: usize) -> Result<Geometry> {
        let mut fitted = *self;
        if self.auto_adjust {
            let needed = self.total_rendered_size(matrix_size) + CANVAS_MARGIN;
            fitted.canvas_size = self.canvas_size.max(needed);
        }
        if fitted.canvas_size > MAX_CANVAS_SIZE {
            return Err(Error::invalid_geometry("canvas_size", fitted.canvas_size));
        }
        Ok(fitted)
    }
}

/// Output of the sizing heuristic, before the matrix is known.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizePlan {
    /// Advisory minimum QR version. The encoder may pick a larger one.
    pub version_hint: i16,
    pub geometry: Geometry,
}

/// Derives the version hint, border and module size from the content length.
///
/// # Example
///
/// ```rust
/// use qrstyle::size::{plan, Geometry};
///
/// let plan = plan(120, &Geometry::default());
/// assert_eq!(plan.version_hint, 3);
/// assert_eq!(plan.geometry.border_modules, 4);
/// assert_eq!(plan.geometry.module_px, 12);
/// ```
pub fn plan(content_len: usize, requested: &Geometry) -> SizePlan {
    if !requested.auto_adjust {
        return SizePlan {
            version_hint: 1,
            geometry: *requested,
        };
    }

    let version_hint = match content_len {
        n if n > 150 => 4,
        n if n > 100 => 3,
        n if n > 50 => 2,
        _ => 1,
    };
    let step = u32::try_from(content_len / 300).unwrap_or(u32::MAX);
    let border_modules = requested.border_modules.max(4u32.saturating_add(step));
    let module_px = 10.max(requested.module_px.saturating_sub(step));

    log::debug!(
        "size plan for {content_len} chars: version hint {version_hint}, border {border_modules}, module {module_px}px"
    );

    SizePlan {
        version_hint,
        geometry: Geometry {
            module_px,
            border_modules,
            ..*requested
        },
    }
}
