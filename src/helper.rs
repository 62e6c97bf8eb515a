use std::fs::{self, File};
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::color::{Background, HexColor};
use crate::error::{Error, Result};
use crate::gradient::{render_gradient, GradientConfig};
use crate::logo::{apply_logo, decode_logo};
use crate::matrix::{DefaultEncoder, QrEncoder, QrMatrix};
use crate::raster::{render, QrStyle, StyleConfig};
use crate::size::{plan, Geometry};
use crate::svg::{render_gradient_svg, render_svg};

/*---- Caller boundary ----*/

/// Output flavor of a render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// RGBA pixels, written as PNG.
    #[default]
    Raster,
    /// An SVG document.
    Vector,
}

impl OutputFormat {
    /// Picks the format from a file extension (`png` or `svg`).
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "png" => Some(OutputFormat::Raster),
            "svg" => Some(OutputFormat::Vector),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Raster => "png",
            OutputFormat::Vector => "svg",
        }
    }
}

/// A finished render.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderedQr {
    Raster(RgbaImage),
    Vector(String),
}

impl RenderedQr {
    pub fn format(&self) -> OutputFormat {
        match self {
            RenderedQr::Raster(_) => OutputFormat::Raster,
            RenderedQr::Vector(_) => OutputFormat::Vector,
        }
    }

    /// Writes PNG or SVG bytes into `out` and flushes it.
    pub fn write_to<W: Write + Seek>(&self, out: &mut W) -> Result<()> {
        match self {
            RenderedQr::Raster(img) => img.write_to(out, ImageFormat::Png)?,
            RenderedQr::Vector(svg) => out.write_all(svg.as_bytes())?,
        }
        out.flush()?;
        Ok(())
    }

    /// The encoded PNG or SVG bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_to(&mut Cursor::new(&mut bytes))?;
        Ok(bytes)
    }
}

/// Everything a caller supplies for one render.
///
/// Colors and the style are kept as the raw strings a form or command line provides; they are
/// validated by [`generate`].
#[derive(Clone, Debug)]
pub struct QrRequest<'a> {
    pub content: &'a str,
    /// `classic`, `rounded`, `circle`, `gradient` or `orange_circle`. Unknown names render classic.
    pub style: &'a str,
    pub foreground: &'a str,
    /// A hex color or [`crate::color::TRANSPARENT`].
    pub background: &'a str,
    /// Start and end colors. Selects the gradient renderer when present.
    pub gradient: Option<(&'a str, &'a str)>,
    pub canvas_size: u32,
    /// Encoded logo image (PNG, JPEG, ...).
    pub logo: Option<&'a [u8]>,
    pub format: OutputFormat,
}

impl<'a> QrRequest<'a> {
    /// A request with the default style and colors.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: "rounded",
            foreground: "#000000",
            background: "#FFFFFF",
            gradient: None,
            canvas_size: Geometry::default().canvas_size,
            logo: None,
            format: OutputFormat::Raster,
        }
    }
}

/// Style preset that swaps the foreground to orange.
const ORANGE: HexColor = HexColor::new(0xFF, 0x57, 0x22);

enum Styler {
    Plain(StyleConfig),
    Gradient(GradientConfig),
}

fn resolve_styler(request: &QrRequest, geometry: Geometry) -> Result<Styler> {
    let background = Background::parse(request.background, "background")?;
    let style_name = request.style.trim().to_ascii_lowercase();

    if let Some((start, end)) = request.gradient {
        return Ok(Styler::Gradient(GradientConfig {
            start: HexColor::parse(start, "gradient_start")?,
            end: HexColor::parse(end, "gradient_end")?,
            background,
            geometry,
        }));
    }
    if style_name == "gradient" {
        return Ok(Styler::Gradient(GradientConfig {
            background,
            geometry,
            ..GradientConfig::default()
        }));
    }

    let mut foreground = HexColor::parse(request.foreground, "foreground")?;
    let style = if style_name == "orange_circle" {
        foreground = ORANGE;
        QrStyle::Circle
    } else {
        QrStyle::from_name(&style_name)
    };
    Ok(Styler::Plain(StyleConfig {
        style,
        foreground,
        background,
        geometry,
    }))
}

impl Styler {
    fn with_geometry(self, geometry: Geometry) -> Self {
        match self {
            Styler::Plain(config) => Styler::Plain(StyleConfig { geometry, ..config }),
            Styler::Gradient(config) => Styler::Gradient(GradientConfig { geometry, ..config }),
        }
    }
}

/// A validated and encoded request, ready for either output format.
struct Prepared {
    matrix: QrMatrix,
    styler: Styler,
    logo: Option<DynamicImage>,
    content_len: usize,
}

impl Prepared {
    fn into_raster(self) -> RgbaImage {
        let mut img = match &self.styler {
            Styler::Plain(config) => render(&self.matrix, config),
            Styler::Gradient(config) => render_gradient(&self.matrix, config),
        };
        apply_logo(&mut img, self.logo.as_ref(), self.content_len);
        img
    }

    fn into_vector(self) -> String {
        match &self.styler {
            Styler::Plain(config) => render_svg(&self.matrix, config, self.logo.as_ref()),
            Styler::Gradient(config) => render_gradient_svg(&self.matrix, config, self.logo.as_ref()),
        }
    }
}

/// Validates, sizes and encodes a request. `request.format` is not consulted.
fn prepare<E: QrEncoder + ?Sized>(encoder: &E, request: &QrRequest) -> Result<Prepared> {
    if request.content.is_empty() {
        return Err(Error::InvalidContent);
    }
    let requested = Geometry {
        canvas_size: request.canvas_size,
        ..Geometry::default()
    };
    requested.validate()?;
    let content_len = request.content.chars().count();
    let size_plan = plan(content_len, &requested);
    let styler = resolve_styler(request, size_plan.geometry)?;

    let logo = request.logo.and_then(|bytes| match decode_logo(bytes) {
        Ok(img) => Some(img),
        Err(e) => {
            log::warn!("rendering without logo: {e}");
            None
        }
    });

    let matrix = encoder.encode(request.content, size_plan.version_hint)?;
    let geometry = size_plan.geometry.fitted_to(matrix.size())?;
    log::debug!(
        "rendering {}x{} matrix on {}px canvas",
        matrix.size(),
        matrix.size(),
        geometry.canvas_size
    );

    Ok(Prepared {
        matrix,
        styler: styler.with_geometry(geometry),
        logo,
        content_len,
    })
}

/// Renders a request with a custom encoder.
///
/// Validation happens before any encoding work. Geometry is derived from the matrix the
/// encoder actually returns.
pub fn generate_with<E: QrEncoder + ?Sized>(encoder: &E, request: &QrRequest) -> Result<RenderedQr> {
    let prepared = prepare(encoder, request)?;
    Ok(match request.format {
        OutputFormat::Raster => RenderedQr::Raster(prepared.into_raster()),
        OutputFormat::Vector => RenderedQr::Vector(prepared.into_vector()),
    })
}

/// Renders a request with the default `qrcode`-backed encoder.
///
/// # Example
///
/// ```rust
/// use qrstyle::helper::{generate, OutputFormat, QrRequest, RenderedQr};
///
/// let request = QrRequest {
///     style: "circle",
///     background: "transparent",
///     format: OutputFormat::Vector,
///     ..QrRequest::new("https://example.com")
/// };
/// let rendered = generate(&request).unwrap();
/// assert!(matches!(&rendered, RenderedQr::Vector(svg) if svg.contains("<circle")));
/// ```
pub fn generate(request: &QrRequest) -> Result<RenderedQr> {
    generate_with(&DefaultEncoder, request)
}

/*---- Convenience ----*/

/// Renders `content` with the default rounded style as an RGBA image.
///
/// # Example
///
/// ```
/// use qrstyle::helper::generate_image_buffer;
///
/// let img = generate_image_buffer("Hello, World!").unwrap();
/// assert_eq!(img.width(), img.height());
/// ```
pub fn generate_image_buffer(content: &str) -> Result<RgbaImage> {
    Ok(prepare(&DefaultEncoder, &QrRequest::new(content))?.into_raster())
}

/// Renders `content` with the default rounded style as an SVG string.
pub fn generate_svg_string(content: &str) -> Result<String> {
    Ok(prepare(&DefaultEncoder, &QrRequest::new(content))?.into_vector())
}

/// Saves a render to `directory/filename.<ext>`, creating the directory if needed.
///
/// `directory` defaults to `generated` and `filename` to a timestamp. Returns the written path.
pub fn save(rendered: &RenderedQr, directory: Option<&str>, filename: Option<&str>) -> Result<PathBuf> {
    let directory = directory.unwrap_or("generated");
    let filename = match filename {
        Some(name) => name.to_string(),
        None => {
            let since_the_epoch = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            format!("qr_{}", since_the_epoch.as_millis())
        }
    };

    if !Path::new(directory).exists() {
        fs::create_dir_all(directory)?;
    }
    let path = Path::new(directory).join(format!("{}.{}", filename, rendered.format().extension()));
    write_file(rendered, &path)?;
    Ok(path)
}

/// Writes a render to `path`.
///
/// The output is encoded in memory first, so an encoding failure never leaves a partial file.
pub fn write_file(rendered: &RenderedQr, path: &Path) -> Result<()> {
    let bytes = rendered.to_bytes()?;
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    /// Encoder that ignores the content and returns a fixed matrix.
    struct FixedEncoder(QrMatrix);

    impl QrEncoder for FixedEncoder {
        fn encode(&self, _content: &str, _version_hint: i16) -> Result<QrMatrix> {
            Ok(self.0.clone())
        }
    }

    fn raster(rendered: RenderedQr) -> RgbaImage {
        match rendered {
            RenderedQr::Raster(img) => img,
            RenderedQr::Vector(_) => panic!("expected raster output"),
        }
    }

    fn logo_png(side: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(side, side, Rgba([200, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_hello_canvas_is_388() {
        let img = raster(generate(&QrRequest::new("HELLO")).unwrap());
        assert_eq!(img.dimensions(), (388, 388));
    }

    #[test]
    fn test_empty_content_is_rejected() {
        assert!(matches!(generate(&QrRequest::new("")), Err(Error::InvalidContent)));
    }

    #[test]
    fn test_short_hex_is_reported() {
        let request = QrRequest {
            foreground: "#FFF",
            ..QrRequest::new("HELLO")
        };
        match generate(&request) {
            Err(Error::InvalidColor { field, value }) => {
                assert_eq!(field, "foreground");
                assert_eq!(value, "#FFF");
            }
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_gradient_color_names_field() {
        let request = QrRequest {
            gradient: Some(("#1E88E5", "green")),
            ..QrRequest::new("HELLO")
        };
        assert!(matches!(
            generate(&request),
            Err(Error::InvalidColor { field: "gradient_end", .. })
        ));
    }

    #[test]
    fn test_color_validated_before_encoding() {
        let too_long = "x".repeat(4000);
        let request = QrRequest {
            background: "nope",
            ..QrRequest::new(&too_long)
        };
        assert!(matches!(generate(&request), Err(Error::InvalidColor { .. })));
    }

    #[test]
    fn test_capacity_is_terminal() {
        let too_long = "x".repeat(4000);
        assert!(matches!(
            generate(&QrRequest::new(&too_long)),
            Err(Error::EncoderCapacity { .. })
        ));
    }

    #[test]
    fn test_oversized_canvas_is_rejected() {
        let request = QrRequest {
            canvas_size: 100_000,
            ..QrRequest::new("HELLO")
        };
        assert!(matches!(
            generate(&request),
            Err(Error::InvalidGeometry { field: "canvas_size", .. })
        ));
    }

    #[test]
    fn test_gradient_style_name_uses_default_colors() {
        let request = QrRequest {
            style: "gradient",
            ..QrRequest::new("HELLO")
        };
        let img = raster(generate(&request).unwrap());
        assert_eq!(*img.get_pixel(74, 74), Rgba([30, 136, 229, 255]));
    }

    #[test]
    fn test_orange_circle_preset() {
        let request = QrRequest {
            style: "orange_circle",
            ..QrRequest::new("HELLO")
        };
        let img = raster(generate(&request).unwrap());
        assert_eq!(*img.get_pixel(74, 74), Rgba([0xFF, 0x57, 0x22, 255]));
    }

    #[test]
    fn test_unknown_style_matches_classic() {
        let classic = QrRequest {
            style: "classic",
            ..QrRequest::new("HELLO")
        };
        let unknown = QrRequest {
            style: "hexagon",
            ..QrRequest::new("HELLO")
        };
        assert_eq!(generate(&classic).unwrap(), generate(&unknown).unwrap());
    }

    #[test]
    fn test_geometry_follows_returned_matrix() {
        // A version 3 sized matrix although "HELLO" only hints version 1.
        let rows = vec![vec![false; 29]; 29];
        let encoder = FixedEncoder(QrMatrix::from_rows(rows).unwrap());
        let img = raster(generate_with(&encoder, &QrRequest::new("HELLO")).unwrap());
        // (29 + 8) * 12 + 40
        assert_eq!(img.width(), 484);
    }

    #[test]
    fn test_transparent_background_with_logo() {
        let logo = logo_png(200);
        let request = QrRequest {
            background: "transparent",
            logo: Some(&logo),
            ..QrRequest::new("HELLO")
        };
        let img = raster(generate(&request).unwrap());
        let plain = raster(
            generate(&QrRequest {
                logo: None,
                ..request.clone()
            })
            .unwrap(),
        );
        assert_eq!(img.dimensions(), plain.dimensions());

        // Logo side: 388 / 5 = 77px, placed at (388 - 77) / 2 = 155.
        let (lo, hi) = (155u32, 155 + 77);
        let center = f64::from(lo) + 77.0 / 2.0;
        let mut logo_pixels = 0;
        for (x, y, px) in img.enumerate_pixels() {
            let alpha = px.0[3];
            let module = plain.get_pixel(x, y).0[3] == 255;
            assert!(
                plain.get_pixel(x, y).0[3] == 0 || module,
                "background pixel at ({x}, {y}) is not fully transparent"
            );
            if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                let dx = f64::from(x) + 0.5 - center;
                let dy = f64::from(y) + 0.5 - center;
                // The blurred mask edge fades out within 4px of the radius.
                if (dx * dx + dy * dy).sqrt() > 77.0 / 2.0 + 4.0 && !module {
                    assert_eq!(alpha, 0, "pixel at ({x}, {y}) outside the logo circle");
                }
                if alpha > 0 && !module {
                    logo_pixels += 1;
                }
            } else {
                assert_eq!(px, plain.get_pixel(x, y), "pixel at ({x}, {y}) outside the logo");
                if !module {
                    assert_eq!(alpha, 0, "pixel at ({x}, {y}) is not fully transparent");
                }
            }
        }
        assert!(logo_pixels > 0);
        assert!(img.get_pixel(194, 194).0[3] > 0);
    }

    #[test]
    fn test_broken_logo_is_not_fatal() {
        let request = QrRequest {
            logo: Some(b"garbage"),
            ..QrRequest::new("HELLO")
        };
        let with_bad_logo = generate(&request).unwrap();
        let without_logo = generate(&QrRequest::new("HELLO")).unwrap();
        assert_eq!(with_bad_logo, without_logo);
    }

    #[test]
    fn test_vector_output_with_logo() {
        let logo = logo_png(16);
        let request = QrRequest {
            style: "classic",
            format: OutputFormat::Vector,
            logo: Some(&logo),
            ..QrRequest::new("HELLO")
        };
        let RenderedQr::Vector(svg) = generate(&request).unwrap() else {
            panic!("expected vector output");
        };
        assert_eq!(svg.matches("<image").count(), 1);
        assert!(svg.contains("viewBox=\"0 0 348 348\""));
    }

    #[test]
    fn test_output_is_deterministic() {
        let logo = logo_png(64);
        for format in [OutputFormat::Raster, OutputFormat::Vector] {
            let request = QrRequest {
                style: "rounded",
                logo: Some(&logo),
                format,
                ..QrRequest::new("https://example.com/a/b?c=d")
            };
            let a = generate(&request).unwrap().to_bytes().unwrap();
            let b = generate(&request).unwrap().to_bytes().unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_png_bytes() {
        let bytes = generate(&QrRequest::new("HELLO")).unwrap().to_bytes().unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_extension(Path::new("a.PNG")), Some(OutputFormat::Raster));
        assert_eq!(OutputFormat::from_extension(Path::new("a.svg")), Some(OutputFormat::Vector));
        assert_eq!(OutputFormat::from_extension(Path::new("a.txt")), None);
        assert_eq!(OutputFormat::from_extension(Path::new("a")), None);
    }

    #[test]
    fn test_generate_svg_string() {
        let svg = generate_svg_string("Hello, world!").unwrap();
        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_convenience_matches_generate() {
        let img = generate_image_buffer("HELLO").unwrap();
        assert_eq!(RenderedQr::Raster(img), generate(&QrRequest::new("HELLO")).unwrap());

        let svg = generate_svg_string("HELLO").unwrap();
        let request = QrRequest {
            format: OutputFormat::Vector,
            ..QrRequest::new("HELLO")
        };
        assert_eq!(RenderedQr::Vector(svg), generate(&request).unwrap());
        assert!(matches!(generate_image_buffer(""), Err(Error::InvalidContent)));
        assert!(matches!(generate_svg_string(""), Err(Error::InvalidContent)));
    }

    #[test]
    fn test_write_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("qrstyle-write-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let rendered = generate(&QrRequest::new("HELLO")).unwrap();
        let path = dir.join("hello.png");
        write_file(&rendered, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), rendered.to_bytes().unwrap());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_unencodable_render_leaves_no_file() {
        let dir = std::env::temp_dir().join(format!("qrstyle-empty-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        // PNG cannot encode a zero-sized image.
        let rendered = RenderedQr::Raster(RgbaImage::new(0, 0));
        let path = dir.join("empty.png");
        assert!(write_file(&rendered, &path).is_err());
        assert!(!path.exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
