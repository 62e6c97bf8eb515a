//! # qrstyle
//!
//! A Rust library for rendering decorative QR codes from an encoded module matrix.
//!
//! `qrstyle` takes the boolean grid produced by a QR encoder and paints it as an RGBA image or
//! an SVG document. Encoding itself is delegated to the [`qrcode`] crate at high error
//! correction, so a centered logo can cover part of the code and it still scans.
//!
//! ## Features
//!
//! - Three module styles: classic squares, rounded squares and circular dots.
//! - Vertical two-color gradients.
//! - Solid or fully transparent backgrounds.
//! - Centered logos with a soft circular mask (raster) or embedded as a square image (SVG).
//! - Canvas, border and module size derived from the content length.
//!
//! ## Example
//!
//! Render a circle-style PNG with a transparent background:
//!
//! ```rust
//! use qrstyle::helper::{generate, QrRequest};
//!
//! let request = QrRequest {
//!     style: "circle",
//!     foreground: "#8BC34A",
//!     background: "transparent",
//!     ..QrRequest::new("https://example.com")
//! };
//! let png = generate(&request).unwrap().to_bytes().unwrap();
//! assert!(png.starts_with(b"\x89PNG"));
//! ```
//!
//! Render a gradient directly from a matrix:
//!
//! ```rust
//! use qrstyle::gradient::{render_gradient, GradientConfig};
//! use qrstyle::matrix::{DefaultEncoder, QrEncoder};
//!
//! let matrix = DefaultEncoder.encode("HELLO", 1).unwrap();
//! let img = render_gradient(&matrix, &GradientConfig::default());
//! assert_eq!(img.dimensions(), (350, 350));
//! ```
//!
//! ## Modules
//!
//! - [`helper`]: One-call rendering from caller-supplied strings, plus file output.
//! - [`matrix`]: The module grid and the encoder seam.
//! - [`size`]: Version hint, border, module and canvas sizing.
//! - [`raster`], [`gradient`], [`svg`]: The three renderers.
//! - [`finder`]: Finder pattern membership.
//! - [`color`]: Hex colors and the transparent sentinel.
//! - [`logo`]: Logo resizing, masking and compositing.

#![forbid(unsafe_code)]

pub mod color;
pub mod error;
pub mod finder;
pub mod gradient;
pub mod helper;
pub mod logo;
pub mod matrix;
pub mod raster;
pub mod size;
pub mod svg;

pub use error::{Error, Result};
pub use size::MAX_CANVAS_SIZE;
