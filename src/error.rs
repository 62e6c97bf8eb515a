//! Error type shared by every rendering entry point.

use qrcode::types::QrError;
use thiserror::Error;

/// Errors reported by the rendering pipeline.
///
/// Logo problems are the only failures recovered locally: they are logged and the
/// render continues without a logo, so [`Error::LogoLoad`] never escapes [`crate::helper::generate`].
#[derive(Debug, Error)]
pub enum Error {
    /// The content string was empty.
    #[error("content must not be empty")]
    InvalidContent,

    /// A color parameter was neither a 6-digit hex value nor the transparent sentinel.
    #[error("invalid color for `{field}`: {value:?} (expected 6 hex digits such as #1E88E5)")]
    InvalidColor { field: &'static str, value: String },

    /// A size parameter was zero or exceeded [`crate::MAX_CANVAS_SIZE`].
    #[error("invalid geometry for `{field}`: {value}")]
    InvalidGeometry { field: &'static str, value: u32 },

    /// The content does not fit in any QR version at error correction level H.
    #[error("content of {length} bytes does not fit in a QR code at high error correction")]
    EncoderCapacity { length: usize },

    /// Any other failure reported by the QR encoder.
    #[error("QR encoding failed: {0}")]
    Encoder(QrError),

    /// The logo could not be decoded or resized.
    #[error("logo could not be used: {0}")]
    LogoLoad(String),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_color(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidColor {
            field,
            value: value.into(),
        }
    }

    pub(crate) fn invalid_geometry(field: &'static str, value: u32) -> Self {
        Self::InvalidGeometry { field, value }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
