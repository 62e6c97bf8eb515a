//! The boolean module grid and the QR encoder that produces it.
//!
//! Encoding itself (version selection, Reed-Solomon, masking) is delegated to the
//! [`qrcode`] crate. This module only adapts its output into a [`QrMatrix`].

use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};

use crate::error::{Error, Result};

/// A square grid of modules, `true` meaning dark.
///
/// Immutable once built. Geometry should always be derived from [`QrMatrix::size`],
/// never from the version hint that was passed to the encoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QrMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Builds a matrix from rows. Returns `None` if the rows do not form a non-empty square.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrstyle::matrix::QrMatrix;
    ///
    /// let m = QrMatrix::from_rows(vec![vec![true, false], vec![false, true]]).unwrap();
    /// assert_eq!(m.size(), 2);
    /// assert!(m.get(1, 1));
    /// assert!(QrMatrix::from_rows(vec![vec![true, false]]).is_none());
    /// ```
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Option<Self> {
        let size = rows.len();
        if size == 0 || rows.iter().any(|row| row.len() != size) {
            return None;
        }
        Some(Self {
            size,
            modules: rows.into_iter().flatten().collect(),
        })
    }

    /// The width and height of the matrix, in modules.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the module at column `x`, row `y`. Out-of-range coordinates are light.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size && self.modules[y * self.size + x]
    }

    /// Iterates over the `(x, y)` coordinates of dark modules, row by row.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.modules
            .iter()
            .enumerate()
            .filter(|(_, dark)| **dark)
            .map(move |(i, _)| (i % size, i / size))
    }

    /// Number of dark modules.
    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|dark| **dark).count()
    }
}

/// Anything that can turn content into a module grid at high error correction.
pub trait QrEncoder {
    /// Encodes `content`, starting from `version_hint` and growing if it does not fit.
    fn encode(&self, content: &str, version_hint: i16) -> Result<QrMatrix>;
}

/// Encoder backed by the `qrcode` crate, always at error correction level H.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultEncoder;

impl QrEncoder for DefaultEncoder {
    fn encode(&self, content: &str, version_hint: i16) -> Result<QrMatrix> {
        let data = content.as_bytes();
        let hint = version_hint.clamp(1, 40);
        let code = match QrCode::with_version(data, Version::Normal(hint), EcLevel::H) {
            Ok(code) => code,
            // Let the encoder pick the smallest version that fits.
            Err(QrError::DataTooLong) => QrCode::with_error_correction_level(data, EcLevel::H)
                .map_err(|e| encoder_error(e, data.len()))?,
            Err(e) => return Err(encoder_error(e, data.len())),
        };

        let size = code.width();
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();
        if let Version::Normal(actual) = code.version() {
            if actual != hint {
                log::debug!("encoder chose version {actual} instead of hint {hint}");
            }
        }
        Ok(QrMatrix { size, modules })
    }
}

fn encoder_error(e: QrError, length: usize) -> Error {
    match e {
        QrError::DataTooLong => Error::EncoderCapacity { length },
        other => Error::Encoder(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_is_version_1() {
        let matrix = DefaultEncoder.encode("HELLO", 1).unwrap();
        assert_eq!(matrix.size(), 21);
        // Top-left finder corner is always dark.
        assert!(matrix.get(0, 0));
        assert!(!matrix.get(1, 1));
    }

    #[test]
    fn test_hint_is_a_minimum() {
        let matrix = DefaultEncoder.encode("HELLO", 3).unwrap();
        assert_eq!(matrix.size(), 29);
    }

    #[test]
    fn test_encoder_grows_past_hint() {
        let content = "x".repeat(120);
        let matrix = DefaultEncoder.encode(&content, 1).unwrap();
        assert!(matrix.size() > 21);
        assert_eq!((matrix.size() - 17) % 4, 0);
    }

    #[test]
    fn test_capacity_error() {
        let content = "x".repeat(4000);
        match DefaultEncoder.encode(&content, 4) {
            Err(Error::EncoderCapacity { length }) => assert_eq!(length, 4000),
            other => panic!("expected capacity error, got {other:?}"),
        }
    }

    #[test]
    fn test_dark_modules_iterates_row_major() {
        let m = QrMatrix::from_rows(vec![
            vec![false, true, false],
            vec![true, false, false],
            vec![false, false, true],
        ])
        .unwrap();
        let dark: Vec<_> = m.dark_modules().collect();
        assert_eq!(dark, vec![(1, 0), (0, 1), (2, 2)]);
        assert_eq!(m.dark_count(), 3);
        assert!(!m.get(3, 0));
    }
}
