//! 2D RGBA8 texture data.

use thiserror::Error;

/// Errors from texture construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Width or height is zero.
    #[error("texture dimensions {width}x{height} are empty")]
    ZeroSize {
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// The pixel buffer does not hold `width * height * 4` bytes.
    #[error("expected {expected} bytes of RGBA8 data, got {actual}")]
    SizeMismatch {
        /// Required byte count.
        expected: usize,
        /// Supplied byte count.
        actual: usize,
    },
}

/// An RGBA8 image already in memory, stored in sRGB.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
    label: Option<String>,
}

impl Texture {
    /// Validated texture from raw RGBA8 rows, top to bottom.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            label: None,
        })
    }

    /// 1x1 texture of one color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: rgba.to_vec(),
            label: Some("solid".into()),
        }
    }

    /// Two-tone checkerboard, `size` pixels square with `tile` pixel cells.
    pub fn checkerboard(size: u32, tile: u32, light: [u8; 4], dark: [u8; 4]) -> Self {
        let size = size.max(1);
        let tile = tile.max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let even = ((x / tile) + (y / tile)) % 2 == 0;
                data.extend_from_slice(if even { &light } else { &dark });
            }
        }
        Self {
            width: size,
            height: size,
            data,
            label: Some("checkerboard".into()),
        }
    }

    /// Attach a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Debug label.
    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_validation() {
        assert!(Texture::from_rgba8(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            Texture::from_rgba8(2, 2, vec![0; 12]),
            Err(TextureError::SizeMismatch { expected: 16, actual: 12 })
        );
        assert_eq!(
            Texture::from_rgba8(0, 4, Vec::new()),
            Err(TextureError::ZeroSize { width: 0, height: 4 })
        );
    }

    #[test]
    fn test_checkerboard_pattern() {
        let t = Texture::checkerboard(4, 2, [255; 4], [0, 0, 0, 255]);
        assert_eq!(t.data().len(), 64);
        assert_eq!(&t.data()[0..4], &[255; 4]);
        // pixel (2, 0) sits in the next tile
        assert_eq!(&t.data()[8..12], &[0, 0, 0, 255]);
    }
}
