//! 8-bit grayscale pixel buffer
//!
//! A [`PixelBuffer`] is a row-major grid of `width * height` intensity bytes.
//! The pixel count must be a non-zero multiple of [`ALIGNMENT`]; buffers
//! that break this rule cannot be constructed.
//!
//! Storage is reserved with `try_reserve_exact`, so running out of memory
//! surfaces as [`Error::AllocationFailed`] instead of aborting the process.

use crate::error::{Error, Result};

/// Pixel count granularity required of every buffer
pub const ALIGNMENT: usize = 64;

/// Width and height of a buffer, validated against the alignment rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Validate and create a dimension pair.
    ///
    /// Fails with [`Error::InvalidDimensions`] when either side is zero,
    /// when the pixel count overflows `usize`, or when the pixel count is
    /// not a multiple of [`ALIGNMENT`].
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let invalid = Error::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        let area = (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::InvalidDimensions { width, height })?;
        if area % ALIGNMENT != 0 {
            return Err(invalid);
        }
        Ok(Self { width, height })
    }

    /// Width in pixels (the row stride)
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels
    #[inline]
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Linear offset of `(x, y)` in a row-major buffer.
    #[inline]
    pub fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Whether `(x, y)` lies inside the buffer.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Reserve exactly `len` bytes, all set to `value`.
///
/// Used for both image and scratch buffers so that every allocation in the
/// filter path reports failure the same way.
pub fn alloc_pixels(len: usize, value: u8) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| Error::AllocationFailed { bytes: len })?;
    data.resize(len, value);
    Ok(data)
}

/// Row-major 8-bit grayscale image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    dims: Dimensions,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::filled(width, height, 0)
    }

    /// Create a buffer with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        let data = alloc_pixels(dims.area(), value)?;
        Ok(Self { dims, data })
    }

    /// Wrap existing pixel data.
    ///
    /// `data.len()` must equal `width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let dims = Dimensions::new(width, height)?;
        Self::from_parts(dims, data)
    }

    /// Wrap existing pixel data with already-validated dimensions.
    pub fn from_parts(dims: Dimensions, data: Vec<u8>) -> Result<Self> {
        if data.len() != dims.area() {
            return Err(Error::LengthMismatch {
                expected: dims.area(),
                actual: data.len(),
            });
        }
        Ok(Self { dims, data })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.dims.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.dims.height
    }

    #[inline]
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Number of pixels (equal to the byte length)
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false`: zero-sized buffers cannot be constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major pixel data
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable row-major pixel data
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer, returning its pixel data.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Consume the buffer, returning its dimensions and pixel data.
    pub fn into_parts(self) -> (Dimensions, Vec<u8>) {
        (self.dims, self.data)
    }

    /// Pixel value at `(x, y)`, or `None` when out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<u8> {
        if !self.dims.contains(x, y) {
            return None;
        }
        Some(self.data[self.dims.offset(x, y)])
    }

    /// Set the pixel at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, value: u8) -> Result<()> {
        if !self.dims.contains(x, y) {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.dims.width,
                height: self.dims.height,
            });
        }
        let offset = self.dims.offset(x, y);
        self.data[offset] = value;
        Ok(())
    }

    /// Row `y` as a slice, or `None` when out of bounds.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.dims.height {
            return None;
        }
        let w = self.dims.width as usize;
        let start = y as usize * w;
        Some(&self.data[start..start + w])
    }

    /// Set every pixel to `value`.
    pub fn fill(&mut self, value: u8) {
        self.data.fill(value);
    }

    /// Returns the shared value if every pixel is identical.
    pub fn uniform_value(&self) -> Option<u8> {
        let first = *self.data.first()?;
        self.data.iter().all(|&v| v == first).then_some(first)
    }

    /// Check that `other` has the same dimensions.
    pub fn check_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if self.dims != other.dims {
            return Err(Error::DimensionMismatch {
                expected: (self.dims.width, self.dims.height),
                actual: (other.dims.width, other.dims.height),
            });
        }
        Ok(())
    }

    /// Whether every pixel of `self` is `<=` the matching pixel of `other`.
    ///
    /// Buffers of different size are never ordered.
    pub fn is_pointwise_le(&self, other: &PixelBuffer) -> bool {
        self.dims == other.dims && self.data.iter().zip(&other.data).all(|(a, b)| a <= b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_alignment() {
        assert!(Dimensions::new(8, 8).is_ok());
        assert!(Dimensions::new(64, 1).is_ok());
        assert!(Dimensions::new(16, 4).is_ok());
        assert!(matches!(
            Dimensions::new(7, 9),
            Err(Error::InvalidDimensions {
                width: 7,
                height: 9
            })
        ));
        assert!(Dimensions::new(0, 64).is_err());
        assert!(Dimensions::new(64, 0).is_err());
    }

    #[test]
    fn test_dimensions_offset() {
        let dims = Dimensions::new(16, 4).unwrap();
        assert_eq!(dims.area(), 64);
        assert_eq!(dims.offset(0, 0), 0);
        assert_eq!(dims.offset(3, 2), 35);
        assert!(dims.contains(15, 3));
        assert!(!dims.contains(16, 0));
        assert_eq!(dims.to_string(), "16x4");
    }

    #[test]
    fn test_new_is_zeroed() {
        let buf = PixelBuffer::new(8, 8).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(!buf.is_empty());
        assert_eq!(buf.uniform_value(), Some(0));
    }

    #[test]
    fn test_from_vec_length_check() {
        let err = PixelBuffer::from_vec(8, 8, vec![0; 63]).unwrap_err();
        assert!(matches!(
            err,
            Error::LengthMismatch {
                expected: 64,
                actual: 63
            }
        ));
        assert!(PixelBuffer::from_vec(8, 8, vec![1; 64]).is_ok());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut buf = PixelBuffer::new(8, 8).unwrap();
        buf.set_pixel(3, 5, 200).unwrap();
        assert_eq!(buf.get_pixel(3, 5), Some(200));
        assert_eq!(buf.data()[5 * 8 + 3], 200);
        assert_eq!(buf.get_pixel(8, 0), None);
        assert!(buf.set_pixel(0, 8, 1).is_err());
        assert_eq!(buf.row(5).unwrap()[3], 200);
        assert!(buf.row(8).is_none());
        assert_eq!(buf.uniform_value(), None);
    }

    #[test]
    fn test_alloc_pixels() {
        assert_eq!(alloc_pixels(64, 7).unwrap(), vec![7u8; 64]);
        assert!(matches!(
            alloc_pixels(usize::MAX, 0),
            Err(Error::AllocationFailed { bytes }) if bytes == usize::MAX
        ));
    }

    #[test]
    fn test_fill_and_data_mut() {
        let mut buf = PixelBuffer::new(16, 4).unwrap();
        buf.fill(9);
        assert_eq!(buf.uniform_value(), Some(9));
        buf.data_mut()[17] = 3;
        assert_eq!(buf.get_pixel(1, 1), Some(3));
        assert_eq!(buf.uniform_value(), None);
    }

    #[test]
    fn test_pointwise_order() {
        let a = PixelBuffer::filled(8, 8, 10).unwrap();
        let mut b = PixelBuffer::filled(8, 8, 10).unwrap();
        assert!(a.is_pointwise_le(&b));
        b.set_pixel(0, 0, 9).unwrap();
        assert!(!a.is_pointwise_le(&b));
        assert!(b.is_pointwise_le(&a));

        let c = PixelBuffer::filled(16, 4, 255).unwrap();
        assert!(!a.is_pointwise_le(&c));
        assert!(a.check_same_size(&c).is_err());
    }
}
