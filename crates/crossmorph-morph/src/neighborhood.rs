//! Cross-shaped 5-pixel neighborhood sampling
//!
//! The structuring element is fixed: the center pixel plus its four
//! direct neighbors, returned in the order `[center, left, top, right,
//! bottom]`.
//!
//! # Boundary policy
//!
//! A neighbor that would fall outside `[0, dimension)` along its axis is
//! replaced by the center's own coordinate on that axis (clamp-to-self).
//! A pixel on the left edge therefore uses itself as its left neighbor.
//! Nothing is mirrored or wrapped.

/// Number of samples in the cross neighborhood
pub const CROSS_LEN: usize = 5;

/// Index of each sample in the array returned by [`sample_cross`]
pub const CENTER: usize = 0;
pub const LEFT: usize = 1;
pub const TOP: usize = 2;
pub const RIGHT: usize = 3;
pub const BOTTOM: usize = 4;

/// Sample the cross neighborhood of `(row, col)`.
///
/// `src` is a row-major buffer with stride `width` and `height` rows.
/// The caller guarantees `row < height` and `col < width`.
///
/// Pure function of its inputs; it only reads `src`, so any number of
/// threads may sample the same buffer concurrently.
#[inline]
pub fn sample_cross(src: &[u8], width: u32, height: u32, row: u32, col: u32) -> [u8; CROSS_LEN] {
    debug_assert!(row < height && col < width);

    let left = if col == 0 { col } else { col - 1 };
    let top = if row == 0 { row } else { row - 1 };
    let right = if col + 1 >= width { col } else { col + 1 };
    let bottom = if row + 1 >= height { row } else { row + 1 };

    let stride = width as usize;
    let at = |r: u32, c: u32| src[r as usize * stride + c as usize];

    [
        at(row, col),
        at(row, left),
        at(top, col),
        at(row, right),
        at(bottom, col),
    ]
}
