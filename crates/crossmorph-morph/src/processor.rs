//! Per-tile filter kernel
//!
//! Reads neighborhoods from the shared source buffer and writes reduced
//! values into the tile's own destination rows. Reads may cross the tile
//! boundary; writes never do.

use crate::neighborhood::sample_cross;
use crate::plan::FilterKind;
use crate::tile::TileViewMut;
use crossmorph_core::Dimensions;

/// Apply `kind` to every pixel of one tile.
///
/// `src` is the full source buffer of shape `dims`; `view` holds the
/// destination pixels of the tile.
pub fn process_tile(src: &[u8], dims: Dimensions, view: &mut TileViewMut<'_>, kind: FilterKind) {
    let tile = view.tile();
    let (width, height) = (dims.width(), dims.height());

    for (dy, out_row) in view.rows_mut().iter_mut().enumerate() {
        let row = tile.row_offset + dy as u32;
        for (dx, out) in out_row.iter_mut().enumerate() {
            let col = tile.col_offset + dx as u32;
            *out = kind.reduce(&sample_cross(src, width, height, row, col));
        }
    }
}
