//! Tile grid scheduling
//!
//! Partitions a buffer into a grid of rectangular tiles that are processed
//! independently. Tile `t` sits at grid position
//! `(t / horizontal_tiles, t % horizontal_tiles)`, and its pixel offset is
//! `(grid_row * tile_height, grid_col * tile_width)`.
//!
//! # Tile size normalization
//!
//! A requested size is accepted only when both sides are non-zero
//! multiples of [`TILE_GRANULARITY`] that fit inside the buffer. Otherwise
//! the grid falls back to [`DEFAULT_TILE_SIZE`] on each side, clamped to
//! the buffer dimension.
//!
//! When a tile size does not divide the buffer, the last tile row/column
//! is truncated at the buffer edge so every pixel still belongs to exactly
//! one tile.

use crossmorph_core::Dimensions;
use tracing::warn;

/// Tile side used when no valid size is requested
pub const DEFAULT_TILE_SIZE: u32 = 64;

/// Requested tile sides must be multiples of this
pub const TILE_GRANULARITY: u32 = 16;

/// Requested tile size; `0` on either side selects the default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileSize {
    pub width: u32,
    pub height: u32,
}

impl TileSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Square tile of side `side`.
    pub fn square(side: u32) -> Self {
        Self::new(side, side)
    }

    fn is_valid_for(&self, dims: Dimensions) -> bool {
        self.width != 0
            && self.height != 0
            && self.width % TILE_GRANULARITY == 0
            && self.height % TILE_GRANULARITY == 0
            && self.width <= dims.width()
            && self.height <= dims.height()
    }

    /// Validate against `dims`, falling back to the clamped default.
    pub fn normalize(self, dims: Dimensions) -> TileSize {
        if self.is_valid_for(dims) {
            return self;
        }
        let fallback = TileSize::new(
            DEFAULT_TILE_SIZE.min(dims.width()),
            DEFAULT_TILE_SIZE.min(dims.height()),
        );
        if self != TileSize::default() {
            warn!(
                requested_width = self.width,
                requested_height = self.height,
                width = fallback.width,
                height = fallback.height,
                "tile size overridden"
            );
        }
        fallback
    }
}

/// Rectangular region of a buffer assigned to one worker for one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    /// Position in the grid's row-major tile order
    pub index: usize,
    pub row_offset: u32,
    pub col_offset: u32,
    pub tile_height: u32,
    pub tile_width: u32,
}

impl Tile {
    /// Number of pixels covered
    pub fn area(&self) -> usize {
        self.tile_height as usize * self.tile_width as usize
    }

    /// Whether the pixel `(row, col)` falls inside this tile.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.row_offset
            && row < self.row_offset + self.tile_height
            && col >= self.col_offset
            && col < self.col_offset + self.tile_width
    }
}

/// Tile layout for one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    dims: Dimensions,
    tile_size: TileSize,
    horizontal_tiles: usize,
    vertical_tiles: usize,
}

impl TileGrid {
    /// Lay out tiles of (normalized) `requested` size over `dims`.
    pub fn new(dims: Dimensions, requested: TileSize) -> Self {
        let tile_size = requested.normalize(dims);
        Self::with_tile_size(dims, tile_size)
    }

    /// A single tile covering the whole buffer.
    pub fn whole(dims: Dimensions) -> Self {
        Self::with_tile_size(dims, TileSize::new(dims.width(), dims.height()))
    }

    fn with_tile_size(dims: Dimensions, tile_size: TileSize) -> Self {
        Self {
            dims,
            tile_size,
            horizontal_tiles: dims.width().div_ceil(tile_size.width) as usize,
            vertical_tiles: dims.height().div_ceil(tile_size.height) as usize,
        }
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Effective (normalized) tile size
    pub fn tile_size(&self) -> TileSize {
        self.tile_size
    }

    pub fn horizontal_tiles(&self) -> usize {
        self.horizontal_tiles
    }

    pub fn vertical_tiles(&self) -> usize {
        self.vertical_tiles
    }

    /// Total number of tiles
    pub fn len(&self) -> usize {
        self.horizontal_tiles * self.vertical_tiles
    }

    /// Always `false`: a grid covers at least one pixel.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Descriptor of tile `index`, or `None` past the end.
    pub fn tile(&self, index: usize) -> Option<Tile> {
        if index >= self.len() {
            return None;
        }
        let grid_row = (index / self.horizontal_tiles) as u32;
        let grid_col = (index % self.horizontal_tiles) as u32;
        let row_offset = grid_row * self.tile_size.height;
        let col_offset = grid_col * self.tile_size.width;
        Some(Tile {
            index,
            row_offset,
            col_offset,
            tile_height: self.tile_size.height.min(self.dims.height() - row_offset),
            tile_width: self.tile_size.width.min(self.dims.width() - col_offset),
        })
    }

    /// All tiles in index order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        (0..self.len()).filter_map(|t| self.tile(t))
    }

    /// Index of the tile owning pixel `(row, col)`.
    pub fn tile_index_of(&self, row: u32, col: u32) -> Option<usize> {
        if !self.dims.contains(col, row) {
            return None;
        }
        let grid_row = (row / self.tile_size.height) as usize;
        let grid_col = (col / self.tile_size.width) as usize;
        Some(grid_row * self.horizontal_tiles + grid_col)
    }

    /// Split `dst` into one disjoint writable view per tile, in index order.
    ///
    /// `dst` must hold exactly `width * height` bytes.
    pub fn split_mut<'a>(&self, dst: &'a mut [u8]) -> Vec<TileViewMut<'a>> {
        debug_assert_eq!(dst.len(), self.dims.area());

        let mut views: Vec<TileViewMut<'a>> = self
            .tiles()
            .map(|tile| TileViewMut {
                tile,
                rows: Vec::with_capacity(tile.tile_height as usize),
            })
            .collect();

        let tile_height = self.tile_size.height as usize;
        for (y, mut rest) in dst.chunks_mut(self.dims.width() as usize).enumerate() {
            let first = (y / tile_height) * self.horizontal_tiles;
            for view in &mut views[first..first + self.horizontal_tiles] {
                let (segment, tail) =
                    std::mem::take(&mut rest).split_at_mut(view.tile.tile_width as usize);
                view.rows.push(segment);
                rest = tail;
            }
        }

        views
    }
}

/// Exclusive write access to the destination pixels of one tile
#[derive(Debug)]
pub struct TileViewMut<'a> {
    tile: Tile,
    rows: Vec<&'a mut [u8]>,
}

impl<'a> TileViewMut<'a> {
    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// One slice per tile row, each `tile_width` bytes long
    pub fn rows_mut(&mut self) -> &mut [&'a mut [u8]] {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions::new(w, h).unwrap()
    }

    #[test]
    fn test_normalize_accepts_valid() {
        assert_eq!(
            TileSize::new(16, 32).normalize(dims(64, 64)),
            TileSize::new(16, 32)
        );
        assert_eq!(
            TileSize::square(64).normalize(dims(64, 64)),
            TileSize::square(64)
        );
    }

    #[test]
    fn test_normalize_fallback() {
        let d = dims(128, 128);
        // zero
        assert_eq!(TileSize::default().normalize(d), TileSize::square(64));
        // not a multiple of 16
        assert_eq!(TileSize::square(20).normalize(d), TileSize::square(64));
        assert_eq!(TileSize::new(16, 0).normalize(d), TileSize::square(64));
        // larger than the buffer
        assert_eq!(TileSize::square(256).normalize(d), TileSize::square(64));
    }

    #[test]
    fn test_normalize_clamps_default() {
        assert_eq!(TileSize::default().normalize(dims(8, 8)), TileSize::square(8));
        assert_eq!(
            TileSize::square(16).normalize(dims(32, 2)),
            TileSize::new(32, 2)
        );
    }

    #[test]
    fn test_index_mapping() {
        let grid = TileGrid::new(dims(64, 64), TileSize::square(16));
        assert_eq!(grid.horizontal_tiles(), 4);
        assert_eq!(grid.vertical_tiles(), 4);
        assert_eq!(grid.len(), 16);

        let t = grid.tile(6).unwrap();
        assert_eq!((t.row_offset, t.col_offset), (16, 32));
        assert_eq!((t.tile_height, t.tile_width), (16, 16));
        assert!(grid.tile(16).is_none());
        assert_eq!(grid.tile_index_of(17, 33), Some(6));
    }

    #[test]
    fn test_tiles_partition_buffer() {
        for (w, h, ts) in [(64, 64, 16), (64, 64, 32), (80, 80, 32), (48, 16, 32), (8, 8, 0)] {
            let grid = TileGrid::new(dims(w, h), TileSize::square(ts));
            let mut owners = vec![0u32; (w * h) as usize];
            for tile in grid.tiles() {
                for row in tile.row_offset..tile.row_offset + tile.tile_height {
                    for col in tile.col_offset..tile.col_offset + tile.tile_width {
                        owners[(row * w + col) as usize] += 1;
                        assert_eq!(grid.tile_index_of(row, col), Some(tile.index));
                    }
                }
            }
            assert!(owners.iter().all(|&n| n == 1), "{}x{} tile {}", w, h, ts);
            let covered: usize = grid.tiles().map(|t| t.area()).sum();
            assert_eq!(covered, (w * h) as usize);
        }
    }

    #[test]
    fn test_truncated_edge_tiles() {
        let grid = TileGrid::new(dims(80, 80), TileSize::square(32));
        assert_eq!(grid.len(), 9);
        let last = grid.tile(8).unwrap();
        assert_eq!((last.row_offset, last.col_offset), (64, 64));
        assert_eq!((last.tile_height, last.tile_width), (16, 16));
    }

    #[test]
    fn test_whole_grid() {
        let grid = TileGrid::whole(dims(48, 16));
        assert_eq!(grid.len(), 1);
        let t = grid.tile(0).unwrap();
        assert_eq!((t.tile_width, t.tile_height), (48, 16));
    }

    fn fill_view(view: &mut TileViewMut<'_>, value: u8) {
        for row in view.rows_mut().iter_mut() {
            row.fill(value);
        }
    }

    #[test]
    fn test_rows_mut_through_helper() {
        let grid = TileGrid::new(dims(32, 32), TileSize::square(16));
        let mut dst = vec![0u8; 32 * 32];
        {
            let mut views = grid.split_mut(&mut dst);
            fill_view(&mut views[3], 200);
            fill_view(&mut views[3], 201);
            let rows = views[0].rows_mut();
            assert_eq!(rows.len(), 16);
            rows[15][15] = 1;
        }
        assert_eq!(dst[15 * 32 + 15], 1);
        assert_eq!(dst[16 * 32 + 16], 201);
        assert_eq!(dst[31 * 32 + 31], 201);
        assert_eq!(dst[16 * 32 + 15], 0);
    }

    #[test]
    fn test_split_mut_writes_own_region() {
        let grid = TileGrid::new(dims(64, 32), TileSize::square(16));
        let mut dst = vec![0u8; 64 * 32];
        let mut views = grid.split_mut(&mut dst);
        assert_eq!(views.len(), 8);
        for view in &mut views {
            let index = view.tile().index as u8;
            for row in view.rows_mut() {
                assert_eq!(row.len(), 16);
                row.fill(index);
            }
        }
        drop(views);
        for row in 0..32u32 {
            for col in 0..64u32 {
                let expected = grid.tile_index_of(row, col).unwrap() as u8;
                assert_eq!(dst[(row * 64 + col) as usize], expected);
            }
        }
    }
}
