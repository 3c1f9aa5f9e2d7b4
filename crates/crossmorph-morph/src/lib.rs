//! crossmorph-morph - Tiled grayscale morphology
//!
//! This crate provides grayscale erosion and dilation with a fixed
//! cross-shaped structuring element (center plus the four direct
//! neighbors), executed as repeated passes over tiled buffers:
//!
//! - Neighborhood sampling with clamp-to-self boundaries
//! - Per-tile filter kernel writing only into its own region
//! - Tile grid scheduling with size normalization
//! - Multi-pass engine with buffer ping-pong and a per-run worker pool
//! - Pass plans, including a `"e2 + d1"` sequence syntax

pub mod engine;
mod error;
pub mod neighborhood;
pub mod plan;
pub mod processor;
pub mod tile;

pub use engine::{EngineConfig, Execution, FilterEngine, MAX_WORKERS};
pub use error::{MorphError, MorphResult};
pub use neighborhood::sample_cross;
pub use plan::{FilterKind, PassPlan, PassStep};
pub use processor::process_tile;
pub use tile::{DEFAULT_TILE_SIZE, TILE_GRANULARITY, Tile, TileGrid, TileSize, TileViewMut};
