//! Multi-pass filter engine
//!
//! Runs a [`PassPlan`] over a [`PixelBuffer`]. Each pass reads one buffer
//! and writes the other; the two buffers swap roles after the pass, so no
//! pixel data is copied between passes.
//!
//! # Parallel execution
//!
//! In [`Execution::Parallel`] mode the buffer is split into a [`TileGrid`]
//! and a rayon thread pool of `min(tile_count, max_workers, cores)`
//! threads is built once per run. Tile `t` is statically assigned to worker
//! `t % workers`, so every tile is processed exactly once whatever the
//! tile count. Each pass is a `ThreadPool::scope`, which returns only when
//! every worker has finished (the end-of-pass barrier).
//!
//! A panicking tile task stops the pass: the other workers stop picking up
//! tiles and the run fails with [`MorphError::WorkerDispatchFailure`].
//!
//! # Examples
//!
//! ```
//! use crossmorph_core::PixelBuffer;
//! use crossmorph_morph::{EngineConfig, FilterEngine};
//!
//! let mut image = PixelBuffer::new(8, 8).unwrap();
//! image.set_pixel(3, 3, 100).unwrap();
//!
//! let engine = FilterEngine::new(EngineConfig::default());
//! let out = engine.apply(image, 1, 1).unwrap();
//! assert_eq!(out.uniform_value(), Some(0));
//! ```

use crate::plan::{FilterKind, PassPlan};
use crate::processor::process_tile;
use crate::tile::{TileGrid, TileSize, TileViewMut};
use crate::{MorphError, MorphResult};
use crossmorph_core::{Dimensions, PixelBuffer, alloc_pixels};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, error, trace};

/// Upper bound on worker threads for one run
pub const MAX_WORKERS: usize = 1024;

/// How passes are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Whole buffer as one tile on the calling thread
    Sequential,
    /// Tiled, on a dedicated worker pool
    #[default]
    Parallel,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Requested tile size; normalized against the buffer at run time
    pub tile_size: TileSize,
    /// Maximum number of worker threads
    pub max_workers: usize,
    pub execution: Execution,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: TileSize::default(),
            max_workers: MAX_WORKERS,
            execution: Execution::Parallel,
        }
    }
}

impl EngineConfig {
    /// Square tiles of side `side` (0 selects the default).
    pub fn with_tile_size(mut self, side: u32) -> Self {
        self.tile_size = TileSize::square(side);
        self
    }

    pub fn with_tile_dims(mut self, width: u32, height: u32) -> Self {
        self.tile_size = TileSize::new(width, height);
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Shorthand for `with_execution(Execution::Sequential)`.
    pub fn sequential(self) -> Self {
        self.with_execution(Execution::Sequential)
    }
}

/// Tiled erosion/dilation engine
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    config: EngineConfig,
}

impl FilterEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `n_erode` erosion passes followed by `n_dilate` dilation passes.
    pub fn apply(&self, image: PixelBuffer, n_erode: u32, n_dilate: u32) -> MorphResult<PixelBuffer> {
        self.run(image, &PassPlan::erode_then_dilate(n_erode, n_dilate))
    }

    /// Like [`apply`](Self::apply), on raw row-major bytes.
    ///
    /// Fails with [`MorphError::InvalidDimensions`] when `width * height`
    /// is not a non-zero multiple of 64.
    pub fn apply_raw(
        &self,
        width: u32,
        height: u32,
        data: Vec<u8>,
        n_erode: u32,
        n_dilate: u32,
    ) -> MorphResult<Vec<u8>> {
        let image = PixelBuffer::from_vec(width, height, data)?;
        Ok(self.apply(image, n_erode, n_dilate)?.into_vec())
    }

    /// Execute every step of `plan` in order and return the final image.
    pub fn run(&self, image: PixelBuffer, plan: &PassPlan) -> MorphResult<PixelBuffer> {
        self.run_with(image, plan, process_tile)
    }

    /// Core pass loop, generic over the per-tile kernel.
    fn run_with<F>(&self, image: PixelBuffer, plan: &PassPlan, kernel: F) -> MorphResult<PixelBuffer>
    where
        F: Fn(&[u8], Dimensions, &mut TileViewMut<'_>, FilterKind) + Sync,
    {
        if self.config.max_workers == 0 {
            return Err(MorphError::InvalidParameters(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if plan.is_empty() {
            return Ok(image);
        }

        let (dims, data) = image.into_parts();
        let grid = match self.config.execution {
            Execution::Sequential => TileGrid::whole(dims),
            Execution::Parallel => TileGrid::new(dims, self.config.tile_size),
        };
        let dispatcher = Dispatcher::new(&grid, &self.config)?;
        let mut buffers = PingPong::new(data)?;

        debug!(
            dims = %dims,
            tile_width = grid.tile_size().width,
            tile_height = grid.tile_size().height,
            tiles = grid.len(),
            workers = dispatcher.workers(),
            plan = %plan,
            "starting filter run"
        );

        for step in plan.steps() {
            for pass in 0..step.count {
                debug!(kind = %step.kind, pass = pass + 1, of = step.count, "filter pass");
                let (src, dst) = buffers.split();
                dispatcher.run_pass(&grid, src, dst, step.kind, &kernel)?;
                buffers.swap();
            }
        }

        Ok(PixelBuffer::from_parts(dims, buffers.into_current())?)
    }
}

/// Which of the two buffers currently holds the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    First,
    Second,
}

/// Current/scratch buffer pair whose roles alternate after every pass
struct PingPong {
    buffers: [Vec<u8>; 2],
    current: Slot,
}

impl PingPong {
    fn new(image: Vec<u8>) -> MorphResult<Self> {
        let scratch = alloc_pixels(image.len(), 0)?;
        Ok(Self {
            buffers: [image, scratch],
            current: Slot::First,
        })
    }

    /// `(current, scratch)`: read from the first, write to the second.
    fn split(&mut self) -> (&[u8], &mut [u8]) {
        let [first, second] = &mut self.buffers;
        match self.current {
            Slot::First => (first.as_slice(), second.as_mut_slice()),
            Slot::Second => (second.as_slice(), first.as_mut_slice()),
        }
    }

    fn swap(&mut self) {
        self.current = match self.current {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        };
    }

    fn into_current(self) -> Vec<u8> {
        let [first, second] = self.buffers;
        match self.current {
            Slot::First => first,
            Slot::Second => second,
        }
    }
}

/// Executes one pass over all tiles
enum Dispatcher {
    Inline,
    Pool { pool: ThreadPool, workers: usize },
}

impl Dispatcher {
    fn new(grid: &TileGrid, config: &EngineConfig) -> MorphResult<Self> {
        if config.execution == Execution::Sequential {
            return Ok(Dispatcher::Inline);
        }
        let workers = worker_count(grid.len(), config.max_workers);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("crossmorph-worker-{}", i))
            .build()
            .map_err(|e| {
                MorphError::WorkerDispatchFailure(format!(
                    "could not start {} workers: {}",
                    workers, e
                ))
            })?;
        Ok(Dispatcher::Pool { pool, workers })
    }

    fn workers(&self) -> usize {
        match self {
            Dispatcher::Inline => 1,
            Dispatcher::Pool { workers, .. } => *workers,
        }
    }

    fn run_pass<F>(
        &self,
        grid: &TileGrid,
        src: &[u8],
        dst: &mut [u8],
        kind: FilterKind,
        kernel: &F,
    ) -> MorphResult<()>
    where
        F: Fn(&[u8], Dimensions, &mut TileViewMut<'_>, FilterKind) + Sync,
    {
        let dims = grid.dimensions();
        let views = grid.split_mut(dst);

        let (pool, workers) = match self {
            Dispatcher::Inline => {
                for mut view in views {
                    kernel(src, dims, &mut view, kind);
                }
                return Ok(());
            }
            Dispatcher::Pool { pool, workers } => (pool, *workers),
        };

        let mut stripes: Vec<Vec<TileViewMut<'_>>> = (0..workers).map(|_| Vec::new()).collect();
        for (t, view) in views.into_iter().enumerate() {
            stripes[t % workers].push(view);
        }

        let completed = AtomicUsize::new(0);
        let abort = AtomicBool::new(false);
        let failure: OnceLock<String> = OnceLock::new();

        pool.scope(|s| {
            for (worker, stripe) in stripes.into_iter().enumerate() {
                let (completed, abort, failure) = (&completed, &abort, &failure);
                s.spawn(move |_| {
                    trace!(worker, tiles = stripe.len(), "worker started");
                    for mut view in stripe {
                        if abort.load(Ordering::Acquire) {
                            return;
                        }
                        let index = view.tile().index;
                        let result = panic::catch_unwind(AssertUnwindSafe(|| {
                            kernel(src, dims, &mut view, kind)
                        }));
                        match result {
                            Ok(()) => {
                                completed.fetch_add(1, Ordering::AcqRel);
                            }
                            Err(payload) => {
                                abort.store(true, Ordering::Release);
                                let _ = failure.set(format!(
                                    "tile {} failed on worker {}: {}",
                                    index,
                                    worker,
                                    panic_message(payload.as_ref())
                                ));
                                return;
                            }
                        }
                    }
                });
            }
        });

        if let Some(message) = failure.into_inner() {
            error!(kind = %kind, "{}", message);
            return Err(MorphError::WorkerDispatchFailure(message));
        }

        let done = completed.into_inner();
        if done != grid.len() {
            error!(kind = %kind, done, tiles = grid.len(), "pass incomplete");
            return Err(MorphError::WorkerDispatchFailure(format!(
                "{} of {} tiles completed",
                done,
                grid.len()
            )));
        }
        Ok(())
    }
}

/// Pool size for `tiles` tiles: capped by the configured maximum and by
/// the available hardware parallelism, never zero.
fn worker_count(tiles: usize, max_workers: usize) -> usize {
    let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    tiles.min(max_workers).min(cores).max(1)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(w: u32, h: u32) -> PixelBuffer {
        let data = (0..w * h).map(|i| ((i * 7919) % 256) as u8).collect();
        PixelBuffer::from_vec(w, h, data).unwrap()
    }

    #[test]
    fn test_ping_pong_roles() {
        let mut pp = PingPong::new(vec![1u8; 64]).unwrap();
        {
            let (src, dst) = pp.split();
            assert_eq!(src[0], 1);
            assert_eq!(dst[0], 0);
            dst.fill(2);
        }
        pp.swap();
        {
            let (src, dst) = pp.split();
            assert_eq!(src[0], 2);
            assert_eq!(dst[0], 1);
        }
        assert_eq!(pp.into_current()[0], 2);
    }

    #[test]
    fn test_empty_plan_is_identity() {
        let image = pattern(16, 16);
        let out = FilterEngine::default().run(image.clone(), &PassPlan::new()).unwrap();
        assert_eq!(out, image);
    }

    #[test]
    fn test_config_is_kept() {
        let config = EngineConfig::default().with_tile_dims(32, 16).with_max_workers(4);
        let engine = FilterEngine::new(config.clone());
        assert_eq!(engine.config(), &config);
        assert_eq!(engine.config().tile_size, TileSize::new(32, 16));
        assert_eq!(FilterEngine::default().config().max_workers, MAX_WORKERS);
    }

    #[test]
    fn test_worker_count_caps() {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        assert_eq!(worker_count(1, MAX_WORKERS), 1);
        assert_eq!(worker_count(0, MAX_WORKERS), 1);
        assert_eq!(worker_count(1024, 1), 1);
        assert_eq!(worker_count(1024, MAX_WORKERS), cores.min(1024));
        assert!(worker_count(4096, MAX_WORKERS) <= cores);
    }

    #[test]
    fn test_allocation_failure_maps_to_morph_error() {
        let err: MorphError = alloc_pixels(usize::MAX, 0).unwrap_err().into();
        assert!(matches!(
            err,
            MorphError::AllocationFailure { bytes } if bytes == usize::MAX
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let engine = FilterEngine::new(EngineConfig::default().with_max_workers(0));
        let err = engine.apply(pattern(8, 8), 1, 0).unwrap_err();
        assert!(matches!(err, MorphError::InvalidParameters(_)));
    }

    #[test]
    fn test_apply_raw_rejects_misaligned() {
        let err = FilterEngine::default()
            .apply_raw(7, 9, vec![0; 63], 1, 1)
            .unwrap_err();
        assert!(matches!(
            err,
            MorphError::InvalidDimensions {
                width: 7,
                height: 9
            }
        ));
    }

    #[test]
    fn test_more_tiles_than_workers() {
        let image = pattern(64, 64);
        let expected = FilterEngine::new(EngineConfig::default().sequential())
            .apply(image.clone(), 2, 1)
            .unwrap();
        // 16 tiles over 3 workers
        let engine = FilterEngine::new(
            EngineConfig::default()
                .with_tile_size(16)
                .with_max_workers(3),
        );
        assert_eq!(engine.apply(image, 2, 1).unwrap(), expected);
    }

    #[test]
    fn test_panicking_tile_fails_pass() {
        let engine = FilterEngine::new(EngineConfig::default().with_tile_size(16));
        let plan = PassPlan::erode_then_dilate(1, 1);
        let err = engine
            .run_with(pattern(64, 64), &plan, |src, dims, view, kind| {
                if view.tile().index == 5 {
                    panic!("injected failure");
                }
                process_tile(src, dims, view, kind);
            })
            .unwrap_err();
        match err {
            MorphError::WorkerDispatchFailure(msg) => {
                assert!(msg.contains("tile 5"), "{}", msg);
                assert!(msg.contains("injected failure"), "{}", msg);
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_result_comes_from_scratch_buffer() {
        // A kernel that writes nothing leaves the zeroed scratch as the result.
        let engine = FilterEngine::new(EngineConfig::default().with_tile_size(16));
        let out = engine
            .run_with(pattern(32, 32), &PassPlan::erode_then_dilate(1, 0), |_, _, _, _| {})
            .unwrap();
        assert_eq!(out.uniform_value(), Some(0));
    }
}
