use std::collections::VecDeque;

use colorous::Color;

use crate::addr::{ADDRESS_SPACE, Addr, CidrRange, ColoredRange};
use crate::error::{Error, Result};
use crate::hilbert::HilbertCurve;
use crate::progress::ProgressTracker;

pub const ADDRESS_BITS: u32 = 32;

/// Pixel surface the traversal draws into. `clear` runs once when a run
/// starts; `draw_pixel` coordinates come from the Hilbert mapping and stay
/// within the configured canvas side.
pub trait RasterSink {
    fn clear(&mut self);
    fn draw_pixel(&mut self, color: Color, x: u32, y: u32);
}

/// Traversal geometry: how many address bits one pixel covers and how many
/// sub-blocks a block splits into.
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    pixel_bits: u32,
    division_factor: u32,
}

impl EngineConfig {
    /// `pixel_bits` must be even (the pixel grid is square) and within
    /// `2..=24`; `division_factor` must be a power of two of at least 2
    /// that splits no further than one pixel per step.
    pub fn new(pixel_bits: u32, division_factor: u32) -> Result<Self> {
        if !(2..=24).contains(&pixel_bits) || pixel_bits % 2 != 0 {
            return Err(Error::InvalidConfig(format!(
                "address bits per pixel must be even and within 2..=24, got {}",
                pixel_bits
            )));
        }
        if division_factor < 2 || !division_factor.is_power_of_two() {
            return Err(Error::InvalidConfig(format!(
                "division factor must be a power of two >= 2, got {}",
                division_factor
            )));
        }
        let div_bits = division_factor.trailing_zeros();
        if div_bits > pixel_bits {
            return Err(Error::InvalidConfig(format!(
                "division factor {} splits past the pixel size",
                division_factor
            )));
        }
        if (ADDRESS_BITS - pixel_bits) % div_bits != 0 {
            log::debug!(
                "division factor {} does not land exactly on the pixel size; \
                 the last split resolves below one pixel",
                division_factor
            );
        }

        Ok(EngineConfig {
            pixel_bits,
            division_factor,
        })
    }

    pub fn pixel_bits(&self) -> u32 {
        self.pixel_bits
    }

    pub fn division_factor(&self) -> u32 {
        self.division_factor
    }

    /// Addresses covered by one pixel.
    pub fn pixel_span(&self) -> u64 {
        1u64 << self.pixel_bits
    }

    pub fn curve_order(&self) -> u32 {
        (ADDRESS_BITS - self.pixel_bits) / 2
    }

    /// Canvas side length in pixels.
    pub fn canvas_side(&self) -> u32 {
        1 << self.curve_order()
    }

    fn div_bits(&self) -> u32 {
        self.division_factor.trailing_zeros()
    }
}

impl Default for EngineConfig {
    /// 4096 addresses per pixel on a 1024x1024 canvas, splitting 16 ways.
    fn default() -> Self {
        EngineConfig {
            pixel_bits: 12,
            division_factor: 16,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    InProgress,
    Complete,
}

// One pending unit of work: a power-of-two block of 2^bits addresses.
// The prefix length is carried as an exact integer (32 - bits) rather than
// re-derived from the block size.
#[derive(Clone, Copy, Debug)]
struct Block {
    start: u64,
    bits: u32,
}

impl Block {
    fn size(&self) -> u64 {
        1u64 << self.bits
    }
}

/// Walks the IPv4 space as a tree of power-of-two blocks, testing each
/// block against the input ranges. Blocks nothing overlaps resolve in one
/// step; overlapped blocks subdivide until they reach pixel size and are
/// drawn with the first matching range's color.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Engine { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Begin a run over the whole address space.
    ///
    /// An empty range list starts nothing and returns `Ok(None)`: the sink
    /// is not cleared and the tracker sees no events. If the tracker is
    /// already running another traversal, the request is rejected with
    /// `Error::RunInProgress`.
    pub fn start<'a>(
        &self,
        ranges: Vec<ColoredRange>,
        tracker: &'a mut ProgressTracker,
        sink: &'a mut dyn RasterSink,
    ) -> Result<Option<Traversal<'a>>> {
        if ranges.is_empty() {
            return Ok(None);
        }

        tracker.start(ADDRESS_SPACE)?;
        sink.clear();

        let mut queue = VecDeque::new();
        queue.push_back(Block {
            start: 0,
            bits: ADDRESS_BITS,
        });

        Ok(Some(Traversal {
            ranges,
            queue,
            curve: HilbertCurve::new(self.config.curve_order()),
            pixel_bits: self.config.pixel_bits,
            div_bits: self.config.div_bits(),
            tracker,
            sink,
        }))
    }

    /// Start and drain a run in one call, for hosts that do not need to
    /// interleave other work.
    pub fn render(
        &self,
        ranges: Vec<ColoredRange>,
        tracker: &mut ProgressTracker,
        sink: &mut dyn RasterSink,
    ) -> Result<()> {
        if let Some(mut traversal) = self.start(ranges, tracker, sink)? {
            traversal.run();
        }
        Ok(())
    }
}

/// One in-flight run: an explicit FIFO queue of pending blocks, drained a
/// bounded number at a time so the host stays responsive in between.
pub struct Traversal<'a> {
    ranges: Vec<ColoredRange>,
    queue: VecDeque<Block>,
    curve: HilbertCurve,
    pixel_bits: u32,
    div_bits: u32,
    tracker: &'a mut ProgressTracker,
    sink: &'a mut dyn RasterSink,
}

impl Traversal<'_> {
    /// Process up to `budget` queued blocks, then hand control back.
    pub fn pump(&mut self, budget: usize) -> RunStatus {
        for _ in 0..budget {
            match self.queue.pop_front() {
                Some(block) => self.process(block),
                None => break,
            }
        }

        if self.queue.is_empty() {
            debug_assert!(
                !self.tracker.is_running(),
                "work queue drained before the space was fully resolved"
            );
            RunStatus::Complete
        } else {
            RunStatus::InProgress
        }
    }

    /// Drain the queue to completion.
    pub fn run(&mut self) {
        while self.pump(4096) == RunStatus::InProgress {}
    }

    /// Pending blocks still queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Abandon the run: pending work is dropped and the tracker returns to
    /// idle with no completion event. Pixels already drawn stay on the sink.
    pub fn cancel(mut self) {
        self.queue.clear();
        self.tracker.abort();
    }

    fn process(&mut self, block: Block) {
        let block_range = CidrRange::aligned(
            Addr::new(block.start as u32),
            (ADDRESS_BITS - block.bits) as u8,
        );

        // First match in input order decides the color.
        let Some(hit) = self.ranges.iter().find(|c| c.range.overlaps(&block_range)) else {
            // Nothing overlaps anywhere in this block: resolve it whole.
            self.tracker.advance(block.size());
            return;
        };

        if block.bits <= self.pixel_bits {
            let (x, y) = self.curve.point(block.start >> self.pixel_bits);
            self.sink.draw_pixel(hit.color, x, y);
            self.tracker.advance(block.size());
        } else {
            let child_bits = block.bits - self.div_bits;
            let child_size = 1u64 << child_bits;
            for child in 0..(1u64 << self.div_bits) {
                self.queue.push_back(Block {
                    start: block.start + child * child_size,
                    bits: child_bits,
                });
            }
        }
    }
}

impl Drop for Traversal<'_> {
    fn drop(&mut self) {
        // An unfinished traversal must not leave the tracker running, or
        // every later run would be rejected.
        if !self.queue.is_empty() {
            self.tracker.abort();
        }
    }
}
