//! Render user-supplied IPv4 CIDR ranges onto a Hilbert curve map of the
//! address space. Each range is assigned a color from a gradient palette;
//! the subdivision engine walks the space as a tree of power-of-two blocks,
//! skipping everything no range touches.

use std::net::Ipv4Addr;

mod addr;
mod canvas;
mod engine;
mod error;
mod hilbert;
mod palette;
mod progress;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export types for public API
pub use addr::{ADDRESS_SPACE, Addr, CidrRange, ColoredRange};
pub use canvas::Canvas;
pub use colorous::Color;
pub use engine::{ADDRESS_BITS, Engine, EngineConfig, RasterSink, RunStatus, Traversal};
pub use error::{Error, Result};
pub use hilbert::HilbertCurve;
pub use palette::{Palette, PaletteKind};
pub use progress::{ProgressObserver, ProgressTracker};

/// Parse textual range input into colored ranges, in input order.
///
/// Entries are separated by newlines or commas. A bare address counts as a
/// /32. Invalid entries are logged and skipped; the remaining entries still
/// render, colored by their position among the valid ones.
pub fn parse_ranges(input: &str, palette: &Palette) -> Vec<ColoredRange> {
    let mut parsed = Vec::new();

    for (entry_num, entry) in input.split(['\n', ',']).enumerate() {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        match parse_entry(entry) {
            Ok(range) => parsed.push(range),
            Err(e) => {
                log::warn!("Skipping entry {}: {} - {}", entry_num + 1, entry, e);
            }
        }
    }

    let total = parsed.len();
    parsed
        .into_iter()
        .enumerate()
        .map(|(index, range)| ColoredRange::new(range, palette.color(index, total)))
        .collect()
}

fn parse_entry(entry: &str) -> std::result::Result<CidrRange, String> {
    if entry.contains('/') {
        entry.parse::<CidrRange>().map_err(|e| e.to_string())
    } else {
        entry
            .parse::<Ipv4Addr>()
            .map(|ip| CidrRange::aligned(Addr::from(ip), 32))
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges_keeps_input_order() {
        let palette = Palette::default();
        let ranges = parse_ranges("10.0.0.0/8\n192.168.0.0/16", &palette);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].range.to_string(), "10.0.0.0/8");
        assert_eq!(ranges[1].range.to_string(), "192.168.0.0/16");
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let palette = Palette::default();
        let ranges = parse_ranges("10.0.0.0/8\nnot-a-range\n300.1.2.3/4\n172.16.0.0/12", &palette);
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[1].range.to_string(), "172.16.0.0/12");
    }

    #[test]
    fn test_commas_separate_entries() {
        let palette = Palette::default();
        let ranges = parse_ranges("10.0.0.0/8, 172.16.0.0/12,192.168.0.0/16", &palette);
        assert_eq!(ranges.len(), 3);
    }

    #[test]
    fn test_bare_address_is_a_slash_32() {
        let palette = Palette::default();
        let ranges = parse_ranges("8.8.8.8", &palette);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].range.to_string(), "8.8.8.8/32");
        assert_eq!(ranges[0].range.block_size(), 1);
    }

    #[test]
    fn test_ranges_get_distinct_colors() {
        let palette = Palette::default();
        let ranges = parse_ranges("10.0.0.0/8\n172.16.0.0/12", &palette);
        let a = ranges[0].color;
        let b = ranges[1].color;
        assert_ne!((a.r, a.g, a.b), (b.r, b.g, b.b));
    }

    #[test]
    fn test_empty_input_yields_no_ranges() {
        let palette = Palette::default();
        assert!(parse_ranges("", &palette).is_empty());
        assert!(parse_ranges("\n  \n,,\n", &palette).is_empty());
    }

    // End to end: two /1 ranges cover the whole space, so every canvas
    // pixel is painted with one of the two colors.
    #[test]
    fn test_full_coverage_paints_every_pixel() {
        let palette = Palette::default();
        let ranges = parse_ranges("0.0.0.0/1\n128.0.0.0/1", &palette);

        let config = EngineConfig::new(20, 16).unwrap();
        let mut canvas = Canvas::new(config.canvas_side());
        let mut tracker = ProgressTracker::new(Box::new(SilentObserver));

        Engine::new(config)
            .render(ranges, &mut tracker, &mut canvas)
            .unwrap();

        let side = config.canvas_side();
        for y in 0..side {
            for x in 0..side {
                assert_eq!(canvas.pixel(x, y)[3], 255, "pixel ({}, {}) untouched", x, y);
            }
        }
    }

    struct SilentObserver;

    impl ProgressObserver for SilentObserver {}
}
