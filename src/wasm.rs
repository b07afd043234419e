use wasm_bindgen::prelude::*;

use crate::{
    Canvas, Engine, EngineConfig, Palette, PaletteKind, ProgressObserver, ProgressTracker,
    parse_ranges,
};

#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Canvas side length for the given pixel granularity, so the caller can
/// size its drawing surface before rendering.
#[wasm_bindgen]
pub fn canvas_side(pixel_bits: u32) -> Result<u32, JsValue> {
    let config = EngineConfig::new(pixel_bits, 16).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config.canvas_side())
}

struct SilentProgress;

impl ProgressObserver for SilentProgress {}

/// Parse the input ranges, run a full traversal, and return the resulting
/// RGBA pixel data (row-major, 4 bytes per pixel).
#[wasm_bindgen]
pub fn render_map(
    input: &str,
    pixel_bits: u32,
    division_factor: u32,
    palette: &str,
) -> Result<Vec<u8>, JsValue> {
    let kind: PaletteKind = palette.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let config = EngineConfig::new(pixel_bits, division_factor)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let ranges = parse_ranges(input, &Palette::new(kind));

    let mut canvas = Canvas::new(config.canvas_side());
    let mut tracker = ProgressTracker::new(Box::new(SilentProgress));
    Engine::new(config)
        .render(ranges, &mut tracker, &mut canvas)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    Ok(canvas.rgba_data())
}
