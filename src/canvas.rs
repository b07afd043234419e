use anyhow::{Context, Result};
use colorous::Color;
use image::{ImageBuffer, Rgba, RgbaImage};

use crate::engine::RasterSink;

/// Square RGBA surface backed by an image buffer. Untouched pixels stay
/// fully transparent, so only addresses inside some input range appear in
/// the output.
pub struct Canvas {
    image: RgbaImage,
    side: u32,
}

impl Canvas {
    pub fn new(side: u32) -> Self {
        Canvas {
            image: blank(side),
            side,
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    /// Raw RGBA bytes, row-major.
    pub fn rgba_data(&self) -> Vec<u8> {
        self.image.as_raw().clone()
    }

    pub fn save(&self, filename: &str) -> Result<()> {
        self.image
            .save(filename)
            .context(format!("Failed to save image to {}", filename))
    }
}

fn blank(side: u32) -> RgbaImage {
    ImageBuffer::from_pixel(side, side, Rgba([0, 0, 0, 0]))
}

impl RasterSink for Canvas {
    fn clear(&mut self) {
        self.image = blank(self.side);
    }

    fn draw_pixel(&mut self, color: Color, x: u32, y: u32) {
        self.image.put_pixel(x, y, Rgba([color.r, color.g, color.b, 255]));
    }
}
