//! RGB drawing surface for the idle screen

use anyhow::{Context, Result};
use fontdue::Font;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub type Rgb = [u8; 3];

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]]
    }

    /// Vertical gradient, deep purple at the top to dark blue at the bottom
    pub fn fill_gradient(&mut self) {
        let row_len = self.width as usize * 3;
        for y in 0..self.height {
            let t = y as f32 / self.height as f32;
            let color = [(10.0 + 30.0 * t) as u8, (8.0 + 22.0 * t) as u8, (25.0 + 75.0 * t) as u8];
            let start = y as usize * row_len;
            for px in self.pixels[start..start + row_len].chunks_exact_mut(3) {
                px.copy_from_slice(&color);
            }
        }
    }

    fn blend(&mut self, x: i32, y: i32, color: Rgb, coverage: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || coverage == 0 {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        let a = coverage as u32;
        for (dst, src) in self.pixels[idx..idx + 3].iter_mut().zip(color) {
            *dst = ((src as u32 * a + *dst as u32 * (255 - a)) / 255) as u8;
        }
    }

    /// Draw `text` with its top-left corner at (x, y)
    pub fn draw_text(&mut self, font: &Font, size: f32, text: &str, x: i32, y: i32, color: Rgb) {
        let ascent = font
            .horizontal_line_metrics(size)
            .map(|m| m.ascent.round() as i32)
            .unwrap_or(size as i32);
        let baseline = y + ascent;
        let mut pen = x as f32;

        for ch in text.chars() {
            let (metrics, bitmap) = font.rasterize(ch, size);
            let left = pen.round() as i32 + metrics.xmin;
            let top = baseline - (metrics.height as i32 + metrics.ymin);

            for gy in 0..metrics.height {
                for gx in 0..metrics.width {
                    let coverage = bitmap[gy * metrics.width + gx];
                    self.blend(left + gx as i32, top + gy as i32, color, coverage);
                }
            }
            pen += metrics.advance_width;
        }
    }

    pub fn write_png(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut encoder = png::Encoder::new(BufWriter::new(file), self.width, self.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header().context("Failed to write PNG header")?;
        writer.write_image_data(&self.pixels).context("Failed to write PNG data")?;
        writer.finish().context("Failed to finish PNG")?;
        Ok(())
    }
}

/// Horizontal advance of `text` in pixels
pub fn text_width(font: &Font, size: f32, text: &str) -> i32 {
    text.chars()
        .map(|ch| font.metrics(ch, size).advance_width)
        .sum::<f32>()
        .ceil() as i32
}
