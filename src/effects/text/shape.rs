//! Shape sampling
//!
//! Text is drawn onto an offscreen canvas and its opaque pixels are read
//! back on a coarse grid. Each lit grid cell becomes a point a dot can
//! land on.

use crate::display::{draw_text_scaled, text_width_scaled, PixelBuffer, GLYPH_HEIGHT, GLYPH_ROWS};
use crate::math::Vec2;

/// Fraction of the canvas width a string may span
const MAX_WIDTH_FRACTION: f32 = 0.8;
/// Fraction of the canvas height for anything that is not a number
const TEXT_HEIGHT_FRACTION: f32 = 0.45;

/// Points of a sampled shape with the extent used to center it
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSample {
    pub points: Vec<Vec2>,
    /// Rightmost plus leftmost point x. With centered text this is the
    /// sampling canvas width, give or take a grid cell.
    pub width: f32,
    pub height: f32,
}

impl ShapeSample {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Offscreen canvas plus the grid it is read on
pub struct ShapeSampler {
    canvas: PixelBuffer,
    gap: u32,
    font_size: f32,
}

impl ShapeSampler {
    pub fn new(width: u32, height: u32, gap: u32, font_size: f32) -> Self {
        let mut sampler = Self {
            canvas: PixelBuffer::with_size(0, 0),
            gap: gap.max(1),
            font_size,
        };
        sampler.fit(width, height);
        sampler
    }

    /// Resize to the largest multiple of the grid gap that fits
    pub fn fit(&mut self, width: u32, height: u32) {
        let w = width / self.gap * self.gap;
        let h = height / self.gap * self.gap;
        self.canvas.resize(w, h);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    /// Pixel height to draw `text` at: as large as `font_size` allows
    /// while fitting the canvas. Lone numbers may use the full height,
    /// anything else under half of it.
    pub fn fitted_size(&self, text: &str) -> f32 {
        let (cw, ch) = self.size();
        let measured = text_width_scaled(text, self.font_size / GLYPH_HEIGHT as f32);
        let by_height = ch as f32 * if is_number(text) { 1.0 } else { TEXT_HEIGHT_FRACTION };

        let mut size = self.font_size.min(by_height);
        if measured > 0.0 {
            size = size.min(cw as f32 / measured * MAX_WIDTH_FRACTION * self.font_size);
        }
        size
    }

    /// Rasterize `text` centered on the canvas and sample it
    pub fn sample_text(&mut self, text: &str) -> ShapeSample {
        self.canvas.clear_rgba(0, 0, 0, 0);

        if !text.is_empty() {
            let (cw, ch) = self.size();
            let scale = self.fitted_size(text) / GLYPH_HEIGHT as f32;
            let x = cw as f32 / 2.0 - text_width_scaled(text, scale) / 2.0;
            let y = ch as f32 / 2.0 - GLYPH_ROWS as f32 * scale / 2.0;
            draw_text_scaled(&mut self.canvas, x, y, text, 255, 0, 0, scale);
        }

        self.sample()
    }

    /// Read the canvas alpha at every grid point
    fn sample(&self) -> ShapeSample {
        let (cw, ch) = self.size();
        let step = self.gap as usize;
        let mut points = Vec::new();
        let (mut min_x, mut min_y) = (cw, ch);
        let (mut max_x, mut max_y) = (0, 0);

        for y in (0..ch).step_by(step) {
            for x in (0..cw).step_by(step) {
                if self.canvas.alpha_at(x, y) > 0 {
                    points.push(Vec2::new(x as f32, y as f32));
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }

        ShapeSample {
            points,
            width: (max_x + min_x) as f32,
            height: (max_y + min_y) as f32,
        }
    }
}

/// Whether `text` reads as a single finite number
fn is_number(text: &str) -> bool {
    text.trim().parse::<f64>().map_or(false, f64::is_finite)
}
