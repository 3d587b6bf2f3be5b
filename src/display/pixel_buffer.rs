// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Write ABGR pixel with alpha (RGBA8888 little-endian byte order)
#[inline]
fn write_pixel_rgba(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    dest[0] = a; // A
    dest[1] = b; // B
    dest[2] = g; // G
    dest[3] = r; // R
}

/// Source-over blend of one color onto an ABGR pixel.
///
/// Opaque destinations take the cheap per-channel path; translucent ones
/// (offscreen layers cleared to transparent) accumulate coverage the way a
/// canvas 2D context does.
#[inline]
fn blend_over(dest: &mut [u8], r: u8, g: u8, b: u8, a: u8) {
    if a == 0 {
        return;
    }
    let da = dest[0];
    if da == 255 || a == 255 {
        let alpha = a as u16;
        dest[0] = if a == 255 { 255 } else { da };
        dest[1] = blend_channel(b, dest[1], alpha);
        dest[2] = blend_channel(g, dest[2], alpha);
        dest[3] = blend_channel(r, dest[3], alpha);
        return;
    }

    let sa = a as u32;
    // Destination weight after the source covers `sa` of it, in 0..=255
    let dw = da as u32 * (255 - sa) / 255;
    let out_a = sa + dw;
    if out_a == 0 {
        return;
    }
    let mix = |s: u8, d: u8| ((s as u32 * sa + d as u32 * dw + out_a / 2) / out_a) as u8;
    dest[1] = mix(b, dest[1]);
    dest[2] = mix(g, dest[2]);
    dest[3] = mix(r, dest[3]);
    dest[0] = out_a.min(255) as u8;
}

/// Convert a 0.0..=1.0 alpha to a channel value
#[inline]
pub fn alpha_u8(a: f32) -> u8 {
    (a.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering.
/// This is the canvas every effect draws into.
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create a fully transparent pixel buffer
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; (width * height * 4) as usize],
            width,
            height,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate to a new size. Contents are discarded, like an HTML canvas.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize((width * height * 4) as usize, 0);
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y * self.width + x) * 4) as usize
    }

    fn fill_u32(&mut self, pixel: u32) {
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / 4;
        for i in 0..len {
            // Safety: pixels.len() is always divisible by 4 (width * height * 4)
            // and write_unaligned makes no alignment assumption about Vec<u8>.
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    /// Clear to a solid opaque color
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        self.fill_u32(u32::from_ne_bytes([255, b, g, r]));
    }

    /// Clear to a color with custom alpha (0 for a transparent layer)
    pub fn clear_rgba(&mut self, r: u8, g: u8, b: u8, a: u8) {
        self.fill_u32(u32::from_ne_bytes([a, b, g, r]));
    }

    /// Set a single pixel with custom alpha (bounds checked)
    #[inline]
    pub fn set_pixel_rgba(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            write_pixel_rgba(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Read all 4 channels of a pixel (bounds checked)
    /// Returns (r, g, b, a) or None if out of bounds
    #[inline]
    pub fn get_pixel_rgba(&self, x: i32, y: i32) -> Option<(u8, u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
                self.pixels[idx],     // A
            ))
        } else {
            None
        }
    }

    /// Alpha channel at (x, y), 0 when out of bounds
    #[inline]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x < self.width && y < self.height {
            self.pixels[self.pixel_index(x, y)]
        } else {
            0
        }
    }

    /// Set pixel with source-over alpha blending
    #[inline]
    pub fn blend_pixel(&mut self, x: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            blend_over(&mut self.pixels[idx..idx + 4], r, g, b, a);
        }
    }

    /// Draw a horizontal span with alpha blending
    pub fn hline_blend(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        // Compute starting index once, then increment by 4 per pixel
        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            blend_over(&mut self.pixels[idx..idx + 4], r, g, b, a);
            idx += 4;
        }
    }

    /// Fill a rectangle with an opaque color
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8) {
        self.fill_rect_blend(x, y, w, h, r, g, b, 255);
    }

    /// Fill a rectangle with alpha blending
    pub fn fill_rect_blend(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8, a: u8) {
        if w == 0 {
            return;
        }
        for row in 0..h as i32 {
            self.hline_blend(x, x + w as i32 - 1, y + row, r, g, b, a);
        }
    }

    /// Translucent wash over the whole canvas. Repeated every frame this
    /// leaves fading trails behind anything that moved.
    pub fn overlay(&mut self, r: u8, g: u8, b: u8, a: u8) {
        if a == 0 {
            return;
        }
        for chunk in self.pixels.chunks_exact_mut(4) {
            blend_over(chunk, r, g, b, a);
        }
    }

    /// Fill a circle with alpha blending (midpoint algorithm, span filled)
    pub fn fill_circle_blend(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8, a: u8) {
        if radius <= 0 {
            if radius == 0 {
                self.blend_pixel(cx, cy, r, g, b, a);
            }
            return;
        }

        let mut xi = radius;
        let mut y = 0;
        let mut err = 1 - radius;

        while xi >= y {
            // Spans for 4 quadrants, skipping the ones already drawn
            self.hline_blend(cx - xi, cx + xi, cy + y, r, g, b, a);
            if y != 0 {
                self.hline_blend(cx - xi, cx + xi, cy - y, r, g, b, a);
            }
            if xi != y {
                self.hline_blend(cx - y, cx + y, cy + xi, r, g, b, a);
                if y != 0 {
                    self.hline_blend(cx - y, cx + y, cy - xi, r, g, b, a);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                xi -= 1;
                err += 2 * (y - xi) + 1;
            }
        }
    }

    /// Soft halo around a point: alpha falls off quadratically from `a` at
    /// the center to zero at `radius`. Stands in for a canvas shadow blur.
    pub fn fill_circle_glow(&mut self, cx: i32, cy: i32, radius: i32, r: u8, g: u8, b: u8, a: u8) {
        if radius <= 0 || a == 0 {
            return;
        }
        let r_sq = (radius * radius) as f32;
        let r_f = radius as f32;

        let y_start = (cy - radius).max(0);
        let y_end = (cy + radius).min(self.height as i32 - 1);
        let x_start = (cx - radius).max(0);
        let x_end = (cx + radius).min(self.width as i32 - 1);

        for y in y_start..=y_end {
            let dy = (y - cy) as f32;
            let dy_sq = dy * dy;
            for x in x_start..=x_end {
                let dx = (x - cx) as f32;
                let dist_sq = dx * dx + dy_sq;
                if dist_sq > r_sq {
                    continue;
                }
                let t = 1.0 - dist_sq.sqrt() / r_f;
                let alpha = (a as f32 * t * t) as u8;
                self.blend_pixel(x, y, r, g, b, alpha);
            }
        }
    }

    /// Blended 1px line (Bresenham, bounds checked per pixel)
    pub fn line_blend(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, r: u8, g: u8, b: u8, a: u8) {
        let dx = (x1 - x0).abs();
        let dy = -((y1 - y0).abs());
        let sx = if x0 < x1 { 1i32 } else { -1i32 };
        let sy = if y0 < y1 { 1i32 } else { -1i32 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.blend_pixel(x, y, r, g, b, a);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Blended line with variable thickness and rounded ends
    pub fn line_thick_rounded_blend(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: i32,
        r: u8,
        g: u8,
        b: u8,
        a: u8,
    ) {
        if thickness <= 1 {
            self.line_blend(x0, y0, x1, y1, r, g, b, a);
            return;
        }

        let dx = (x1 - x0) as f32;
        let dy = (y1 - y0) as f32;
        let len = (dx * dx + dy * dy).sqrt();
        let radius = thickness / 2;

        if len < 0.001 {
            self.fill_circle_blend(x0, y0, radius, r, g, b, a);
            return;
        }

        // Parallel lines offset along the perpendicular
        let px = -dy / len;
        let py = dx / len;
        let half = (thickness - 1) as f32 / 2.0;
        for i in 0..thickness {
            let offset = (i as f32) - half;
            let ox = (px * offset).round() as i32;
            let oy = (py * offset).round() as i32;
            self.line_blend(x0 + ox, y0 + oy, x1 + ox, y1 + oy, r, g, b, a);
        }
        self.fill_circle_blend(x1, y1, radius, r, g, b, a);
    }

    /// Stroke an open path through `points`
    pub fn stroke_path(&mut self, points: &[(f32, f32)], thickness: i32, r: u8, g: u8, b: u8, a: u8) {
        if let [(x, y)] = points {
            self.fill_circle_blend(x.round() as i32, y.round() as i32, thickness / 2, r, g, b, a);
            return;
        }
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            self.line_thick_rounded_blend(
                x0.round() as i32,
                y0.round() as i32,
                x1.round() as i32,
                y1.round() as i32,
                thickness,
                r,
                g,
                b,
                a,
            );
        }
    }

    /// Composite a source buffer onto this one with source-over blending,
    /// using the source's per-pixel alpha. Transparent pixels are skipped.
    pub fn composite(&mut self, src: &PixelBuffer, dst_x: i32, dst_y: i32) {
        let src_w = src.width() as i32;
        let src_h = src.height() as i32;
        let dst_w = self.width as i32;
        let dst_h = self.height as i32;

        for sy in 0..src_h {
            let dy = dst_y + sy;
            if dy < 0 || dy >= dst_h {
                continue;
            }

            for sx in 0..src_w {
                let dx = dst_x + sx;
                if dx < 0 || dx >= dst_w {
                    continue;
                }

                let si = src.pixel_index(sx as u32, sy as u32);
                let sa = src.pixels[si]; // alpha channel (ABGR[0])
                if sa == 0 {
                    continue;
                }

                let di = self.pixel_index(dx as u32, dy as u32);
                blend_over(
                    &mut self.pixels[di..di + 4],
                    src.pixels[si + 3],
                    src.pixels[si + 2],
                    src.pixels[si + 1],
                    sa,
                );
            }
        }
    }

    /// Raw pixels for texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
