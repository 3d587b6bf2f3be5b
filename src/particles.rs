//! Spark particles
//!
//! Per-frame physics (no dt): velocity integrates into position, gravity
//! pulls the vertical component, friction scales both, and life drains by
//! each spark's own decay rate until it burns out.

use crate::config::Rgb;
use crate::display::{alpha_u8, PixelBuffer};
use crate::math::Vec2;
use std::collections::VecDeque;

/// Positions a spark trail keeps
pub const SPARK_TRAIL_LEN: usize = 5;

/// Bounded history of recent positions, oldest first
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<Vec2>,
    max_len: usize,
}

impl Trail {
    pub fn new(max_len: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(max_len + 1),
            max_len,
        }
    }

    /// Append a position, dropping the oldest beyond `max_len`
    pub fn push(&mut self, p: Vec2) {
        self.points.push_back(p);
        while self.points.len() > self.max_len {
            self.points.pop_front();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points as (x, y) tuples for `PixelBuffer::stroke_path`
    pub fn as_tuples(&self) -> Vec<(f32, f32)> {
        self.points.iter().map(|p| (p.x, p.y)).collect()
    }
}

/// A single burning spark
#[derive(Debug, Clone)]
pub struct Spark {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: Rgb,
    /// 1.0 at birth, dead at or below 0
    pub life: f32,
    /// Life lost per frame
    pub decay: f32,
    pub size: f32,
    pub trail: Trail,
}

impl Spark {
    pub fn new(pos: Vec2, vel: Vec2, color: Rgb, decay: f32, size: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            life: 1.0,
            decay,
            size,
            trail: Trail::new(SPARK_TRAIL_LEN),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Live sparks plus the forces acting on them
pub struct SparkField {
    sparks: Vec<Spark>,
    gravity: f32,
    friction: f32,
    max_sparks: usize,
}

impl SparkField {
    pub fn new(gravity: f32, friction: f32, max_sparks: usize) -> Self {
        Self {
            sparks: Vec::with_capacity(max_sparks),
            gravity,
            friction,
            max_sparks,
        }
    }

    /// Add sparks, evicting the oldest live ones past the cap
    pub fn emit(&mut self, sparks: impl IntoIterator<Item = Spark>) {
        self.sparks.extend(sparks);
        if self.sparks.len() > self.max_sparks {
            let excess = self.sparks.len() - self.max_sparks;
            self.sparks.drain(..excess);
        }
    }

    /// Advance every spark one frame and drop the burnt-out ones
    pub fn update(&mut self) {
        for p in &mut self.sparks {
            p.pos += p.vel;
            p.vel.y += self.gravity;
            p.vel *= self.friction;

            p.life -= p.decay;

            let pos = p.pos;
            p.trail.push(pos);
        }

        // Keeps birth order so eviction stays oldest-first
        self.sparks.retain(Spark::is_alive);
    }

    /// Trails, bodies and glows, faded by remaining life
    pub fn render(&self, buffer: &mut PixelBuffer) {
        for p in &self.sparks {
            let Rgb { r, g, b } = p.color;
            if p.trail.len() > 1 {
                buffer.stroke_path(&p.trail.as_tuples(), 1, r, g, b, alpha_u8(p.life * 0.3));
            }

            let x = p.pos.x.round() as i32;
            let y = p.pos.y.round() as i32;
            let radius = p.size.round() as i32;
            buffer.fill_circle_glow(x, y, radius + 10, r, g, b, alpha_u8(p.life * 0.5));
            buffer.fill_circle_blend(x, y, radius, r, g, b, alpha_u8(p.life));
        }
    }

    pub fn sparks(&self) -> &[Spark] {
        &self.sparks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spark(decay: f32) -> Spark {
        Spark::new(
            Vec2::new(100.0, 100.0),
            Vec2::new(2.0, -3.0),
            Rgb::new(255, 0, 0),
            decay,
            2.0,
        )
    }

    #[test]
    fn test_trail_is_bounded() {
        let mut trail = Trail::new(5);
        for i in 0..20 {
            trail.push(Vec2::new(i as f32, 0.0));
            assert!(trail.len() <= 5);
        }
        assert_eq!(trail.as_tuples()[0], (15.0, 0.0));
        assert_eq!(trail.as_tuples()[4], (19.0, 0.0));
    }

    #[test]
    fn test_update_integrates_gravity_and_friction() {
        let mut field = SparkField::new(0.5, 0.5, 10);
        field.emit([spark(0.01)]);
        field.update();
        let p = &field.sparks()[0];
        assert_eq!(p.pos, Vec2::new(102.0, 97.0));
        // vy = (-3 + 0.5) * 0.5, vx = 2 * 0.5
        assert!(p.vel.approx_eq(&Vec2::new(1.0, -1.25), 1e-6));
        assert_eq!(p.trail.len(), 1);
    }

    #[test]
    fn test_life_monotonic_until_removed() {
        let mut field = SparkField::new(0.5, 0.99, 10);
        field.emit([spark(0.03)]);
        let mut last = 1.0;
        let mut frames = 0;
        while field.sparks().len() > 0 {
            field.update();
            frames += 1;
            for p in field.sparks() {
                assert!(p.life <= last);
                assert!(p.life > 0.0);
                assert!(p.trail.len() <= SPARK_TRAIL_LEN);
                last = p.life;
            }
            assert!(frames < 100, "spark never burnt out");
        }
        assert_eq!(frames, 34);
    }

    #[test]
    fn test_emit_evicts_oldest_past_cap() {
        let mut field = SparkField::new(0.0, 1.0, 3);
        let mut first = spark(0.01);
        first.size = 9.0;
        field.emit([first]);
        field.emit([spark(0.01), spark(0.01), spark(0.01)]);
        assert_eq!(field.sparks().len(), 3);
        assert!(field.sparks().iter().all(|p| p.size == 2.0));
    }

    #[test]
    fn test_render_fades_with_life() {
        let mut buffer = PixelBuffer::with_size(200, 200);
        let mut field = SparkField::new(0.0, 1.0, 10);
        let mut dim = spark(0.0);
        dim.life = 0.2;
        field.emit([dim]);
        field.render(&mut buffer);
        let (_, _, _, a) = buffer.get_pixel_rgba(100, 100).unwrap();
        assert!(a > 0 && a < 200);
    }
}
