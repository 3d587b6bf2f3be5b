//! Dots and their motion
//!
//! A dot is plain data; the free functions here move it. Each frame a dot
//! closes a fixed fraction of the distance to its target (exponential
//! approach), optionally lingers there for a number of frames, then takes
//! the next queued waypoint. With nothing queued it idles: a dot that is
//! part of the current shape shivers in place, a free dot wanders.

use crate::config::Rgba;
use crate::display::{alpha_u8, PixelBuffer};
use crate::util::Rng;
use std::collections::VecDeque;

/// Easing of a freshly created dot
pub const DEFAULT_EASING: f32 = 0.07;
/// Per-frame approach rate of size and alpha toward the target
const FADE_RATE: f32 = 0.05;
const MIN_ALPHA: f32 = 0.1;
const MIN_SIZE: f32 = 1.0;
/// Half-width of a free dot's random walk
const WANDER: f32 = 25.0;

/// How long a dot waits once it reaches its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hold {
    /// Move on as soon as the target is reached
    #[default]
    None,
    /// Jump straight onto the target
    Snap,
    /// Linger this many frames after arriving
    Frames(u32),
}

impl Hold {
    /// Frame-count form: 0 means no hold, negative means snap
    pub fn from_frames(frames: i32) -> Self {
        match frames {
            0 => Self::None,
            f if f < 0 => Self::Snap,
            f => Self::Frames(f as u32),
        }
    }
}

/// Position, radius and alpha of a dot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotPoint {
    pub x: f32,
    pub y: f32,
    /// Radius
    pub z: f32,
    /// Alpha, 0.0..=1.0
    pub a: f32,
}

impl DotPoint {
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A queued target. Fields left as `None` keep the dot's current value
/// when the waypoint is taken.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Waypoint {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub z: Option<f32>,
    pub a: Option<f32>,
    pub hold: Hold,
}

impl Waypoint {
    /// A waypoint that only moves
    pub fn to(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// A waypoint that stays put and only changes appearance
    pub fn in_place() -> Self {
        Self::default()
    }

    pub fn size(mut self, z: f32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn alpha(mut self, a: f32) -> Self {
        self.a = Some(a);
        self
    }

    pub fn hold(mut self, hold: Hold) -> Self {
        self.hold = hold;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Dot {
    pub current: DotPoint,
    pub target: DotPoint,
    pub hold: Hold,
    pub queue: VecDeque<Waypoint>,
    /// Fraction of the remaining distance covered per frame
    pub easing: f32,
    /// Part of the shape on screen (true) or drifting free (false)
    pub is_static: bool,
    pub color: Rgba,
}

impl Dot {
    /// A resting dot at (x, y)
    pub fn new(x: f32, y: f32, size: f32, color: Rgba) -> Self {
        let p = DotPoint { x, y, z: size, a: 1.0 };
        Self {
            current: p,
            target: p,
            hold: Hold::None,
            queue: VecDeque::new(),
            easing: DEFAULT_EASING,
            is_static: true,
            color,
        }
    }
}

/// Queue a waypoint behind any already pending
pub fn queue(dot: &mut Dot, waypoint: Waypoint) {
    dot.queue.push_back(waypoint);
}

/// Step toward the target. Returns true once the dot is there and any hold
/// has run out.
pub fn move_towards(dot: &mut Dot) -> bool {
    let n = dot.target;
    let p = &mut dot.current;

    if dot.hold == Hold::Snap {
        p.x = n.x;
        p.y = n.y;
        return true;
    }

    let dx = p.x - n.x;
    let dy = p.y - n.y;
    let d = (dx * dx + dy * dy).sqrt();

    if d > 1.0 {
        let e = dot.easing * d;
        p.x -= (dx / d) * e;
        p.y -= (dy / d) * e;
        return false;
    }

    match dot.hold {
        Hold::Frames(n) if n > 1 => dot.hold = Hold::Frames(n - 1),
        Hold::Frames(1) => dot.hold = Hold::None,
        _ => return true,
    }
    false
}

/// One frame of motion: approach, advance the queue or idle, then ease
/// size and alpha toward the target's
pub fn update(dot: &mut Dot, rng: &mut Rng) {
    if move_towards(dot) {
        if let Some(wp) = dot.queue.pop_front() {
            let p = dot.current;
            dot.target = DotPoint {
                x: wp.x.unwrap_or(p.x),
                y: wp.y.unwrap_or(p.y),
                z: wp.z.unwrap_or(p.z),
                a: wp.a.unwrap_or(p.a),
            };
            dot.hold = wp.hold;
        } else if dot.is_static {
            dot.current.x -= (rng.next_f32() * std::f32::consts::PI).sin();
            dot.current.y -= (rng.next_f32() * std::f32::consts::PI).sin();
        } else {
            let x = dot.current.x + rng.range_f32(-WANDER, WANDER);
            let y = dot.current.y + rng.range_f32(-WANDER, WANDER);
            queue(dot, Waypoint::to(x, y));
        }
    }

    let p = &mut dot.current;
    p.a = (p.a - (p.a - dot.target.a) * FADE_RATE).max(MIN_ALPHA);
    p.z = (p.z - (p.z - dot.target.z) * FADE_RATE).max(MIN_SIZE);
}

/// Filled circle of the dot's current radius and alpha
pub fn draw(dot: &Dot, buffer: &mut PixelBuffer) {
    let Rgba { r, g, b, a } = dot.color;
    let p = &dot.current;
    buffer.fill_circle_blend(
        p.x.round() as i32,
        p.y.round() as i32,
        p.z.round() as i32,
        r,
        g,
        b,
        alpha_u8(p.a * a),
    );
}
