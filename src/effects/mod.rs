pub mod fireworks;
pub mod text;

pub use fireworks::{FireworksEffect, Rocket};
pub use text::TextAnimation;

use crate::display::PixelBuffer;

/// Per-frame constants in the effects assume this rate
pub const FRAME_RATE: f32 = 60.0;

/// Most simulation frames run for a single `update`, so a stalled host
/// does not trigger a burst of catch-up work
pub const MAX_CATCHUP_FRAMES: u32 = 4;

/// Trait for all effects
pub trait Effect {
    /// Update effect state (called each display frame)
    /// - dt: delta time in seconds
    /// - width/height: current size of the effect's canvas
    fn update(&mut self, dt: f32, width: u32, height: u32);

    /// Draw into the effect's canvas
    fn render(&self, buffer: &mut PixelBuffer);

    /// Effect name for logs
    fn name(&self) -> &str;
}
