//! Fireworks and dot-matrix text effects on a software framebuffer
//!
//! Two independent effects each draw into their own named layer of a
//! [`stage::Stage`]:
//!
//! - [`effects::FireworksEffect`]: rockets that burst into falling sparks
//! - [`effects::TextAnimation`]: a pool of dots morphing between sampled
//!   text shapes, driven by scripts like `#countdown 3|Hello|#time`
//!
//! The `sparkmorph` binary (feature `window`) shows both in an SDL2 window.

pub mod clock;
pub mod config;
pub mod control;
pub mod display;
pub mod effects;
pub mod error;
pub mod math;
#[cfg(feature = "mqtt")]
pub mod mqtt;
pub mod particles;
pub mod stage;
pub mod util;

pub use error::FxError;
