//! Effect options and the JSON config file
//!
//! Every key is optional; anything left out falls back to the defaults
//! below, so `{}` is a valid config.

use crate::effects::FRAME_RATE;
use crate::error::FxError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Shortest accepted timer period in seconds, one frame
pub const MIN_INTERVAL: f32 = 1.0 / FRAME_RATE;

/// An opaque color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A color with a 0.0..=1.0 alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Fireworks tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksOptions {
    /// Upper bound on live sparks; the oldest are evicted first
    pub max_particles: usize,
    pub gravity: f32,
    /// Per-frame velocity multiplier
    pub friction: f32,
    pub colors: Vec<Rgb>,
    pub particle_speed: f32,
    pub particle_size: f32,
    /// Rocket trail length in frames
    pub trail_length: usize,
    pub fade_color: Rgb,
    pub fade_alpha: f32,
    /// Seconds between random launch rolls
    pub auto_interval: f32,
    pub auto_chance: f32,
    /// Seconds between launches of the steady launcher
    pub steady_interval: f32,
}

impl Default for FireworksOptions {
    fn default() -> Self {
        Self {
            max_particles: 150,
            gravity: 0.5,
            friction: 0.99,
            colors: vec![
                Rgb::new(220, 38, 127),  // rose pink
                Rgb::new(255, 182, 193), // light pink
                Rgb::new(255, 20, 147),  // deep pink
                Rgb::new(255, 192, 203), // pink
                Rgb::new(255, 105, 180), // hot pink
                Rgb::new(255, 218, 185), // peach puff
                Rgb::new(255, 228, 225), // misty rose
                Rgb::new(238, 130, 238), // violet
            ],
            particle_speed: 8.0,
            particle_size: 3.0,
            trail_length: 8,
            fade_color: Rgb::new(255, 240, 245),
            fade_alpha: 0.02,
            auto_interval: 0.8,
            auto_chance: 0.3,
            steady_interval: 1.5,
        }
    }
}

impl FireworksOptions {
    pub fn validate(&self) -> Result<(), FxError> {
        if self.colors.is_empty() {
            return Err(FxError::invalid("colors", "palette must not be empty"));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(FxError::invalid("friction", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.auto_chance) {
            return Err(FxError::invalid("auto_chance", "must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.fade_alpha) {
            return Err(FxError::invalid("fade_alpha", "must be in [0, 1]"));
        }
        if self.auto_interval.is_nan() || self.auto_interval < MIN_INTERVAL {
            return Err(FxError::invalid("auto_interval", "must be at least one frame"));
        }
        if self.steady_interval.is_nan() || self.steady_interval < MIN_INTERVAL {
            return Err(FxError::invalid("steady_interval", "must be at least one frame"));
        }
        if self.trail_length == 0 {
            return Err(FxError::invalid("trail_length", "must be at least 1"));
        }
        Ok(())
    }
}

/// Text animation tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Sampling grid spacing in pixels
    pub gap: u32,
    /// Upper bound on the rendered glyph height in pixels
    pub font_size: f32,
    pub dot_color: Rgba,
    /// Easing of a dot already in a shape when it is retargeted
    pub animation_speed: f32,
    /// Initial and landing dot radius
    pub dot_size: f32,
    /// Seconds each plain text token stays up
    pub step_interval: f32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            gap: 13,
            font_size: 500.0,
            dot_color: Rgba::new(255, 255, 255, 1.0),
            animation_speed: 0.14,
            dot_size: 5.0,
            step_interval: 2.0,
        }
    }
}

impl TextOptions {
    pub fn validate(&self) -> Result<(), FxError> {
        if self.gap == 0 {
            return Err(FxError::invalid("gap", "must be greater than zero"));
        }
        if self.font_size <= 0.0 {
            return Err(FxError::invalid("font_size", "must be positive"));
        }
        if !(self.animation_speed > 0.0 && self.animation_speed <= 1.0) {
            return Err(FxError::invalid("animation_speed", "must be in (0, 1]"));
        }
        if self.step_interval.is_nan() || self.step_interval < MIN_INTERVAL {
            return Err(FxError::invalid("step_interval", "must be at least one frame"));
        }
        Ok(())
    }
}

/// Window layout of the two canvases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageOptions {
    pub background: Rgb,
    /// Horizontal and vertical space the text canvas leaves free
    pub text_margin: (u32, u32),
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            background: Rgb::new(0, 0, 0),
            text_margin: (100, 30),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttOptions {
    /// Empty means the client default
    pub host: String,
    pub topic: String,
}

/// Top-level config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stage: StageOptions,
    pub fireworks: FireworksOptions,
    pub text: TextOptions,
    /// Script played on startup
    pub script: String,
    pub mqtt: MqttOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stage: StageOptions::default(),
            fireworks: FireworksOptions::default(),
            text: TextOptions::default(),
            script: "#countdown 3|Hello|#time".to_string(),
            mqtt: MqttOptions::default(),
        }
    }
}

impl AppConfig {
    /// Parse and validate config JSON
    pub fn from_json(json: &str, path: &Path) -> Result<Self, FxError> {
        let config: Self = serde_json::from_str(json).map_err(|source| FxError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FxError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| FxError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json, path)
    }

    pub fn validate(&self) -> Result<(), FxError> {
        self.fireworks.validate()?;
        self.text.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_object_is_all_defaults() {
        let config = AppConfig::from_json("{}", Path::new("inline")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let json = r#"{ "fireworks": { "gravity": 0.2 }, "text": { "gap": 8 } }"#;
        let config = AppConfig::from_json(json, Path::new("inline")).unwrap();
        assert_eq!(config.fireworks.gravity, 0.2);
        assert_eq!(config.fireworks.friction, 0.99);
        assert_eq!(config.fireworks.colors.len(), 8);
        assert_eq!(config.text.gap, 8);
        assert_eq!(config.text.font_size, 500.0);
    }

    #[test]
    fn test_dot_color_alpha_defaults_to_opaque() {
        let json = r#"{ "text": { "dot_color": { "r": 10, "g": 20, "b": 30 } } }"#;
        let config = AppConfig::from_json(json, Path::new("inline")).unwrap();
        assert_eq!(config.text.dot_color, Rgba::new(10, 20, 30, 1.0));
    }

    #[test]
    fn test_zero_gap_rejected() {
        let json = r#"{ "text": { "gap": 0 } }"#;
        let err = AppConfig::from_json(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, FxError::InvalidOption { key: "gap", .. }));
    }

    #[test]
    fn test_sub_frame_intervals_rejected() {
        let json = r#"{ "fireworks": { "auto_interval": 1e-10 } }"#;
        let err = AppConfig::from_json(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, FxError::InvalidOption { key: "auto_interval", .. }));

        let json = r#"{ "fireworks": { "steady_interval": 0.001 } }"#;
        let err = AppConfig::from_json(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, FxError::InvalidOption { key: "steady_interval", .. }));

        let json = r#"{ "text": { "step_interval": 0.0 } }"#;
        let err = AppConfig::from_json(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, FxError::InvalidOption { key: "step_interval", .. }));

        let json = r#"{ "text": { "step_interval": 0.02 } }"#;
        assert!(AppConfig::from_json(json, Path::new("inline")).is_ok());
    }

    #[test]
    fn test_empty_palette_rejected() {
        let json = r#"{ "fireworks": { "colors": [] } }"#;
        let err = AppConfig::from_json(json, Path::new("inline")).unwrap_err();
        assert!(matches!(err, FxError::InvalidOption { key: "colors", .. }));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = AppConfig::from_json("{ nope", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, FxError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "script": "Hi|#time", "stage": {{ "text_margin": [40, 20] }} }}"#)
            .unwrap();
        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.script, "Hi|#time");
        assert_eq!(config.stage.text_margin, (40, 20));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FxError::ConfigIo { .. }));
    }
}
