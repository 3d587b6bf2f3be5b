//! Fireworks Effect
//!
//! Rockets climb from the bottom of the canvas, accelerating until they
//! reach their target height, then burst into a ring of sparks that fall
//! under gravity and friction. The canvas is never cleared: a faint wash of
//! the fade color each frame leaves soft trails behind everything.

use super::{Effect, FRAME_RATE, MAX_CATCHUP_FRAMES};
use crate::clock::Interval;
use crate::config::{FireworksOptions, Rgb};
use crate::display::{alpha_u8, PixelBuffer};
use crate::error::FxError;
use crate::math::Vec2;
use crate::particles::{Spark, SparkField, Trail};
use crate::stage::Stage;
use crate::util::Rng;
use std::f32::consts::TAU;

pub const ROCKET_ACCELERATION: f32 = 0.3;
pub const ROCKET_MAX_SPEED: f32 = 15.0;
/// Sparks per burst, inclusive
pub const BURST_MIN: i32 = 20;
pub const BURST_MAX: i32 = 49;
/// A rocket that climbs past this without bursting is dropped
const OFFSCREEN_Y: f32 = -50.0;

const ROCKET_RADIUS: i32 = 4;
const ROCKET_GLOW: i32 = 15;
const SPARK_MIN_SPEED: f32 = 3.0;
const ANGLE_JITTER: f32 = 0.5;

/// An ascending firework
#[derive(Debug, Clone)]
pub struct Rocket {
    pub pos: Vec2,
    pub target: Vec2,
    /// Upward speed in pixels per frame
    pub speed: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub trail: Trail,
    pub color: Rgb,
    pub exploded: bool,
    /// Sparks released by the burst, as they were at birth
    pub sparks: Vec<Spark>,
}

impl Rocket {
    /// Advance one frame. Returns true on the frame the rocket reaches
    /// its target height.
    fn climb(&mut self) -> bool {
        self.speed = (self.speed + self.acceleration).min(self.max_speed);
        self.pos.y -= self.speed;

        let pos = self.pos;
        self.trail.push(pos);

        self.speed > 0.0 && self.pos.y <= self.target.y
    }
}

pub struct FireworksEffect {
    selector: String,
    options: FireworksOptions,
    width: u32,
    height: u32,
    rockets: Vec<Rocket>,
    field: SparkField,
    running: bool,
    rng: Rng,
    frames: Interval,
    auto_launch: Interval,
    steady_launch: Option<Interval>,
}

impl FireworksEffect {
    /// Bind to the stage layer under `selector`
    pub fn new(stage: &Stage, selector: &str, options: FireworksOptions) -> Result<Self, FxError> {
        options.validate()?;
        let (width, height) = stage.layer(selector)?.size();
        Ok(Self {
            selector: selector.to_string(),
            field: SparkField::new(options.gravity, options.friction, options.max_particles),
            auto_launch: Interval::new(options.auto_interval),
            options,
            width,
            height,
            rockets: Vec::new(),
            running: false,
            rng: Rng::from_time(),
            frames: Interval::new(1.0 / FRAME_RATE),
            steady_launch: None,
        })
    }

    /// Replace the random source, for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::new(seed);
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn start(&mut self) {
        if !self.running {
            log::info!("fireworks started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            log::info!("fireworks stopped");
        }
        self.running = false;
        self.frames.reset();
    }

    pub fn toggle(&mut self) {
        if self.running {
            self.stop();
        } else {
            self.start();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Also launch one rocket every `steady_interval`, regardless of chance
    pub fn start_auto_fireworks(&mut self) {
        if self.steady_launch.is_none() {
            log::info!("steady auto-fireworks every {}s", self.options.steady_interval);
            self.steady_launch = Some(Interval::new(self.options.steady_interval));
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn rockets(&self) -> &[Rocket] {
        &self.rockets
    }

    pub fn sparks(&self) -> &[Spark] {
        self.field.sparks()
    }

    /// Launch a rocket from the bottom edge toward (x, y)
    pub fn create_firework(&mut self, x: f32, y: f32) {
        let color = random_color(&mut self.rng, &self.options.colors);
        self.rockets.push(Rocket {
            pos: Vec2::new(x, self.height as f32),
            target: Vec2::new(x, y),
            speed: 0.0,
            max_speed: ROCKET_MAX_SPEED,
            acceleration: ROCKET_ACCELERATION,
            trail: Trail::new(self.options.trail_length),
            color,
            exploded: false,
            sparks: Vec::new(),
        });
    }

    /// Launch toward a random point: anywhere across, and within the band
    /// starting at `top` (fraction of height) spanning `span`
    fn launch_random(&mut self, top: f32, span: f32) {
        let h = self.height as f32;
        let x = self.rng.next_f32() * self.width as f32;
        let y = self.rng.next_f32() * (h * span) + h * top;
        self.create_firework(x, y);
    }

    /// One frame of rocket motion. Rockets that burst on the previous pass
    /// are pruned first; ones bursting now stay listed until the next pass.
    pub fn update_fireworks(&mut self) {
        self.rockets.retain(|r| !r.exploded);

        let Self {
            rockets,
            field,
            rng,
            options,
            ..
        } = self;

        for rocket in rockets.iter_mut() {
            if rocket.climb() {
                let sparks = explode(rocket, rng, options);
                log::debug!(
                    "burst at ({:.0}, {:.0}) with {} sparks",
                    rocket.pos.x,
                    rocket.pos.y,
                    sparks.len()
                );
                field.emit(sparks.iter().cloned());
                rocket.sparks = sparks;
            }
        }

        rockets.retain(|r| r.exploded || r.pos.y >= OFFSCREEN_Y);
    }

    /// One frame of spark physics
    pub fn update_particles(&mut self) {
        self.field.update();
    }

    /// One full simulation frame
    pub fn step(&mut self) {
        self.update_fireworks();
        self.update_particles();
    }

    fn draw_rockets(&self, buffer: &mut PixelBuffer) {
        for rocket in self.rockets.iter().filter(|r| !r.exploded) {
            let Rgb { r, g, b } = rocket.color;
            buffer.stroke_path(&rocket.trail.as_tuples(), 3, r, g, b, alpha_u8(0.6));

            let x = rocket.pos.x.round() as i32;
            let y = rocket.pos.y.round() as i32;
            buffer.fill_circle_glow(x, y, ROCKET_RADIUS + ROCKET_GLOW, r, g, b, alpha_u8(0.8));
            buffer.fill_circle_blend(x, y, ROCKET_RADIUS, r, g, b, 255);
        }
    }
}

/// Mark the rocket burst and build its ring of sparks: evenly spaced
/// angles with a little jitter, random speed, decay and size each.
fn explode(rocket: &mut Rocket, rng: &mut Rng, options: &FireworksOptions) -> Vec<Spark> {
    rocket.exploded = true;

    let count = rng.range_i32(BURST_MIN, BURST_MAX) as usize;
    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32 + (rng.next_f32() - 0.5) * ANGLE_JITTER;
            let speed = rng.next_f32() * options.particle_speed + SPARK_MIN_SPEED;
            let color = random_color(rng, &options.colors);
            let decay = rng.range_f32(0.01, 0.03);
            let size = rng.next_f32() * options.particle_size + 1.0;
            Spark::new(rocket.pos, Vec2::from_angle(angle, speed), color, decay, size)
        })
        .collect()
}

fn random_color(rng: &mut Rng, colors: &[Rgb]) -> Rgb {
    colors[rng.index(colors.len())]
}

impl Effect for FireworksEffect {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.resize(width, height);
        }
        if !self.running {
            return;
        }

        for _ in 0..self.auto_launch.tick(dt) {
            if self.rng.chance(self.options.auto_chance) {
                self.launch_random(0.2, 0.6);
            }
        }
        if let Some(steady) = self.steady_launch.as_mut() {
            for _ in 0..steady.tick(dt) {
                self.launch_random(0.2, 0.4);
            }
        }

        let frames = self.frames.tick(dt).min(MAX_CATCHUP_FRAMES);
        for _ in 0..frames {
            self.step();
        }
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        if !self.running {
            return;
        }
        let Rgb { r, g, b } = self.options.fade_color;
        buffer.overlay(r, g, b, alpha_u8(self.options.fade_alpha));

        self.draw_rockets(buffer);
        self.field.render(buffer);
    }

    fn name(&self) -> &str {
        "Fireworks"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn effect() -> FireworksEffect {
        let mut stage = Stage::new(800, 600, Rgb::new(0, 0, 0));
        stage.add_layer("#fireworks", (0, 0));
        FireworksEffect::new(&stage, "#fireworks", FireworksOptions::default())
            .unwrap()
            .with_seed(1234)
    }

    #[test]
    fn test_missing_canvas_is_error() {
        let stage = Stage::new(800, 600, Rgb::new(0, 0, 0));
        let err = FireworksEffect::new(&stage, "#fireworks", FireworksOptions::default());
        assert!(matches!(err, Err(FxError::CanvasNotFound(_))));
    }

    #[test]
    fn test_bound_to_selector() {
        let mut stage = Stage::new(800, 600, Rgb::new(0, 0, 0));
        stage.add_layer("#a", (0, 0)).add_layer("#fireworks", (100, 30));
        let fx = FireworksEffect::new(&stage, "#fireworks", FireworksOptions::default()).unwrap();
        assert_eq!(fx.selector(), "#fireworks");
        assert_eq!(stage.layer(fx.selector()).unwrap().size(), (700, 570));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut stage = Stage::new(800, 600, Rgb::new(0, 0, 0));
        stage.add_layer("#fireworks", (0, 0));
        let options = FireworksOptions {
            colors: Vec::new(),
            ..FireworksOptions::default()
        };
        assert!(FireworksEffect::new(&stage, "#fireworks", options).is_err());
    }

    #[test]
    fn test_start_stop_toggle() {
        let mut fx = effect();
        assert!(!fx.is_running());
        fx.start();
        assert!(fx.is_running());
        fx.toggle();
        assert!(!fx.is_running());
        fx.toggle();
        assert!(fx.is_running());
        fx.stop();
        assert!(!fx.is_running());
    }

    #[test]
    fn test_rocket_launches_beneath_target() {
        let mut fx = effect();
        fx.create_firework(100.0, 100.0);
        let rocket = &fx.rockets()[0];
        assert_eq!(rocket.pos, Vec2::new(100.0, 600.0));
        assert_eq!(rocket.target, Vec2::new(100.0, 100.0));
        assert_eq!(rocket.speed, 0.0);
        assert!(!rocket.exploded);
    }

    #[test]
    fn test_rocket_explodes_once_at_target() {
        let mut fx = effect();
        fx.create_firework(100.0, 100.0);

        let mut frames = 0;
        loop {
            let before = fx.rockets()[0].pos.y;
            fx.update_fireworks();
            frames += 1;
            let rocket = &fx.rockets()[0];
            if rocket.exploded {
                assert!(before > 100.0, "burst must happen on the crossing frame");
                assert!(rocket.pos.y <= 100.0);
                break;
            }
            assert!(rocket.pos.y > 100.0);
            assert!(frames < 200, "rocket never reached its target");
        }

        let rocket = &fx.rockets()[0];
        assert!(!rocket.sparks.is_empty());
        let n = rocket.sparks.len() as i32;
        assert!((BURST_MIN..=BURST_MAX).contains(&n));
        assert_eq!(fx.sparks().len(), rocket.sparks.len());

        // Pruned on the following pass, and never bursts again
        fx.update_fireworks();
        assert!(fx.rockets().is_empty());
        assert_eq!(fx.sparks().len(), n as usize);
    }

    #[test]
    fn test_speed_is_capped() {
        let mut fx = effect();
        fx.create_firework(10.0, -10_000.0);
        for _ in 0..100 {
            fx.update_fireworks();
            if let Some(rocket) = fx.rockets().first() {
                assert!(rocket.speed <= ROCKET_MAX_SPEED);
            }
        }
    }

    #[test]
    fn test_rocket_above_screen_is_dropped() {
        let mut fx = effect();
        fx.create_firework(10.0, -10_000.0);
        for _ in 0..200 {
            fx.update_fireworks();
        }
        assert!(fx.rockets().is_empty());
        assert!(fx.sparks().is_empty());
    }

    #[test]
    fn test_trails_never_exceed_limits() {
        let mut fx = effect();
        for i in 0..5 {
            fx.create_firework(100.0 + i as f32 * 50.0, 150.0 + i as f32 * 40.0);
        }
        for _ in 0..300 {
            fx.step();
            for rocket in fx.rockets() {
                assert!(rocket.trail.len() <= 8);
            }
            for spark in fx.sparks() {
                assert!(spark.trail.len() <= 5);
                assert!(spark.life > 0.0);
            }
        }
        assert!(fx.sparks().is_empty(), "all sparks burn out eventually");
    }

    #[test]
    fn test_spark_count_capped_by_max_particles() {
        let mut stage = Stage::new(800, 600, Rgb::new(0, 0, 0));
        stage.add_layer("#fireworks", (0, 0));
        let options = FireworksOptions {
            max_particles: 30,
            ..FireworksOptions::default()
        };
        let mut fx = FireworksEffect::new(&stage, "#fireworks", options)
            .unwrap()
            .with_seed(5);
        for _ in 0..4 {
            fx.create_firework(400.0, 300.0);
        }
        for _ in 0..60 {
            fx.step();
            assert!(fx.sparks().len() <= 30);
        }
    }

    #[test]
    fn test_update_does_nothing_while_stopped() {
        let mut fx = effect();
        fx.create_firework(100.0, 100.0);
        fx.update(1.0, 800, 600);
        assert_eq!(fx.rockets()[0].speed, 0.0);
    }

    #[test]
    fn test_update_runs_fixed_frames() {
        let mut fx = effect();
        fx.start();
        fx.create_firework(100.0, 100.0);
        fx.update(2.0 / FRAME_RATE + 0.001, 800, 600);
        let speed = fx.rockets()[0].speed;
        assert!((speed - 2.0 * ROCKET_ACCELERATION).abs() < 1e-5);
    }

    #[test]
    fn test_update_picks_up_resize() {
        let mut fx = effect();
        fx.update(0.0, 1024, 768);
        fx.create_firework(10.0, 10.0);
        assert_eq!(fx.rockets()[0].pos.y, 768.0);
    }

    #[test]
    fn test_steady_launcher_fires_every_interval() {
        let mut fx = effect();
        fx.options.auto_chance = 0.0;
        fx.start();
        fx.start_auto_fireworks();
        fx.update(1.5, 800, 600);
        assert_eq!(fx.rockets().len(), 1);
        let target = fx.rockets()[0].target;
        assert!(target.y >= 120.0 && target.y <= 360.0);
    }

    #[test]
    fn test_random_launcher_respects_chance() {
        let mut fx = effect();
        fx.options.auto_chance = 0.0;
        fx.start();
        for _ in 0..50 {
            fx.update(0.8, 800, 600);
        }
        assert!(fx.rockets().is_empty());

        fx.options.auto_chance = 1.0;
        fx.update(0.8, 800, 600);
        assert_eq!(fx.rockets().len(), 1);
    }

    #[test]
    fn test_render_leaves_canvas_alone_when_stopped() {
        let fx = effect();
        let mut buffer = PixelBuffer::with_size(800, 600);
        fx.render(&mut buffer);
        assert_eq!(buffer.alpha_at(400, 300), 0);
    }

    #[test]
    fn test_render_washes_and_draws_rocket() {
        let mut fx = effect();
        fx.start();
        fx.create_firework(400.0, 100.0);
        fx.update_fireworks();
        let mut buffer = PixelBuffer::with_size(800, 600);
        fx.render(&mut buffer);
        assert!(buffer.alpha_at(0, 0) > 0, "fade wash covers the canvas");
        let rocket = &fx.rockets()[0];
        let (r, g, b, _) = buffer
            .get_pixel_rgba(rocket.pos.x as i32, rocket.pos.y as i32)
            .unwrap();
        assert_eq!((r, g, b), (rocket.color.r, rocket.color.g, rocket.color.b));
    }
}
