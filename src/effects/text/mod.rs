//! Dot-matrix text
//!
//! A pool of dots morphs between shapes sampled from rendered text. On each
//! switch every shape point is handed to a dot (in random order), which
//! pops out briefly and then settles onto its point; dots left over drift
//! away as dim background specks. The pool only ever grows.
//!
//! What to show and when is decided by the [`Sequencer`] from a script such
//! as `#countdown 3|Hello|#time`.

pub mod command;
pub mod dot;
pub mod sequencer;
pub mod shape;

pub use command::{parse_script, Command, Script};
pub use dot::{Dot, DotPoint, Hold, Waypoint};
pub use sequencer::{Action, Sequencer};
pub use shape::{ShapeSample, ShapeSampler};

use super::{Effect, FRAME_RATE, MAX_CATCHUP_FRAMES};
use crate::clock::{Clock, Interval, SystemClock};
use crate::config::TextOptions;
use crate::display::PixelBuffer;
use crate::error::FxError;
use crate::stage::Stage;
use crate::util::Rng;

const FAST_EASING: f32 = 0.25;
const JOIN_EASING: f32 = 0.11;
const DRIFT_EASING: f32 = 0.04;
const DRIFT_ALPHA: f32 = 0.3;
const POP_HOLD: u32 = 18;
const JOIN_HOLD: u32 = 30;
const RELEASE_HOLD: u32 = 20;

pub struct TextAnimation {
    selector: String,
    options: TextOptions,
    width: u32,
    height: u32,
    dots: Vec<Dot>,
    sampler: ShapeSampler,
    sequencer: Sequencer,
    clock: Box<dyn Clock>,
    rng: Rng,
    frames: Interval,
    shape_size: (f32, f32),
}

impl TextAnimation {
    /// Bind to the stage layer under `selector`
    pub fn new(stage: &Stage, selector: &str, options: TextOptions) -> Result<Self, FxError> {
        options.validate()?;
        let (width, height) = stage.layer(selector)?.size();
        Ok(Self {
            selector: selector.to_string(),
            sampler: ShapeSampler::new(width, height, options.gap, options.font_size),
            sequencer: Sequencer::new(options.step_interval),
            options,
            width,
            height,
            dots: Vec::new(),
            clock: Box::new(SystemClock),
            rng: Rng::from_time(),
            frames: Interval::new(1.0 / FRAME_RATE),
            shape_size: (0.0, 0.0),
        })
    }

    /// Replace the random source, for reproducible runs
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Rng::new(seed);
        self
    }

    /// Replace the wall clock read by `#time`
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Play a script. Text is parsed and queued after anything pending,
    /// a command list replaces what is pending.
    pub fn animate(&mut self, script: impl Into<Script>) {
        let actions = self.sequencer.perform(script.into(), self.clock.as_ref());
        self.apply(actions);
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn dot_count(&self) -> usize {
        self.dots.len()
    }

    /// Extent of the shape last switched to
    pub fn shape_size(&self) -> (f32, f32) {
        self.shape_size
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.sampler.fit(width, height);
    }

    fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            let (text, fast) = match action {
                Action::Show { text, fast } => (text, fast),
                Action::Disperse => (String::new(), false),
            };
            let shape = self.sampler.sample_text(&text);
            log::debug!("switching to '{}' ({} points)", text, shape.len());
            self.switch_shape(&shape, fast);
        }
    }

    /// Retarget the pool onto `shape`. `fast` is used for countdown
    /// numbers, which change every second.
    pub fn switch_shape(&mut self, shape: &ShapeSample, fast: bool) {
        let (aw, ah) = (self.width as f32, self.height as f32);
        self.shape_size = (shape.width, shape.height);
        let cx = aw / 2.0 - shape.width / 2.0;
        let cy = ah / 2.0 - shape.height / 2.0;

        let TextOptions {
            dot_size,
            dot_color,
            animation_speed,
            ..
        } = self.options;
        while self.dots.len() < shape.len() {
            self.dots.push(Dot::new(aw / 2.0, ah / 2.0, dot_size, dot_color));
        }

        let rng = &mut self.rng;
        let mut points = shape.points.clone();
        let mut d = 0;
        while !points.is_empty() {
            let p = points.swap_remove(rng.index(points.len()));
            let dot = &mut self.dots[d];

            dot.easing = if fast {
                FAST_EASING
            } else if dot.is_static {
                animation_speed
            } else {
                JOIN_EASING
            };

            let pop = if dot.is_static {
                Waypoint::in_place()
                    .size(rng.next_f32() * 20.0 + 10.0)
                    .alpha(rng.next_f32())
                    .hold(Hold::Frames(POP_HOLD))
            } else {
                let hold = if fast { POP_HOLD } else { JOIN_HOLD };
                Waypoint::in_place()
                    .size(rng.next_f32() * 5.0 + 5.0)
                    .hold(Hold::Frames(hold))
            };
            dot::queue(dot, pop);

            dot.is_static = true;
            dot::queue(dot, Waypoint::to(p.x + cx, p.y + cy).alpha(1.0).size(dot_size));
            d += 1;
        }

        for dot in self.dots[d..].iter_mut().filter(|dot| dot.is_static) {
            let pop = Waypoint::in_place()
                .size(rng.next_f32() * 20.0 + 10.0)
                .alpha(rng.next_f32())
                .hold(Hold::Frames(RELEASE_HOLD));
            dot::queue(dot, pop);

            dot.is_static = false;
            dot.easing = DRIFT_EASING;
            let drift = Waypoint::to(rng.next_f32() * aw, rng.next_f32() * ah)
                .alpha(DRIFT_ALPHA)
                .size(rng.next_f32() * 4.0);
            dot::queue(dot, drift);
        }
    }

    /// One frame of dot motion
    pub fn step(&mut self) {
        for d in &mut self.dots {
            dot::update(d, &mut self.rng);
        }
    }
}

impl Effect for TextAnimation {
    fn update(&mut self, dt: f32, width: u32, height: u32) {
        if (width, height) != (self.width, self.height) {
            self.resize(width, height);
        }

        let actions = self.sequencer.advance(dt, self.clock.as_ref());
        self.apply(actions);

        let frames = self.frames.tick(dt).min(MAX_CATCHUP_FRAMES);
        for _ in 0..frames {
            self.step();
        }
    }

    fn render(&self, buffer: &mut PixelBuffer) {
        buffer.clear_rgba(0, 0, 0, 0);
        for d in &self.dots {
            dot::draw(d, buffer);
        }
    }

    fn name(&self) -> &str {
        "Text"
    }
}
