//! Script playback
//!
//! The sequencer owns the pending commands and one repeating timer. It
//! never draws: `perform` and `advance` return the [`Action`]s the caller
//! should apply. Starting a timer always replaces the current one, so a
//! countdown or clock started from inside the sequence takes over from it.

use super::command::{Command, Script};
use crate::clock::{Clock, Interval, WallTime};
use std::collections::VecDeque;

/// Seconds between countdown numbers and between clock checks
pub const TICK_SECONDS: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Morph the dots into `text`. `fast` shortens the transition.
    Show { text: String, fast: bool },
    /// Release every dot from the current shape
    Disperse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    /// Take the next pending command
    Sequence,
    /// Show the current countdown number, or hand back to the sequence at 0
    Countdown,
    /// Show the time if it changed
    Clock,
}

#[derive(Debug)]
struct Timer {
    job: Job,
    interval: Interval,
    current: i32,
    /// Last index before the timer stops; `None` repeats forever
    max: Option<i32>,
    reverse: bool,
}

impl Timer {
    fn finished(&self) -> bool {
        if self.reverse {
            self.current <= 0
        } else {
            self.max.is_some_and(|max| self.current >= max)
        }
    }
}

pub struct Sequencer {
    pending: VecDeque<Command>,
    timer: Option<Timer>,
    /// Bumped whenever a timer starts
    generation: u64,
    step_interval: f32,
    clock_shown: Option<WallTime>,
}

impl Sequencer {
    /// `step_interval` is the time each sequence step stays up
    pub fn new(step_interval: f32) -> Self {
        Self {
            pending: VecDeque::new(),
            timer: None,
            generation: 0,
            step_interval,
            clock_shown: None,
        }
    }

    /// Commands not yet started
    pub fn pending(&self) -> impl Iterator<Item = &Command> {
        self.pending.iter()
    }

    /// Whether a timer is still scheduled
    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Queue a script and restart playback. The first step runs at once.
    pub fn perform(&mut self, script: Script, clock: &dyn Clock) -> Vec<Action> {
        match script {
            Script::Text(text) => self.pending.extend(super::command::parse_script(&text)),
            Script::Commands(commands) => self.pending = commands.into(),
        }
        log::info!("playing script with {} steps", self.pending.len());

        let mut actions = Vec::new();
        self.start_sequence(clock, &mut actions);
        actions
    }

    /// Advance the current timer by `dt` seconds
    pub fn advance(&mut self, dt: f32, clock: &dyn Clock) -> Vec<Action> {
        let mut actions = Vec::new();
        let fired = match self.timer.as_mut() {
            Some(timer) => timer.interval.tick(dt),
            None => return actions,
        };

        for _ in 0..fired {
            let generation = self.generation;
            let Some(timer) = self.timer.as_mut() else {
                break;
            };
            timer.current += if timer.reverse { -1 } else { 1 };
            let (job, index) = (timer.job, timer.current);
            if timer.finished() {
                self.timer = None;
            }

            self.run(job, index, clock, &mut actions);
            if self.generation != generation {
                break;
            }
        }
        actions
    }

    fn start_sequence(&mut self, clock: &dyn Clock, actions: &mut Vec<Action>) {
        let steps = self.pending.len() as i32;
        let period = self.step_interval;
        self.start_timer(Job::Sequence, period, Some(steps), false, clock, actions);
    }

    /// Run `job` for the first index now, then keep the timer unless it is
    /// already done or the job started a timer of its own
    fn start_timer(
        &mut self,
        job: Job,
        period: f32,
        max: Option<i32>,
        reverse: bool,
        clock: &dyn Clock,
        actions: &mut Vec<Action>,
    ) {
        self.timer = None;
        self.generation += 1;
        let generation = self.generation;

        let timer = Timer {
            job,
            interval: Interval::new(period),
            current: if reverse { max.unwrap_or(0) } else { 1 },
            max,
            reverse,
        };
        self.run(job, timer.current, clock, actions);

        if self.generation == generation && !timer.finished() {
            self.timer = Some(timer);
        }
    }

    fn run(&mut self, job: Job, index: i32, clock: &dyn Clock, actions: &mut Vec<Action>) {
        match job {
            Job::Sequence => self.step(clock, actions),
            Job::Countdown if index > 0 => actions.push(Action::Show {
                text: index.to_string(),
                fast: true,
            }),
            Job::Countdown => {
                if self.pending.is_empty() {
                    actions.push(Action::Disperse);
                } else {
                    self.start_sequence(clock, actions);
                }
            }
            Job::Clock => {
                let now = clock.now();
                if self.clock_shown != Some(now) {
                    self.clock_shown = Some(now);
                    actions.push(Action::Show {
                        text: now.to_string(),
                        fast: false,
                    });
                }
            }
        }
    }

    /// Take the next command off the queue and act on it
    fn step(&mut self, clock: &dyn Clock, actions: &mut Vec<Action>) {
        loop {
            let Some(command) = self.pending.pop_front() else {
                return;
            };
            match command {
                Command::Text(text) => actions.push(Action::Show { text, fast: false }),
                Command::Countdown(n) => {
                    log::debug!("countdown from {}", n);
                    let max = Some(i32::try_from(n).unwrap_or(i32::MAX));
                    self.start_timer(Job::Countdown, TICK_SECONDS, max, true, clock, actions);
                }
                Command::Time if !self.pending.is_empty() => actions.push(Action::Show {
                    text: clock.now().to_string(),
                    fast: false,
                }),
                Command::Time => {
                    log::debug!("entering clock mode");
                    self.clock_shown = None;
                    self.start_timer(Job::Clock, TICK_SECONDS, None, false, clock, actions);
                }
                Command::Pause => {}
                Command::Unknown(name) => {
                    log::warn!("skipping unknown directive '{}'", name);
                    continue;
                }
            }
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn show(text: &str, fast: bool) -> Action {
        Action::Show {
            text: text.to_string(),
            fast,
        }
    }

    #[test]
    fn test_countdown_then_text() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);

        assert_eq!(seq.perform("#countdown 3|Hello".into(), &clock), vec![show("3", true)]);
        assert!(seq.advance(0.5, &clock).is_empty());
        assert_eq!(seq.advance(0.5, &clock), vec![show("2", true)]);
        assert_eq!(seq.advance(1.0, &clock), vec![show("1", true)]);
        assert_eq!(seq.advance(1.0, &clock), vec![show("Hello", false)]);

        // Nothing is left to play
        assert!(!seq.is_active());
        assert!(seq.advance(10.0, &clock).is_empty());
    }

    #[test]
    fn test_countdown_at_end_disperses() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);
        seq.perform("#countdown 2".into(), &clock);
        assert_eq!(seq.advance(1.0, &clock), vec![show("1", true)]);
        assert_eq!(seq.advance(1.0, &clock), vec![Action::Disperse]);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_huge_countdown_still_counts() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);
        assert_eq!(
            seq.perform("#countdown 3000000000|Go".into(), &clock),
            vec![show("2147483647", true)]
        );
        assert_eq!(seq.advance(1.0, &clock), vec![show("2147483646", true)]);
        assert!(seq.is_active());
    }

    #[test]
    fn test_text_steps_at_step_interval() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);
        assert_eq!(seq.perform("A|B|C".into(), &clock), vec![show("A", false)]);
        assert!(seq.advance(1.5, &clock).is_empty());
        assert_eq!(seq.advance(0.5, &clock), vec![show("B", false)]);
        assert_eq!(seq.advance(2.0, &clock), vec![show("C", false)]);
        assert!(!seq.is_active());
    }

    #[test]
    fn test_large_dt_fires_every_step() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(1.0);
        seq.perform("A|B|C".into(), &clock);
        assert_eq!(seq.advance(5.0, &clock), vec![show("B", false), show("C", false)]);
    }

    #[test]
    fn test_time_mid_sequence_shows_once() {
        let clock = FixedClock::new(9, 5);
        let mut seq = Sequencer::new(1.0);
        assert_eq!(seq.perform("#time|Bye".into(), &clock), vec![show("9:05", false)]);
        assert_eq!(seq.advance(1.0, &clock), vec![show("Bye", false)]);
    }

    #[test]
    fn test_clock_mode_updates_on_minute_change() {
        let clock = FixedClock::new(9, 5);
        let mut seq = Sequencer::new(1.0);
        assert_eq!(seq.perform("#time".into(), &clock), vec![show("9:05", false)]);
        assert!(seq.advance(1.0, &clock).is_empty());
        assert!(seq.advance(30.0, &clock).is_empty());

        clock.set(9, 6);
        assert_eq!(seq.advance(1.0, &clock), vec![show("9:06", false)]);
        assert!(seq.advance(1.0, &clock).is_empty());
        assert!(seq.is_active());
    }

    #[test]
    fn test_text_appends_commands_replace() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);
        seq.perform("A|B|C".into(), &clock);
        seq.perform("D".into(), &clock);
        // "A" was shown first, the restart shows "B" at once
        let pending: Vec<_> = seq.pending().cloned().collect();
        assert_eq!(pending, vec![Command::Text("C".into()), Command::Text("D".into())]);

        seq.perform(vec![Command::Text("X".into()), Command::Text("Y".into())].into(), &clock);
        let pending: Vec<_> = seq.pending().cloned().collect();
        assert_eq!(pending, vec![Command::Text("Y".into())]);
    }

    #[test]
    fn test_new_script_supersedes_countdown() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(2.0);
        seq.perform("#countdown 5".into(), &clock);
        assert_eq!(
            seq.perform(vec![Command::Text("Now".into())].into(), &clock),
            vec![show("Now", false)]
        );
        assert!(seq.advance(10.0, &clock).is_empty());
    }

    #[test]
    fn test_empty_token_is_a_quiet_step() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(1.0);
        assert!(seq.perform("|B".into(), &clock).is_empty());
        assert_eq!(seq.advance(1.0, &clock), vec![show("B", false)]);
    }

    #[test]
    fn test_unknown_directive_skipped() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(1.0);
        assert_eq!(seq.perform("#spin|B".into(), &clock), vec![show("B", false)]);
    }

    #[test]
    fn test_empty_script_starts_nothing() {
        let clock = FixedClock::new(12, 0);
        let mut seq = Sequencer::new(1.0);
        assert!(seq.perform(Script::Commands(Vec::new()), &clock).is_empty());
        assert!(!seq.is_active());
    }
}
