//! Countdown state machine for the lapwatch widget.
//!
//! The countdown has two states, stopped and running. While running it owns a
//! single tick schedule that fires every `step` seconds and takes `step` off
//! the remaining time. When the remaining time reaches zero the countdown
//! stops itself and emits a [`CompleteMsg`].
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_lapwatch::countdown::Model;
//!
//! let mut countdown = Model::new();
//! countdown.set_initial_time(10).unwrap();
//! assert_eq!(countdown.remaining(), 10);
//!
//! let first_tick = countdown.start();
//! assert!(first_tick.is_some());
//! assert!(countdown.running());
//!
//! countdown.pause();
//! assert!(!countdown.running());
//! assert_eq!(countdown.remaining(), 10);
//! ```
//!
//! # Tick Scheduling
//!
//! Entering the running state acquires a [`TickHandle`] that carries a fresh
//! generation tag. Every [`TickMsg`] is stamped with the tag of the handle
//! that scheduled it, and the countdown only accepts ticks whose tag matches
//! the handle it currently holds. Leaving the running state drops the handle,
//! so ticks that were already in flight are discarded on arrival and a pause
//! followed by a quick start can never leave two schedules decrementing the
//! same countdown.
//!
//! # bubbletea-rs Integration
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_lapwatch::countdown::{CompleteMsg, Model};
//!
//! struct App {
//!     countdown: Model,
//!     done: bool,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         let mut countdown = Model::new().with_initial_time(30);
//!         let cmd = countdown.start();
//!         (Self { countdown, done: false }, cmd)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(complete) = msg.downcast_ref::<CompleteMsg>() {
//!             if complete.id == self.countdown.id() {
//!                 self.done = true;
//!             }
//!         }
//!         self.countdown.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.countdown.view()
//!     }
//! }
//! ```

use crate::clock;
use crate::error::InputError;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Model as BubbleTeaModel, Msg};
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

// Internal ID management for countdown instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Wraps `msg` in a command that delivers it on the next turn of the loop.
pub(crate) fn emit<M: Clone + Send + 'static>(msg: M) -> Cmd {
    bubbletea_tick(Duration::from_nanos(1), move |_| Box::new(msg.clone()) as Msg)
}

/// Message delivered by the tick schedule every `step` seconds.
///
/// Ticks are only honoured by the countdown whose `id` they carry and only
/// while the schedule that produced them is still the live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickMsg {
    /// The countdown this tick belongs to.
    pub id: i64,
    /// Generation of the schedule that produced this tick.
    tag: i64,
}

/// Sent once when a running countdown reaches zero.
#[derive(Debug, Clone)]
pub struct CompleteMsg {
    /// The countdown that completed.
    pub id: i64,
}

/// Sent when a lap is recorded through the widget.
#[derive(Debug, Clone)]
pub struct LapMsg {
    /// The countdown the lap was taken on.
    pub id: i64,
    /// The recorded lap.
    pub lap: Lap,
}

/// Countdown configuration.
///
/// `initial_time` is where the countdown starts and what `reset` restores.
/// `step` is both the decrement per tick and the tick period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Starting time in seconds.
    pub initial_time: u64,
    /// Seconds taken off per tick; also the tick period.
    pub step: NonZeroU64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_time: 0,
            step: NonZeroU64::MIN,
        }
    }
}

/// A snapshot of elapsed time taken on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lap {
    /// 1-based position in the lap list.
    pub index: usize,
    /// Seconds elapsed since the previous lap, or since the start for the first.
    pub since_lap: u64,
    /// Seconds elapsed since the start of the countdown.
    pub overall: u64,
}

/// The two states of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not counting down. Configuration may be edited.
    Stopped,
    /// Counting down; a tick schedule is live.
    Running,
}

/// Ownership of the live tick schedule.
///
/// Exactly one exists while the countdown runs. Dropping it is what cancels
/// the schedule: once it is gone no tick carrying its tag is accepted.
#[derive(Debug)]
pub struct TickHandle {
    id: i64,
    tag: i64,
    interval: Duration,
}

impl TickHandle {
    /// Generation tag of this schedule.
    pub fn tag(&self) -> i64 {
        self.tag
    }

    /// Period between ticks.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn message(&self) -> TickMsg {
        TickMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn schedule(&self) -> Cmd {
        let msg = self.message();
        bubbletea_tick(self.interval, move |_| Box::new(msg.clone()) as Msg)
    }
}

/// The countdown state machine.
#[derive(Debug)]
pub struct Model {
    id: i64,
    config: Config,
    remaining: u64,
    handle: Option<TickHandle>,
    last_tag: i64,
    laps: Vec<Lap>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates a stopped countdown with zero initial time and a 1 second step.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a stopped countdown from `config`, with `remaining` set to the
    /// initial time.
    pub fn with_config(config: Config) -> Self {
        Self {
            id: next_id(),
            config,
            remaining: config.initial_time,
            handle: None,
            last_tag: 0,
            laps: Vec::new(),
        }
    }

    /// Builder form of [`Model::set_initial_time`] for a freshly created model.
    pub fn with_initial_time(mut self, secs: u64) -> Self {
        self.config.initial_time = secs;
        self.remaining = secs;
        self
    }

    /// Builder form of [`Model::set_step`] for a freshly created model.
    pub fn with_step(mut self, step: NonZeroU64) -> Self {
        self.config.step = step;
        self
    }

    /// Unique identifier of this countdown, carried by all of its messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current configuration.
    pub fn config(&self) -> Config {
        self.config
    }

    /// Starting time in seconds.
    pub fn initial_time(&self) -> u64 {
        self.config.initial_time
    }

    /// Seconds per tick.
    pub fn step(&self) -> u64 {
        self.config.step.get()
    }

    /// Seconds left on the countdown.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Whether a tick schedule is live.
    pub fn running(&self) -> bool {
        self.handle.is_some()
    }

    /// Current state.
    pub fn state(&self) -> State {
        if self.running() {
            State::Running
        } else {
            State::Stopped
        }
    }

    /// The live tick schedule, if running.
    pub fn tick_handle(&self) -> Option<&TickHandle> {
        self.handle.as_ref()
    }

    /// Laps recorded since the last reset, oldest first.
    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    /// Seconds elapsed since the initial time.
    pub fn elapsed(&self) -> u64 {
        self.config.initial_time.saturating_sub(self.remaining)
    }

    /// Fraction of the initial time that has elapsed, in `0.0..=1.0`.
    ///
    /// Zero when the initial time is zero.
    pub fn progress(&self) -> f64 {
        if self.config.initial_time == 0 {
            return 0.0;
        }
        self.elapsed() as f64 / self.config.initial_time as f64
    }

    /// Elapsed fraction on a 0 to 100 scale, for the progress ring.
    pub fn percent(&self) -> f64 {
        if self.config.initial_time == 0 {
            return 0.0;
        }
        self.elapsed() as f64 * 100.0 / self.config.initial_time as f64
    }

    /// The message the live schedule will deliver next.
    ///
    /// Hosts that drive the countdown from their own clock, and tests, can
    /// feed this back through [`Model::update`] instead of waiting on the
    /// scheduled command.
    pub fn next_tick(&self) -> Option<TickMsg> {
        self.handle.as_ref().map(TickHandle::message)
    }

    /// Starts counting down and returns the command for the first tick.
    ///
    /// Does nothing and returns `None` when there is no time left or when
    /// the countdown is already running, so a schedule is never duplicated.
    pub fn start(&mut self) -> Option<Cmd> {
        if self.running() {
            trace!(id = self.id, "start ignored, already running");
            return None;
        }
        if self.remaining == 0 {
            debug!(id = self.id, "start ignored, no time remaining");
            return None;
        }

        self.last_tag += 1;
        let handle = TickHandle {
            id: self.id,
            tag: self.last_tag,
            interval: Duration::from_secs(self.config.step.get()),
        };
        debug!(
            id = self.id,
            tag = handle.tag,
            remaining = self.remaining,
            step = self.config.step.get(),
            "countdown started"
        );
        let cmd = handle.schedule();
        self.handle = Some(handle);
        Some(cmd)
    }

    /// Stops counting down, keeping the remaining time.
    pub fn pause(&mut self) {
        if self.release("paused") {
            debug!(id = self.id, remaining = self.remaining, "countdown paused");
        }
    }

    /// Pauses when running, otherwise starts.
    pub fn toggle(&mut self) -> Option<Cmd> {
        if self.running() {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    /// Stops, restores the initial time and clears the laps.
    pub fn reset(&mut self) {
        self.release("reset");
        self.remaining = self.config.initial_time;
        self.laps.clear();
        debug!(id = self.id, remaining = self.remaining, "countdown reset");
    }

    /// Records a lap. Works in either state and changes nothing but the lap
    /// list.
    pub fn lap(&mut self) -> Lap {
        let overall = self.elapsed();
        let previous = self.laps.last().map_or(0, |l| l.overall);
        let lap = Lap {
            index: self.laps.len() + 1,
            since_lap: overall.saturating_sub(previous),
            overall,
        };
        self.laps.push(lap);
        debug!(id = self.id, index = lap.index, overall, "lap recorded");
        lap
    }

    /// Sets the initial time and, with it, the remaining time.
    ///
    /// # Errors
    ///
    /// [`InputError::Running`] while the countdown runs.
    pub fn set_initial_time(&mut self, secs: u64) -> Result<(), InputError> {
        if self.running() {
            return Err(InputError::Running);
        }
        self.config.initial_time = secs;
        self.remaining = secs;
        debug!(id = self.id, initial_time = secs, "initial time set");
        Ok(())
    }

    /// Sets the step, which is both the decrement and the tick period.
    ///
    /// # Errors
    ///
    /// [`InputError::Running`] while the countdown runs, and
    /// [`InputError::ZeroStep`] for a zero step.
    pub fn set_step(&mut self, secs: u64) -> Result<(), InputError> {
        if self.running() {
            return Err(InputError::Running);
        }
        let step = NonZeroU64::new(secs).ok_or(InputError::ZeroStep)?;
        self.config.step = step;
        debug!(id = self.id, step = secs, "step set");
        Ok(())
    }

    /// Handles tick messages addressed to this countdown.
    ///
    /// Returns the next tick, or the completion notice when the countdown
    /// reaches zero. Ticks for other countdowns, ticks from a released
    /// schedule and ticks arriving while stopped are ignored.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        let tick = msg.downcast_ref::<TickMsg>()?;
        if tick.id != self.id {
            return None;
        }
        let live_tag = match &self.handle {
            Some(handle) if handle.tag == tick.tag => handle.tag,
            _ => {
                trace!(id = self.id, tag = tick.tag, "stale tick dropped");
                return None;
            }
        };

        let step = self.config.step.get();
        if self.remaining <= step {
            self.remaining = 0;
            self.release("completed");
            debug!(id = self.id, "countdown complete");
            return Some(emit(CompleteMsg { id: self.id }));
        }

        self.remaining -= step;
        trace!(id = self.id, tag = live_tag, remaining = self.remaining, "tick");
        self.handle.as_ref().map(TickHandle::schedule)
    }

    /// The remaining time as `HH : MM : SS`.
    pub fn view(&self) -> String {
        clock::format(self.remaining)
    }

    // Drops the tick handle if held. Returns whether one was released.
    fn release(&mut self, reason: &'static str) -> bool {
        match self.handle.take() {
            Some(handle) => {
                trace!(id = self.id, tag = handle.tag, reason, "tick schedule released");
                true
            }
            None => false,
        }
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.release("teardown");
    }
}

impl BubbleTeaModel for Model {
    fn init() -> (Self, Option<Cmd>) {
        (Self::new(), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        self.update(msg)
    }

    fn view(&self) -> String {
        self.view()
    }
}
