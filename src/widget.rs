//! The lapwatch widget: a countdown with laps, a progress ring and two
//! settings fields.
//!
//! The widget ties the [`countdown`](crate::countdown) state machine to its
//! inputs and outputs. Key presses become named transitions (`start`,
//! `pause`, `reset`, `lap`, `set_initial_time`, `set_step`); ticks are
//! forwarded to the countdown; the view shows the settings, the ring with the
//! remaining time in the middle, the lap list and a help line.
//!
//! # Embedding
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Model as BubbleTeaModel, Msg};
//! use bubbletea_lapwatch::countdown::{CompleteMsg, LapMsg};
//! use bubbletea_lapwatch::widget::Model as Lapwatch;
//!
//! struct App {
//!     lapwatch: Lapwatch,
//!     laps_seen: usize,
//! }
//!
//! impl BubbleTeaModel for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         (Self { lapwatch: Lapwatch::new().with_initial_time(90), laps_seen: 0 }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         if let Some(lap) = msg.downcast_ref::<LapMsg>() {
//!             if lap.id == self.lapwatch.countdown().id() {
//!                 self.laps_seen += 1;
//!             }
//!         }
//!         self.lapwatch.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.lapwatch.view()
//!     }
//! }
//! ```
//!
//! # Settings Fields
//!
//! Edits to the "Initial Time" field call `set_initial_time` on every
//! keystroke that leaves a valid number, which also resets the remaining
//! time. Edits to the "Step Interval" field call `set_step`. Text that does
//! not parse never reaches the countdown: the last valid value stays in
//! effect and the field shows the validation message. Both fields are
//! disabled while the countdown runs.

use crate::clock;
use crate::countdown::{self, CompleteMsg, Config, LapMsg, TickMsg};
use crate::error::InputError;
use crate::field;
use crate::help;
use crate::key::{self, new_binding, with_disabled, with_help, with_keys_str, Binding};
use crate::progress;
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use lipgloss_extras::lipgloss::{self, Color, Style};
use std::num::NonZeroU64;
use tracing::{debug, warn};

/// Colour of the unfilled part of the ring.
pub const RING_TRACK: &str = "#3C3C3C";

/// Key bindings for the widget.
#[derive(Debug, Clone)]
pub struct KeyMap {
    /// Start the countdown. Disabled while running.
    pub start: Binding,
    /// Pause the countdown. Disabled while stopped.
    pub pause: Binding,
    /// Start when stopped, pause when running.
    pub toggle: Binding,
    /// Stop, restore the initial time and clear laps.
    pub reset: Binding,
    /// Record a lap.
    pub lap: Binding,
    /// Focus the next settings field.
    pub next_field: Binding,
    /// Focus the previous settings field.
    pub prev_field: Binding,
    /// Leave the settings fields.
    pub blur: Binding,
    /// Toggle the full help.
    pub help: Binding,
    /// Quit the program.
    pub quit: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            start: new_binding(vec![with_keys_str(&["s"]), with_help("s", "start")]),
            pause: new_binding(vec![
                with_keys_str(&["p"]),
                with_help("p", "pause"),
                with_disabled(),
            ]),
            toggle: new_binding(vec![
                with_keys_str(&["space"]),
                with_help("space", "start/pause"),
            ]),
            reset: new_binding(vec![with_keys_str(&["r"]), with_help("r", "reset")]),
            lap: new_binding(vec![with_keys_str(&["l"]), with_help("l", "lap")]),
            next_field: new_binding(vec![
                with_keys_str(&["tab"]),
                with_help("tab", "next field"),
            ]),
            prev_field: new_binding(vec![
                with_keys_str(&["shift+tab"]),
                with_help("shift+tab", "prev field"),
            ]),
            blur: new_binding(vec![with_keys_str(&["esc"]), with_help("esc", "done editing")]),
            help: new_binding(vec![with_keys_str(&["?"]), with_help("?", "more")]),
            quit: new_binding(vec![
                with_keys_str(&["q", "ctrl+c"]),
                with_help("q", "quit"),
            ]),
        }
    }
}

impl key::KeyMap for KeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.start,
            &self.pause,
            &self.reset,
            &self.lap,
            &self.next_field,
            &self.help,
            &self.quit,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.start, &self.pause, &self.toggle],
            vec![&self.reset, &self.lap],
            vec![&self.next_field, &self.prev_field, &self.blur],
            vec![&self.help, &self.quit],
        ]
    }
}

/// Which settings field has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Neither field; keys go to the controls.
    None,
    /// The initial time field.
    InitialTime,
    /// The step interval field.
    Step,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::None => Focus::InitialTime,
            Focus::InitialTime => Focus::Step,
            Focus::Step => Focus::None,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::None => Focus::Step,
            Focus::InitialTime => Focus::None,
            Focus::Step => Focus::InitialTime,
        }
    }
}

/// Styles for the parts of the view the widget draws itself.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Widget title.
    pub title: Style,
    /// Section headings.
    pub heading: Style,
    /// Lap rows.
    pub lap: Style,
    /// The per-lap split next to each lap.
    pub split: Style,
    /// Message shown when the countdown completes.
    pub finished: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            title: Style::new().bold(true).foreground(Color::from("#7571F9")),
            heading: Style::new().bold(true),
            lap: Style::new(),
            split: Style::new().foreground(Color::from("#626262")),
            finished: Style::new().bold(true).foreground(Color::from("#04B575")),
        }
    }
}

/// The lapwatch widget.
#[derive(Debug)]
pub struct Model {
    /// Heading drawn above the widget.
    pub title: String,
    /// Key bindings.
    pub key_map: KeyMap,
    /// Help line.
    pub help: help::Model,
    /// Progress ring.
    pub ring: progress::Model,
    /// Styles.
    pub styles: Styles,

    countdown: countdown::Model,
    initial_field: field::Model,
    step_field: field::Model,
    focus: Focus,
    finished: bool,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates the widget with zero initial time and a 1 second step.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates the widget from a countdown configuration.
    pub fn with_config(config: Config) -> Self {
        let mut m = Self {
            title: "Stopwatch".to_string(),
            key_map: KeyMap::default(),
            help: help::Model::new(),
            ring: progress::new(&[progress::with_track_color(RING_TRACK.to_string())]),
            styles: Styles::default(),
            countdown: countdown::Model::with_config(config),
            initial_field: field::Model::new("Initial Time (secs)").with_placeholder("0"),
            step_field: field::Model::new("Step Interval (secs)"),
            focus: Focus::None,
            finished: false,
        };
        m.sync_fields();
        m.sync_controls();
        m
    }

    /// Builder form of [`Model::set_initial_time`].
    pub fn with_initial_time(mut self, secs: u64) -> Self {
        self.countdown = self.countdown.with_initial_time(secs);
        self.sync_fields();
        self.sync_controls();
        self
    }

    /// Builder form of [`Model::set_step`].
    pub fn with_step(mut self, step: NonZeroU64) -> Self {
        self.countdown = self.countdown.with_step(step);
        self.sync_fields();
        self
    }

    /// The underlying countdown.
    pub fn countdown(&self) -> &countdown::Model {
        &self.countdown
    }

    /// The initial time field.
    pub fn initial_field(&self) -> &field::Model {
        &self.initial_field
    }

    /// The step interval field.
    pub fn step_field(&self) -> &field::Model {
        &self.step_field
    }

    /// Which field has focus.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Whether the last run reached zero and nothing has happened since.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Moves keyboard focus to a field, or away from both with [`Focus::None`].
    pub fn focus_field(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::None => {
                self.initial_field.blur();
                self.step_field.blur();
            }
            Focus::InitialTime => {
                self.initial_field.focus();
                self.step_field.blur();
            }
            Focus::Step => {
                self.initial_field.blur();
                self.step_field.focus();
            }
        }
    }

    /// Starts the countdown. Returns the first tick, or `None` when there is
    /// no time left or the countdown is already running.
    pub fn start(&mut self) -> Option<Cmd> {
        let cmd = self.countdown.start();
        if cmd.is_some() {
            self.finished = false;
        }
        self.sync_controls();
        cmd
    }

    /// Pauses the countdown, keeping the remaining time.
    pub fn pause(&mut self) {
        self.countdown.pause();
        self.sync_controls();
    }

    /// Pauses when running, otherwise starts.
    pub fn toggle(&mut self) -> Option<Cmd> {
        if self.countdown.running() {
            self.pause();
            None
        } else {
            self.start()
        }
    }

    /// Stops, restores the initial time and clears the laps. The fields show
    /// the restored settings again, dropping any rejected text.
    pub fn reset(&mut self) {
        self.countdown.reset();
        self.finished = false;
        self.sync_fields();
        self.sync_controls();
    }

    /// Records a lap and returns the command that announces it with a
    /// [`LapMsg`].
    pub fn lap(&mut self) -> Cmd {
        let lap = self.countdown.lap();
        countdown::emit(LapMsg {
            id: self.countdown.id(),
            lap,
        })
    }

    /// Sets the initial time (and the remaining time) and updates the field.
    ///
    /// # Errors
    ///
    /// [`InputError::Running`] while the countdown runs.
    pub fn set_initial_time(&mut self, secs: u64) -> Result<(), InputError> {
        self.countdown.set_initial_time(secs)?;
        self.finished = false;
        self.sync_fields();
        self.sync_controls();
        Ok(())
    }

    /// Sets the step and updates the field.
    ///
    /// # Errors
    ///
    /// [`InputError::Running`] while the countdown runs and
    /// [`InputError::ZeroStep`] for zero.
    pub fn set_step(&mut self, secs: u64) -> Result<(), InputError> {
        self.countdown.set_step(secs)?;
        self.sync_fields();
        Ok(())
    }

    /// Handles ticks, completion notices for this countdown and key presses.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if msg.downcast_ref::<TickMsg>().is_some() {
            let cmd = self.countdown.update(msg);
            self.sync_controls();
            return cmd;
        }

        if let Some(complete) = msg.downcast_ref::<CompleteMsg>() {
            if complete.id == self.countdown.id() {
                self.finished = true;
            }
            return None;
        }

        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        self.handle_key(key_msg)
    }

    fn handle_key(&mut self, msg: &KeyMsg) -> Option<Cmd> {
        if self.key_map.quit.matches(msg) {
            return Some(bubbletea_rs::quit());
        }
        if self.key_map.next_field.matches(msg) {
            self.focus_field(self.focus.next());
            return None;
        }
        if self.key_map.prev_field.matches(msg) {
            self.focus_field(self.focus.prev());
            return None;
        }
        if self.key_map.blur.matches(msg) {
            self.focus_field(Focus::None);
            return None;
        }

        if self.focus != Focus::None && field::Model::accepts(msg) {
            let changed = match self.focus {
                Focus::InitialTime => self.initial_field.handle_key(msg),
                Focus::Step => self.step_field.handle_key(msg),
                Focus::None => false,
            };
            if changed {
                self.apply_edit(self.focus);
            }
            return None;
        }

        if self.key_map.start.matches(msg) {
            return self.start();
        }
        if self.key_map.pause.matches(msg) {
            self.pause();
            return None;
        }
        if self.key_map.toggle.matches(msg) {
            return self.toggle();
        }
        if self.key_map.reset.matches(msg) {
            self.reset();
            return None;
        }
        if self.key_map.lap.matches(msg) {
            return Some(self.lap());
        }
        if self.key_map.help.matches(msg) {
            self.help.show_all = !self.help.show_all;
        }
        None
    }

    // Runs the named transition for an edited field. Text that does not
    // parse, or that the countdown rejects, stays in the field with its error.
    fn apply_edit(&mut self, focus: Focus) {
        match focus {
            Focus::InitialTime => {
                let result = self
                    .initial_field
                    .parse()
                    .and_then(|secs| self.countdown.set_initial_time(secs));
                if let Err(err) = &result {
                    warn!(%err, text = self.initial_field.value(), "initial time edit rejected");
                } else {
                    self.finished = false;
                }
                self.initial_field.set_err(result.err());
            }
            Focus::Step => {
                let result = self
                    .step_field
                    .parse()
                    .and_then(|secs| self.countdown.set_step(secs));
                if let Err(err) = &result {
                    warn!(%err, text = self.step_field.value(), "step edit rejected");
                }
                self.step_field.set_err(result.err());
            }
            Focus::None => {}
        }
        self.sync_controls();
    }

    fn sync_fields(&mut self) {
        let config = self.countdown.config();
        let text = if config.initial_time == 0 {
            String::new()
        } else {
            config.initial_time.to_string()
        };
        self.initial_field.set_value(&text);
        self.initial_field.set_err(None);
        self.step_field.set_value(&config.step.to_string());
        self.step_field.set_err(None);
    }

    // Mirrors run state into the controls: settings are frozen while
    // running and only one of start/pause is offered.
    fn sync_controls(&mut self) {
        let running = self.countdown.running();
        if running != self.initial_field.disabled() {
            debug!(running, "settings fields {}", if running { "locked" } else { "unlocked" });
        }
        self.initial_field.set_disabled(running);
        self.step_field.set_disabled(running);
        self.key_map.start.set_enabled(!running);
        self.key_map.pause.set_enabled(running);
        self.ring.set_percent(self.countdown.progress());
    }

    /// Renders the whole widget.
    pub fn view(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        sections.push(self.styles.title.render(&self.title));

        let fields = lipgloss::join_horizontal(
            lipgloss::TOP,
            &[
                self.initial_field.view().as_str(),
                "    ",
                self.step_field.view().as_str(),
            ],
        );
        sections.push(fields);

        sections.push(self.ring.view_with_label(&self.countdown.view()));

        if self.finished {
            sections.push(self.styles.finished.render("Time's up!"));
        }

        let mut laps = vec![self.styles.heading.render("Lap Times")];
        for lap in self.countdown.laps() {
            laps.push(format!(
                "{} {}",
                self.styles
                    .lap
                    .render(&format!("Lap {}: {}", lap.index, clock::format(lap.overall))),
                self.styles
                    .split
                    .render(&format!("(+{})", clock::format(lap.since_lap)))
            ));
        }
        sections.push(laps.join("\n"));

        sections.push(self.help.view(&self.key_map));

        sections.join("\n\n")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(m: &mut Model, code: KeyCode) -> Option<Cmd> {
        m.update(Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn type_text(m: &mut Model, text: &str) {
        for c in text.chars() {
            press(m, KeyCode::Char(c));
        }
    }

    fn tick(m: &mut Model) -> Option<Cmd> {
        let msg = m.countdown().next_tick().expect("countdown should be running");
        m.update(Box::new(msg))
    }

    #[test]
    fn test_new_widget_defaults() {
        let m = Model::new();
        assert_eq!(m.countdown().remaining(), 0);
        assert_eq!(m.countdown().step(), 1);
        assert_eq!(m.initial_field().value(), "");
        assert_eq!(m.step_field().value(), "1");
        assert_eq!(m.focus(), Focus::None);
        assert!(m.key_map.start.enabled());
        assert!(!m.key_map.pause.enabled());
    }

    #[test]
    fn test_typing_initial_time_sets_remaining() {
        let mut m = Model::new();
        press(&mut m, KeyCode::Tab);
        assert_eq!(m.focus(), Focus::InitialTime);
        type_text(&mut m, "10");
        assert_eq!(m.countdown().initial_time(), 10);
        assert_eq!(m.countdown().remaining(), 10);
        assert!(m.initial_field().err().is_none());
    }

    #[test]
    fn test_clearing_initial_time_keeps_last_valid_value() {
        let mut m = Model::new();
        m.focus_field(Focus::InitialTime);
        type_text(&mut m, "7");
        press(&mut m, KeyCode::Backspace);
        assert_eq!(m.initial_field().value(), "");
        assert_eq!(m.initial_field().err(), Some(&InputError::Empty));
        assert_eq!(m.countdown().initial_time(), 7);
    }

    #[test]
    fn test_zero_step_is_rejected_with_message() {
        let mut m = Model::new();
        m.focus_field(Focus::Step);
        press(&mut m, KeyCode::Backspace);
        type_text(&mut m, "0");
        assert_eq!(m.step_field().err(), Some(&InputError::ZeroStep));
        assert_eq!(m.countdown().step(), 1);

        press(&mut m, KeyCode::Backspace);
        type_text(&mut m, "2");
        assert!(m.step_field().err().is_none());
        assert_eq!(m.countdown().step(), 2);
    }

    #[test]
    fn test_action_keys_work_while_a_field_is_focused() {
        let mut m = Model::new().with_initial_time(5);
        m.focus_field(Focus::InitialTime);
        assert!(press(&mut m, KeyCode::Char('s')).is_some());
        assert!(m.countdown().running());
        assert_eq!(m.initial_field().value(), "5");
    }

    #[test]
    fn test_fields_locked_while_running() {
        let mut m = Model::new().with_initial_time(30);
        m.start();
        m.focus_field(Focus::InitialTime);
        type_text(&mut m, "9");
        assert_eq!(m.initial_field().value(), "30");
        assert_eq!(m.countdown().initial_time(), 30);
        assert!(m.initial_field().disabled());
        assert!(m.step_field().disabled());
        assert!(!m.key_map.start.enabled());
        assert!(m.key_map.pause.enabled());
    }

    #[test]
    fn test_start_with_zero_time_does_nothing() {
        let mut m = Model::new();
        assert!(press(&mut m, KeyCode::Char('s')).is_none());
        assert!(press(&mut m, KeyCode::Char(' ')).is_none());
        assert!(!m.countdown().running());
    }

    #[test]
    fn test_scenario_ten_seconds() {
        let mut m = Model::new();
        m.set_initial_time(10).unwrap();
        m.set_step(1).unwrap();
        press(&mut m, KeyCode::Char('s'));
        for _ in 0..3 {
            tick(&mut m);
        }
        assert_eq!(m.countdown().remaining(), 7);
        assert_eq!(m.countdown().percent(), 30.0);

        press(&mut m, KeyCode::Char('p'));
        assert_eq!(m.countdown().remaining(), 7);
        assert!(!m.countdown().running());

        press(&mut m, KeyCode::Char('l'));
        assert_eq!(m.countdown().laps().len(), 1);

        press(&mut m, KeyCode::Char('r'));
        assert_eq!(m.countdown().remaining(), 10);
        assert!(m.countdown().laps().is_empty());
    }

    #[test]
    fn test_completion_unlocks_fields_and_marks_finished() {
        let mut m = Model::new().with_initial_time(2).with_step(NonZeroU64::new(2).unwrap());
        m.start();
        assert!(tick(&mut m).is_some());
        assert!(!m.countdown().running());
        assert!(!m.initial_field().disabled());
        assert!(m.key_map.start.enabled());

        let id = m.countdown().id();
        m.update(Box::new(CompleteMsg { id }));
        assert!(m.finished());
        m.reset();
        assert!(!m.finished());
    }

    #[test]
    fn test_reset_restores_rejected_field_text() {
        let mut m = Model::new().with_initial_time(7);
        m.focus_field(Focus::InitialTime);
        press(&mut m, KeyCode::Backspace);
        assert_eq!(m.initial_field().err(), Some(&InputError::Empty));

        press(&mut m, KeyCode::Char('r'));
        assert_eq!(m.countdown().remaining(), 7);
        assert_eq!(m.initial_field().value(), "7");
        assert!(m.initial_field().err().is_none());
        assert!(!lipgloss::strip_ansi(&m.view()).contains("a value is required"));
    }

    #[test]
    fn test_ring_uses_widget_track_colour() {
        let m = Model::new();
        assert_eq!(m.ring.empty_color, RING_TRACK);
    }

    #[test]
    fn test_lap_key_returns_notice_and_keeps_running() {
        let mut m = Model::new().with_initial_time(10);
        m.start();
        tick(&mut m);
        assert!(press(&mut m, KeyCode::Char('l')).is_some());
        assert!(m.countdown().running());
        assert_eq!(m.countdown().remaining(), 9);
        assert_eq!(m.countdown().laps()[0].overall, 1);
    }

    #[test]
    fn test_quit_key() {
        let mut m = Model::new();
        assert!(press(&mut m, KeyCode::Char('q')).is_some());
    }

    #[test]
    fn test_focus_cycles() {
        let mut m = Model::new();
        press(&mut m, KeyCode::Tab);
        press(&mut m, KeyCode::Tab);
        assert_eq!(m.focus(), Focus::Step);
        press(&mut m, KeyCode::Tab);
        assert_eq!(m.focus(), Focus::None);
        m.update(Box::new(KeyMsg {
            key: KeyCode::BackTab,
            modifiers: KeyModifiers::SHIFT,
        }));
        assert_eq!(m.focus(), Focus::Step);
        press(&mut m, KeyCode::Esc);
        assert_eq!(m.focus(), Focus::None);
        assert!(!m.step_field().focused());
    }

    #[test]
    fn test_view_contains_every_section() {
        let mut m = Model::new().with_initial_time(61);
        m.lap();
        let view = lipgloss::strip_ansi(&m.view());
        assert!(view.contains("Stopwatch"));
        assert!(view.contains("Initial Time (secs)"));
        assert!(view.contains("Step Interval (secs)"));
        assert!(view.contains("00 : 01 : 01"));
        assert!(view.contains("Lap Times"));
        assert!(view.contains("Lap 1: 00 : 00 : 00"));
        assert!(view.contains("s start"));
        assert!(!view.contains("p pause"));
    }
}
