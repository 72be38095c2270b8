#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-lapwatch/")]

//! # bubbletea-lapwatch
//!
//! A countdown stopwatch for [bubbletea-rs](https://github.com/whit3rabbit/bubbletea-rs)
//! terminal applications. It has start, pause, reset and lap controls, a
//! circular progress indicator and a list of recorded laps.
//!
//! ## Components
//!
//! - [`countdown`]: the timer state machine and its tick schedule
//! - [`widget`]: the full widget with settings fields, ring, laps and help
//! - [`progress`]: ring or bar progress indicator
//! - [`field`]: numeric input used for the settings
//! - [`help`] and [`key`]: key bindings and the help line built from them
//! - [`clock`]: `HH : MM : SS` formatting
//!
//! ## Quick Start
//!
//! ```rust
//! use bubbletea_lapwatch::prelude::*;
//! use bubbletea_rs::{Cmd, Model, Msg};
//!
//! struct App {
//!     lapwatch: TimerWidget,
//! }
//!
//! impl Model for App {
//!     fn init() -> (Self, Option<Cmd>) {
//!         (Self { lapwatch: TimerWidget::new().with_initial_time(60) }, None)
//!     }
//!
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         self.lapwatch.update(msg)
//!     }
//!
//!     fn view(&self) -> String {
//!         self.lapwatch.view()
//!     }
//! }
//! ```
//!
//! ## Driving The Countdown Directly
//!
//! ```rust
//! use bubbletea_lapwatch::Countdown;
//!
//! let mut timer = Countdown::new().with_initial_time(10);
//! let _first_tick = timer.start();
//! assert!(timer.running());
//!
//! let tick = timer.next_tick().unwrap();
//! timer.update(Box::new(tick));
//! assert_eq!(timer.remaining(), 9);
//! assert_eq!(timer.view(), "00 : 00 : 09");
//! ```

pub mod clock;
pub mod countdown;
pub mod error;
pub mod field;
pub mod help;
pub mod key;
pub mod progress;
pub mod widget;

use bubbletea_rs::Cmd;

/// Focus management shared by the focusable components.
///
/// ```rust
/// use bubbletea_lapwatch::prelude::*;
///
/// let mut input = Field::new("Step Interval (secs)");
/// assert!(!input.focused());
///
/// input.focus();
/// assert!(input.focused());
///
/// input.blur();
/// assert!(!input.focused());
/// ```
pub trait Component {
    /// Gives the component keyboard focus. May return a command to run.
    fn focus(&mut self) -> Option<Cmd>;

    /// Takes keyboard focus away.
    fn blur(&mut self);

    /// Whether the component has keyboard focus.
    fn focused(&self) -> bool;
}

pub use countdown::{
    CompleteMsg, Config as CountdownConfig, Lap, LapMsg, Model as Countdown, State, TickMsg,
};
pub use error::InputError;
pub use field::Model as Field;
pub use help::Model as HelpModel;
pub use key::{
    matches, matches_binding, new_binding, with_disabled, with_help, with_keys_str, Binding,
    KeyMap, KeyPress,
};
pub use progress::Model as Progress;
pub use widget::{Focus, KeyMap as TimerKeyMap, Model as TimerWidget};

/// Re-exports for `use bubbletea_lapwatch::prelude::*`.
pub mod prelude {
    pub use crate::countdown::{
        CompleteMsg, Config as CountdownConfig, Lap, LapMsg, Model as Countdown, State, TickMsg,
    };
    pub use crate::error::InputError;
    pub use crate::field::Model as Field;
    pub use crate::help::Model as HelpModel;
    pub use crate::key::{
        matches, matches_binding, new_binding, with_disabled, with_help, with_keys_str, Binding,
        KeyMap, KeyPress,
    };
    pub use crate::progress::Model as Progress;
    pub use crate::widget::{Focus, KeyMap as TimerKeyMap, Model as TimerWidget};
    pub use crate::Component;
}
