//! Error types for the lapwatch widget.
//!
//! The only failure class in the widget is invalid configuration input: text
//! that cannot become an initial time or a step interval, or an edit attempted
//! while the countdown is running. None of these are fatal; callers keep the
//! last valid value and surface the message.

use thiserror::Error;

/// A rejected edit of the countdown configuration.
///
/// # Examples
///
/// ```rust
/// use bubbletea_lapwatch::error::InputError;
///
/// let err = InputError::NotANumber("abc".to_string());
/// assert_eq!(err.to_string(), "\"abc\" is not a whole number of seconds");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// The field holds no text.
    #[error("a value is required")]
    Empty,

    /// The text is not a non-negative integer.
    #[error("{0:?} is not a whole number of seconds")]
    NotANumber(String),

    /// A step interval of zero seconds would never advance the countdown.
    #[error("step must be at least 1 second")]
    ZeroStep,

    /// Configuration is frozen while the countdown runs.
    #[error("cannot change settings while the timer is running")]
    Running,
}
