//! Numeric input field for the lapwatch widget.
//!
//! A single-line text input that only accepts ASCII digits from the keyboard.
//! The widget uses two of them, one for the initial time and one for the step
//! interval. A field never hands a value to the countdown on its own; callers
//! run [`Model::parse`] after each edit and decide what to do with the result.
//!
//! ```rust
//! use bubbletea_lapwatch::field::Model;
//! use bubbletea_lapwatch::Component;
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let mut field = Model::new("Initial Time (secs)");
//! field.focus();
//! field.handle_key(&KeyMsg { key: KeyCode::Char('4'), modifiers: KeyModifiers::NONE });
//! field.handle_key(&KeyMsg { key: KeyCode::Char('2'), modifiers: KeyModifiers::NONE });
//! assert_eq!(field.parse(), Ok(42));
//! ```

use crate::error::InputError;
use crate::Component;
use bubbletea_rs::{Cmd, KeyMsg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::lipgloss::{Color, Style};

/// Longest accepted input. Nine digits is over thirty years in seconds and
/// keeps every value far from `u64` overflow.
pub const DEFAULT_CHAR_LIMIT: usize = 9;

/// Visual styles for a field.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Label above the input line.
    pub label: Style,
    /// Prompt before the text.
    pub prompt: Style,
    /// Entered text.
    pub text: Style,
    /// Placeholder shown when empty.
    pub placeholder: Style,
    /// Character under the cursor.
    pub cursor: Style,
    /// Validation message.
    pub error: Style,
    /// Text of a disabled field.
    pub disabled: Style,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            label: Style::new().bold(true),
            prompt: Style::new().foreground(Color::from("#7571F9")),
            text: Style::new(),
            placeholder: Style::new().foreground(Color::from("#626262")),
            cursor: Style::new().reverse(true),
            error: Style::new().foreground(Color::from("#FF5F87")),
            disabled: Style::new().foreground(Color::from("#4A4A4A")),
        }
    }
}

/// A numeric text field.
#[derive(Debug, Clone)]
pub struct Model {
    /// Label rendered above the input.
    pub label: String,
    /// Prompt rendered before the text.
    pub prompt: String,
    /// Text shown when the field is empty.
    pub placeholder: String,
    /// Maximum number of digits.
    pub char_limit: usize,
    /// Visual styles.
    pub styles: Styles,

    value: String,
    pos: usize,
    focus: bool,
    disabled: bool,
    err: Option<InputError>,
}

impl Model {
    /// Creates an empty, blurred, enabled field with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            prompt: "> ".to_string(),
            placeholder: String::new(),
            char_limit: DEFAULT_CHAR_LIMIT,
            styles: Styles::default(),
            value: String::new(),
            pos: 0,
            focus: false,
            disabled: false,
            err: None,
        }
    }

    /// Sets the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the initial text.
    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the text and moves the cursor to the end. The text is taken as
    /// given, so [`Model::parse`] may reject it.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.pos = self.value.chars().count();
    }

    /// Cursor position in characters.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor, clamped to the text.
    pub fn set_cursor(&mut self, pos: usize) {
        self.pos = pos.min(self.value.chars().count());
    }

    /// Whether the field rejects edits.
    pub fn disabled(&self) -> bool {
        self.disabled
    }

    /// Enables or disables editing.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Last validation error, if any.
    pub fn err(&self) -> Option<&InputError> {
        self.err.as_ref()
    }

    /// Records a validation error for display, or clears it with `None`.
    pub fn set_err(&mut self, err: Option<InputError>) {
        self.err = err;
    }

    /// Parses the text as whole seconds.
    ///
    /// # Errors
    ///
    /// [`InputError::Empty`] for blank text and [`InputError::NotANumber`]
    /// for anything that is not a non-negative integer.
    pub fn parse(&self) -> Result<u64, InputError> {
        let text = self.value.trim();
        if text.is_empty() {
            return Err(InputError::Empty);
        }
        text.parse::<u64>()
            .map_err(|_| InputError::NotANumber(text.to_string()))
    }

    /// Applies an editing key. Returns whether the text changed.
    ///
    /// Blurred and disabled fields ignore every key.
    pub fn handle_key(&mut self, msg: &KeyMsg) -> bool {
        if !self.focus || self.disabled {
            return false;
        }
        if msg.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }

        match msg.key {
            KeyCode::Char(c) if c.is_ascii_digit() => self.insert(c),
            KeyCode::Backspace => self.delete_before_cursor(),
            KeyCode::Delete => self.delete_at_cursor(),
            KeyCode::Left => {
                self.pos = self.pos.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.set_cursor(self.pos + 1);
                false
            }
            KeyCode::Home => {
                self.pos = 0;
                false
            }
            KeyCode::End => {
                self.pos = self.value.chars().count();
                false
            }
            _ => false,
        }
    }

    /// Reports whether `msg` is a key this field would consume when focused.
    pub fn accepts(msg: &KeyMsg) -> bool {
        if msg.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match msg.key {
            KeyCode::Char(c) => c.is_ascii_digit(),
            KeyCode::Backspace
            | KeyCode::Delete
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Home
            | KeyCode::End => true,
            _ => false,
        }
    }

    /// Renders the label, the input line and any validation message.
    pub fn view(&self) -> String {
        let mut out = self.styles.label.render(&self.label);
        out.push('\n');
        out.push_str(&self.styles.prompt.render(&self.prompt));
        out.push_str(&self.input_view());
        if let Some(err) = &self.err {
            out.push('\n');
            out.push_str(&self.styles.error.render(&err.to_string()));
        }
        out
    }

    fn input_view(&self) -> String {
        if self.disabled {
            let text = if self.value.is_empty() {
                &self.placeholder
            } else {
                &self.value
            };
            return self.styles.disabled.render(text);
        }

        if self.value.is_empty() {
            if !self.focus {
                return self.styles.placeholder.render(&self.placeholder);
            }
            let mut chars = self.placeholder.chars();
            let first = chars.next().map_or(" ".to_string(), |c| c.to_string());
            let rest: String = chars.collect();
            return format!(
                "{}{}",
                self.styles.cursor.render(&first),
                self.styles.placeholder.render(&rest)
            );
        }

        if !self.focus {
            return self.styles.text.render(&self.value);
        }

        let chars: Vec<char> = self.value.chars().collect();
        let before: String = chars[..self.pos].iter().collect();
        let at = chars.get(self.pos).map_or(" ".to_string(), |c| c.to_string());
        let after: String = chars.get(self.pos + 1..).map_or(String::new(), |s| s.iter().collect());
        format!(
            "{}{}{}",
            self.styles.text.render(&before),
            self.styles.cursor.render(&at),
            self.styles.text.render(&after)
        )
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_pos)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) -> bool {
        if self.value.chars().count() >= self.char_limit {
            return false;
        }
        let at = self.byte_index(self.pos);
        self.value.insert(at, c);
        self.pos += 1;
        true
    }

    fn delete_before_cursor(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        let at = self.byte_index(self.pos);
        self.value.remove(at);
        true
    }

    fn delete_at_cursor(&mut self) -> bool {
        if self.pos >= self.value.chars().count() {
            return false;
        }
        let at = self.byte_index(self.pos);
        self.value.remove(at);
        true
    }
}

impl Component for Model {
    fn focus(&mut self) -> Option<Cmd> {
        self.focus = true;
        None
    }

    fn blur(&mut self) {
        self.focus = false;
    }

    fn focused(&self) -> bool {
        self.focus
    }
}
