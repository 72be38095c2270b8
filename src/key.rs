//! Key bindings for the lapwatch widget.
//!
//! A [`Binding`] pairs one or more key presses with the help text shown for
//! them. Bindings can be disabled, which both stops them from matching and
//! hides them from the help view. This is how the widget shows either
//! "start" or "pause", never both.
//!
//! ```rust
//! use bubbletea_lapwatch::key::{matches_binding, new_binding, with_help, with_keys_str};
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let lap = new_binding(vec![with_keys_str(&["l"]), with_help("l", "lap")]);
//! let msg = KeyMsg { key: KeyCode::Char('l'), modifiers: KeyModifiers::NONE };
//! assert!(matches_binding(&msg, &lap));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key press: a key code plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key that was pressed.
    pub code: KeyCode,
    /// Modifiers held during the press.
    pub mods: KeyModifiers,
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, mods): (KeyCode, KeyModifiers)) -> Self {
        Self { code, mods }
    }
}

impl KeyPress {
    // Terminals report shifted characters and back-tab with SHIFT set, but the
    // code already encodes the shift, so it is ignored for those keys.
    fn normalized_mods(code: KeyCode, mods: KeyModifiers) -> KeyModifiers {
        match code {
            KeyCode::Char(_) | KeyCode::BackTab => mods.difference(KeyModifiers::SHIFT),
            _ => mods,
        }
    }

    fn matches(&self, msg: &KeyMsg) -> bool {
        self.code == msg.key
            && Self::normalized_mods(self.code, self.mods)
                == Self::normalized_mods(msg.key, msg.modifiers)
    }
}

/// Help text for a binding, rendered as `key desc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short label for the keys, e.g. `"space"`.
    pub key: String,
    /// What the binding does, e.g. `"start/pause"`.
    pub desc: String,
}

/// A set of key presses that trigger one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates an enabled binding for `keys` with no help text.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help text.
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// The key presses this binding responds to.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// The help text for this binding.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Whether the binding is active. A binding without keys is never enabled.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding in place.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Reports whether `msg` triggers this binding.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled() && self.keys.iter().any(|k| k.matches(msg))
    }
}

/// Option applied by [`new_binding`].
#[derive(Debug, Clone)]
pub enum BindingOpt {
    /// Replace the key presses.
    Keys(Vec<KeyPress>),
    /// Set the help text (`key`, `desc`).
    Help(String, String),
    /// Start disabled.
    Disabled,
}

/// Builds a binding from a list of options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        match opt {
            BindingOpt::Keys(keys) => binding.keys = keys,
            BindingOpt::Help(key, desc) => binding.help = Help { key, desc },
            BindingOpt::Disabled => binding.disabled = true,
        }
    }
    binding
}

/// Key presses given as strings such as `"q"`, `"ctrl+c"`, `"space"`,
/// `"shift+tab"`. Unknown names are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    BindingOpt::Keys(keys.iter().filter_map(|k| parse_key_str(k)).collect())
}

/// Help text for a binding.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    BindingOpt::Help(key.to_string(), desc.to_string())
}

/// Marks a binding as initially disabled.
pub fn with_disabled() -> BindingOpt {
    BindingOpt::Disabled
}

/// Reports whether `msg` triggers `binding`.
pub fn matches_binding(msg: &KeyMsg, binding: &Binding) -> bool {
    binding.matches(msg)
}

/// Reports whether `msg` triggers any of `bindings`.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

fn parse_key_str(s: &str) -> Option<KeyPress> {
    let mut mods = KeyModifiers::NONE;
    let mut rest = s;
    loop {
        if let Some(r) = rest.strip_prefix("ctrl+") {
            mods |= KeyModifiers::CONTROL;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("alt+") {
            mods |= KeyModifiers::ALT;
            rest = r;
        } else if let Some(r) = rest.strip_prefix("shift+") {
            mods |= KeyModifiers::SHIFT;
            rest = r;
        } else {
            break;
        }
    }

    let code = match rest {
        "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "tab" if mods.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "space" | " " => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };

    Some(KeyPress { code, mods })
}

/// Key bindings a component exposes to the help view.
pub trait KeyMap {
    /// Bindings for the single-line help.
    fn short_help(&self) -> Vec<&Binding>;
    /// Bindings grouped into columns for the expanded help.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers,
        }
    }

    #[test]
    fn test_parse_key_strings() {
        assert_eq!(
            parse_key_str("ctrl+c"),
            Some(KeyPress {
                code: KeyCode::Char('c'),
                mods: KeyModifiers::CONTROL
            })
        );
        assert_eq!(parse_key_str("space"), Some(KeyCode::Char(' ').into()));
        assert_eq!(
            parse_key_str("shift+tab").map(|k| k.code),
            Some(KeyCode::BackTab)
        );
        assert_eq!(parse_key_str("bogus"), None);
    }

    #[test]
    fn test_binding_matches_with_modifiers() {
        let quit = new_binding(vec![with_keys_str(&["q", "ctrl+c"])]);
        assert!(quit.matches(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(quit.matches(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!quit.matches(&key(KeyCode::Char('c'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_shift_is_ignored_for_back_tab() {
        let prev = new_binding(vec![with_keys_str(&["shift+tab"])]);
        assert!(prev.matches(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert!(prev.matches(&key(KeyCode::BackTab, KeyModifiers::NONE)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut start = new_binding(vec![with_keys_str(&["s"]), with_disabled()]);
        let msg = key(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(!start.enabled());
        assert!(!matches_binding(&msg, &start));

        start.set_enabled(true);
        assert!(matches(&msg, &[&start]));
    }

    #[test]
    fn test_binding_without_keys_is_disabled() {
        let empty = Binding::new(Vec::<KeyCode>::new()).with_help("x", "nothing");
        assert!(!empty.enabled());
        assert_eq!(empty.help().desc, "nothing");
    }
}
