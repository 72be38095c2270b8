//! Help line generated from key bindings.
//!
//! The compact view lists bindings on one line (`s start • r reset • l lap`).
//! The full view groups them into columns. Disabled bindings are skipped in
//! both, so the help always reflects what the widget will actually accept.
//!
//! ```rust
//! use bubbletea_lapwatch::help::Model;
//! use bubbletea_lapwatch::key::{Binding, KeyMap};
//! use crossterm::event::KeyCode;
//!
//! struct Keys {
//!     lap: Binding,
//!     quit: Binding,
//! }
//!
//! impl KeyMap for Keys {
//!     fn short_help(&self) -> Vec<&Binding> {
//!         vec![&self.lap, &self.quit]
//!     }
//!     fn full_help(&self) -> Vec<Vec<&Binding>> {
//!         vec![vec![&self.lap], vec![&self.quit]]
//!     }
//! }
//!
//! let keys = Keys {
//!     lap: Binding::new(vec![KeyCode::Char('l')]).with_help("l", "lap"),
//!     quit: Binding::new(vec![KeyCode::Char('q')]).with_help("q", "quit"),
//! };
//! let help = Model::new();
//! let line = lipgloss_extras::lipgloss::strip_ansi(&help.view(&keys));
//! assert_eq!(line, "l lap • q quit");
//! ```

use crate::key::{Binding, KeyMap};
use lipgloss_extras::lipgloss::{self, AdaptiveColor, Style};

/// Styles for the help view.
#[derive(Debug, Clone)]
pub struct Styles {
    /// Ellipsis shown when the line is truncated.
    pub ellipsis: Style,
    /// Key label.
    pub key: Style,
    /// Binding description.
    pub desc: Style,
    /// Separator between bindings or columns.
    pub separator: Style,
}

impl Default for Styles {
    fn default() -> Self {
        let key = Style::new().foreground(AdaptiveColor {
            Light: "#909090",
            Dark: "#626262",
        });
        let desc = Style::new().foreground(AdaptiveColor {
            Light: "#B2B2B2",
            Dark: "#4A4A4A",
        });
        let separator = Style::new().foreground(AdaptiveColor {
            Light: "#DDDADA",
            Dark: "#3C3C3C",
        });

        Self {
            ellipsis: separator.clone(),
            key,
            desc,
            separator,
        }
    }
}

/// The help view.
#[derive(Debug, Clone)]
pub struct Model {
    /// Render the full, multi-column help instead of the single line.
    pub show_all: bool,
    /// Maximum width; 0 means unlimited.
    pub width: usize,
    /// Separator between bindings in the short view.
    pub short_separator: String,
    /// Separator between columns in the full view.
    pub full_separator: String,
    /// Shown in place of bindings that do not fit.
    pub ellipsis: String,
    /// Visual styles.
    pub styles: Styles,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            show_all: false,
            width: 0,
            short_separator: " • ".to_string(),
            full_separator: "    ".to_string(),
            ellipsis: "…".to_string(),
            styles: Styles::default(),
        }
    }
}

impl Model {
    /// Creates a help view with default styles and no width limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Renders the short or full help depending on `show_all`.
    pub fn view<K: KeyMap>(&self, keymap: &K) -> String {
        if self.show_all {
            self.full_help_view(keymap.full_help())
        } else {
            self.short_help_view(keymap.short_help())
        }
    }

    /// Renders enabled bindings on one line, truncating to `width`.
    pub fn short_help_view(&self, bindings: Vec<&Binding>) -> String {
        let separator = self.styles.separator.render(&self.short_separator);
        let mut out = String::new();
        let mut total_width = 0;

        for binding in bindings.into_iter().filter(|b| b.enabled()) {
            let sep = if total_width > 0 { separator.as_str() } else { "" };
            let item = format!("{}{}", sep, self.entry(binding));
            let item_width = lipgloss::width_visible(&item);

            if let Some(tail) = self.overflow_tail(total_width, item_width) {
                out.push_str(&tail);
                break;
            }
            total_width += item_width;
            out.push_str(&item);
        }
        out
    }

    /// Renders each group as a column of enabled bindings.
    pub fn full_help_view(&self, groups: Vec<Vec<&Binding>>) -> String {
        let separator = self.styles.separator.render(&self.full_separator);
        let separator_width = lipgloss::width_visible(&separator);
        let mut columns: Vec<String> = Vec::new();
        let mut total_width = 0;

        for group in groups {
            let rows: Vec<String> = group
                .into_iter()
                .filter(|b| b.enabled())
                .map(|b| self.entry(b))
                .collect();
            if rows.is_empty() {
                continue;
            }

            let column = rows.join("\n");
            let column_width = lipgloss::width_visible(&column)
                + if columns.is_empty() { 0 } else { separator_width };
            if let Some(tail) = self.overflow_tail(total_width, column_width) {
                if !tail.is_empty() {
                    columns.push(tail);
                }
                break;
            }
            total_width += column_width;
            columns.push(column);
        }

        let mut parts: Vec<&str> = Vec::with_capacity(columns.len() * 2);
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                parts.push(separator.as_str());
            }
            parts.push(column.as_str());
        }
        lipgloss::join_horizontal(lipgloss::TOP, &parts)
    }

    fn entry(&self, binding: &Binding) -> String {
        let help = binding.help();
        format!(
            "{} {}",
            self.styles.key.render(&help.key),
            self.styles.desc.render(&help.desc)
        )
    }

    // `Some` when an item of `item_width` would overflow. The string is the
    // ellipsis to append, or empty when not even that fits.
    fn overflow_tail(&self, total_width: usize, item_width: usize) -> Option<String> {
        if self.width == 0 || total_width + item_width <= self.width {
            return None;
        }
        let tail = format!(" {}", self.styles.ellipsis.render(&self.ellipsis));
        if total_width + lipgloss::width_visible(&tail) < self.width {
            Some(tail)
        } else {
            Some(String::new())
        }
    }
}
