//! Progress indicator for the lapwatch widget.
//!
//! Renders a fraction in `0.0..=1.0` either as a ring (the default) or as a
//! horizontal bar. The ring is drawn on a character grid twice as wide as it
//! is tall, so it looks round in a typical terminal font, and it fills
//! clockwise from 12 o'clock. A label, usually the remaining time, can be
//! centered inside the ring.
//!
//! # Basic Usage
//!
//! ```rust
//! use bubbletea_lapwatch::progress::{new, with_radius, with_solid_fill};
//!
//! let mut ring = new(&[with_radius(4), with_solid_fill("#04B575".to_string())]);
//! ring.set_percent(0.3);
//! let view = ring.view_with_label("00 : 00 : 07");
//! assert!(view.contains("00 : 00 : 07"));
//! ```
//!
//! # Bar Shape
//!
//! ```rust
//! use bubbletea_lapwatch::progress::{new, with_shape, with_width, Shape};
//!
//! let bar = new(&[with_shape(Shape::Bar), with_width(20)]);
//! let half = bar.view_as(0.5, "");
//! assert!(half.contains('█'));
//! ```

use lipgloss_extras::lipgloss::{self, Color, Style};
use std::f64::consts::TAU;
use unicode_width::UnicodeWidthStr;

const DEFAULT_WIDTH: i32 = 40;
const DEFAULT_RADIUS: u16 = 5;
const MIN_RADIUS: u16 = 3;

/// How the progress is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A circle of cells filling clockwise from the top.
    Ring,
    /// A horizontal bar filling left to right.
    Bar,
}

/// Configuration options for [`new`].
///
/// ```rust
/// use bubbletea_lapwatch::progress::{new, with_fill_characters, without_percentage};
///
/// let ring = new(&[with_fill_characters('#', '.'), without_percentage()]);
/// assert_eq!(ring.full, '#');
/// assert!(!ring.show_percentage);
/// ```
pub enum ProgressOption {
    /// Selects ring or bar rendering.
    WithShape(Shape),
    /// Ring radius in rows. Values below 3 are raised to 3.
    WithRadius(u16),
    /// Total bar width in columns, including the percentage.
    WithWidth(i32),
    /// Color of the filled portion.
    WithSolidFill(String),
    /// Color of the unfilled track.
    WithTrackColor(String),
    /// Filled and empty glyphs.
    WithFillCharacters(char, char),
    /// Hides the numeric percentage.
    WithoutPercentage,
}

impl ProgressOption {
    fn apply(&self, m: &mut Model) {
        match self {
            ProgressOption::WithShape(shape) => {
                m.shape = *shape;
                if !m.fill_customized {
                    (m.full, m.empty) = default_glyphs(*shape);
                }
            }
            ProgressOption::WithRadius(r) => m.radius = (*r).max(MIN_RADIUS),
            ProgressOption::WithWidth(w) => m.width = *w,
            ProgressOption::WithSolidFill(color) => m.full_color = color.clone(),
            ProgressOption::WithTrackColor(color) => m.empty_color = color.clone(),
            ProgressOption::WithFillCharacters(full, empty) => {
                m.full = *full;
                m.empty = *empty;
                m.fill_customized = true;
            }
            ProgressOption::WithoutPercentage => m.show_percentage = false,
        }
    }
}

/// Draw as a ring or a bar.
pub fn with_shape(shape: Shape) -> ProgressOption {
    ProgressOption::WithShape(shape)
}

/// Ring radius in rows.
pub fn with_radius(radius: u16) -> ProgressOption {
    ProgressOption::WithRadius(radius)
}

/// Bar width in columns.
pub fn with_width(w: i32) -> ProgressOption {
    ProgressOption::WithWidth(w)
}

/// Solid color for the filled portion.
pub fn with_solid_fill(color: String) -> ProgressOption {
    ProgressOption::WithSolidFill(color)
}

/// Color for the unfilled track.
pub fn with_track_color(color: String) -> ProgressOption {
    ProgressOption::WithTrackColor(color)
}

/// Glyphs for filled and empty cells.
pub fn with_fill_characters(full: char, empty: char) -> ProgressOption {
    ProgressOption::WithFillCharacters(full, empty)
}

/// Hide the percentage.
pub fn without_percentage() -> ProgressOption {
    ProgressOption::WithoutPercentage
}

fn default_glyphs(shape: Shape) -> (char, char) {
    match shape {
        Shape::Ring => ('●', '·'),
        Shape::Bar => ('█', '░'),
    }
}

/// A progress indicator.
#[derive(Debug, Clone)]
pub struct Model {
    /// Ring or bar.
    pub shape: Shape,
    /// Ring radius in rows.
    pub radius: u16,
    /// Total bar width, including the percentage if shown.
    pub width: i32,

    /// Glyph for filled cells.
    pub full: char,
    /// Color of filled cells (hex or ANSI string).
    pub full_color: String,
    /// Glyph for empty cells.
    pub empty: char,
    /// Color of empty cells.
    pub empty_color: String,

    /// Whether to render the numeric percentage.
    pub show_percentage: bool,
    /// Style applied to the percentage.
    pub percentage_style: Style,
    /// Style applied to the label inside the ring.
    pub label_style: Style,

    fill_customized: bool,
    percent: f64,
}

/// Creates a progress indicator at 0% with the given options applied.
///
/// Defaults: ring shape, radius 5, bar width 40, `●`/`·` ring glyphs,
/// purple fill on a gray track, percentage shown.
pub fn new(opts: &[ProgressOption]) -> Model {
    let (full, empty) = default_glyphs(Shape::Ring);
    let mut m = Model {
        shape: Shape::Ring,
        radius: DEFAULT_RADIUS,
        width: DEFAULT_WIDTH,
        full,
        full_color: "#7571F9".to_string(),
        empty,
        empty_color: "#606060".to_string(),
        show_percentage: true,
        percentage_style: Style::new(),
        label_style: Style::new().bold(true),
        fill_customized: false,
        percent: 0.0,
    };

    for opt in opts {
        opt.apply(&mut m);
    }

    m
}

impl Default for Model {
    fn default() -> Self {
        new(&[])
    }
}

impl Model {
    /// Current fraction in `0.0..=1.0`.
    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Sets the fraction, clamped to `0.0..=1.0`. NaN is treated as zero.
    pub fn set_percent(&mut self, p: f64) {
        self.percent = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
    }

    /// Renders at the current fraction with no label.
    pub fn view(&self) -> String {
        self.view_as(self.percent, "")
    }

    /// Renders at the current fraction with `label` in the middle.
    pub fn view_with_label(&self, label: &str) -> String {
        self.view_as(self.percent, label)
    }

    /// Renders at an explicit fraction.
    pub fn view_as(&self, percent: f64, label: &str) -> String {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 1.0)
        };
        match self.shape {
            Shape::Ring => self.ring_view(percent, label),
            Shape::Bar => self.bar_view(percent, label),
        }
    }

    fn percentage_text(&self, percent: f64) -> String {
        format!("{:3.0}%", percent * 100.0)
    }

    fn ring_view(&self, percent: f64, label: &str) -> String {
        let radius = self.radius.max(MIN_RADIUS) as usize;
        let rows = 2 * radius + 1;
        let cols = 4 * radius + 1;
        let cells = ring_cells(radius as u16);
        let filled = (cells.len() as f64 * percent).round() as usize;

        let full = Style::new()
            .foreground(Color::from(self.full_color.as_str()))
            .render(&self.full.to_string());
        let empty = Style::new()
            .foreground(Color::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());

        let mut grid: Vec<Vec<String>> = vec![vec![" ".to_string(); cols]; rows];
        for (i, &(row, col)) in cells.iter().enumerate() {
            grid[row][col] = if i < filled {
                full.clone()
            } else {
                empty.clone()
            };
        }

        // Text rows inside the ring, centered. The interior of the middle
        // row spans every column except the two ring cells at its ends.
        let interior = cols - 2;
        let mut overlays: Vec<(String, usize, &Style)> = Vec::new();
        let mut below: Vec<String> = Vec::new();
        let percentage = self.percentage_text(percent);
        let texts = [
            (label.to_string(), &self.label_style),
            (
                if self.show_percentage {
                    percentage.trim_start().to_string()
                } else {
                    String::new()
                },
                &self.percentage_style,
            ),
        ];
        let mut row = radius;
        for (text, style) in texts.iter() {
            if text.is_empty() {
                continue;
            }
            let w = UnicodeWidthStr::width(text.as_str());
            if w <= interior && row < rows - 1 {
                overlays.push((text.clone(), row, *style));
                row += 1;
            } else {
                below.push(style.render(text));
            }
        }

        let mut lines = Vec::with_capacity(rows + below.len());
        for (r, cells_in_row) in grid.iter().enumerate() {
            match overlays.iter().find(|(_, at, _)| *at == r) {
                Some((text, _, style)) => {
                    let w = UnicodeWidthStr::width(text.as_str());
                    let start = (cols - w) / 2;
                    let mut line: String = cells_in_row[..start].concat();
                    line.push_str(&style.render(text));
                    line.push_str(&cells_in_row[start + w..].concat());
                    lines.push(line);
                }
                None => lines.push(cells_in_row.concat()),
            }
        }
        lines.extend(below);
        lines.join("\n")
    }

    fn bar_view(&self, percent: f64, label: &str) -> String {
        let percent_view = if self.show_percentage {
            self.percentage_style
                .render(&format!(" {}", self.percentage_text(percent)))
        } else {
            String::new()
        };
        let text_width = lipgloss::width_visible(&percent_view) as i32;
        let tw = std::cmp::max(0, self.width - text_width);
        let fw = std::cmp::max(0, std::cmp::min(tw, ((tw as f64) * percent).round() as i32));

        let mut result = String::new();
        if !label.is_empty() {
            result.push_str(&self.label_style.render(label));
            result.push(' ');
        }
        let full = Style::new()
            .foreground(Color::from(self.full_color.as_str()))
            .render(&self.full.to_string());
        result.push_str(&full.repeat(fw as usize));
        let empty = Style::new()
            .foreground(Color::from(self.empty_color.as_str()))
            .render(&self.empty.to_string());
        result.push_str(&empty.repeat((tw - fw) as usize));
        result.push_str(&percent_view);
        result
    }
}

/// Grid positions `(row, col)` of a ring of the given radius, ordered
/// clockwise starting at 12 o'clock.
///
/// The grid is `2 * radius + 1` rows by `4 * radius + 1` columns; columns
/// count half as much as rows when measuring distance.
pub fn ring_cells(radius: u16) -> Vec<(usize, usize)> {
    let r = radius as f64;
    let rows = 2 * radius as usize + 1;
    let cols = 4 * radius as usize + 1;

    let mut cells: Vec<(f64, usize, usize)> = Vec::new();
    for row in 0..rows {
        for col in 0..cols {
            let dx = (col as f64 - 2.0 * r) / 2.0;
            let dy = row as f64 - r;
            let dist = (dx * dx + dy * dy).sqrt();
            if (dist - r).abs() < 0.5 {
                let mut angle = dx.atan2(-dy);
                if angle < 0.0 {
                    angle += TAU;
                }
                cells.push((angle, row, col));
            }
        }
    }

    cells.sort_by(|a, b| a.0.total_cmp(&b.0).then((a.1, a.2).cmp(&(b.1, b.2))));
    cells.into_iter().map(|(_, row, col)| (row, col)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_no_options() {
        let progress = new(&[]);
        assert_eq!(progress.shape, Shape::Ring);
        assert_eq!(progress.radius, DEFAULT_RADIUS);
        assert_eq!(progress.full, '●');
        assert_eq!(progress.empty, '·');
        assert!(progress.show_percentage);
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_bar_shape_switches_glyphs_unless_customized() {
        let bar = new(&[with_shape(Shape::Bar)]);
        assert_eq!((bar.full, bar.empty), ('█', '░'));

        let custom = new(&[with_fill_characters('#', '-'), with_shape(Shape::Bar)]);
        assert_eq!((custom.full, custom.empty), ('#', '-'));
    }

    #[test]
    fn test_radius_has_a_floor() {
        let ring = new(&[with_radius(1)]);
        assert_eq!(ring.radius, MIN_RADIUS);
    }

    #[test]
    fn test_set_percent_clamps() {
        let mut p = new(&[]);
        p.set_percent(1.5);
        assert_eq!(p.percent(), 1.0);
        p.set_percent(-0.2);
        assert_eq!(p.percent(), 0.0);
        p.set_percent(f64::NAN);
        assert_eq!(p.percent(), 0.0);
    }

    #[test]
    fn test_ring_cells_start_at_top_and_go_clockwise() {
        let cells = ring_cells(4);
        assert_eq!(cells[0], (0, 8));

        // The right-most cell of the middle row comes before the bottom,
        // which comes before the left-most cell of the middle row.
        let pos = |cell: (usize, usize)| cells.iter().position(|&c| c == cell).unwrap();
        let right = pos((4, 16));
        let bottom = pos((8, 8));
        let left = pos((4, 0));
        assert!(right < bottom);
        assert!(bottom < left);
    }

    #[test]
    fn test_ring_is_symmetric() {
        let cells = ring_cells(5);
        for &(row, col) in &cells {
            assert!(cells.contains(&(row, 20 - col)));
            assert!(cells.contains(&(10 - row, col)));
        }
    }

    #[test]
    fn test_ring_fill_extremes() {
        let ring = new(&[with_radius(4), without_percentage()]);
        let empty = lipgloss::strip_ansi(&ring.view_as(0.0, ""));
        let full = lipgloss::strip_ansi(&ring.view_as(1.0, ""));
        assert!(!empty.contains('●'));
        assert!(empty.contains('·'));
        assert!(!full.contains('·'));
        assert!(full.contains('●'));
    }

    #[test]
    fn test_ring_half_fill_counts() {
        let ring = new(&[with_radius(4), without_percentage()]);
        let total = ring_cells(4).len();
        let half = lipgloss::strip_ansi(&ring.view_as(0.5, ""));
        let filled = half.chars().filter(|&c| c == '●').count();
        assert_eq!(filled, (total as f64 * 0.5).round() as usize);
    }

    #[test]
    fn test_ring_label_and_percentage_are_centered() {
        let ring = new(&[with_radius(5)]);
        let view = lipgloss::strip_ansi(&ring.view_as(0.3, "00 : 00 : 07"));
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[5].contains("00 : 00 : 07"));
        assert!(lines[6].contains("30%"));
    }

    #[test]
    fn test_wide_label_goes_below_ring() {
        let ring = new(&[with_radius(3), without_percentage()]);
        let label = "a label far too wide for the ring";
        let view = lipgloss::strip_ansi(&ring.view_as(0.0, label));
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[7], label);
    }

    #[test]
    fn test_bar_width_and_extremes() {
        let bar = new(&[with_shape(Shape::Bar), with_width(20)]);
        for p in [0.0, 0.5, 1.0] {
            assert_eq!(lipgloss::width_visible(&bar.view_as(p, "")), 20);
        }
        let empty = lipgloss::strip_ansi(&bar.view_as(0.0, ""));
        let full = lipgloss::strip_ansi(&bar.view_as(1.0, ""));
        assert!(!empty.contains('█'));
        assert!(!full.contains('░'));
        assert!(full.ends_with("100%"));
    }
}
