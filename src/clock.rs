//! Clock-face formatting for whole seconds.
//!
//! The countdown and the lap list both render durations as `HH : MM : SS`.

/// Renders `secs` as `HH : MM : SS`, each field zero-padded to two digits.
///
/// Hours are not wrapped, so durations of 100 hours or more widen the first
/// field instead of losing information.
///
/// # Examples
///
/// ```rust
/// use bubbletea_lapwatch::clock::format;
///
/// assert_eq!(format(0), "00 : 00 : 00");
/// assert_eq!(format(61), "00 : 01 : 01");
/// assert_eq!(format(3661), "01 : 01 : 01");
/// ```
pub fn format(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02} : {:02} : {:02}", hours, minutes, seconds)
}
