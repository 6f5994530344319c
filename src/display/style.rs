//! Terminal styling helpers shared by the renderer and the CLI

use colored::*;

pub const BOX_WIDTH: usize = 58;

pub fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
pub fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
pub fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
pub fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
pub fn fail(s: &str) -> ColoredString   { s.truecolor(240, 90, 90) }

/// Pushes the prediction up
pub fn positive(s: &str) -> ColoredString { s.truecolor(255, 0, 82) }
/// Pushes the prediction down
pub fn negative(s: &str) -> ColoredString { s.truecolor(0, 138, 250) }

/// Blue for low feature values through red for high ones; `t` in `[0, 1]`
pub fn gradient(s: &str, t: f64) -> ColoredString {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    s.truecolor(lerp(0, 255), lerp(138, 0), lerp(250, 82))
}

pub fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

/// Visible width in characters, ignoring color codes
pub fn visible_len(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

pub fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

pub fn box_top() -> String    { format!("  {}", dim(&format!("┌{}┐", "─".repeat(BOX_WIDTH - 1)))) }
pub fn box_bottom() -> String { format!("  {}", dim(&format!("└{}┘", "─".repeat(BOX_WIDTH - 1)))) }
pub fn box_sep() -> String    { format!("  {}", dim(&format!("├{}┤", "─".repeat(BOX_WIDTH - 1)))) }

pub fn box_line(content: &str) -> String {
    let pad = BOX_WIDTH.saturating_sub(visible_len(content) + 2);
    format!("  {}  {}{}{}", dim("│"), content, " ".repeat(pad), dim("│"))
}

pub fn box_center(content: &str) -> String {
    let total_pad = BOX_WIDTH.saturating_sub(visible_len(content) + 2);
    let left = total_pad / 2;
    let right = total_pad - left;
    format!("  {}  {}{}{}{}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"))
}

pub fn section(title: &str) -> String {
    format!("\n  {}\n  {}", title.white().bold(), dim(&"─".repeat(56)))
}

/// Right-pad to `width` visible characters
pub fn pad_right(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_len(s));
    format!("{}{}", s, " ".repeat(pad))
}

/// Left-pad to `width` visible characters
pub fn pad_left(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_len(s));
    format!("{}{}", " ".repeat(pad), s)
}

/// Cut to at most `max` characters, marking the cut with an ellipsis
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}
