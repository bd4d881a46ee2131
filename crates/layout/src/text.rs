//! Text fitting without a text shaper.
//!
//! Headlines pick one of three sizes by character count, and summaries are
//! wrapped by column count using an average glyph advance. Both are estimates
//! on purpose: they keep [`layout`](crate::layout) pure and identical on every
//! machine, and the stylesheet still clamps whatever the browser measures.

use serde::Serialize;

/// Ellipsis appended to a truncated summary.
pub const ELLIPSIS: char = '…';

/// Headline size tier, chosen from the title length alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadlineTier {
    /// Up to 50 characters.
    Large,
    /// 51 to 80 characters.
    Medium,
    /// More than 80 characters.
    Small,
}
impl HeadlineTier {
    pub fn for_title(title: &str) -> Self {
        match title.chars().count() {
            n if n > 80 => Self::Small,
            n if n > 50 => Self::Medium,
            _ => Self::Large,
        }
    }

    /// Font size at the reference canvas width.
    pub fn font_size(&self) -> u32 {
        match self {
            Self::Large => 72,
            Self::Medium => 60,
            Self::Small => 48,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Large => "large",
            Self::Medium => "medium",
            Self::Small => "small",
        }
    }
}

/// Greedy word wrap at `columns` characters per line.
///
/// Whitespace runs collapse to single spaces. Words longer than a whole line
/// are split across lines.
pub fn wrap(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut width = 0;
    for word in text.split_whitespace() {
        let mut rest = word;
        while !rest.is_empty() {
            let length = rest.chars().count();
            let needed = if width == 0 { length } else { width + 1 + length };
            if needed <= columns {
                if width > 0 {
                    line.push(' ');
                }
                line.push_str(rest);
                width = needed;
                break;
            }
            if width > 0 {
                lines.push(std::mem::take(&mut line));
                width = 0;
                continue;
            }
            let split = rest.char_indices().nth(columns).map_or(rest.len(), |(i, _)| i);
            lines.push(rest[..split].to_string());
            rest = &rest[split..];
        }
    }
    if width > 0 {
        lines.push(line);
    }
    lines
}

/// Wraps `text` and keeps at most `max_lines` lines, ending the last kept line
/// with [`ELLIPSIS`] when anything was cut. Returns the lines and whether the
/// text was truncated.
pub fn clamp(text: &str, columns: usize, max_lines: usize) -> (Vec<String>, bool) {
    let mut lines = wrap(text, columns);
    if lines.len() <= max_lines {
        return (lines, false);
    }
    lines.truncate(max_lines);
    if let Some(last) = lines.last_mut() {
        let room = columns.max(1) - 1;
        let kept: String = last.chars().take(room).collect();
        *last = format!("{}{ELLIPSIS}", kept.trim_end());
    }
    (lines, true)
}
