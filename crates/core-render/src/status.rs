//! Search bar composition.
//!
//! The bar occupies the row below the content:
//! `Search: <input>` on the left and `< > c/t` right-aligned. The `< >` affordances are
//! present only while navigation is visible; the counter always shows (`0/0` when empty).
//! A notice, when active, owns the row under the bar.
//!
//! Two stages as before: `compose_status` yields ordered segments, `format_status` fits them
//! into a row of a given width. When the row is too narrow the input is shortened from the
//! left so its end (where typing happens) stays visible.

use crate::layout::cluster_width;
use unicode_segmentation::UnicodeSegmentation;

pub const PROMPT: &str = "Search: ";
pub const NAV_AFFORDANCE: &str = "< >";

pub struct StatusContext<'a> {
    pub input: &'a str,
    /// Pre-formatted counter text (`current/total`).
    pub counter: &'a str,
    pub nav_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    Prompt,
    Input(&'a str),
    Nav,
    Counter(&'a str),
}

pub fn compose_status<'a>(ctx: &StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    let mut out = Vec::with_capacity(4);
    out.push(StatusSegment::Prompt);
    out.push(StatusSegment::Input(ctx.input));
    if ctx.nav_visible {
        out.push(StatusSegment::Nav);
    }
    out.push(StatusSegment::Counter(ctx.counter));
    out
}

/// Formatted bar plus the column the input caret sits at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub caret_col: u16,
}

pub fn str_width(s: &str) -> u16 {
    s.graphemes(true)
        .fold(0u16, |acc, g| acc.saturating_add(cluster_width(g)))
}

/// Longest suffix of `s` no wider than `max` columns.
fn tail_within(s: &str, max: u16) -> &str {
    let mut used = 0u16;
    let mut start = s.len();
    for (idx, g) in s.grapheme_indices(true).rev() {
        let w = cluster_width(g);
        if used.saturating_add(w) > max {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}

/// Longest prefix of `s` no wider than `max` columns.
pub fn head_within(s: &str, max: u16) -> &str {
    let mut used = 0u16;
    let mut end = 0;
    for (idx, g) in s.grapheme_indices(true) {
        let w = cluster_width(g);
        if used.saturating_add(w) > max {
            break;
        }
        used += w;
        end = idx + g.len();
    }
    &s[..end]
}

pub fn format_status(segments: &[StatusSegment<'_>], width: u16) -> StatusLine {
    let mut left_prefix = String::new();
    let mut input = "";
    let mut right = String::new();
    for seg in segments {
        match seg {
            StatusSegment::Prompt => left_prefix.push_str(PROMPT),
            StatusSegment::Input(s) => input = s,
            StatusSegment::Nav => {
                right.push_str(NAV_AFFORDANCE);
                right.push(' ');
            }
            StatusSegment::Counter(c) => right.push_str(c),
        }
    }
    let right_w = str_width(&right);
    let prefix_w = str_width(&left_prefix);
    // One column gap between input and the right block, one for the caret.
    let room = width.saturating_sub(prefix_w + right_w + 2);
    let shown = tail_within(input, room);
    let shown_w = str_width(shown);

    let mut text = String::with_capacity(width as usize + 8);
    text.push_str(head_within(&left_prefix, width));
    text.push_str(shown);
    let caret_col = (prefix_w + shown_w).min(width.saturating_sub(1));
    let used = str_width(&text);
    if used + right_w < width {
        text.extend(std::iter::repeat_n(' ', (width - used - right_w) as usize));
        text.push_str(&right);
    }
    StatusLine { text, caret_col }
}

pub fn build_status(ctx: &StatusContext<'_>, width: u16) -> StatusLine {
    format_status(&compose_status(ctx), width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_state_shows_counter_only() {
        let ctx = StatusContext {
            input: "",
            counter: "0/0",
            nav_visible: false,
        };
        let segs = compose_status(&ctx);
        assert!(!segs.contains(&StatusSegment::Nav));
        let line = format_status(&segs, 20);
        assert_eq!(line.text, "Search:          0/0");
        assert_eq!(line.caret_col, 8);
    }

    #[test]
    fn nav_visible_with_matches() {
        let ctx = StatusContext {
            input: "grace",
            counter: "1/3",
            nav_visible: true,
        };
        let line = build_status(&ctx, 24);
        assert_eq!(line.text, "Search: grace    < > 1/3");
        assert_eq!(line.caret_col, 13);
    }

    #[test]
    fn long_input_keeps_its_tail() {
        let ctx = StatusContext {
            input: "amazing grace how sweet",
            counter: "0/0",
            nav_visible: false,
        };
        let line = build_status(&ctx, 20);
        // 20 - 8 prompt - 3 counter - 2 = 7 columns of input
        assert_eq!(line.text, "Search: w sweet  0/0");
        assert_eq!(line.caret_col, 15);
    }

    #[test]
    fn wide_input_is_measured_in_columns() {
        let ctx = StatusContext {
            input: "恩典",
            counter: "1/1",
            nav_visible: true,
        };
        let line = build_status(&ctx, 22);
        assert_eq!(line.caret_col, 12);
        assert_eq!(str_width(&line.text), 22);
    }

    #[test]
    fn narrow_row_drops_right_block() {
        let ctx = StatusContext {
            input: "",
            counter: "12/345",
            nav_visible: true,
        };
        let line = build_status(&ctx, 6);
        assert_eq!(line.text, "Search");
        assert_eq!(line.caret_col, 5);
    }
}
