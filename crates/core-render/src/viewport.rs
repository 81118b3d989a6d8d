//! Vertical window into the laid-out rows.
//!
//! * `first_line` is the index of the topmost layout row on screen.
//! * `height` is the number of screen rows available for content (the search bar and
//!   notice line are managed by the caller).
//! * After any operation `first_line` never points past the last full page, so the end of
//!   the text sits on the bottom row instead of leaving blank space below it.

use core_config::RevealAlign;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub first_line: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(first_line: usize, height: usize) -> Self {
        Self { first_line, height }
    }

    fn max_first(&self, total: usize) -> usize {
        total.saturating_sub(self.height)
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.first_line && line < self.first_line + self.height
    }

    /// Keep `first_line` inside `[0, total - height]`.
    pub fn clamp(&mut self, total: usize) {
        self.first_line = self.first_line.min(self.max_first(total));
    }

    /// Scroll so `line` is visible. `Center` always recenters; `Nearest` moves only as far as
    /// needed to leave `margin` rows of context on the near side. Returns whether
    /// `first_line` changed.
    pub fn reveal(&mut self, line: usize, align: RevealAlign, margin: usize, total: usize) -> bool {
        let before = self.first_line;
        if self.height == 0 {
            return false;
        }
        match align {
            RevealAlign::Center => {
                self.first_line = line.saturating_sub(self.height / 2);
            }
            RevealAlign::Nearest => {
                let margin = margin.min(self.height.saturating_sub(1) / 2);
                if line < self.first_line + margin {
                    self.first_line = line.saturating_sub(margin);
                } else if line + margin >= self.first_line + self.height {
                    self.first_line = line + margin + 1 - self.height;
                }
            }
        }
        self.clamp(total);
        self.first_line != before
    }

    pub fn scroll_by(&mut self, delta: isize, total: usize) {
        self.first_line = self.first_line.saturating_add_signed(delta);
        self.clamp(total);
    }

    pub fn page_down(&mut self, total: usize) {
        let step = self.height.saturating_sub(1).max(1);
        self.scroll_by(step as isize, total);
    }

    pub fn page_up(&mut self, total: usize) {
        let step = self.height.saturating_sub(1).max(1);
        self.scroll_by(-(step as isize), total);
    }

    pub fn resize(&mut self, height: usize, total: usize) {
        self.height = height;
        self.clamp(total);
    }
}
