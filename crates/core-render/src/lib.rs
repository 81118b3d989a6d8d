//! Terminal presentation of the hymnal page.
//!
//! Pipeline per frame:
//! 1. `layout::Layout::build` flattens the display tree into wrapped rows of styled runs and
//!    records which row every element starts on (used to reveal the active marker).
//! 2. `viewport::Viewport` picks the window of rows on screen.
//! 3. `paint` emits the visible rows, the search bar and the notice line through
//!    `writer::Writer`, which flushes once.
//!
//! Screen layout (top to bottom): content rows, search bar, notice line. The two bottom rows
//! are `CHROME_ROWS`; a terminal shorter than that shows only what fits, bar first.
//!
//! Full repaint every frame: the page is small and only changes on user input or load.

pub mod layout;
pub mod status;
pub mod style;
pub mod terminal;
pub mod viewport;
pub mod writer;

pub use layout::{ClassRoles, Layout, Role, Row, Run};
pub use status::{StatusContext, StatusLine, build_status};
pub use style::{Attrs, Style};
pub use terminal::{CrosstermBackend, TerminalBackend, TerminalGuard};
pub use viewport::Viewport;
pub use writer::{Command, Writer};

use std::time::Instant;
use tracing::trace;

/// Rows below the content: search bar and notice line.
pub const CHROME_ROWS: u16 = 2;

/// Everything one frame needs.
pub struct PageFrame<'a> {
    pub layout: &'a Layout,
    pub viewport: &'a Viewport,
    pub status: StatusContext<'a>,
    pub notice: Option<&'a str>,
    /// `(columns, rows)` of the terminal.
    pub size: (u16, u16),
}

/// Number of content rows for a terminal `rows` tall.
pub fn text_rows(rows: u16) -> u16 {
    rows.saturating_sub(CHROME_ROWS)
}

fn paint_row(w: &mut Writer, row: &Row, width: u16) {
    let mut used = 0u16;
    for run in &row.runs {
        if used >= width {
            break;
        }
        let text = status::head_within(&run.text, width - used);
        let style = Style::for_role(run.role);
        w.set_style(style);
        w.print(text);
        used += status::str_width(text);
    }
    w.reset_style();
}

pub fn paint(frame: &PageFrame<'_>, w: &mut Writer) {
    let started = Instant::now();
    let (cols, rows) = frame.size;
    let content_rows = text_rows(rows);
    w.hide_cursor();

    let first = frame.viewport.first_line;
    for y in 0..content_rows {
        w.move_to(0, y);
        w.reset_style();
        if let Some(row) = frame.layout.rows().get(first + y as usize) {
            paint_row(w, row, cols);
        }
        w.clear_line();
    }

    let line = build_status(&frame.status, cols);
    if rows > content_rows {
        w.move_to(0, content_rows);
        w.set_style(Style::bar());
        w.print(line.text);
        w.clear_line();
        w.reset_style();
    }
    if rows > content_rows + 1 {
        w.move_to(0, content_rows + 1);
        if let Some(notice) = frame.notice {
            w.set_style(Style::for_role(Role::Error));
            w.print(status::head_within(notice, cols));
            w.reset_style();
        }
        w.clear_line();
    }
    if rows > content_rows {
        w.show_cursor_at(line.caret_col, content_rows);
    }
    trace!(
        target: "render",
        content_rows,
        first_line = first,
        total_rows = frame.layout.row_count(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "frame_painted"
    );
}
