//! Display tree → screen rows.
//!
//! The tree is flattened in document order into visual rows of styled runs, soft-wrapped at
//! the given column width. Roles come from element classes via a caller-supplied table so
//! this crate stays ignorant of which classes the search engine or loader use.
//!
//! Invariants:
//! * A grapheme cluster is never split across rows.
//! * `'\n'` inside text and `LineBreak` nodes end the current row.
//! * Block elements start on a fresh row and the following content does too.
//! * Every element gets an anchor: the row its first grapheme landed on (or the row that was
//!   current when it closed, for empty elements).
//! * Control characters other than `'\n'` are rendered as a single space.

use core_dom::{Dom, NodeId, NodeKind};
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Presentation role of a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Plain,
    Highlight,
    Active,
    Error,
}

/// Ordered `(class, role)` pairs; the first class an element carries wins.
pub type ClassRoles<'a> = &'a [(&'a str, Role)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub runs: Vec<Run>,
    pub width: u16,
}

impl Row {
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Plain text of the row (tests, diagnostics).
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn push(&mut self, cluster: &str, width: u16, role: Role) {
        match self.runs.last_mut() {
            Some(run) if run.role == role => run.text.push_str(cluster),
            _ => self.runs.push(Run {
                text: cluster.to_string(),
                role,
            }),
        }
        self.width = self.width.saturating_add(width);
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    rows: Vec<Row>,
    anchors: HashMap<NodeId, usize>,
    width: u16,
}

/// Display width of one grapheme cluster as laid out (control clusters count as a space).
pub fn cluster_width(g: &str) -> u16 {
    if g.chars().any(char::is_control) {
        return 1;
    }
    u16::try_from(UnicodeWidthStr::width(g)).unwrap_or(u16::MAX)
}

enum Visit {
    Enter(NodeId, Role),
    LeaveBlock,
}

struct Builder {
    rows: Vec<Row>,
    anchors: HashMap<NodeId, usize>,
    pending: Vec<NodeId>,
    width: u16,
}

impl Builder {
    fn current(&mut self) -> &mut Row {
        if self.rows.is_empty() {
            self.rows.push(Row::default());
        }
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    fn break_row(&mut self) {
        self.current();
        self.rows.push(Row::default());
    }

    fn break_if_dirty(&mut self) {
        if self.rows.last().is_some_and(|r| !r.is_empty()) {
            self.break_row();
        }
    }

    fn settle_anchors(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let row = self.rows.len().saturating_sub(1);
        for id in self.pending.drain(..) {
            self.anchors.insert(id, row);
        }
    }

    fn place(&mut self, cluster: &str, role: Role) {
        let w = cluster_width(cluster);
        let limit = self.width;
        let row = self.current();
        if row.width > 0 && row.width.saturating_add(w) > limit {
            self.break_row();
        }
        self.settle_anchors();
        if cluster.chars().any(char::is_control) {
            self.current().push(" ", 1, role);
        } else {
            self.current().push(cluster, w, role);
        }
    }

    fn text(&mut self, text: &str, role: Role) {
        let mut lines = text.split('\n');
        if let Some(first) = lines.next() {
            for g in first.graphemes(true) {
                self.place(g, role);
            }
        }
        for line in lines {
            self.settle_anchors();
            self.break_row();
            for g in line.graphemes(true) {
                self.place(g, role);
            }
        }
    }
}

impl Layout {
    /// Lay out the subtree under `root` for a viewport `width` columns wide.
    pub fn build(dom: &Dom, root: NodeId, roles: ClassRoles<'_>, width: u16) -> Self {
        let mut b = Builder {
            rows: Vec::new(),
            anchors: HashMap::new(),
            pending: Vec::new(),
            width: width.max(1),
        };
        let mut stack = vec![Visit::Enter(root, Role::Plain)];
        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(id, inherited) => match dom.kind(id) {
                    Some(NodeKind::Text(t)) => b.text(t, inherited),
                    Some(NodeKind::LineBreak) => {
                        b.settle_anchors();
                        b.break_row();
                    }
                    Some(NodeKind::Element(el)) => {
                        let role = roles
                            .iter()
                            .find(|(class, _)| el.has_class(class))
                            .map_or(inherited, |&(_, role)| role);
                        if el.tag.is_block() {
                            b.break_if_dirty();
                            stack.push(Visit::LeaveBlock);
                        }
                        b.pending.push(id);
                        for &child in dom.children(id).iter().rev() {
                            stack.push(Visit::Enter(child, role));
                        }
                    }
                    Some(NodeKind::Comment(_)) | None => {}
                },
                Visit::LeaveBlock => {
                    b.settle_anchors();
                    b.break_if_dirty();
                }
            }
        }
        b.settle_anchors();
        // A trailing break leaves one empty row behind; keep it only when it is the sole row.
        if b.rows.len() > 1 && b.rows.last().is_some_and(Row::is_empty) {
            b.rows.pop();
        }
        Self {
            rows: b.rows,
            anchors: b.anchors,
            width: b.width,
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// Row an element starts on.
    pub fn anchor(&self, id: NodeId) -> Option<usize> {
        self.anchors.get(&id).copied()
    }
}
