//! The page-side collaborator the engine reports to.

use core_dom::NodeId;
use std::fmt;

/// Counter readout: `current/total`, 1-based. `0/0` is the empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchCounter {
    pub current: usize,
    pub total: usize,
}

impl MatchCounter {
    pub const fn empty() -> Self {
        Self {
            current: 0,
            total: 0,
        }
    }

    /// Counter for a 0-based cursor.
    pub const fn at(cursor: usize, total: usize) -> Self {
        Self {
            current: cursor + 1,
            total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl fmt::Display for MatchCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

/// Non-blocking user notices raised by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoMatch { term: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoMatch { term } => write!(f, "No matches for \u{201c}{term}\u{201d}"),
        }
    }
}

/// Implemented by the page layer. Calls arrive synchronously from inside engine operations.
pub trait SearchView {
    fn update_counter(&mut self, counter: MatchCounter);
    /// Previous/next controls are shown only while at least one match exists.
    fn set_navigation_visible(&mut self, visible: bool);
    fn notify(&mut self, notice: Notice);
    /// Scroll so the given highlight marker is visible.
    fn reveal(&mut self, marker: NodeId);
}
