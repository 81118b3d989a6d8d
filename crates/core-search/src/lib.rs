//! In-page search, highlight and navigation over the display tree.
//!
//! A [`SearchSession`] owns the document text, the match set and the cursor for one page.
//! The page lends it the [`core_dom::Dom`] and a [`SearchView`] for each operation:
//!
//! * `search(term)` clears old markup, regenerates the content from the document text and
//!   wraps every case-insensitive literal occurrence in a `Mark` element.
//! * `clear_highlights()` unwraps every marker and merges the text back together.
//! * `advance(direction)` cycles the active marker with wrap-around.

pub mod matcher;
pub mod session;
pub mod view;

pub use matcher::Matcher;
pub use session::{Direction, LoadState, Match, SearchOutcome, SearchSession};
pub use view::{MatchCounter, Notice, SearchView};

use core_dom::{DomError, NodeId};
use thiserror::Error;

/// Class carried by every highlight marker.
pub const HIGHLIGHT_CLASS: &str = "highlight";
/// Extra class carried by the marker at the cursor.
pub const ACTIVE_CLASS: &str = "active-highlight";
/// Content shown when a search is submitted before the text has loaded.
pub const NOT_LOADED_PLACEHOLDER: &str = "The hymnal text has not been loaded yet.";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error("search term could not be compiled: {0}")]
    Pattern(#[from] regex::Error),
    #[error("text segment {0} has no parent element")]
    DetachedSegment(NodeId),
}
