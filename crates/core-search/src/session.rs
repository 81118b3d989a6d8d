//! Search session: the document text, the match set and the cursor for one page.
//!
//! Invariants:
//! * Every entry of the match set refers to a live `Mark` element carrying
//!   `HIGHLIGHT_CLASS` beneath the container, in document order, and no other
//!   highlight markers exist beneath the container.
//! * `cursor` is `None` or a valid index into the match set; exactly the marker at the
//!   cursor carries `ACTIVE_CLASS`.
//! * Every search starts from `clear_highlights` and regenerates the container from the
//!   document text, so matches are never computed against stale markup.

use crate::matcher::Matcher;
use crate::view::{MatchCounter, Notice, SearchView};
use crate::{ACTIVE_CLASS, HIGHLIGHT_CLASS, NOT_LOADED_PLACEHOLDER, SearchError};
use core_dom::{Dom, NodeId, Tag, TextSegment};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// One located occurrence of the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Byte offset into the document text.
    pub start: usize,
    /// Byte length of the matched text.
    pub len: usize,
    /// Highlight marker element wrapping the matched text.
    pub marker: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    fn delta(self) -> isize {
        match self {
            Direction::Next => 1,
            Direction::Previous => -1,
        }
    }
}

/// Lifecycle of the document text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Loaded(Arc<str>),
    Failed,
}

/// What a `search` call ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty term: highlights cleared, nothing else.
    Cleared,
    /// Text not available yet; the placeholder was written into the container.
    NotLoaded,
    /// Loading failed earlier; content left untouched.
    Unavailable,
    NoMatch,
    Found { total: usize },
}

#[derive(Debug)]
pub struct SearchSession {
    container: NodeId,
    load: LoadState,
    matches: Vec<Match>,
    cursor: Option<usize>,
}

impl SearchSession {
    pub fn new(container: NodeId) -> Self {
        Self {
            container,
            load: LoadState::Pending,
            matches: Vec::new(),
            cursor: None,
        }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    /// Document text, empty unless loaded.
    pub fn document_text(&self) -> &str {
        match &self.load {
            LoadState::Loaded(text) => text,
            LoadState::Pending | LoadState::Failed => "",
        }
    }

    pub fn set_document<T: Into<Arc<str>>>(&mut self, text: T) {
        let text = text.into();
        debug!(target: "search", size_bytes = text.len(), "document_set");
        self.load = LoadState::Loaded(text);
        self.matches.clear();
        self.cursor = None;
    }

    pub fn mark_load_failed(&mut self) {
        self.load = LoadState::Failed;
        self.matches.clear();
        self.cursor = None;
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current_match(&self) -> Option<&Match> {
        self.cursor.and_then(|i| self.matches.get(i))
    }

    pub fn counter(&self) -> MatchCounter {
        match self.cursor {
            Some(i) => MatchCounter::at(i, self.matches.len()),
            None => MatchCounter::empty(),
        }
    }

    /// Run a search for `term` (trimmed). See [`SearchOutcome`] for the possible results.
    pub fn search<V: SearchView + ?Sized>(
        &mut self,
        dom: &mut Dom,
        view: &mut V,
        term: &str,
    ) -> Result<SearchOutcome, SearchError> {
        let term = term.trim();
        self.clear_highlights(dom, view)?;
        if term.is_empty() {
            trace!(target: "search", "empty_term");
            return Ok(SearchOutcome::Cleared);
        }

        let text = match &self.load {
            LoadState::Failed => {
                debug!(target: "search", "search_after_load_failure");
                return Ok(SearchOutcome::Unavailable);
            }
            LoadState::Loaded(text) if !text.is_empty() => Arc::clone(text),
            LoadState::Loaded(_) | LoadState::Pending => {
                dom.set_text_content(self.container, NOT_LOADED_PLACEHOLDER)?;
                debug!(target: "search", "search_before_load");
                return Ok(SearchOutcome::NotLoaded);
            }
        };

        let started = Instant::now();
        let matcher = Matcher::new(term)?;
        dom.set_text_content(self.container, &text)?;
        let segments: Vec<TextSegment> = dom.text_segments(self.container).collect();
        for segment in &segments {
            self.mark_segment(dom, &matcher, *segment)?;
        }

        info!(
            target: "search",
            term_len = term.len(),
            segments = segments.len(),
            matches = self.matches.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "search_complete"
        );

        if self.matches.is_empty() {
            view.notify(Notice::NoMatch {
                term: term.to_string(),
            });
            view.update_counter(MatchCounter::empty());
            view.set_navigation_visible(false);
            return Ok(SearchOutcome::NoMatch);
        }

        self.advance(dom, view, Direction::Next)?;
        Ok(SearchOutcome::Found {
            total: self.matches.len(),
        })
    }

    /// Wrap every match inside one text segment. The segment is scanned once and replaced by
    /// its (pre, mark, ..., post) pieces in a single splice, so the cost stays linear in the
    /// number of matches.
    fn mark_segment(
        &mut self,
        dom: &mut Dom,
        matcher: &Matcher,
        segment: TextSegment,
    ) -> Result<(), SearchError> {
        let text = match dom.text(segment.node) {
            Some(text) => text.to_owned(),
            None => return Ok(()),
        };
        let ranges: Vec<_> = matcher.find_iter(&text).collect();
        if ranges.is_empty() {
            return Ok(());
        }
        if dom.parent(segment.node).is_none() {
            return Err(SearchError::DetachedSegment(segment.node));
        }

        let mut pieces = Vec::with_capacity(ranges.len() * 2 + 1);
        let mut consumed = 0usize;
        for range in ranges {
            if range.start > consumed {
                pieces.push(dom.create_text(&text[consumed..range.start]));
            }
            let marker = dom.create_element(Tag::Mark);
            dom.add_class(marker, HIGHLIGHT_CLASS)?;
            let hit = dom.create_text(&text[range.clone()]);
            dom.append_child(marker, hit)?;
            pieces.push(marker);
            self.matches.push(Match {
                start: segment.offset + range.start,
                len: range.len(),
                marker,
            });
            consumed = range.end;
        }
        if consumed < text.len() {
            pieces.push(dom.create_text(&text[consumed..]));
        }
        dom.replace_with_nodes(segment.node, pieces)?;
        Ok(())
    }

    /// Unwrap every highlight marker beneath the container back into plain text, merge the
    /// fragments, and reset the match set, cursor and counter. Idempotent.
    pub fn clear_highlights<V: SearchView + ?Sized>(
        &mut self,
        dom: &mut Dom,
        view: &mut V,
    ) -> Result<(), SearchError> {
        let removed = dom.unwrap_class(self.container, HIGHLIGHT_CLASS)?;
        dom.normalize(self.container)?;

        if removed > 0 || !self.matches.is_empty() {
            debug!(target: "search", removed, "highlights_cleared");
        }
        self.matches.clear();
        self.cursor = None;
        view.update_counter(MatchCounter::empty());
        view.set_navigation_visible(false);
        Ok(())
    }

    /// Move the current match one step in `direction`, wrapping around both ends.
    /// Returns the new cursor, or `None` when there are no matches.
    pub fn advance<V: SearchView + ?Sized>(
        &mut self,
        dom: &mut Dom,
        view: &mut V,
        direction: Direction,
    ) -> Result<Option<usize>, SearchError> {
        let total = self.matches.len();
        if total == 0 {
            return Ok(None);
        }

        if let Some(previous) = self.current_match()
            && dom.contains(previous.marker)
        {
            dom.remove_class(previous.marker, ACTIVE_CLASS)?;
        }

        let next = match (self.cursor, direction) {
            (None, Direction::Next) => 0,
            (None, Direction::Previous) => total - 1,
            (Some(current), dir) => {
                (current as isize + dir.delta()).rem_euclid(total as isize) as usize
            }
        };
        self.cursor = Some(next);

        let marker = self.matches[next].marker;
        dom.add_class(marker, ACTIVE_CLASS)?;
        view.reveal(marker);
        view.update_counter(MatchCounter::at(next, total));
        view.set_navigation_visible(true);
        trace!(target: "search.nav", ?direction, cursor = next, total, "advance");
        Ok(Some(next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        counter: MatchCounter,
        nav: bool,
        notices: Vec<Notice>,
        revealed: Vec<NodeId>,
    }

    impl SearchView for Recorder {
        fn update_counter(&mut self, counter: MatchCounter) {
            self.counter = counter;
        }
        fn set_navigation_visible(&mut self, visible: bool) {
            self.nav = visible;
        }
        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
        fn reveal(&mut self, marker: NodeId) {
            self.revealed.push(marker);
        }
    }

    fn page(text: &str) -> (Dom, SearchSession, Recorder) {
        let mut dom = Dom::new();
        let container = dom.create_element(Tag::Container);
        dom.set_text_content(container, text).unwrap();
        let mut session = SearchSession::new(container);
        session.set_document(text);
        (dom, session, Recorder::default())
    }

    #[test]
    fn marks_split_text_into_pre_match_post() {
        let (mut dom, mut s, mut v) = page("O grace divine");
        let out = s.search(&mut dom, &mut v, "GRACE").unwrap();
        assert_eq!(out, SearchOutcome::Found { total: 1 });
        let root = s.container();
        let kids = dom.children(root).to_vec();
        assert_eq!(kids.len(), 3);
        assert_eq!(dom.text(kids[0]), Some("O "));
        assert_eq!(dom.text_content(kids[1]), "grace");
        assert!(dom.has_class(kids[1], HIGHLIGHT_CLASS));
        assert!(dom.has_class(kids[1], ACTIVE_CLASS));
        assert_eq!(dom.text(kids[2]), Some(" divine"));
        assert_eq!(s.matches()[0].start, 2);
        assert_eq!(v.revealed, vec![kids[1]]);
    }

    #[test]
    fn match_at_segment_edges_leaves_no_empty_text() {
        let (mut dom, mut s, mut v) = page("gracegrace");
        s.search(&mut dom, &mut v, "grace").unwrap();
        let kids = dom.children(s.container()).to_vec();
        assert_eq!(kids.len(), 2, "two touching markers, no empty fragments");
        assert!(kids.iter().all(|k| dom.has_class(*k, HIGHLIGHT_CLASS)));
    }

    #[test]
    fn advance_moves_active_class() {
        let (mut dom, mut s, mut v) = page("a b a b a");
        s.search(&mut dom, &mut v, "a").unwrap();
        let markers: Vec<_> = s.matches().iter().map(|m| m.marker).collect();
        assert_eq!(s.advance(&mut dom, &mut v, Direction::Next).unwrap(), Some(1));
        let active = dom.query_class(s.container(), ACTIVE_CLASS);
        assert_eq!(active, vec![markers[1]]);
        assert_eq!(v.counter.to_string(), "2/3");
    }

    #[test]
    fn advance_without_matches_is_noop() {
        let (mut dom, mut s, mut v) = page("text");
        assert_eq!(s.advance(&mut dom, &mut v, Direction::Previous).unwrap(), None);
        assert!(v.revealed.is_empty());
        assert_eq!(s.cursor(), None);
    }

    #[test]
    fn pending_load_writes_placeholder() {
        let mut dom = Dom::new();
        let container = dom.create_element(Tag::Container);
        let mut s = SearchSession::new(container);
        let mut v = Recorder::default();
        let out = s.search(&mut dom, &mut v, "grace").unwrap();
        assert_eq!(out, SearchOutcome::NotLoaded);
        assert_eq!(dom.text_content(container), NOT_LOADED_PLACEHOLDER);
        assert!(v.notices.is_empty());
    }

    #[test]
    fn whitespace_only_term_just_clears() {
        let (mut dom, mut s, mut v) = page("grace");
        s.search(&mut dom, &mut v, "grace").unwrap();
        let out = s.search(&mut dom, &mut v, "   \t").unwrap();
        assert_eq!(out, SearchOutcome::Cleared);
        assert!(s.matches().is_empty());
        assert!(dom.query_class(s.container(), HIGHLIGHT_CLASS).is_empty());
        assert!(!v.nav);
    }
}
