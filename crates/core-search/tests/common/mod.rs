#![allow(dead_code)] // Shared across integration test binaries; each uses a subset.

use core_dom::{Dom, NodeId, Tag};
use core_search::{MatchCounter, Notice, SearchSession, SearchView};

/// View double that records everything the engine reports.
#[derive(Debug)]
pub struct RecordingView {
    pub counter: MatchCounter,
    pub nav_visible: bool,
    pub notices: Vec<Notice>,
    pub revealed: Vec<NodeId>,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            counter: MatchCounter::empty(),
            nav_visible: false,
            notices: Vec::new(),
            revealed: Vec::new(),
        }
    }
}

impl SearchView for RecordingView {
    fn update_counter(&mut self, counter: MatchCounter) {
        self.counter = counter;
    }

    fn set_navigation_visible(&mut self, visible: bool) {
        self.nav_visible = visible;
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn reveal(&mut self, marker: NodeId) {
        self.revealed.push(marker);
    }
}

pub struct Page {
    pub dom: Dom,
    pub session: SearchSession,
    pub view: RecordingView,
}

impl Page {
    /// A page whose text has loaded and been rendered into the container.
    pub fn loaded(text: &str) -> Self {
        let mut dom = Dom::new();
        let container = dom.create_element(Tag::Container);
        dom.set_text_content(container, text).unwrap();
        let mut session = SearchSession::new(container);
        session.set_document(text);
        Self {
            dom,
            session,
            view: RecordingView::default(),
        }
    }

    pub fn content(&self) -> String {
        self.dom.text_content(self.session.container())
    }

    pub fn search(&mut self, term: &str) -> core_search::SearchOutcome {
        self.session
            .search(&mut self.dom, &mut self.view, term)
            .expect("search")
    }

    pub fn next(&mut self) -> Option<usize> {
        self.session
            .advance(&mut self.dom, &mut self.view, core_search::Direction::Next)
            .expect("advance next")
    }

    pub fn previous(&mut self) -> Option<usize> {
        self.session
            .advance(&mut self.dom, &mut self.view, core_search::Direction::Previous)
            .expect("advance previous")
    }

    pub fn clear(&mut self) {
        self.session
            .clear_highlights(&mut self.dom, &mut self.view)
            .expect("clear");
    }

    pub fn marker_texts(&self) -> Vec<String> {
        self.session
            .matches()
            .iter()
            .map(|m| self.dom.text_content(m.marker))
            .collect()
    }
}
