//! The hymnal page: display tree, search input, counter, notice and viewport.
//!
//! `Page` owns everything the terminal shows and is driven by the runtime loop one event at
//! a time. It holds no terminal handle, so the whole page is exercised headless in tests.

use crate::keys::{Binding, binding_for};
use anyhow::Result;
use core_config::{Config, ConfigContext, RevealAlign};
use core_dom::{Dom, NodeId, Tag};
use core_events::{KeyEvent, LoadEvent};
use core_loader::{LOAD_ERROR_CLASS, LoadStatus, apply_load};
use core_render::{
    CHROME_ROWS, ClassRoles, Layout, PageFrame, Role, StatusContext, Viewport, Writer, paint,
    text_rows,
};
use core_search::{
    ACTIVE_CLASS, Direction, HIGHLIGHT_CLASS, MatchCounter, Notice, SearchOutcome, SearchSession,
    SearchView,
};
use std::time::{Duration, Instant};
use tracing::{debug, info};
use unicode_segmentation::UnicodeSegmentation;

const ROLES: ClassRoles<'static> = &[
    (ACTIVE_CLASS, Role::Active),
    (HIGHLIGHT_CLASS, Role::Highlight),
    (LOAD_ERROR_CLASS, Role::Error),
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveNotice {
    text: String,
    expires_at: Instant,
}

/// Page-side state the search engine reports into.
#[derive(Debug)]
pub struct PageView {
    counter: MatchCounter,
    nav_visible: bool,
    notice: Option<ActiveNotice>,
    notice_ttl: Duration,
    reveal: Option<NodeId>,
}

impl PageView {
    fn new(notice_ttl: Duration) -> Self {
        Self {
            counter: MatchCounter::empty(),
            nav_visible: false,
            notice: None,
            notice_ttl,
            reveal: None,
        }
    }

    #[cfg(test)]
    pub fn counter(&self) -> MatchCounter {
        self.counter
    }

    #[cfg(test)]
    pub fn nav_visible(&self) -> bool {
        self.nav_visible
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|n| n.text.as_str())
    }
}

impl SearchView for PageView {
    fn update_counter(&mut self, counter: MatchCounter) {
        self.counter = counter;
    }

    fn set_navigation_visible(&mut self, visible: bool) {
        self.nav_visible = visible;
    }

    fn notify(&mut self, notice: Notice) {
        self.notice = Some(ActiveNotice {
            text: notice.to_string(),
            expires_at: Instant::now() + self.notice_ttl,
        });
    }

    fn reveal(&mut self, marker: NodeId) {
        self.reveal = Some(marker);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Continue { redraw: bool },
    Quit,
}

pub struct Page {
    dom: Dom,
    session: SearchSession,
    view: PageView,
    input: String,
    layout: Layout,
    viewport: Viewport,
    size: (u16, u16),
    config: Config,
}

impl Page {
    pub fn new(mut config: Config, size: (u16, u16)) -> Self {
        let mut dom = Dom::new();
        let container = dom.create_element(Tag::Container);
        config.apply_context(ConfigContext::new(size.1, CHROME_ROWS));
        let view = PageView::new(config.file.notice.duration());
        let mut page = Self {
            dom,
            session: SearchSession::new(container),
            view,
            input: String::new(),
            layout: Layout::default(),
            viewport: Viewport::new(0, text_rows(size.1) as usize),
            size,
            config,
        };
        page.relayout();
        page
    }

    pub fn apply_load(&mut self, event: LoadEvent) -> Result<LoadStatus> {
        let status = apply_load(event, &mut self.dom, &mut self.session)?;
        if status == LoadStatus::Ready {
            self.input.clear();
        }
        info!(target: "runtime", ?status, "load_applied");
        self.viewport.first_line = 0;
        self.relayout();
        Ok(status)
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> Result<PageControl> {
        let Some(binding) = binding_for(key) else {
            return Ok(PageControl::Continue { redraw: false });
        };
        match binding {
            Binding::Insert(c) => self.input.push(c),
            Binding::Backspace => {
                if let Some((idx, _)) = self.input.grapheme_indices(true).next_back() {
                    self.input.truncate(idx);
                }
            }
            Binding::ClearInput => self.input.clear(),
            Binding::Submit => self.submit()?,
            Binding::Next => self.navigate(Direction::Next)?,
            Binding::Previous => self.navigate(Direction::Previous)?,
            Binding::PageUp => self.viewport.page_up(self.layout.row_count()),
            Binding::PageDown => self.viewport.page_down(self.layout.row_count()),
            Binding::Quit => return Ok(PageControl::Quit),
        }
        Ok(PageControl::Continue { redraw: true })
    }

    fn submit(&mut self) -> Result<()> {
        self.view.notice = None;
        let outcome = self
            .session
            .search(&mut self.dom, &mut self.view, &self.input)?;
        debug!(target: "runtime", ?outcome, "search_submitted");
        if matches!(
            outcome,
            SearchOutcome::Cleared | SearchOutcome::NotLoaded | SearchOutcome::NoMatch
        ) {
            self.view.reveal = None;
        }
        self.relayout();
        Ok(())
    }

    fn navigate(&mut self, direction: Direction) -> Result<()> {
        if self
            .session
            .advance(&mut self.dom, &mut self.view, direction)?
            .is_some()
        {
            self.relayout();
        }
        Ok(())
    }

    /// Expire the notice once its lifetime has passed. Returns whether a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.view.notice.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.view.notice = None;
            return true;
        }
        false
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        if let Some(margin) = self
            .config
            .recompute_with_context(ConfigContext::new(height, CHROME_ROWS))
        {
            debug!(target: "runtime", margin, "reveal_margin_changed");
        }
        self.relayout();
    }

    /// Rebuild the layout from the display tree and scroll any pending reveal into view.
    fn relayout(&mut self) {
        self.layout = Layout::build(&self.dom, self.session.container(), ROLES, self.size.0);
        let total = self.layout.row_count();
        self.viewport.resize(text_rows(self.size.1) as usize, total);
        if let Some(marker) = self.view.reveal.take()
            && let Some(line) = self.layout.anchor(marker)
        {
            let align: RevealAlign = self.config.file.reveal.align;
            let margin = self.config.effective_reveal_margin as usize;
            self.viewport.reveal(line, align, margin, total);
        }
    }

    pub fn paint(&self, w: &mut Writer) {
        let counter = self.view.counter.to_string();
        let frame = PageFrame {
            layout: &self.layout,
            viewport: &self.viewport,
            status: StatusContext {
                input: &self.input,
                counter: &counter,
                nav_visible: self.view.nav_visible,
            },
            notice: self.view.notice(),
            size: self.size,
        };
        paint(&frame, w);
    }
}

#[cfg(test)]
impl Page {
    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn content_text(&self) -> String {
        self.dom.text_content(self.session.container())
    }
}
