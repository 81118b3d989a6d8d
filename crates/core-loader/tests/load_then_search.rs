use core_dom::{Dom, NodeId, Tag};
use core_events::{AsyncEventSource, Event, LoadEvent};
use core_loader::{
    LOAD_ERROR_MESSAGE, LoadEventSource, LoadStatus, TextLoader, apply_load,
};
use core_search::{MatchCounter, Notice, SearchOutcome, SearchSession, SearchView};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
struct Quiet {
    counter: MatchCounter,
    notices: usize,
}

impl SearchView for Quiet {
    fn update_counter(&mut self, counter: MatchCounter) {
        self.counter = counter;
    }
    fn set_navigation_visible(&mut self, _visible: bool) {}
    fn notify(&mut self, _notice: Notice) {
        self.notices += 1;
    }
    fn reveal(&mut self, _marker: NodeId) {}
}

async fn receive_load(path: std::path::PathBuf) -> LoadEvent {
    let (tx, mut rx) = mpsc::channel::<Event>(4);
    let source = Box::new(LoadEventSource::new(TextLoader::new(path)));
    assert_eq!(source.name(), "text_loader");
    let handle = source.spawn(tx);
    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("load outcome within timeout")
        .expect("channel open");
    handle.await.expect("loader task joins");
    match event {
        Event::Load(load) => load,
        other => panic!("expected load event, got {other:?}"),
    }
}

#[tokio::test]
async fn loaded_text_is_rendered_and_searchable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hymnal.txt");
    std::fs::write(&path, "grace\r\ngrace amazing grace").unwrap();

    let load = receive_load(path).await;
    let mut dom = Dom::new();
    let container = dom.create_element(Tag::Container);
    let mut session = SearchSession::new(container);
    assert_eq!(
        apply_load(load, &mut dom, &mut session).unwrap(),
        LoadStatus::Ready
    );
    assert_eq!(dom.text_content(container), "grace\ngrace amazing grace");

    let mut view = Quiet::default();
    let out = session.search(&mut dom, &mut view, "Grace").unwrap();
    assert_eq!(out, SearchOutcome::Found { total: 3 });
    assert_eq!(view.counter.to_string(), "1/3");
}

#[tokio::test]
async fn missing_resource_shows_error_and_search_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let load = receive_load(dir.path().join("missing.txt")).await;
    assert!(!load.is_loaded());

    let mut dom = Dom::new();
    let container = dom.create_element(Tag::Container);
    let mut session = SearchSession::new(container);
    assert_eq!(
        apply_load(load, &mut dom, &mut session).unwrap(),
        LoadStatus::Failed
    );
    assert_eq!(dom.text_content(container), LOAD_ERROR_MESSAGE);

    let children_before = dom.children(container).to_vec();
    let mut view = Quiet::default();
    let out = session.search(&mut dom, &mut view, "anything").unwrap();
    assert_eq!(out, SearchOutcome::Unavailable);
    assert_eq!(dom.children(container), children_before.as_slice());
    assert_eq!(dom.text_content(container), LOAD_ERROR_MESSAGE);
    assert_eq!(view.notices, 0);
}
