//! Text loader: fetch the hymnal text once at startup and hand it to the page.
//!
//! The fetch runs on the async runtime as an event source so the page stays responsive;
//! its single terminal outcome arrives in the event loop as `Event::Load`. There are no
//! retries. [`apply_load`] then either stores and renders the text or replaces the content
//! with a visible error message.

pub mod endings;

pub use endings::{LineEnding, NormalizedText, normalize_line_endings};

use core_dom::{Dom, DomError, Tag};
use core_events::{AsyncEventSource, CHANNEL_SEND_FAILURES, Event, LoadEvent};
use core_search::SearchSession;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Class carried by the paragraph shown when loading fails.
pub const LOAD_ERROR_CLASS: &str = "load-error";
/// Message shown in place of the content when loading fails.
pub const LOAD_ERROR_MESSAGE: &str =
    "Unable to load the hymnal text. Check that the file exists and the path is correct.";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{path} not found")]
    NotFound { path: PathBuf },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid UTF-8 (first invalid byte at {valid_up_to})")]
    InvalidUtf8 { path: PathBuf, valid_up_to: usize },
}

/// Successfully fetched text with line endings already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub text: String,
    pub original_line_ending: LineEnding,
    pub mixed_line_endings: bool,
}

/// Read `path` as UTF-8 and normalize its line endings.
pub async fn fetch_text(path: &Path) -> Result<LoadedText, LoadError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let raw = String::from_utf8(bytes).map_err(|e| LoadError::InvalidUtf8 {
        path: path.to_path_buf(),
        valid_up_to: e.utf8_error().valid_up_to(),
    })?;
    let body = raw.strip_prefix('\u{feff}').unwrap_or(&raw);
    let norm = normalize_line_endings(body);
    Ok(LoadedText {
        text: norm.text,
        original_line_ending: norm.original,
        mixed_line_endings: norm.mixed,
    })
}

/// One-shot loader for a named resource. `load` consumes it, so a page fetches once.
#[derive(Debug, Clone)]
pub struct TextLoader {
    path: PathBuf,
}

impl TextLoader {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(self) -> LoadEvent {
        match fetch_text(&self.path).await {
            Ok(loaded) => {
                info!(
                    target: "loader",
                    file = %self.path.display(),
                    size_bytes = loaded.text.len(),
                    line_count = loaded.text.lines().count(),
                    line_ending = loaded.original_line_ending.name(),
                    "text_loaded"
                );
                if loaded.mixed_line_endings {
                    warn!(target: "loader", file = %self.path.display(), "mixed_line_endings");
                }
                LoadEvent::Loaded { text: loaded.text }
            }
            Err(err) => {
                error!(target: "loader", error = %err, "text_load_failed");
                LoadEvent::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}

/// Event source that performs the startup fetch and delivers its outcome.
pub struct LoadEventSource {
    loader: TextLoader,
}

impl LoadEventSource {
    pub fn new(loader: TextLoader) -> Self {
        Self { loader }
    }
}

impl AsyncEventSource for LoadEventSource {
    fn name(&self) -> &'static str {
        "text_loader"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let loader = self.loader;
        tokio::spawn(async move {
            let outcome = loader.load().await;
            if tx.send(Event::Load(outcome)).await.is_err() {
                CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
                warn!(target: "loader", "load_outcome_dropped_channel_closed");
            }
        })
    }
}

/// What the page ended up showing after a load outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Ready,
    Failed,
}

/// Store and render a load outcome. Success renders the text into the session's container
/// and makes it the document text; failure replaces the content with the error message and
/// leaves the document text empty.
pub fn apply_load(
    event: LoadEvent,
    dom: &mut Dom,
    session: &mut SearchSession,
) -> Result<LoadStatus, DomError> {
    let container = session.container();
    match event {
        LoadEvent::Loaded { text } => {
            let text: Arc<str> = text.into();
            dom.set_text_content(container, &text)?;
            session.set_document(text);
            Ok(LoadStatus::Ready)
        }
        LoadEvent::Failed { .. } => {
            session.mark_load_failed();
            dom.clear_children(container)?;
            let paragraph = dom.create_element(Tag::Paragraph);
            dom.add_class(paragraph, LOAD_ERROR_CLASS)?;
            let message = dom.create_text(LOAD_ERROR_MESSAGE);
            dom.append_child(paragraph, message)?;
            dom.append_child(container, paragraph)?;
            Ok(LoadStatus::Failed)
        }
    }
}
