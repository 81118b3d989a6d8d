//! Hymnal entrypoint: a terminal page that loads a hymnal text and searches within it.
use anyhow::Result;
use clap::Parser;
use core_config::load_from;
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent, LoadEvent, TickEventSource,
};
use core_loader::{LoadEventSource, TextLoader};
use core_render::{CrosstermBackend, TerminalBackend, TerminalGuard, Writer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, trace, warn};
use tracing_appender::non_blocking::WorkerGuard;

mod keys;
mod page;

use page::{Page, PageControl};

const LOG_FILE: &str = "hymnal.log";
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "hymnal", version, about = "Search and highlight within a hymnal text")]
struct Args {
    /// Text file to load. Overrides `[source] path` from the configuration.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `hymnal.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
}

struct AppStartup {
    backend: CrosstermBackend,
    _log_guard: Option<WorkerGuard>,
}

struct RuntimeContext<'a> {
    page: Page,
    source_path: PathBuf,
    terminal_guard: TerminalGuard<'a>,
}

impl AppStartup {
    fn new() -> Self {
        Self {
            backend: CrosstermBackend::new(),
            _log_guard: None,
        }
    }

    fn run<'a>(&'a mut self, args: &Args) -> Result<RuntimeContext<'a>> {
        self.configure_logging()?;
        Self::install_panic_hook();
        info!(target: "runtime", "startup");

        let config = load_from(args.config.clone())?;
        let source_path = args
            .path
            .clone()
            .unwrap_or_else(|| config.source_path().to_path_buf());

        self.backend.set_title("Hymnal")?;
        let size = self.backend.size()?;
        let guard = self.backend.enter_guard()?;

        info!(
            target: "runtime.startup",
            source = %source_path.display(),
            config_override = args.config.is_some(),
            reveal_align = ?config.file.reveal.align,
            columns = size.0,
            rows = size.1,
            "bootstrap_complete"
        );

        Ok(RuntimeContext {
            page: Page::new(config, size),
            source_path,
            terminal_guard: guard,
        })
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = Path::new(".");
        let log_path = log_dir.join(LOG_FILE);
        if log_path.exists() {
            let _ = std::fs::remove_file(&log_path);
        }

        let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        if tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(nb_writer)
            .with_ansi(false)
            .try_init()
            .is_ok()
        {
            self._log_guard = Some(guard);
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownReason {
    CtrlC,
    Quit,
    ShutdownEvent,
    ChannelClosed,
}

impl ShutdownReason {
    fn as_str(&self) -> &'static str {
        match self {
            ShutdownReason::CtrlC => "ctrl_c",
            ShutdownReason::Quit => "quit",
            ShutdownReason::ShutdownEvent => "shutdown_event",
            ShutdownReason::ChannelClosed => "channel_closed",
        }
    }
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn log_shutdown_stage(reason: ShutdownReason, stage: &'static str) {
    info!(
        target: "runtime.shutdown",
        reason = reason.as_str(),
        stage = stage,
        "shutdown_stage"
    );
}

#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue { redraw: bool },
    Break { reason: ShutdownReason },
}

/// Apply one event to the page and decide whether the loop keeps going.
fn route_event(page: &mut Page, event: Event) -> LoopControl {
    match event {
        Event::Input(input) => route_input(page, &input),
        Event::Load(load) => {
            info!(target: "runtime.events", loaded = load.is_loaded(), "load_event_received");
            if let Err(err) = page.apply_load(load) {
                error!(target: "runtime", ?err, "load_apply_failed");
            }
            LoopControl::Continue { redraw: true }
        }
        Event::Tick => LoopControl::Continue {
            redraw: page.tick(Instant::now()),
        },
        Event::Shutdown => LoopControl::Break {
            reason: ShutdownReason::ShutdownEvent,
        },
    }
}

fn route_input(page: &mut Page, input: &InputEvent) -> LoopControl {
    match input {
        InputEvent::CtrlC => LoopControl::Break {
            reason: ShutdownReason::CtrlC,
        },
        InputEvent::Resize(w, h) => {
            page.resize(*w, *h);
            LoopControl::Continue { redraw: true }
        }
        InputEvent::Key(key) => match page.handle_key(key) {
            Ok(PageControl::Quit) => LoopControl::Break {
                reason: ShutdownReason::Quit,
            },
            Ok(PageControl::Continue { redraw }) => LoopControl::Continue { redraw },
            Err(err) => {
                error!(target: "runtime", ?err, "key_handling_failed");
                LoopControl::Continue { redraw: true }
            }
        },
    }
}

struct PageRuntime<'a> {
    page: Page,
    rx: mpsc::Receiver<Event>,
    tx: Option<mpsc::Sender<Event>>,
    source_handles: Vec<tokio::task::JoinHandle<()>>,
    input_task: Option<tokio::task::JoinHandle<()>>,
    input_shutdown: Option<core_input::AsyncInputShutdown>,
    _terminal_guard: TerminalGuard<'a>,
}

impl<'a> PageRuntime<'a> {
    fn new(
        page: Page,
        terminal_guard: TerminalGuard<'a>,
        tx: mpsc::Sender<Event>,
        rx: mpsc::Receiver<Event>,
        input_task: tokio::task::JoinHandle<()>,
        input_shutdown: core_input::AsyncInputShutdown,
        source_handles: Vec<tokio::task::JoinHandle<()>>,
    ) -> Self {
        Self {
            page,
            rx,
            tx: Some(tx),
            source_handles,
            input_task: Some(input_task),
            input_shutdown: Some(input_shutdown),
            _terminal_guard: terminal_guard,
        }
    }

    async fn run(&mut self) -> Result<()> {
        self.draw();

        let loop_span = tracing::debug_span!(target: "runtime", "event_loop");
        let _enter_loop = loop_span.enter();

        let mut shutdown_reason = ShutdownReason::ChannelClosed;
        while let Some(event) = self.rx.recv().await {
            let control = route_event(&mut self.page, event);
            match control {
                LoopControl::Break { reason } => {
                    shutdown_reason = reason;
                    break;
                }
                LoopControl::Continue { redraw: true } => self.draw(),
                LoopControl::Continue { redraw: false } => {}
            }
        }

        self.rx.close();
        self.finalize_shutdown(shutdown_reason).await;
        Ok(())
    }

    fn draw(&mut self) {
        let mut writer = Writer::new();
        self.page.paint(&mut writer);
        if let Err(err) = writer.flush() {
            error!(target: "render", ?err, "frame_flush_failed");
        }
    }

    async fn finalize_shutdown(&mut self, reason: ShutdownReason) {
        log_shutdown_stage(reason, "begin");
        if let Some(tx) = self.tx.take() {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "dropping_runtime_sender");
            drop(tx);
        }

        while let Some(handle) = self.source_handles.pop() {
            match tokio::time::timeout(Duration::from_millis(200), handle).await {
                Ok(Ok(_)) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_stopped"
                ),
                Ok(Err(err)) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_cancelled"
                ),
                Ok(Err(err)) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "event_source_task_error"
                ),
                Err(_) => warn!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "event_source_task_timeout"
                ),
            }
        }

        if let Some(shutdown) = self.input_shutdown.take() {
            trace!(target: "runtime.shutdown", reason = reason.as_str(), "input_task_shutdown_signal");
            shutdown.signal();
        }

        if let Some(handle) = self.input_task.take() {
            match handle.await {
                Ok(_) => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_joined"
                ),
                Err(err) if err.is_cancelled() => trace!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    "input_task_cancelled"
                ),
                Err(err) => error!(
                    target: "runtime.shutdown",
                    reason = reason.as_str(),
                    ?err,
                    "input_task_join_failed"
                ),
            }
        }

        log_shutdown_stage(reason, "complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    let context = startup.run(&args)?;
    let (tx, rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let (input_task, input_shutdown) = core_input::spawn_async_input(tx.clone());
    let mut registry = EventSourceRegistry::new();
    registry.register(LoadEventSource::new(TextLoader::new(context.source_path)));
    registry.register(TickEventSource::new(TICK_INTERVAL));
    let source_handles = registry.spawn_all(&tx);

    let mut runtime = PageRuntime::new(
        context.page,
        context.terminal_guard,
        tx,
        rx,
        input_task,
        input_shutdown,
        source_handles,
    );
    runtime.run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_path_and_config() {
        let args = Args::parse_from(["hymnal", "songs.txt", "--config", "alt.toml"]);
        assert_eq!(args.path, Some(PathBuf::from("songs.txt")));
        assert_eq!(args.config, Some(PathBuf::from("alt.toml")));
        let bare = Args::parse_from(["hymnal"]);
        assert!(bare.path.is_none() && bare.config.is_none());
    }

    #[test]
    fn shutdown_reasons_have_stable_labels() {
        assert_eq!(ShutdownReason::CtrlC.to_string(), "ctrl_c");
        assert_eq!(ShutdownReason::Quit.as_str(), "quit");
        assert_eq!(ShutdownReason::ChannelClosed.as_str(), "channel_closed");
    }

    fn page() -> Page {
        Page::new(core_config::Config::default(), (40, 12))
    }

    #[test]
    fn load_event_fills_page_and_redraws() {
        let mut page = page();
        let control = route_event(
            &mut page,
            Event::Load(LoadEvent::Loaded {
                text: "Abide with me".to_string(),
            }),
        );
        assert_eq!(control, LoopControl::Continue { redraw: true });
        assert_eq!(page.content_text(), "Abide with me");
    }

    #[test]
    fn interrupt_quit_and_shutdown_break_the_loop() {
        let mut page = page();
        assert_eq!(
            route_event(&mut page, Event::Input(InputEvent::CtrlC)),
            LoopControl::Break {
                reason: ShutdownReason::CtrlC
            }
        );
        let esc = core_events::KeyEvent::new(
            core_events::KeyCode::Esc,
            core_events::KeyModifiers::empty(),
        );
        assert_eq!(
            route_event(&mut page, Event::Input(InputEvent::Key(esc))),
            LoopControl::Break {
                reason: ShutdownReason::Quit
            }
        );
        assert_eq!(
            route_event(&mut page, Event::Shutdown),
            LoopControl::Break {
                reason: ShutdownReason::ShutdownEvent
            }
        );
        assert_eq!(
            route_event(&mut page, Event::Tick),
            LoopControl::Continue { redraw: false }
        );
    }

    #[tokio::test]
    async fn bounded_channel_applies_backpressure() {
        let (tx, mut rx) = mpsc::channel::<Event>(1);
        tx.send(Event::Tick).await.unwrap();
        assert!(tx.try_send(Event::Tick).is_err());
        assert!(matches!(rx.recv().await, Some(Event::Tick)));
        assert!(tx.try_send(Event::Shutdown).is_ok());
    }
}
