use crate::translate_key;
use core_events::{
    ASYNC_INPUT_STARTS, CHANNEL_SEND_FAILURES, Event, InputEvent, KEYPRESS_TOTAL,
};
use crossterm::event::{Event as CEvent, EventStream, KeyEvent as CKeyEvent, KeyEventKind as CKind};
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio::sync::{Notify, mpsc::Sender};
use tokio::task;
use tokio_stream::StreamExt;
use tracing::{info, trace, warn};

#[derive(Clone, Debug)]
pub struct AsyncInputShutdown {
    notify: Arc<Notify>,
}

impl AsyncInputShutdown {
    pub fn signal(&self) {
        self.notify.notify_one();
    }
}

#[derive(Clone, Debug)]
struct ShutdownListener {
    notify: Arc<Notify>,
}

impl ShutdownListener {
    fn new_pair() -> (AsyncInputShutdown, Self) {
        let notify = Arc::new(Notify::new());
        (
            AsyncInputShutdown {
                notify: notify.clone(),
            },
            ShutdownListener { notify },
        )
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

pub(crate) fn spawn_async_event_task(
    sender: Sender<Event>,
) -> (task::JoinHandle<()>, AsyncInputShutdown) {
    let (shutdown, listener) = ShutdownListener::new_pair();
    let handle = task::spawn(async move {
        let stream = EventStream::new();
        AsyncEventStreamTask::new(sender, stream, listener)
            .run()
            .await;
    });
    (handle, shutdown)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExitReason {
    ShutdownSignal,
    ChannelClosed,
    StreamEnded,
    StreamError,
}

impl ExitReason {
    fn as_str(&self) -> &'static str {
        match self {
            ExitReason::ShutdownSignal => "shutdown_signal",
            ExitReason::ChannelClosed => "channel_closed",
            ExitReason::StreamEnded => "stream_ended",
            ExitReason::StreamError => "stream_error",
        }
    }
}

struct AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    sender: Sender<Event>,
    stream: S,
    shutdown: ShutdownListener,
}

impl<S> AsyncEventStreamTask<S>
where
    S: tokio_stream::Stream<Item = io::Result<CEvent>> + Send + Unpin + 'static,
{
    fn new(sender: Sender<Event>, stream: S, shutdown: ShutdownListener) -> Self {
        Self {
            sender,
            stream,
            shutdown,
        }
    }

    async fn run(mut self) {
        info!(target: "input.thread", "async_input_task_started");
        ASYNC_INPUT_STARTS.fetch_add(1, Ordering::Relaxed);
        let reason = loop {
            let next = tokio::select! {
                biased;
                _ = self.shutdown.wait() => break ExitReason::ShutdownSignal,
                next = self.stream.next() => next,
            };
            let Some(result) = next else {
                break ExitReason::StreamEnded;
            };
            let forwarded = match result {
                Ok(CEvent::Key(key)) => self.handle_key_event(key).await,
                Ok(CEvent::Resize(w, h)) => {
                    trace!(target: "input.event", w, h, "resize");
                    self.send_event(Event::Input(InputEvent::Resize(w, h))).await
                }
                Ok(_) => true,
                Err(err) => {
                    warn!(target: "input.thread", error_kind = ?err.kind(), "async_input_task_stream_error");
                    break ExitReason::StreamError;
                }
            };
            if !forwarded {
                break ExitReason::ChannelClosed;
            }
        };
        info!(target: "input.thread", reason = reason.as_str(), "async_input_task_stopped");
    }

    /// `false` once the channel is closed.
    async fn handle_key_event(&mut self, key: CKeyEvent) -> bool {
        if !matches!(key.kind, CKind::Press | CKind::Repeat) {
            return true;
        }
        let Some(input) = translate_key(key) else {
            trace!(target: "input.event", "key_ignored");
            return true;
        };
        // Key identity only; typed characters are search terms and stay out of the log.
        let printable =
            matches!(&input, InputEvent::Key(k) if matches!(k.code, core_events::KeyCode::Char(_)));
        trace!(target: "input.event", kind = "keypress", printable);
        let sent = self.send_event(Event::Input(input)).await;
        if sent {
            KEYPRESS_TOTAL.fetch_add(1, Ordering::Relaxed);
        }
        sent
    }

    async fn send_event(&mut self, event: Event) -> bool {
        if self.sender.send(event).await.is_ok() {
            true
        } else {
            CHANNEL_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            false
        }
    }
}
