//! mpv-backed media element, driven over mpv's JSON IPC socket

use crate::core::media::{MediaElement, MediaEvent, MediaEventSink};
use crate::error::{KioskError, MediaError, Result};
use crate::utils::paths::get_ipc_socket_path;
use crate::utils::process::is_command_available;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, trace, warn};

const CONNECT_ATTEMPTS: u32 = 60;
const CONNECT_BACKOFF: Duration = Duration::from_millis(50);

/// Property observer ids
const OBSERVE_PAUSE: u64 = 1;
const OBSERVE_EOF: u64 = 2;

type Reply = std::result::Result<Value, MediaError>;

/// Commands waiting on mpv. Once closed, nothing can wait any more.
#[derive(Debug, Default)]
struct ReplySlots {
    waiting: HashMap<u64, oneshot::Sender<Reply>>,
    closed: bool,
}

impl ReplySlots {
    fn register(&mut self, request_id: u64) -> std::result::Result<oneshot::Receiver<Reply>, MediaError> {
        if self.closed {
            return Err(MediaError::Closed);
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.insert(request_id, tx);
        Ok(rx)
    }

    fn resolve(&mut self, request_id: u64, reply: Reply) {
        if let Some(tx) = self.waiting.remove(&request_id) {
            let _ = tx.send(reply);
        }
    }

    fn forget(&mut self, request_id: u64) {
        self.waiting.remove(&request_id);
    }

    fn close(&mut self) {
        self.closed = true;
        for (_, tx) in self.waiting.drain() {
            let _ = tx.send(Err(MediaError::Closed));
        }
    }
}

type Replies = Arc<Mutex<ReplySlots>>;

/// A paused mpv window holding one video
pub struct MpvElement {
    _child: Child,
    writer: tokio::sync::Mutex<OwnedWriteHalf>,
    replies: Replies,
    next_request: AtomicU64,
    sink: Arc<OnceLock<MediaEventSink>>,
    reader: JoinHandle<()>,
    socket_path: String,
}

impl MpvElement {
    /// Spawn mpv for `url`, paused, and connect to its IPC socket
    pub async fn launch(url: &str) -> Result<Self> {
        if !is_command_available("mpv").await {
            return Err(KioskError::MissingDependency("mpv".into()));
        }

        let socket_path = get_ipc_socket_path();
        let _ = tokio::fs::remove_file(&socket_path).await;

        let child = Command::new("mpv")
            .args(["--really-quiet", "--pause", "--keep-open=yes", "--force-window=yes"])
            .arg(format!("--input-ipc-server={}", socket_path))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| KioskError::Spawn(format!("Failed to start mpv: {}", e)))?;

        let stream = connect(&socket_path).await?;
        let (read_half, write_half) = stream.into_split();

        let replies: Replies = Arc::new(Mutex::new(ReplySlots::default()));
        let sink = Arc::new(OnceLock::new());
        let reader = tokio::spawn(read_loop(read_half, Arc::clone(&replies), Arc::clone(&sink)));

        let element = Self {
            _child: child,
            writer: tokio::sync::Mutex::new(write_half),
            replies,
            next_request: AtomicU64::new(1),
            sink,
            reader,
            socket_path,
        };

        element
            .command(json!(["observe_property", OBSERVE_PAUSE, "pause"]))
            .await?;
        element
            .command(json!(["observe_property", OBSERVE_EOF, "eof-reached"]))
            .await?;
        debug!(url, "mpv ready");

        Ok(element)
    }

    async fn command(&self, command: Value) -> std::result::Result<Value, MediaError> {
        let request_id = self.next_request.fetch_add(1, Ordering::SeqCst);
        let rx = lock(&self.replies).register(request_id)?;

        let mut line = json!({ "command": command, "request_id": request_id }).to_string();
        line.push('\n');
        trace!(%line, "mpv <-");

        let written = {
            let mut writer = self.writer.lock().await;
            writer.write_all(line.as_bytes()).await
        };
        if let Err(e) = written {
            lock(&self.replies).forget(request_id);
            return Err(MediaError::Ipc(e.to_string()));
        }

        rx.await.unwrap_or(Err(MediaError::Closed))
    }

    async fn set_property(&self, name: &str, value: Value) -> std::result::Result<(), MediaError> {
        self.command(json!(["set_property", name, value])).await.map(|_| ())
    }
}

impl Drop for MpvElement {
    fn drop(&mut self) {
        self.reader.abort();
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

#[async_trait]
impl MediaElement for MpvElement {
    fn attach(&self, sink: MediaEventSink) {
        let _ = self.sink.set(sink);
    }

    async fn play(&self) -> std::result::Result<(), MediaError> {
        self.set_property("pause", json!(false)).await.map_err(|e| match e {
            MediaError::Ipc(reason) => MediaError::Rejected(reason),
            other => other,
        })
    }

    async fn pause(&self) -> std::result::Result<(), MediaError> {
        self.set_property("pause", json!(true)).await
    }

    async fn seek_to_start(&self) -> std::result::Result<(), MediaError> {
        self.command(json!(["seek", 0, "absolute"])).await.map(|_| ())
    }

    async fn is_fullscreen(&self) -> bool {
        matches!(
            self.command(json!(["get_property", "fullscreen"])).await,
            Ok(Value::Bool(true))
        )
    }

    async fn request_fullscreen(&self) -> std::result::Result<(), MediaError> {
        self.set_property("fullscreen", json!(true)).await
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// mpv creates the socket a moment after it starts
async fn connect(socket_path: &str) -> Result<UnixStream> {
    let mut last_error = None;
    for _ in 0..CONNECT_ATTEMPTS {
        match UnixStream::connect(socket_path).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                last_error = Some(e);
                sleep(CONNECT_BACKOFF).await;
            }
        }
    }
    Err(MediaError::Ipc(format!(
        "mpv IPC socket {} never came up: {}",
        socket_path,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
    .into())
}

async fn read_loop(read_half: OwnedReadHalf, replies: Replies, sink: Arc<OnceLock<MediaEventSink>>) {
    let mut lines = BufReader::new(read_half).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "mpv IPC read failed");
                break;
            }
        };
        trace!(%line, "mpv ->");

        let Ok(message) = serde_json::from_str::<Value>(&line) else {
            continue;
        };
        match parse_message(&message) {
            Message::Reply { request_id, result } => lock(&replies).resolve(request_id, result),
            Message::Event(event) => {
                if let Some(sink) = sink.get() {
                    sink.emit(event);
                }
            }
            Message::Shutdown => break,
            Message::Other => {}
        }
    }

    // The window is gone: fail whatever is in flight and report a stop
    lock(&replies).close();
    if let Some(sink) = sink.get() {
        sink.emit(MediaEvent::Paused);
    }
}

#[derive(Debug, PartialEq)]
enum Message {
    Reply {
        request_id: u64,
        result: Reply,
    },
    Event(MediaEvent),
    Shutdown,
    Other,
}

fn parse_message(message: &Value) -> Message {
    if let Some(request_id) = message.get("request_id").and_then(Value::as_u64) {
        let result = match message.get("error").and_then(Value::as_str) {
            Some("success") | None => Ok(message.get("data").cloned().unwrap_or(Value::Null)),
            Some(error) => Err(MediaError::Ipc(error.to_string())),
        };
        return Message::Reply { request_id, result };
    }

    match message.get("event").and_then(Value::as_str) {
        Some("property-change") => {
            let data = message.get("data").and_then(Value::as_bool);
            match (message.get("name").and_then(Value::as_str), data) {
                (Some("pause"), Some(true)) => Message::Event(MediaEvent::Paused),
                (Some("pause"), Some(false)) => Message::Event(MediaEvent::Playing),
                (Some("eof-reached"), Some(true)) => Message::Event(MediaEvent::Ended),
                _ => Message::Other,
            }
        }
        Some("shutdown") => Message::Shutdown,
        _ => Message::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replies() {
        let ok = json!({"data": true, "request_id": 4, "error": "success"});
        assert_eq!(
            parse_message(&ok),
            Message::Reply {
                request_id: 4,
                result: Ok(json!(true))
            }
        );

        let failed = json!({"request_id": 5, "error": "property unavailable"});
        assert_eq!(
            parse_message(&failed),
            Message::Reply {
                request_id: 5,
                result: Err(MediaError::Ipc("property unavailable".into()))
            }
        );
    }

    #[test]
    fn test_reply_slots_fail_waiters_on_close() {
        let mut slots = ReplySlots::default();
        let mut pending = slots.register(1).unwrap();
        slots.resolve(7, Ok(json!(null)));

        slots.close();
        assert_eq!(pending.try_recv().unwrap(), Err(MediaError::Closed));
    }

    #[test]
    fn test_reply_slots_refuse_after_close() {
        let mut slots = ReplySlots::default();
        slots.close();

        assert_eq!(slots.register(2).unwrap_err(), MediaError::Closed);
        assert!(slots.waiting.is_empty());
    }

    #[test]
    fn test_parse_property_changes() {
        let cases = [
            (json!({"event": "property-change", "id": 1, "name": "pause", "data": false}), Message::Event(MediaEvent::Playing)),
            (json!({"event": "property-change", "id": 1, "name": "pause", "data": true}), Message::Event(MediaEvent::Paused)),
            (json!({"event": "property-change", "id": 2, "name": "eof-reached", "data": true}), Message::Event(MediaEvent::Ended)),
            (json!({"event": "property-change", "id": 2, "name": "eof-reached", "data": false}), Message::Other),
            (json!({"event": "property-change", "id": 2, "name": "eof-reached"}), Message::Other),
            (json!({"event": "shutdown"}), Message::Shutdown),
            (json!({"event": "file-loaded"}), Message::Other),
        ];
        for (message, expected) in cases {
            assert_eq!(parse_message(&message), expected, "{message}");
        }
    }
}
