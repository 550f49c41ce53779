//! Session engine: command submission, inbound classification, event fan-out
//!
//! Composes the translator and the serial link, and republishes everything
//! the link produces as classified, timestamped [`SessionEvent`]s on a
//! broadcast channel. The display collaborator subscribes to that stream
//! and calls [`SessionEngine::submit`]; it never touches the link directly.

use crate::core::command::{self, LogicalCommand};
use crate::core::link::{LinkEvent, SerialLink};
use crate::core::transport::LinkError;
use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// How long [`SessionEngine::shutdown`] waits for the dispatcher
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Connection-status summary consumed by the display collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No open connection
    Disconnected,
    /// Link open, read loop running
    Connected,
    /// An I/O fault terminated the read loop
    Faulted,
}

/// Classified feedback payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EventKind {
    /// Session-level information (command echo, help text)
    Info(String),
    /// Device confirmation (READY, WRITTEN, ERASED)
    Success(String),
    /// Plain device output
    Response(String),
    /// Device-reported or link-level error
    Error(String),
}

/// Classified, timestamped unit of feedback destined for display
#[derive(Debug, Clone, Serialize)]
pub struct SessionEvent {
    /// Emission time
    pub at: DateTime<Local>,
    /// Classified payload
    pub kind: EventKind,
}

impl SessionEvent {
    fn now(kind: EventKind) -> Self {
        Self {
            at: Local::now(),
            kind,
        }
    }
}

/// Classify one inbound device line.
///
/// First match wins over a fixed priority order: a device-reported `ERROR`
/// outranks the success markers even when both substrings are present.
pub fn classify(line: &str) -> EventKind {
    if line.contains("ERROR") {
        EventKind::Error(line.to_string())
    } else if line.contains("WRITTEN") || line.contains("ERASED") || line.contains("READY") {
        EventKind::Success(line.to_string())
    } else {
        EventKind::Response(line.to_string())
    }
}

/// Help text surfaced on the `help` command; mirrors the firmware's
/// command set.
pub const HELP_TEXT: &str = "\
Available commands (device format):
  ERASE           - erase the entire FRAM memory
  WRITE:data      - write text data (e.g. WRITE:Hello World)
  READ:bytes      - read the first N bytes (e.g. READ:256)
  EXPORT          - dump FRAM contents as hex

User-friendly forms:
  read 256, write hello, erase, export

Session commands:
  help            - show this message
  exit, quit      - end the session";

/// Session engine composing translator, line framing and serial link.
pub struct SessionEngine {
    id: Uuid,
    link: SerialLink,
    link_rx: Option<mpsc::UnboundedReceiver<LinkEvent>>,
    event_tx: broadcast::Sender<SessionEvent>,
    status: Arc<RwLock<LinkStatus>>,
    quit_tx: watch::Sender<bool>,
    dispatcher: Option<JoinHandle<()>>,
    stopped: bool,
}

impl SessionEngine {
    /// Build an engine over a link that may not be open yet.
    pub fn new(mut link: SerialLink, event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity);
        let (quit_tx, _) = watch::channel(false);
        let link_rx = link.take_events();
        Self {
            id: Uuid::new_v4(),
            link,
            link_rx,
            event_tx,
            status: Arc::new(RwLock::new(LinkStatus::Disconnected)),
            quit_tx,
            dispatcher: None,
            stopped: false,
        }
    }

    /// Subscribe to the session event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// Current connection-status summary.
    pub fn status(&self) -> LinkStatus {
        *self.status.read()
    }

    /// Receiver that flips to `true` once the user asks to quit.
    pub fn quit_signal(&self) -> watch::Receiver<bool> {
        self.quit_tx.subscribe()
    }

    /// Start the inbound dispatcher.
    ///
    /// Call after [`subscribe`](Self::subscribe) so early events are not
    /// missed. Calling more than once has no effect.
    pub fn start(&mut self) {
        if self.dispatcher.is_some() {
            return;
        }
        let Some(mut rx) = self.link_rx.take() else {
            return;
        };
        let event_tx = self.event_tx.clone();
        let status = Arc::clone(&self.status);
        let id = self.id;

        self.dispatcher = Some(tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    LinkEvent::Ready(info) => {
                        *status.write() = LinkStatus::Connected;
                        tracing::info!(session = %id, connection = %info, "link ready");
                        let _ = event_tx.send(SessionEvent::now(EventKind::Success(format!(
                            "READY: Connected to device ({})",
                            info
                        ))));
                    }
                    LinkEvent::Line(line) => {
                        let _ = event_tx.send(SessionEvent::now(classify(&line)));
                    }
                    LinkEvent::Fault(message) => {
                        *status.write() = LinkStatus::Faulted;
                        tracing::error!(session = %id, error = %message, "link fault");
                        let _ = event_tx.send(SessionEvent::now(EventKind::Error(format!(
                            "Serial error: {}",
                            message
                        ))));
                    }
                }
            }
        }));
    }

    /// Open the serial connection and start streaming inbound lines.
    ///
    /// An open failure becomes an `Error` event rather than tearing the
    /// session down; the collaborator decides whether to offer a reconnect.
    pub async fn connect(&mut self) {
        match self.link.open().await {
            Ok(()) => self.link.start_read_loop(),
            Err(err) => {
                *self.status.write() = LinkStatus::Disconnected;
                tracing::error!(session = %self.id, error = %err, "connect failed");
                self.emit(EventKind::Error(format!("Connection error: {}", err)));
            }
        }
    }

    /// Translate and dispatch one line of user input.
    ///
    /// `help` and `exit`/`quit` are intercepted here and never reach the
    /// wire; empty input is discarded. Everything else is encoded and sent,
    /// with an `Info` event describing the attempt and an `Error` event if
    /// the send failed.
    pub async fn submit(&self, input: &str) {
        match command::translate(input) {
            LogicalCommand::Noop => {}
            LogicalCommand::Help => self.emit(EventKind::Info(HELP_TEXT.to_string())),
            LogicalCommand::Quit => {
                self.emit(EventKind::Info("Ending session".to_string()));
                let _ = self.quit_tx.send(true);
            }
            cmd => {
                let Some(wire) = command::to_wire(&cmd) else {
                    return;
                };
                self.emit(EventKind::Info(format!("Executing: {}", wire)));
                tracing::debug!(session = %self.id, wire = %wire, "submit");
                if let Err(err) = self.link.send(wire.as_str()).await {
                    let text = match err {
                        LinkError::NotConnected => "Not connected to device".to_string(),
                        other => format!("Send error: {}", other),
                    };
                    self.emit(EventKind::Error(text));
                }
            }
        }
    }

    /// Stop the read loop and the dispatcher.
    ///
    /// Idempotent; a second call returns immediately. Once this returns no
    /// further events are emitted.
    pub async fn shutdown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        tracing::info!(session = %self.id, "session shutdown");
        self.link.stop().await;
        if let Some(mut dispatcher) = self.dispatcher.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut dispatcher)
                .await
                .is_err()
            {
                dispatcher.abort();
            }
        }
    }

    fn emit(&self, kind: EventKind) {
        let _ = self.event_tx.send(SessionEvent::now(kind));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_lines_classify_as_error() {
        assert_eq!(
            classify("ERROR: FRAM not found"),
            EventKind::Error("ERROR: FRAM not found".to_string())
        );
    }

    #[test]
    fn success_markers_classify_as_success() {
        assert_eq!(
            classify("WRITTEN OK"),
            EventKind::Success("WRITTEN OK".to_string())
        );
        assert_eq!(
            classify("ERASED: Full FRAM erased successfully"),
            EventKind::Success("ERASED: Full FRAM erased successfully".to_string())
        );
        assert_eq!(
            classify("READY: FRAM initialized"),
            EventKind::Success("READY: FRAM initialized".to_string())
        );
    }

    #[test]
    fn everything_else_classifies_as_response() {
        assert_eq!(
            classify("DATA: hello"),
            EventKind::Response("DATA: hello".to_string())
        );
        assert_eq!(
            classify("BEGIN_EXPORT"),
            EventKind::Response("BEGIN_EXPORT".to_string())
        );
    }

    #[test]
    fn error_outranks_success_markers() {
        assert_eq!(
            classify("READY ERROR"),
            EventKind::Error("READY ERROR".to_string())
        );
        assert_eq!(
            classify("ERROR while WRITTEN"),
            EventKind::Error("ERROR while WRITTEN".to_string())
        );
    }
}
