//! Serial link: connection ownership and the background read loop
//!
//! The link exclusively owns the transport. Inbound bytes are drained by a
//! continuously running tokio task, framed into lines and handed to the
//! session engine over an ordered, non-blocking channel; outbound wire
//! commands are written directly, with no queue in between.

use crate::core::transport::{LinkError, LinkTransport};
use bytes::BytesMut;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long [`SerialLink::stop`] waits for the read loop before aborting it
const STOP_GRACE: Duration = Duration::from_secs(2);

/// Inbound signal from the link to the session engine
#[derive(Debug, Clone)]
pub enum LinkEvent {
    /// Connection established; carries the connection summary
    Ready(String),
    /// One complete device line, decoded and terminator-stripped
    Line(String),
    /// I/O fault that terminated the read loop
    Fault(String),
}

/// Owns the connection and the background read loop.
pub struct SerialLink {
    transport: Arc<tokio::sync::Mutex<Box<dyn LinkTransport>>>,
    event_tx: Option<mpsc::UnboundedSender<LinkEvent>>,
    event_rx: Option<mpsc::UnboundedReceiver<LinkEvent>>,
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    poll_interval: Duration,
}

impl SerialLink {
    /// Wrap a transport. The connection is not opened yet.
    pub fn new(transport: Box<dyn LinkTransport>, poll_interval: Duration) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            transport: Arc::new(tokio::sync::Mutex::new(transport)),
            event_tx: Some(event_tx),
            event_rx: Some(event_rx),
            stop: Arc::new(AtomicBool::new(false)),
            reader: None,
            poll_interval,
        }
    }

    /// Take the inbound event stream. The session engine is its only
    /// consumer.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<LinkEvent>> {
        self.event_rx.take()
    }

    /// Open the connection and announce readiness.
    pub async fn open(&mut self) -> Result<(), LinkError> {
        let mut transport = self.transport.lock().await;
        transport.connect().await?;
        let info = transport.connection_info();
        tracing::info!(connection = %info, "serial link open");
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(LinkEvent::Ready(info));
        }
        Ok(())
    }

    /// Whether an open connection exists right now.
    pub async fn is_open(&self) -> bool {
        self.transport.lock().await.is_connected()
    }

    /// Spawn the background read loop.
    ///
    /// Runs until [`stop`](Self::stop) or an I/O fault; a fault is reported
    /// once and terminates the loop. The loop sleeps its poll interval
    /// outside the transport lock, so `send` is never held up for more than
    /// one short read.
    pub fn start_read_loop(&mut self) {
        if self.reader.is_some() {
            return;
        }
        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let transport = Arc::clone(&self.transport);
        let stop = Arc::clone(&self.stop);
        let poll_interval = self.poll_interval;

        self.reader = Some(tokio::spawn(async move {
            let mut pending = BytesMut::with_capacity(4096);
            while !stop.load(Ordering::SeqCst) {
                let chunk = {
                    let mut transport = transport.lock().await;
                    transport.receive().await
                };
                match chunk {
                    Ok(bytes) if !bytes.is_empty() => {
                        pending.extend_from_slice(&bytes);
                        while let Some(line) = next_line(&mut pending) {
                            if !line.is_empty() {
                                tracing::debug!(line = %line, "device line");
                                let _ = tx.send(LinkEvent::Line(line));
                            }
                        }
                    }
                    Ok(_) => tokio::time::sleep(poll_interval).await,
                    Err(err) => {
                        if !stop.load(Ordering::SeqCst) {
                            tracing::warn!(error = %err, "read loop fault");
                            let _ = tx.send(LinkEvent::Fault(err.to_string()));
                        }
                        break;
                    }
                }
            }
        }));
    }

    /// Write one wire line, appending the terminator.
    ///
    /// A direct, immediate attempt: no queue, no retry. Fails with
    /// [`LinkError::NotConnected`] when no open connection exists.
    pub async fn send(&self, wire: &str) -> Result<(), LinkError> {
        let mut transport = self.transport.lock().await;
        if !transport.is_connected() {
            return Err(LinkError::NotConnected);
        }
        let mut frame = Vec::with_capacity(wire.len() + 1);
        frame.extend_from_slice(wire.as_bytes());
        frame.push(b'\n');
        transport.send(&frame).await
    }

    /// Signal the read loop to exit and close the connection.
    ///
    /// Idempotent and safe to call from outside the read loop's task, or
    /// when the link was never opened. The loop observes the stop flag
    /// within one poll interval; once this returns, no further events are
    /// emitted.
    pub async fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        self.event_tx = None;

        {
            let mut transport = self.transport.lock().await;
            transport.disconnect().await;
        }

        if let Some(mut reader) = self.reader.take() {
            if tokio::time::timeout(STOP_GRACE, &mut reader).await.is_err() {
                reader.abort();
            }
        }
    }
}

/// Split one `\n`-terminated line off the front of `pending`, decoding
/// lossily and stripping the terminator and surrounding whitespace.
fn next_line(pending: &mut BytesMut) -> Option<String> {
    let pos = pending.iter().position(|&b| b == b'\n')?;
    let raw = pending.split_to(pos + 1);
    let body = &raw[..raw.len() - 1];
    Some(String::from_utf8_lossy(body).trim().to_string())
}
