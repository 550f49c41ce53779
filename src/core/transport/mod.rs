//! Transport seam for the serial link
//!
//! The link drives an externally supplied byte-stream transport through
//! [`LinkTransport`], so the session engine runs identically against real
//! hardware and against an in-memory fake in tests.

mod serial;

pub use serial::{list_ports, SerialPortTransport};

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Link-level error taxonomy
#[derive(Error, Debug)]
pub enum LinkError {
    /// No open connection exists
    #[error("not connected")]
    NotConnected,

    /// Opening the port failed
    #[error("open failed: {0}")]
    OpenFailure(String),

    /// Writing to the port failed
    #[error("write failed: {0}")]
    WriteFailure(String),

    /// Reading from the port failed
    #[error("read failed: {0}")]
    ReadFailure(String),
}

/// Byte-stream transport driven by the serial link
#[async_trait]
pub trait LinkTransport: Send {
    /// Establish the connection.
    async fn connect(&mut self) -> Result<(), LinkError>;

    /// Close the connection. Idempotent.
    async fn disconnect(&mut self);

    /// Whether an open connection exists.
    fn is_connected(&self) -> bool;

    /// Write the full buffer.
    async fn send(&mut self, data: &[u8]) -> Result<(), LinkError>;

    /// Return the bytes currently available, or an empty buffer when
    /// nothing arrived within the read timeout. Never blocks past the
    /// timeout.
    async fn receive(&mut self) -> Result<Bytes, LinkError>;

    /// Human-readable connection summary (port @ baud).
    fn connection_info(&self) -> String;
}
