//! Serial port transport implementation

use super::{LinkError, LinkTransport};
use crate::config::LinkSettings;
use async_trait::async_trait;
use bytes::Bytes;
use serialport::SerialPort;
use std::io::{Read, Write};
use std::time::Duration;

/// Serial transport backed by a blocking [`serialport`] handle.
///
/// `receive` checks `bytes_to_read` before touching the port, so a poll
/// with nothing pending returns immediately and the submission path is
/// never held up longer than one short read.
pub struct SerialPortTransport {
    settings: LinkSettings,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    /// Create a transport for the configured port; nothing is opened yet.
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            port: None,
        }
    }
}

#[async_trait]
impl LinkTransport for SerialPortTransport {
    async fn connect(&mut self) -> Result<(), LinkError> {
        let port = serialport::new(&self.settings.port, self.settings.baud_rate)
            .timeout(Duration::from_millis(self.settings.read_timeout_ms))
            .open()
            .map_err(|e| LinkError::OpenFailure(format!("{}: {}", self.settings.port, e)))?;
        self.port = Some(port);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.port = None;
    }

    fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    async fn send(&mut self, data: &[u8]) -> Result<(), LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;
        port.write_all(data)
            .map_err(|e| LinkError::WriteFailure(e.to_string()))?;
        port.flush()
            .map_err(|e| LinkError::WriteFailure(e.to_string()))?;
        Ok(())
    }

    async fn receive(&mut self) -> Result<Bytes, LinkError> {
        let port = self.port.as_mut().ok_or(LinkError::NotConnected)?;

        let pending = port
            .bytes_to_read()
            .map_err(|e| LinkError::ReadFailure(e.to_string()))? as usize;
        if pending == 0 {
            return Ok(Bytes::new());
        }

        let mut buffer = vec![0u8; pending.min(4096)];
        match port.read(&mut buffer) {
            Ok(0) => Ok(Bytes::new()),
            Ok(n) => {
                buffer.truncate(n);
                Ok(Bytes::from(buffer))
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(Bytes::new()),
            Err(e) => Err(LinkError::ReadFailure(e.to_string())),
        }
    }

    fn connection_info(&self) -> String {
        format!("{} @ {} baud", self.settings.port, self.settings.baud_rate)
    }
}

/// List serial ports visible on this machine.
pub fn list_ports() -> Result<Vec<serialport::SerialPortInfo>, LinkError> {
    serialport::available_ports().map_err(|e| LinkError::OpenFailure(e.to_string()))
}
