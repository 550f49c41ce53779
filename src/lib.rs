//! # Framlink Core Library
//!
//! Session engine for driving a FRAM memory-storage microcontroller over a
//! serial link:
//!
//! - Background serial read loop with line framing
//! - Translation of user input into the device wire protocol
//!   (`ERASE`, `WRITE:<data>`, `READ:<n>`, `EXPORT`)
//! - Protected-prompt line editing with input sanitization
//! - Classified, timestamped session events for a display front-end
//!
//! ## Example
//!
//! ```rust,no_run
//! use framlink_core::{LinkSettings, SerialLink, SerialPortTransport, SessionEngine};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let settings = LinkSettings::new("COM6", 115200);
//!     let transport = SerialPortTransport::new(settings);
//!     let link = SerialLink::new(Box::new(transport), Duration::from_millis(20));
//!
//!     let mut engine = SessionEngine::new(link, 1024);
//!     let mut events = engine.subscribe();
//!     engine.start();
//!     engine.connect().await;
//!
//!     engine.submit("read 256").await;
//!     while let Ok(event) = events.recv().await {
//!         println!("{:?}", event.kind);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;

// Re-exports for convenience
pub use crate::config::{AppConfig, LinkSettings, TerminalSettings};
pub use crate::core::command::{to_wire, translate, LogicalCommand, WireCommand};
pub use crate::core::input::{sanitize, LineEditor};
pub use crate::core::link::{LinkEvent, SerialLink};
pub use crate::core::session::{
    classify, EventKind, LinkStatus, SessionEngine, SessionEvent, HELP_TEXT,
};
pub use crate::core::transport::{list_ports, LinkError, LinkTransport, SerialPortTransport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
