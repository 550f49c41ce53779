//! CLI support: exit codes and event rendering

use crate::core::session::{EventKind, SessionEvent};

/// Exit code constants for automation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes;

impl ExitCodes {
    /// Success
    pub const SUCCESS: u8 = 0;

    /// General error
    pub const ERROR: u8 = 1;

    /// Invalid arguments
    pub const INVALID_ARGS: u8 = 2;

    /// Connection failed
    pub const CONNECTION_FAILED: u8 = 3;

    /// Port not found
    pub const PORT_NOT_FOUND: u8 = 14;
}

/// Render one session event as a display line.
///
/// The tag mirrors the classification: `[!]` error, `[+]` success, `[>]`
/// device response, `[i]` session info.
pub fn render_event(event: &SessionEvent, show_timestamps: bool) -> String {
    let (tag, text) = match &event.kind {
        EventKind::Info(text) => ("[i]", text),
        EventKind::Success(text) => ("[+]", text),
        EventKind::Response(text) => ("[>]", text),
        EventKind::Error(text) => ("[!]", text),
    };
    if show_timestamps {
        format!("{} {} {}", event.at.format("%H:%M:%S"), tag, text)
    } else {
        format!("{} {}", tag, text)
    }
}

/// Render one session event as a JSON line for scripting.
pub fn render_event_json(event: &SessionEvent) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
}
