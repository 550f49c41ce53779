//! Line-editing input state machine
//!
//! Maintains a single in-progress input line whose prompt prefix is immune
//! to editing: a backspace at or before the guard index leaves the buffer
//! untouched. Committed text runs through [`sanitize`] before it reaches the
//! session engine, because the surrounding terminal renders feedback into
//! the very buffer the user edits and echoed decorations must never be
//! re-submitted as command text.

use regex::Regex;
use std::sync::OnceLock;

/// `HH:MM:SS` timestamps a prior render may have echoed into the buffer
fn timestamp_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}:\d{2}:\d{2}").expect("timestamp pattern"))
}

fn is_decoration(c: char) -> bool {
    c.is_control()
        || matches!(c, '\u{2000}'..='\u{20FF}')
        || matches!(c, '\u{2600}'..='\u{26FF}')
        || matches!(c, '\u{2700}'..='\u{27BF}')
        || matches!(c, '\u{2139}' | '\u{FE0E}' | '\u{FE0F}')
}

/// Strip terminal decorations from a committed line.
///
/// Drops control characters and the symbol ranges used for render prefixes
/// (general punctuation and symbol blocks U+2000–U+20FF, miscellaneous
/// symbols U+2600–U+26FF, dingbats U+2700–U+27BF), removes embedded
/// `HH:MM:SS` timestamps, then collapses whitespace runs to single spaces
/// and trims the ends. Sanitizing already-clean text is a no-op.
pub fn sanitize(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|&c| !is_decoration(c)).collect();
    let without_timestamps = timestamp_pattern().replace_all(&stripped, "");
    without_timestamps
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Editable input line with a protected prompt prefix.
///
/// The guard index pins the cursor lower bound to the position immediately
/// after the prompt; every edit operates at or beyond it. The buffer resets
/// to a fresh prompt after each commit.
#[derive(Debug, Clone)]
pub struct LineEditor {
    buffer: String,
    guard: usize,
    prompt: String,
}

impl LineEditor {
    /// Create an editor and begin the first line.
    pub fn new(prompt: &str) -> Self {
        let mut editor = Self {
            buffer: String::new(),
            guard: 0,
            prompt: prompt.to_string(),
        };
        editor.begin_line();
        editor
    }

    /// Reset the buffer to the prompt and pin the guard just past it.
    pub fn begin_line(&mut self) {
        self.buffer.clear();
        self.buffer.push_str(&self.prompt);
        self.guard = self.buffer.len();
    }

    /// Insert a character at the cursor.
    pub fn on_character(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Delete the character before the cursor.
    ///
    /// A no-op whenever the cursor sits at or before the guard: the buffer
    /// is untouched, so the prompt can never be mutated.
    pub fn on_backspace(&mut self) {
        if self.buffer.len() <= self.guard {
            return;
        }
        self.buffer.pop();
    }

    /// Commit the current line.
    ///
    /// Extracts everything past the guard, sanitizes it, resets for the
    /// next line, and returns the text when non-empty.
    pub fn on_commit(&mut self) -> Option<String> {
        let committed = sanitize(&self.buffer[self.guard..]);
        self.begin_line();
        if committed.is_empty() {
            None
        } else {
            Some(committed)
        }
    }

    /// Current visible line, prompt included.
    pub fn line(&self) -> &str {
        &self.buffer
    }

    /// The prompt prefix.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}
