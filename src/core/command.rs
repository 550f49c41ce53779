//! Logical command parsing and wire encoding
//!
//! Maps user-typed or UI-issued input onto the device's single-line command
//! protocol (`ERASE`, `WRITE:<data>`, `READ:<n>`, `EXPORT`). Parsing is
//! total: unknown shapes pass through verbatim and the device decides
//! validity, which keeps the translator forward compatible with firmware
//! commands it has never heard of.

use std::fmt;

/// Parsed, structured representation of user intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalCommand {
    /// Erase the entire memory
    Erase,
    /// Write text data starting at address zero
    Write(String),
    /// Read the first `n` bytes
    Read(u32),
    /// Dump the full memory as a hex listing
    Export,
    /// Show the help text; intercepted before the wire
    Help,
    /// End the session; intercepted before the wire
    Quit,
    /// Unrecognized input forwarded verbatim
    Raw(String),
    /// Empty input; the session engine discards it
    Noop,
}

/// Exact text line transmitted to the device, terminator excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireCommand(String);

impl WireCommand {
    /// Wire text without the line terminator
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WireCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse one line of user input into a [`LogicalCommand`].
///
/// The line is trimmed and upper-cased before keyword matching. A leading
/// `READ` or `WRITE` token consumes the remainder as its argument, in both
/// the `READ 256` and `READ:256` separator forms. `READ` only narrows when
/// the argument parses as a positive integer; `WRITE` only narrows when a
/// payload is present. Everything else, including shapes that almost match,
/// falls through to [`LogicalCommand::Raw`].
pub fn translate(input: &str) -> LogicalCommand {
    let norm = input.trim().to_uppercase();

    match norm.as_str() {
        "" => return LogicalCommand::Noop,
        "ERASE" => return LogicalCommand::Erase,
        "EXPORT" => return LogicalCommand::Export,
        "HELP" => return LogicalCommand::Help,
        "EXIT" | "QUIT" => return LogicalCommand::Quit,
        _ => {}
    }

    if let Some(arg) = split_argument(&norm, "READ") {
        if let Ok(n) = arg.trim().parse::<u32>() {
            if n > 0 {
                return LogicalCommand::Read(n);
            }
        }
        return LogicalCommand::Raw(norm);
    }

    if let Some(payload) = split_argument(&norm, "WRITE") {
        if !payload.is_empty() {
            return LogicalCommand::Write(payload.to_string());
        }
        return LogicalCommand::Raw(norm);
    }

    LogicalCommand::Raw(norm)
}

/// Split `line` after a leading `keyword` followed by `:` or a single
/// whitespace character, returning the remainder with internal whitespace
/// intact.
fn split_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    let first = rest.chars().next()?;
    if first == ':' || first.is_whitespace() {
        Some(&rest[first.len_utf8()..])
    } else {
        None
    }
}

/// Encode a [`LogicalCommand`] as its wire line.
///
/// Side-effect-free and total over the wire-able variants. `Help`, `Quit`
/// and `Noop` have no wire form (the session engine intercepts them first)
/// and yield `None`.
pub fn to_wire(cmd: &LogicalCommand) -> Option<WireCommand> {
    let wire = match cmd {
        LogicalCommand::Erase => "ERASE".to_string(),
        LogicalCommand::Write(payload) => format!("WRITE:{}", payload),
        LogicalCommand::Read(n) => format!("READ:{}", n),
        LogicalCommand::Export => "EXPORT".to_string(),
        LogicalCommand::Raw(text) => text.clone(),
        LogicalCommand::Help | LogicalCommand::Quit | LogicalCommand::Noop => return None,
    };
    Some(WireCommand(wire))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_keywords() {
        assert_eq!(translate("erase"), LogicalCommand::Erase);
        assert_eq!(translate("  EXPORT "), LogicalCommand::Export);
        assert_eq!(translate("help"), LogicalCommand::Help);
        assert_eq!(translate("exit"), LogicalCommand::Quit);
        assert_eq!(translate("Quit"), LogicalCommand::Quit);
    }

    #[test]
    fn read_both_separator_forms() {
        assert_eq!(translate("read 100"), LogicalCommand::Read(100));
        assert_eq!(translate("READ:256"), LogicalCommand::Read(256));
        assert_eq!(translate("read  42 "), LogicalCommand::Read(42));
    }

    #[test]
    fn read_with_bad_count_stays_raw() {
        assert_eq!(
            translate("read zero"),
            LogicalCommand::Raw("READ ZERO".to_string())
        );
        assert_eq!(translate("read 0"), LogicalCommand::Raw("READ 0".to_string()));
        assert_eq!(translate("read -5"), LogicalCommand::Raw("READ -5".to_string()));
    }

    #[test]
    fn write_preserves_internal_whitespace() {
        assert_eq!(
            translate("write this is  test data"),
            LogicalCommand::Write("THIS IS  TEST DATA".to_string())
        );
        assert_eq!(
            translate("WRITE:hello world"),
            LogicalCommand::Write("HELLO WORLD".to_string())
        );
    }

    #[test]
    fn write_without_payload_stays_raw() {
        assert_eq!(translate("write"), LogicalCommand::Raw("WRITE".to_string()));
        assert_eq!(translate("WRITE:"), LogicalCommand::Raw("WRITE:".to_string()));
    }

    #[test]
    fn unknown_input_passes_through_normalized() {
        assert_eq!(
            translate("  status now "),
            LogicalCommand::Raw("STATUS NOW".to_string())
        );
        // A near-miss keyword is not narrowed.
        assert_eq!(translate("READY"), LogicalCommand::Raw("READY".to_string()));
    }

    #[test]
    fn translation_is_total() {
        assert_eq!(translate(""), LogicalCommand::Noop);
        assert_eq!(translate("   "), LogicalCommand::Noop);
        // Non-ASCII input never panics, it just passes through.
        assert_eq!(
            translate("schreibe daten ä"),
            LogicalCommand::Raw("SCHREIBE DATEN Ä".to_string())
        );
    }

    #[test]
    fn wire_forms() {
        assert_eq!(to_wire(&LogicalCommand::Erase).unwrap().as_str(), "ERASE");
        assert_eq!(to_wire(&LogicalCommand::Export).unwrap().as_str(), "EXPORT");
        assert_eq!(
            to_wire(&LogicalCommand::Read(100)).unwrap().as_str(),
            "READ:100"
        );
        assert_eq!(
            to_wire(&LogicalCommand::Write("A  B C".to_string()))
                .unwrap()
                .as_str(),
            "WRITE:A  B C"
        );
        assert_eq!(
            to_wire(&LogicalCommand::Raw("PING".to_string()))
                .unwrap()
                .as_str(),
            "PING"
        );
    }

    #[test]
    fn session_commands_have_no_wire_form() {
        assert_eq!(to_wire(&LogicalCommand::Help), None);
        assert_eq!(to_wire(&LogicalCommand::Quit), None);
        assert_eq!(to_wire(&LogicalCommand::Noop), None);
    }

    #[test]
    fn typed_read_reaches_the_wire_unchanged() {
        let cmd = translate("read 100");
        assert_eq!(to_wire(&cmd).unwrap().as_str(), "READ:100");
    }
}
