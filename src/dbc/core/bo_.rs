use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

/// Decode a `BO_` line and open the message scope for the `SG_` lines that
/// follow. Returns the message id the caller should treat as current, or
/// `None` when the line was dropped.
pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) -> Option<u32> {
    // Example: BO_ 960 Key_Status: 4 BCM
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BO_") => {}
        _ => return None,
    }

    let Some(id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            "BO_ line carries no numeric identifier".to_string(),
        );
        return None;
    };

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BO_ {id} carries no message name"),
        );
        return None;
    };
    let name: &str = name_token.trim_end_matches(':');

    // The colon may be glued to the name or stand alone.
    let mut size_token: Option<&str> = parts.next();
    if size_token == Some(":") {
        size_token = parts.next();
    }
    let Some(size) = size_token.and_then(|t| t.parse::<u16>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BO_ {id} carries no payload size"),
        );
        return None;
    };

    let transmitter_token: &str = parts.next().unwrap_or("Vector__XXX");
    let transmitter: &str = if transmitter_token == "Vector__XXX" {
        ""
    } else {
        transmitter_token
    };

    if net.messages.contains_key(&id) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("message id {id} is declared twice; keeping '{}'", net.messages[&id].name),
        );
        return None;
    }

    net.add_message_if_absent(id, name, size, transmitter);
    Some(id)
}
