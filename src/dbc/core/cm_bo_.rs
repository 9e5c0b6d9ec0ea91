use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected format:
    // CM_ BO_ 960 "Comment regarding the message";
    let mut parts = line.split_ascii_whitespace();
    let (Some("CM_"), Some("BO_"), Some(id_token)) = (parts.next(), parts.next(), parts.next())
    else {
        return;
    };

    let Ok(id) = id_token.parse::<u32>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid message id '{id_token}' in CM_ BO_ line"),
        );
        return;
    };

    let Some((text, _)) = strings::take_quoted(line) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("CM_ BO_ {id} carries no quoted comment"),
        );
        return;
    };

    match net.lookup_message_mut(id) {
        Some(msg) => msg.comment = text,
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("CM_ references unknown message {id}"),
        ),
    }
}
