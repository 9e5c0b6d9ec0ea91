use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected format:
    // CM_ BU_ NodeName "Comment regarding the node";
    let mut parts = line.split_ascii_whitespace();
    let (Some("CM_"), Some("BU_"), Some(node_name)) = (parts.next(), parts.next(), parts.next())
    else {
        return;
    };

    let Some((text, _)) = strings::take_quoted(line) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("CM_ BU_ {node_name} carries no quoted comment"),
        );
        return;
    };

    match net.lookup_node_mut(node_name) {
        Some(node) => node.comment = text,
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("CM_ references unknown node '{node_name}'"),
        ),
    }
}
