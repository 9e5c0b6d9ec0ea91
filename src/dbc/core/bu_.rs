use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

/// Decode the BU_ line listing node names and register them in the network.
/// Example: `BU_: ECU1 ECU2 ECU3`
pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Split tokens, skip the "BU_:"
    let mut parts = line.split_ascii_whitespace();
    let first: Option<&str> = parts.next();
    if first != Some("BU_:") && first != Some("BU_") {
        return;
    }

    for name in parts {
        if name == ":" {
            continue;
        }
        if net.nodes.contains_key(name) {
            log.push(
                DiagnosticKind::DuplicateName,
                format!("node '{name}' is declared twice"),
            );
            continue;
        }
        net.add_node_if_absent(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "BU_: BCM ECM Gateway");
        assert_eq!(net.nodes.len(), 3);
        assert!(net.lookup_node("Gateway").is_some());
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_duplicate_warns() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "BU_: BCM BCM");
        assert_eq!(net.nodes.len(), 1);
        assert!(log.status().contains(
            crate::dbc::types::diagnostics::Status::WARN_DUPLICATE_NAME
        ));
    }
}
