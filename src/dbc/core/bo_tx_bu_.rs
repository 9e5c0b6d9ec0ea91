use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: BO_TX_BU_ 960 : BCM,Gateway;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BO_TX_BU_") => {}
        _ => return,
    }

    let Some(id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            "BO_TX_BU_ line carries no numeric identifier".to_string(),
        );
        return;
    };

    let Some(msg) = net.lookup_message_mut(id) else {
        log.push(
            DiagnosticKind::DanglingReference,
            format!("BO_TX_BU_ references unknown message {id}"),
        );
        return;
    };

    for token in parts {
        for name in token.trim_start_matches(':').split(',') {
            let name: &str = name.trim();
            if !name.is_empty() && name != "Vector__XXX" {
                msg.additional_transmitters.insert(name.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::diagnostics::Status;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        net.add_message_if_absent(960, "Key_Status", 4, "BCM");
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "BO_TX_BU_ 960 : ABS,Gateway;");

        let msg = net.lookup_message(960).unwrap();
        assert!(msg.additional_transmitters.contains("ABS"));
        assert!(msg.additional_transmitters.contains("Gateway"));
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_unknown_message() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "BO_TX_BU_ 1 : A;");
        assert!(log.status().contains(Status::WARN_DANGLING_REFERENCE));
    }
}
