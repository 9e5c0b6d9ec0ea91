use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected format:
    // CM_ SG_ 960 SignalName "Comment regarding the signal";
    let mut parts = line.split_ascii_whitespace();
    let (Some("CM_"), Some("SG_"), Some(id_token), Some(signal_name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return;
    };

    let Ok(id) = id_token.parse::<u32>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid message id '{id_token}' in CM_ SG_ line"),
        );
        return;
    };

    let Some((text, _)) = strings::take_quoted(line) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("CM_ SG_ {id} {signal_name} carries no quoted comment"),
        );
        return;
    };

    match net.lookup_signal_mut(id, signal_name) {
        Some(sig) => sig.comment = text,
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("CM_ references unknown signal '{signal_name}' in message {id}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::diagnostics::Status;
    use crate::dbc::types::signal::Signal;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        let msg = net.add_message_if_absent(960, "Key_Status", 4, "BCM");
        let mut sig: Signal = Signal::default();
        sig.name = "Key_Position".to_string();
        msg.add_signal_if_absent(sig);

        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(
            &mut net,
            &mut log,
            "CM_ SG_ 960 Key_Position \"Ignition key position.\nMulti-line note.\";",
        );
        assert_eq!(
            net.lookup_signal(960, "Key_Position").unwrap().comment,
            "Ignition key position.\nMulti-line note."
        );
    }

    #[test]
    fn test_decode_unknown_signal() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"CM_ SG_ 1 Ghost "boo";"#);
        assert!(log.status().contains(Status::WARN_DANGLING_REFERENCE));
    }
}
