use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::message::SignalGroup;
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: SIG_GROUP_ 960 KeyGroup 1 : Key_Position Key_Lock;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("SIG_GROUP_") => {}
        _ => return,
    }

    let Some(id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            "SIG_GROUP_ line carries no numeric identifier".to_string(),
        );
        return;
    };
    let Some(name) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SIG_GROUP_ {id} carries no group name"),
        );
        return;
    };
    let Some(repetitions) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SIG_GROUP_ {id} {name} carries no repetition count"),
        );
        return;
    };

    let signals: Vec<String> = parts
        .filter(|t| *t != ":")
        .map(|t| t.trim_start_matches(':').to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let Some(msg) = net.lookup_message_mut(id) else {
        log.push(
            DiagnosticKind::DanglingReference,
            format!("SIG_GROUP_ references unknown message {id}"),
        );
        return;
    };

    if msg.signal_groups.contains_key(name) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("signal group '{name}' is declared twice in message '{}'", msg.name),
        );
        return;
    }
    msg.signal_groups.insert(
        name.to_string(),
        SignalGroup {
            name: name.to_string(),
            repetitions,
            signals,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        net.add_message_if_absent(960, "Key_Status", 4, "BCM");
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(
            &mut net,
            &mut log,
            "SIG_GROUP_ 960 KeyGroup 1 : Key_Position Key_Lock;",
        );

        let group: &SignalGroup = net
            .lookup_message(960)
            .unwrap()
            .signal_groups
            .get("KeyGroup")
            .unwrap();
        assert_eq!(group.repetitions, 1);
        assert_eq!(group.signals, vec!["Key_Position".to_string(), "Key_Lock".to_string()]);
        assert!(log.status().is_ok());
    }
}
