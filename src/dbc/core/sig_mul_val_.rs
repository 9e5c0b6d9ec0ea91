use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;
use crate::dbc::types::signal::ExtendedMultiplexor;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: SIG_MUL_VAL_ 960 Detail Mode 0-3, 8-15;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("SIG_MUL_VAL_") => {}
        _ => return,
    }

    let Some(id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            "SIG_MUL_VAL_ line carries no numeric identifier".to_string(),
        );
        return;
    };
    let (Some(signal_name), Some(switch_name)) = (parts.next(), parts.next()) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SIG_MUL_VAL_ {id} names no signal/switch pair"),
        );
        return;
    };

    let mut entry: ExtendedMultiplexor = ExtendedMultiplexor {
        switch_name: switch_name.to_string(),
        ranges: Default::default(),
    };
    for token in parts {
        for range in token.split(',') {
            let range: &str = range.trim();
            if range.is_empty() {
                continue;
            }
            let bounds: Option<(u32, u32)> = range.split_once('-').and_then(|(lo, hi)| {
                Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?))
            });
            let Some((lo, hi)) = bounds else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("invalid value range '{range}' on SIG_MUL_VAL_ {id} {signal_name}"),
                );
                return;
            };
            entry.ranges.insert((lo, hi));
        }
    }

    match net.lookup_signal_mut(id, signal_name) {
        Some(sig) => {
            sig.extended_multiplexors
                .insert(switch_name.to_string(), entry);
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("SIG_MUL_VAL_ references unknown signal '{signal_name}' in message {id}"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::signal::Signal;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        let msg = net.add_message_if_absent(960, "Msg", 8, "A");
        let mut sig: Signal = Signal::default();
        sig.name = "Detail".to_string();
        msg.add_signal_if_absent(sig);

        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "SIG_MUL_VAL_ 960 Detail Mode 0-3, 8-15;");

        let sig = net.lookup_signal(960, "Detail").unwrap();
        let entry: &ExtendedMultiplexor = sig.extended_multiplexors.get("Mode").unwrap();
        assert_eq!(entry.switch_name, "Mode");
        assert!(entry.ranges.contains(&(0, 3)));
        assert!(entry.ranges.contains(&(8, 15)));
        assert!(log.status().is_ok());
    }
}
