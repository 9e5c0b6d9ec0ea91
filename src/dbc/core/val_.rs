use crate::dbc::core::strings;
use crate::dbc::types::ValueDescriptions;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

/// Decode a `VAL_` line attaching value descriptions to a signal or an
/// environment variable.
pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // VAL_ 960 Key_Position 0 "Off" 1 "Acc" 2 "Run";
    // VAL_ EnvKlemme15 0 "Aus" 1 "Ein";
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("VAL_") => {}
        _ => return,
    }

    let Some(target) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "VAL_ line names no target".to_string(),
        );
        return;
    };

    if let Ok(message_id) = target.parse::<u32>() {
        // Signal form: the signal name follows the message id.
        let Some(signal_name) = parts.next() else {
            log.push(
                DiagnosticKind::ParseError,
                format!("VAL_ {message_id} names no signal"),
            );
            return;
        };
        let rest: String = parts.collect::<Vec<_>>().join(" ");
        let Some(descriptions) = value_pairs(&rest) else {
            log.push(
                DiagnosticKind::ParseError,
                format!("invalid value descriptions on VAL_ {message_id} {signal_name}"),
            );
            return;
        };

        match net.lookup_signal_mut(message_id, signal_name) {
            Some(sig) => sig.value_descriptions = descriptions,
            None => log.push(
                DiagnosticKind::DanglingReference,
                format!("VAL_ references unknown signal '{signal_name}' in message {message_id}"),
            ),
        }
    } else {
        // Environment variable form.
        let rest: String = parts.collect::<Vec<_>>().join(" ");
        let Some(descriptions) = value_pairs(&rest) else {
            log.push(
                DiagnosticKind::ParseError,
                format!("invalid value descriptions on VAL_ {target}"),
            );
            return;
        };

        match net.lookup_env_variable_mut(target) {
            Some(var) => var.value_descriptions = descriptions,
            None => log.push(
                DiagnosticKind::DanglingReference,
                format!("VAL_ references unknown environment variable '{target}'"),
            ),
        }
    }
}

/// Parse an alternating `value "label"` sequence. Empty input yields an
/// empty map; a trailing value with no label fails.
pub(crate) fn value_pairs(s: &str) -> Option<ValueDescriptions> {
    let mut descriptions: ValueDescriptions = ValueDescriptions::new();
    let mut rest: &str = s.trim();

    while !rest.is_empty() {
        let value_end: usize = rest.find(char::is_whitespace)?;
        let value: i64 = rest[..value_end].parse().ok()?;
        let (label, label_end) = strings::take_quoted(&rest[value_end..])?;
        descriptions.insert(value, label);
        rest = rest[value_end + label_end..].trim_start();
    }
    Some(descriptions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::diagnostics::Status;
    use crate::dbc::types::signal::Signal;

    #[test]
    fn test_value_pairs() {
        let pairs: ValueDescriptions = value_pairs(r#"0 "Off" 1 "Acc" -1 "Fault state""#).unwrap();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&-1).map(String::as_str), Some("Fault state"));
        assert_eq!(value_pairs("7"), None);
        assert!(value_pairs("").unwrap().is_empty());
    }

    #[test]
    fn test_decode_signal_form() {
        let mut net: Network = Network::default();
        let msg = net.add_message_if_absent(960, "Key_Status", 4, "BCM");
        let mut sig: Signal = Signal::default();
        sig.name = "Key_Position".to_string();
        msg.add_signal_if_absent(sig);

        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(
            &mut net,
            &mut log,
            r#"VAL_ 960 Key_Position 0 "Off" 1 "Acc";"#,
        );
        let sig = net.lookup_signal(960, "Key_Position").unwrap();
        assert_eq!(sig.value_descriptions.len(), 2);
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_env_var_form() {
        let mut net: Network = Network::default();
        net.add_env_variable_if_absent("EnvKlemme15");
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"VAL_ EnvKlemme15 0 "Aus" 1 "Ein";"#);
        let var = net.lookup_env_variable("EnvKlemme15").unwrap();
        assert_eq!(var.value_descriptions.len(), 2);
    }

    #[test]
    fn test_decode_dangling_target() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"VAL_ 1 Nope 0 "x";"#);
        assert!(log.status().contains(Status::WARN_DANGLING_REFERENCE));
    }
}
