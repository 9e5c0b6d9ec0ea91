use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;
use crate::dbc::types::signal::ExtendedValueType;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: SIG_VALTYPE_ 960 FloatSignal : 1;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("SIG_VALTYPE_") => {}
        _ => return,
    }

    let Some(id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            "SIG_VALTYPE_ line carries no numeric identifier".to_string(),
        );
        return;
    };
    let Some(signal_name) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SIG_VALTYPE_ {id} names no signal"),
        );
        return;
    };

    let mut digit_token: Option<&str> = parts.next();
    if digit_token == Some(":") {
        digit_token = parts.next();
    }
    let extended: Option<ExtendedValueType> = digit_token
        .map(|t| t.trim_start_matches(':'))
        .and_then(|t| t.parse::<u32>().ok())
        .and_then(ExtendedValueType::from_dbc_digit);
    let Some(extended) = extended else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid extended value type on SIG_VALTYPE_ {id} {signal_name}"),
        );
        return;
    };

    match net.lookup_signal_mut(id, signal_name) {
        Some(sig) => sig.extended_value_type = extended,
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("SIG_VALTYPE_ references unknown signal '{signal_name}' in message {id}"),
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
        sig.name = "FloatSignal".to_string();
        msg.add_signal_if_absent(sig);

        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "SIG_VALTYPE_ 960 FloatSignal : 1;");
        assert_eq!(
            net.lookup_signal(960, "FloatSignal").unwrap().extended_value_type,
            ExtendedValueType::Float
        );
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_invalid_digit() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "SIG_VALTYPE_ 960 S : 9;");
        assert!(log.status().is_err());
    }
}
