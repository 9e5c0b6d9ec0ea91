use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: VERSION "1.0.2"
    match strings::take_quoted(line) {
        Some((text, _)) => net.version = text,
        None => log.push(
            DiagnosticKind::ParseError,
            "VERSION line carries no quoted string".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"VERSION "1.0.2""#);
        assert_eq!(net.version, "1.0.2");
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_empty_version() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"VERSION """#);
        assert_eq!(net.version, "");
        assert!(log.status().is_ok());
    }
}
