use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected format:
    // CM_ "Comment regarding the network";
    match strings::take_quoted(line) {
        Some((text, _)) => net.comment = text,
        None => log.push(
            DiagnosticKind::ParseError,
            "CM_ line carries no quoted comment".to_string(),
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
        decode(&mut net, &mut log, r#"CM_ "Body control network";"#);
        assert_eq!(net.comment, "Body control network");
    }

    #[test]
    fn test_decode_multiline() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "CM_ \"first line\nsecond line\";");
        assert_eq!(net.comment, "first line\nsecond line");
    }
}
