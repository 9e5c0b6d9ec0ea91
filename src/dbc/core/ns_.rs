use crate::dbc::types::diagnostics::DiagnosticLog;
use crate::dbc::types::network::Network;

/// Decode the `NS_ :` header line. Symbols usually follow one per indented
/// line (appended by the caller via [`append_symbol`]), but inline symbols
/// after the colon are accepted too.
pub(crate) fn decode(net: &mut Network, _log: &mut DiagnosticLog, line: &str) {
    let mut parts = line.split_ascii_whitespace();
    let first: Option<&str> = parts.next();
    if first != Some("NS_") && first != Some("NS_:") {
        return;
    }

    for token in parts {
        if token != ":" {
            net.new_symbols.push(token.to_string());
        }
    }
}

/// One indented continuation line of the `NS_` block.
pub(crate) fn append_symbol(net: &mut Network, token: &str) {
    net.new_symbols.push(token.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_header_and_symbols() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, "NS_ :");
        assert!(net.new_symbols.is_empty());

        append_symbol(&mut net, "CM_");
        append_symbol(&mut net, "BA_DEF_");
        assert_eq!(net.new_symbols, vec!["CM_".to_string(), "BA_DEF_".to_string()]);
    }
}
