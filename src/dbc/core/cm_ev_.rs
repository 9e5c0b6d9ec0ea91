use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected format:
    // CM_ EV_ EnvName "Comment regarding the environment variable";
    let mut parts = line.split_ascii_whitespace();
    let (Some("CM_"), Some("EV_"), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
        return;
    };

    let Some((text, _)) = strings::take_quoted(line) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("CM_ EV_ {name} carries no quoted comment"),
        );
        return;
    };

    match net.lookup_env_variable_mut(name) {
        Some(var) => var.comment = text,
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("CM_ references unknown environment variable '{name}'"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        net.add_env_variable_if_absent("EnvTemp");
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(&mut net, &mut log, r#"CM_ EV_ EnvTemp "Cabin temperature";"#);
        assert_eq!(
            net.lookup_env_variable("EnvTemp").unwrap().comment,
            "Cabin temperature"
        );
    }
}
