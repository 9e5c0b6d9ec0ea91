use crate::dbc::core::attributes::value_token;
use crate::dbc::types::attributes::AttributeValue;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // BA_DEF_DEF_ "DBName" "";
    // BA_DEF_DEF_ "GenMsgCycleTime" 0;
    // BA_DEF_DEF_REL_ "GenSigTimeout" 100;
    let line: &str = line.trim().trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BA_DEF_DEF_") | Some("BA_DEF_DEF_REL_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "attribute default carries no name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_matches('"');

    // Rebuild the remaining tail to preserve spaces inside quoted values.
    let tail: String = parts.collect::<Vec<_>>().join(" ");
    let Some((raw_value, quoted)) = value_token(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("attribute default '{name}' carries no value"),
        );
        return;
    };

    let Some(definition) = net.attribute_definitions.get(name) else {
        log.push(
            DiagnosticKind::UnknownAttribute,
            format!("default for undefined attribute '{name}'"),
        );
        return;
    };

    let Some(value) = AttributeValue::from_token(definition, &raw_value, quoted) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("default '{raw_value}' does not fit the declared type of '{name}'"),
        );
        return;
    };
    net.attribute_defaults.insert(name.to_string(), value);
}
