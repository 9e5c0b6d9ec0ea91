use crate::dbc::core::val_;
use crate::dbc::types::ValueDescriptions;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: VAL_TABLE_ GearTable 0 "N" 1 "D" 2 "R";
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("VAL_TABLE_") => {}
        _ => return,
    }

    let Some(name) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "VAL_TABLE_ line carries no table name".to_string(),
        );
        return;
    };

    let rest: String = parts.collect::<Vec<_>>().join(" ");
    let Some(descriptions) = val_::value_pairs(&rest) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid value descriptions in VAL_TABLE_ {name}"),
        );
        return;
    };

    if net.value_tables.contains_key(name) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("value table '{name}' is declared twice"),
        );
        return;
    }
    net.value_tables.insert(name.to_string(), descriptions);
}
