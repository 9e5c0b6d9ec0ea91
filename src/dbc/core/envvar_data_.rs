use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::env_variable::EnvVarType;
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: ENVVAR_DATA_ EnvBlob : 16;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("ENVVAR_DATA_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "ENVVAR_DATA_ line carries no variable name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_end_matches(':');

    let mut size_token: Option<&str> = parts.next();
    if size_token == Some(":") {
        size_token = parts.next();
    }
    let Some(data_size) = size_token.and_then(|t| t.parse::<u32>().ok()) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid data size on ENVVAR_DATA_ {name}"),
        );
        return;
    };

    match net.lookup_env_variable_mut(name) {
        Some(var) => {
            var.data_size = data_size;
            var.var_type = EnvVarType::Data;
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("ENVVAR_DATA_ references unknown environment variable '{name}'"),
        ),
    }
}
