use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::env_variable::{AccessType, EnvVarType, EnvironmentVariable};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: EV_ EnvKlemme15 : 0 [0|1] "" 0 3 DUMMY_NODE_VECTOR8000 Gateway,BCM;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("EV_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "EV_ line carries no variable name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_end_matches(':');

    // The colon may be glued to the name or stand alone.
    let mut type_token: Option<&str> = parts.next();
    if type_token == Some(":") {
        type_token = parts.next();
    }
    let var_type: EnvVarType = match type_token {
        Some("0") => EnvVarType::Integer,
        Some("1") => EnvVarType::Float,
        other => {
            log.push(
                DiagnosticKind::ParseError,
                format!("invalid type '{}' on EV_ {name}", other.unwrap_or("")),
            );
            return;
        }
    };

    // "[min|max]" — may be split across tokens.
    let mut bounds: String = parts.next().unwrap_or("").to_string();
    while !bounds.ends_with(']') {
        let Some(tok) = parts.next() else { break };
        bounds.push(' ');
        bounds.push_str(tok);
    }
    let inner: &str = bounds.trim_start_matches('[').trim_end_matches(']');
    let mut nums = inner.split('|').map(str::trim);
    let minimum: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let maximum: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let (Some(minimum), Some(maximum)) = (minimum, maximum) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid [min|max] group '{bounds}' on EV_ {name}"),
        );
        return;
    };

    // Quoted unit, then the scalar tail.
    let tail: String = parts.collect::<Vec<_>>().join(" ");
    let Some((unit, unit_end)) = strings::take_quoted(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("EV_ {name} carries no quoted unit"),
        );
        return;
    };
    let mut tail_it = tail[unit_end..].split_ascii_whitespace();

    let initial_value: Option<f64> = tail_it.next().and_then(|t| t.parse().ok());
    let id: Option<u32> = tail_it.next().and_then(|t| t.parse().ok());
    let (Some(initial_value), Some(id)) = (initial_value, id) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid initial value or identifier on EV_ {name}"),
        );
        return;
    };

    let access_token: &str = tail_it.next().unwrap_or("");
    let Some(access_type) = decode_access_token(access_token) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid access type '{access_token}' on EV_ {name}"),
        );
        return;
    };

    if net.env_variables.contains_key(name) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("environment variable '{name}' is declared twice"),
        );
        return;
    }

    let mut var: EnvironmentVariable = EnvironmentVariable::new(name);
    var.var_type = if access_type.is_string() {
        EnvVarType::String
    } else {
        var_type
    };
    var.minimum = minimum;
    var.maximum = maximum;
    var.unit = unit;
    var.initial_value = initial_value;
    var.id = id;
    var.access_type = access_type;
    for token in tail_it {
        for node in token.split(',') {
            let node: &str = node.trim();
            if !node.is_empty() && node != "Vector__XXX" {
                var.access_nodes.insert(node.to_string());
            }
        }
    }

    net.env_variables.insert(name.to_string(), var);
}

// "DUMMY_NODE_VECTOR<hex>"
fn decode_access_token(token: &str) -> Option<AccessType> {
    let hex: &str = token.strip_prefix("DUMMY_NODE_VECTOR")?;
    u16::from_str_radix(hex, 16).ok().map(AccessType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::diagnostics::Status;

    #[test]
    fn test_decode() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(
            &mut net,
            &mut log,
            r#"EV_ EnvTemp : 1 [-40|215] "degC" 20 7 DUMMY_NODE_VECTOR3 Gateway,BCM;"#,
        );

        let var = net.lookup_env_variable("EnvTemp").unwrap();
        assert_eq!(var.var_type, EnvVarType::Float);
        assert_eq!(var.minimum, -40.0);
        assert_eq!(var.maximum, 215.0);
        assert_eq!(var.unit, "degC");
        assert_eq!(var.initial_value, 20.0);
        assert_eq!(var.id, 7);
        assert!(var.access_type.is_read());
        assert!(var.access_type.is_write());
        assert_eq!(var.access_nodes.len(), 2);
        assert!(log.status().is_ok());
    }

    #[test]
    fn test_decode_string_flag_overrides_type() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        decode(
            &mut net,
            &mut log,
            r#"EV_ EnvName : 0 [0|0] "" 0 1 DUMMY_NODE_VECTOR8000 Vector__XXX;"#,
        );
        let var = net.lookup_env_variable("EnvName").unwrap();
        assert_eq!(var.var_type, EnvVarType::String);
        assert!(var.access_nodes.is_empty());
    }

    #[test]
    fn test_decode_duplicate_keeps_first() {
        let mut net: Network = Network::default();
        let mut log: DiagnosticLog = DiagnosticLog::new(None);
        let line: &str = r#"EV_ Env : 0 [0|1] "" 0 1 DUMMY_NODE_VECTOR0 Vector__XXX;"#;
        decode(&mut net, &mut log, line);
        decode(&mut net, &mut log, line);
        assert_eq!(net.env_variables.len(), 1);
        assert!(log.status().contains(Status::WARN_DUPLICATE_NAME));
    }
}
