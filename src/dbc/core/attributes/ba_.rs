use crate::dbc::core::attributes::value_token;
use crate::dbc::types::attributes::{AttributeDefinition, AttributeValue};
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // BA_ "DBName" "TestCAN";
    // BA_ "NmNode" BU_ Gateway 1;
    // BA_ "GenMsgCycleTime" BO_ 960 100;
    // BA_ "GenSigStartValue" SG_ 960 Key_Position 0;
    // BA_ "EvInitial" EV_ EnvTemp 20;
    let line: &str = line.trim().trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BA_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "BA_ line carries no attribute name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_matches('"');

    let Some(definition) = net.attribute_definitions.get(name).cloned() else {
        log.push(
            DiagnosticKind::UnknownAttribute,
            format!("value for undefined attribute '{name}'"),
        );
        return;
    };

    // The token after the name decides the host object.
    let tokens: Vec<&str> = parts.collect();
    match tokens.first().copied() {
        Some("BU_") => attach_node(net, log, name, &definition, &tokens[1..]),
        Some("BO_") => attach_message(net, log, name, &definition, &tokens[1..]),
        Some("SG_") => attach_signal(net, log, name, &definition, &tokens[1..]),
        Some("EV_") => attach_env_variable(net, log, name, &definition, &tokens[1..]),
        Some(_) => {
            // Network-level attribute; the whole tail is the value.
            let Some(value) = parse_value(log, name, &definition, &tokens) else {
                return;
            };
            net.attributes.insert(name.to_string(), value);
        }
        None => log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" carries no value"),
        ),
    }
}

fn attach_node(
    net: &mut Network,
    log: &mut DiagnosticLog,
    name: &str,
    definition: &AttributeDefinition,
    tokens: &[&str],
) {
    let Some((node_name, rest)) = tokens.split_first() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" BU_ names no node"),
        );
        return;
    };
    let Some(value) = parse_value(log, name, definition, rest) else {
        return;
    };
    match net.lookup_node_mut(node_name) {
        Some(node) => {
            node.attributes.insert(name.to_string(), value);
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("BA_ \"{name}\" references unknown node '{node_name}'"),
        ),
    }
}

fn attach_message(
    net: &mut Network,
    log: &mut DiagnosticLog,
    name: &str,
    definition: &AttributeDefinition,
    tokens: &[&str],
) {
    let Some((id_token, rest)) = tokens.split_first() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" BO_ names no message"),
        );
        return;
    };
    let Ok(id) = id_token.parse::<u32>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid message id '{id_token}' on BA_ \"{name}\""),
        );
        return;
    };
    let Some(value) = parse_value(log, name, definition, rest) else {
        return;
    };
    match net.lookup_message_mut(id) {
        Some(msg) => {
            msg.attributes.insert(name.to_string(), value);
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("BA_ \"{name}\" references unknown message {id}"),
        ),
    }
}

fn attach_signal(
    net: &mut Network,
    log: &mut DiagnosticLog,
    name: &str,
    definition: &AttributeDefinition,
    tokens: &[&str],
) {
    let (Some(id_token), Some(signal_name)) = (tokens.first(), tokens.get(1)) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" SG_ names no signal"),
        );
        return;
    };
    let Ok(id) = id_token.parse::<u32>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid message id '{id_token}' on BA_ \"{name}\""),
        );
        return;
    };
    let Some(value) = parse_value(log, name, definition, &tokens[2..]) else {
        return;
    };
    match net.lookup_signal_mut(id, signal_name) {
        Some(sig) => {
            sig.attributes.insert(name.to_string(), value);
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("BA_ \"{name}\" references unknown signal '{signal_name}' in message {id}"),
        ),
    }
}

fn attach_env_variable(
    net: &mut Network,
    log: &mut DiagnosticLog,
    name: &str,
    definition: &AttributeDefinition,
    tokens: &[&str],
) {
    let Some((var_name, rest)) = tokens.split_first() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" EV_ names no environment variable"),
        );
        return;
    };
    let Some(value) = parse_value(log, name, definition, rest) else {
        return;
    };
    match net.lookup_env_variable_mut(var_name) {
        Some(var) => {
            var.attributes.insert(name.to_string(), value);
        }
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("BA_ \"{name}\" references unknown environment variable '{var_name}'"),
        ),
    }
}

fn parse_value(
    log: &mut DiagnosticLog,
    name: &str,
    definition: &AttributeDefinition,
    tokens: &[&str],
) -> Option<AttributeValue> {
    let tail: String = tokens.join(" ");
    let Some((raw_value, quoted)) = value_token(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_ \"{name}\" carries no value"),
        );
        return None;
    };
    let value: Option<AttributeValue> = AttributeValue::from_token(definition, &raw_value, quoted);
    if value.is_none() {
        log.push(
            DiagnosticKind::ParseError,
            format!("value '{raw_value}' does not fit the declared type of '{name}'"),
        );
    }
    value
}
