use crate::dbc::core::attributes::value_token;
use crate::dbc::types::attributes::{AttributeRelation, AttributeValue, RelationKind};
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // BA_REL_ "EnvAccess" BU_EV_REL_ Gateway EnvTemp 1;
    // BA_REL_ "TxTimeout" BU_BO_REL_ Gateway 960 100;
    // BA_REL_ "RxTimeout" BU_SG_REL_ Gateway SG_ 960 Key_Position 100;
    let line: &str = line.trim().trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("BA_REL_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "BA_REL_ line carries no attribute name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_matches('"');

    let Some(definition) = net.attribute_definitions.get(name).cloned() else {
        log.push(
            DiagnosticKind::UnknownAttribute,
            format!("value for undefined relation attribute '{name}'"),
        );
        return;
    };

    let relation_tag: &str = parts.next().unwrap_or("");
    let Some(node) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_REL_ \"{name}\" names no node"),
        );
        return;
    };
    if net.lookup_node(node).is_none() {
        log.push(
            DiagnosticKind::DanglingReference,
            format!("BA_REL_ \"{name}\" references unknown node '{node}'"),
        );
        return;
    }

    let kind: RelationKind = match relation_tag {
        "BU_EV_REL_" => {
            let Some(env_var) = parts.next() else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("BA_REL_ \"{name}\" names no environment variable"),
                );
                return;
            };
            if net.lookup_env_variable(env_var).is_none() {
                log.push(
                    DiagnosticKind::DanglingReference,
                    format!("BA_REL_ \"{name}\" references unknown environment variable '{env_var}'"),
                );
                return;
            }
            RelationKind::ControlUnitEnvVar {
                node: node.to_string(),
                env_var: env_var.to_string(),
            }
        }
        "BU_BO_REL_" => {
            let Some(message_id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("BA_REL_ \"{name}\" carries no message id"),
                );
                return;
            };
            if net.lookup_message(message_id).is_none() {
                log.push(
                    DiagnosticKind::DanglingReference,
                    format!("BA_REL_ \"{name}\" references unknown message {message_id}"),
                );
                return;
            }
            RelationKind::NodeTxMessage {
                node: node.to_string(),
                message_id,
            }
        }
        "BU_SG_REL_" => {
            // The signal reference repeats the SG_ tag.
            if parts.next() != Some("SG_") {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("BA_REL_ \"{name}\" BU_SG_REL_ carries no SG_ tag"),
                );
                return;
            }
            let message_id: Option<u32> = parts.next().and_then(|t| t.parse().ok());
            let signal: Option<&str> = parts.next();
            let (Some(message_id), Some(signal)) = (message_id, signal) else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("BA_REL_ \"{name}\" names no signal"),
                );
                return;
            };
            if net.lookup_signal(message_id, signal).is_none() {
                log.push(
                    DiagnosticKind::DanglingReference,
                    format!(
                        "BA_REL_ \"{name}\" references unknown signal '{signal}' in message {message_id}"
                    ),
                );
                return;
            }
            RelationKind::NodeMappedRxSignal {
                node: node.to_string(),
                message_id,
                signal: signal.to_string(),
            }
        }
        other => {
            log.push(
                DiagnosticKind::ParseError,
                format!("unknown relation tag '{other}' on BA_REL_ \"{name}\""),
            );
            return;
        }
    };

    let tail: String = parts.collect::<Vec<_>>().join(" ");
    let Some((raw_value, quoted)) = value_token(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("BA_REL_ \"{name}\" carries no value"),
        );
        return;
    };
    let Some(value) = AttributeValue::from_token(&definition, &raw_value, quoted) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("value '{raw_value}' does not fit the declared type of '{name}'"),
        );
        return;
    };

    net.add_attribute_relation(AttributeRelation {
        name: name.to_string(),
        kind,
        value,
    });
}
