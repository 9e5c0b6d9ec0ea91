use crate::dbc::core::strings::collect_all_quoted;
use crate::dbc::types::attributes::{AttributeDefinition, AttributeObjectType, AttributeValueType};
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // BA_DEF_ "DBName" STRING;
    // BA_DEF_ BO_ "GenMsgCycleTime" INT 0 10000;
    // BA_DEF_ SG_ "GenSigStartValue" FLOAT 0 100000;
    // BA_DEF_ BU_ "NmNode" ENUM "No","Yes";
    // BA_DEF_REL_ BU_SG_REL_ "GenSigTimeout" INT 0 65535;

    // Keep a copy to extract the quoted enum values later.
    let line_copy: &str = line.trim().trim_end_matches(';');
    let mut parts = line_copy.split_ascii_whitespace();

    let relation: bool = match parts.next() {
        Some("BA_DEF_") => false,
        Some("BA_DEF_REL_") => true,
        _ => return,
    };

    // Optional object tag; a quoted token means the definition is network-level.
    let Some(mut token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "attribute definition carries no name".to_string(),
        );
        return;
    };
    let object_type: AttributeObjectType = if token.starts_with('"') {
        AttributeObjectType::Network
    } else {
        let Some(tag) = AttributeObjectType::from_dbc_tag(token) else {
            log.push(
                DiagnosticKind::ParseError,
                format!("unknown attribute object tag '{token}'"),
            );
            return;
        };
        let Some(next) = parts.next() else {
            log.push(
                DiagnosticKind::ParseError,
                "attribute definition carries no name".to_string(),
            );
            return;
        };
        token = next;
        tag
    };
    if object_type.is_relation() != relation {
        log.push(
            DiagnosticKind::ParseError,
            format!(
                "object tag '{}' does not belong in a {} statement",
                object_type.dbc_tag(),
                if relation { "BA_DEF_REL_" } else { "BA_DEF_" }
            ),
        );
        return;
    }

    let name: &str = token.trim_matches('"');

    let Some(kind_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("attribute definition '{name}' carries no value type"),
        );
        return;
    };

    let value_type: AttributeValueType = match kind_token {
        "STRING" => AttributeValueType::String,
        "INT" => {
            let min: Option<i64> = parts.next().and_then(|t| t.parse().ok());
            let max: Option<i64> = parts.next().and_then(|t| t.parse().ok());
            let (Some(min), Some(max)) = (min, max) else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("invalid INT bounds on attribute definition '{name}'"),
                );
                return;
            };
            AttributeValueType::Int { min, max }
        }
        "HEX" => {
            let min: Option<u64> = parts.next().and_then(|t| t.parse().ok());
            let max: Option<u64> = parts.next().and_then(|t| t.parse().ok());
            let (Some(min), Some(max)) = (min, max) else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("invalid HEX bounds on attribute definition '{name}'"),
                );
                return;
            };
            AttributeValueType::Hex { min, max }
        }
        "FLOAT" => {
            let min: Option<f64> = parts.next().and_then(|t| t.parse().ok());
            let max: Option<f64> = parts.next().and_then(|t| t.parse().ok());
            let (Some(min), Some(max)) = (min, max) else {
                log.push(
                    DiagnosticKind::ParseError,
                    format!("invalid FLOAT bounds on attribute definition '{name}'"),
                );
                return;
            };
            AttributeValueType::Float { min, max }
        }
        "ENUM" => {
            let mut quoted: Vec<String> = collect_all_quoted(line_copy);
            if !quoted.is_empty() {
                quoted.remove(0); // remove the attribute name
            }
            AttributeValueType::Enum(quoted)
        }
        other => {
            log.push(
                DiagnosticKind::ParseError,
                format!("unknown attribute value type '{other}' on definition '{name}'"),
            );
            return;
        }
    };

    if net.attribute_definitions.contains_key(name) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("attribute '{name}' is defined twice"),
        );
        return;
    }
    net.attribute_definitions.insert(
        name.to_string(),
        AttributeDefinition {
            name: name.to_string(),
            object_type,
            value_type,
        },
    );
}
