//! User-defined attributes: definitions (`BA_DEF_`), values (`BA_`) and
//! relation attributes (`BA_REL_`).
//!
//! An attribute value always carries the payload type its definition
//! declares; construction goes through [`AttributeValue::from_token`], which
//! consults the [`AttributeDefinition`] so an ill-typed `BA_` line can never
//! produce a value of the wrong variant.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Object class an attribute definition attaches to.
///
/// The last three variants are relation attributes (`BA_DEF_REL_` /
/// `BA_REL_`): attached to a node↔object pair rather than a single object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttributeObjectType {
    #[default]
    Network,
    Node,
    Message,
    Signal,
    EnvironmentVariable,
    ControlUnitEnvVar,
    NodeTxMessage,
    NodeMappedRxSignal,
}

impl AttributeObjectType {
    /// DBC object tag as written after `BA_DEF_` / `BA_DEF_REL_`.
    pub fn dbc_tag(self) -> &'static str {
        match self {
            AttributeObjectType::Network => "",
            AttributeObjectType::Node => "BU_",
            AttributeObjectType::Message => "BO_",
            AttributeObjectType::Signal => "SG_",
            AttributeObjectType::EnvironmentVariable => "EV_",
            AttributeObjectType::ControlUnitEnvVar => "BU_EV_REL_",
            AttributeObjectType::NodeTxMessage => "BU_BO_REL_",
            AttributeObjectType::NodeMappedRxSignal => "BU_SG_REL_",
        }
    }

    pub fn from_dbc_tag(tag: &str) -> Option<AttributeObjectType> {
        match tag {
            "BU_" => Some(AttributeObjectType::Node),
            "BO_" => Some(AttributeObjectType::Message),
            "SG_" => Some(AttributeObjectType::Signal),
            "EV_" => Some(AttributeObjectType::EnvironmentVariable),
            "BU_EV_REL_" => Some(AttributeObjectType::ControlUnitEnvVar),
            "BU_BO_REL_" => Some(AttributeObjectType::NodeTxMessage),
            "BU_SG_REL_" => Some(AttributeObjectType::NodeMappedRxSignal),
            _ => None,
        }
    }

    /// `true` for the `BA_DEF_REL_` object classes.
    pub fn is_relation(self) -> bool {
        matches!(
            self,
            AttributeObjectType::ControlUnitEnvVar
                | AttributeObjectType::NodeTxMessage
                | AttributeObjectType::NodeMappedRxSignal
        )
    }
}

/// Payload type of an attribute, as declared by `BA_DEF_`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValueType {
    Int { min: i64, max: i64 },
    Hex { min: u64, max: u64 },
    Float { min: f64, max: f64 },
    String,
    Enum(Vec<String>),
}

impl Default for AttributeValueType {
    fn default() -> Self {
        AttributeValueType::String
    }
}

/// Attribute definition (`BA_DEF_` / `BA_DEF_REL_`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub object_type: AttributeObjectType,
    pub value_type: AttributeValueType,
}

/// Concrete attribute value stored on a network, node, message, signal or
/// environment variable.
///
/// `Enum` holds the index into the definition's value list, which is how
/// `BA_` lines carry enum values; `BA_DEF_DEF_` defaults for enums carry the
/// label instead and are stored as `String`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Int(i64),
    Hex(u64),
    Float(f64),
    String(String),
    Enum(u32),
}

impl AttributeValue {
    /// Builds a value for `definition` from a raw DBC token.
    ///
    /// `quoted` tells whether the token was double-quoted in the source,
    /// which is what distinguishes an enum label from an enum index.
    /// Returns `None` when the token does not fit the declared type.
    pub fn from_token(
        definition: &AttributeDefinition,
        token: &str,
        quoted: bool,
    ) -> Option<AttributeValue> {
        match &definition.value_type {
            AttributeValueType::Int { .. } => token.parse::<i64>().ok().map(AttributeValue::Int),
            AttributeValueType::Hex { .. } => token.parse::<u64>().ok().map(AttributeValue::Hex),
            AttributeValueType::Float { .. } => {
                token.parse::<f64>().ok().map(AttributeValue::Float)
            }
            AttributeValueType::String => Some(AttributeValue::String(token.to_string())),
            AttributeValueType::Enum(values) => {
                if quoted {
                    // Defaults reference the label; keep it verbatim.
                    values
                        .iter()
                        .any(|v| v == token)
                        .then(|| AttributeValue::String(token.to_string()))
                } else {
                    let index: u32 = token.parse::<u32>().ok()?;
                    (usize::try_from(index).ok()? < values.len())
                        .then_some(AttributeValue::Enum(index))
                }
            }
        }
    }
}

/// Which node↔object pair a relation attribute is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    ControlUnitEnvVar { node: String, env_var: String },
    NodeTxMessage { node: String, message_id: u32 },
    NodeMappedRxSignal {
        node: String,
        message_id: u32,
        signal: String,
    },
}

impl RelationKind {
    pub fn object_type(&self) -> AttributeObjectType {
        match self {
            RelationKind::ControlUnitEnvVar { .. } => AttributeObjectType::ControlUnitEnvVar,
            RelationKind::NodeTxMessage { .. } => AttributeObjectType::NodeTxMessage,
            RelationKind::NodeMappedRxSignal { .. } => AttributeObjectType::NodeMappedRxSignal,
        }
    }

    // Key tuple shared by every variant; unused positions collapse to
    // neutral values so the resulting order is total.
    fn sort_key(&self) -> (&str, u32, &str) {
        match self {
            RelationKind::ControlUnitEnvVar { node, env_var } => (node, 0, env_var),
            RelationKind::NodeTxMessage { node, message_id } => (node, *message_id, ""),
            RelationKind::NodeMappedRxSignal {
                node,
                message_id,
                signal,
            } => (node, *message_id, signal),
        }
    }
}

/// Attribute attached to a relationship (`BA_REL_`), held by the network in
/// an ordered set.
///
/// Identity is the key tuple `(name, object type, node, message id,
/// env-var/signal name)`; `value` rides along and does not participate in
/// equality or ordering, so inserting a relation with
/// [`BTreeSet::replace`](std::collections::BTreeSet::replace) updates the
/// value in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttributeRelation {
    pub name: String,
    pub kind: RelationKind,
    pub value: AttributeValue,
}

impl AttributeRelation {
    fn key(&self) -> (&str, AttributeObjectType, (&str, u32, &str)) {
        (&self.name, self.kind.object_type(), self.kind.sort_key())
    }
}

impl PartialEq for AttributeRelation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for AttributeRelation {}

impl PartialOrd for AttributeRelation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AttributeRelation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn relation(name: &str, kind: RelationKind) -> AttributeRelation {
        AttributeRelation {
            name: name.to_string(),
            kind,
            value: AttributeValue::Int(0),
        }
    }

    #[test]
    fn test_relation_order_is_lexicographic() {
        let mut set: BTreeSet<AttributeRelation> = BTreeSet::new();
        set.insert(relation(
            "b",
            RelationKind::NodeTxMessage {
                node: "ECU".to_string(),
                message_id: 5,
            },
        ));
        set.insert(relation(
            "a",
            RelationKind::NodeMappedRxSignal {
                node: "ECU".to_string(),
                message_id: 9,
                signal: "Speed".to_string(),
            },
        ));
        set.insert(relation(
            "a",
            RelationKind::ControlUnitEnvVar {
                node: "ECU".to_string(),
                env_var: "EnvTemp".to_string(),
            },
        ));
        set.insert(relation(
            "a",
            RelationKind::NodeMappedRxSignal {
                node: "ECU".to_string(),
                message_id: 9,
                signal: "Rpm".to_string(),
            },
        ));

        let names: Vec<(String, AttributeObjectType)> = set
            .iter()
            .map(|r| (r.name.clone(), r.kind.object_type()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("a".to_string(), AttributeObjectType::ControlUnitEnvVar),
                ("a".to_string(), AttributeObjectType::NodeMappedRxSignal),
                ("a".to_string(), AttributeObjectType::NodeMappedRxSignal),
                ("b".to_string(), AttributeObjectType::NodeTxMessage),
            ]
        );

        // Same key, new value: replace updates in place.
        let replaced = set.replace(AttributeRelation {
            name: "b".to_string(),
            kind: RelationKind::NodeTxMessage {
                node: "ECU".to_string(),
                message_id: 5,
            },
            value: AttributeValue::Int(42),
        });
        assert!(replaced.is_some());
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_value_factory_checks_types() {
        let int_def = AttributeDefinition {
            name: "Cycle".to_string(),
            object_type: AttributeObjectType::Message,
            value_type: AttributeValueType::Int { min: 0, max: 10000 },
        };
        assert_eq!(
            AttributeValue::from_token(&int_def, "100", false),
            Some(AttributeValue::Int(100))
        );
        assert_eq!(AttributeValue::from_token(&int_def, "fast", false), None);

        let enum_def = AttributeDefinition {
            name: "SendType".to_string(),
            object_type: AttributeObjectType::Message,
            value_type: AttributeValueType::Enum(vec!["Cyclic".to_string(), "Event".to_string()]),
        };
        assert_eq!(
            AttributeValue::from_token(&enum_def, "1", false),
            Some(AttributeValue::Enum(1))
        );
        assert_eq!(AttributeValue::from_token(&enum_def, "2", false), None);
        assert_eq!(
            AttributeValue::from_token(&enum_def, "Event", true),
            Some(AttributeValue::String("Event".to_string()))
        );
        assert_eq!(AttributeValue::from_token(&enum_def, "Burst", true), None);
    }
}
