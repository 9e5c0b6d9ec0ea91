//! Network model: the root aggregate owning every entity parsed from a DBC
//! file.
//!
//! All cross-entity references are symbolic names resolved by lookup on the
//! owning collection; nothing points back at its container. Nodes keep
//! their `BU_` declaration order and signals their `SG_` declaration order;
//! everything else lives in canonically sorted maps, which is what makes
//! serialization deterministic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::dbc::types::ValueDescriptions;
use crate::dbc::types::attributes::{AttributeDefinition, AttributeRelation, AttributeValue};
use crate::dbc::types::env_variable::EnvironmentVariable;
use crate::dbc::types::message::Message;
use crate::dbc::types::node::Node;
use crate::dbc::types::signal::Signal;
use crate::dbc::types::signal_type::SignalType;

/// Bus timing parameters (`BS_:`). Obsolete in practice but still part of
/// the grammar; the whole struct is absent when the line is empty.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BitTiming {
    pub baudrate: u32,
    pub btr1: u32,
    pub btr2: u32,
}

/// In-memory representation of a CAN database (DBC).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Network {
    /// Version string (`VERSION`).
    pub version: String,
    /// New-symbol list (`NS_`), kept in file order.
    pub new_symbols: Vec<String>,
    /// Bit timing (`BS_:`); `None` when the line carries no values.
    pub bit_timing: Option<BitTiming>,
    /// Nodes in `BU_` declaration order.
    pub nodes: IndexMap<String, Node>,
    /// Network-level value tables (`VAL_TABLE_`).
    pub value_tables: BTreeMap<String, ValueDescriptions>,
    /// Messages keyed by identifier (ascending on iteration).
    pub messages: BTreeMap<u32, Message>,
    /// Environment variables (`EV_`).
    pub env_variables: BTreeMap<String, EnvironmentVariable>,
    /// Signal types (`SGTYPE_`).
    pub signal_types: BTreeMap<String, SignalType>,
    /// Attribute definitions (`BA_DEF_` / `BA_DEF_REL_`); the object type is
    /// recorded on each definition.
    pub attribute_definitions: BTreeMap<String, AttributeDefinition>,
    /// Attribute defaults (`BA_DEF_DEF_` / `BA_DEF_DEF_REL_`).
    pub attribute_defaults: BTreeMap<String, AttributeValue>,
    /// Attribute values attached to the network itself (`BA_`).
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Relation attribute values (`BA_REL_`), ordered by their key tuple.
    pub attribute_relations: BTreeSet<AttributeRelation>,
    /// Network comment (`CM_`).
    pub comment: String,
}

impl Network {
    // --------- Nodes --------
    /// Adds a node unless the name is already taken and returns it.
    pub fn add_node_if_absent(&mut self, name: &str) -> &mut Node {
        self.nodes
            .entry(name.to_string())
            .or_insert_with(|| Node::new(name))
    }

    pub fn lookup_node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn lookup_node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.get_mut(name)
    }

    // ------------- Messages ------------
    /// Adds a message unless the identifier is already taken and returns it.
    pub fn add_message_if_absent(
        &mut self,
        id: u32,
        name: &str,
        size: u16,
        transmitter: &str,
    ) -> &mut Message {
        self.messages
            .entry(id)
            .or_insert_with(|| Message::new(id, name, size, transmitter))
    }

    pub fn lookup_message(&self, id: u32) -> Option<&Message> {
        self.messages.get(&id)
    }

    pub fn lookup_message_mut(&mut self, id: u32) -> Option<&mut Message> {
        self.messages.get_mut(&id)
    }

    /// Linear scan; message names are not indexed.
    pub fn lookup_message_by_name(&self, name: &str) -> Option<&Message> {
        self.messages.values().find(|m| m.name == name)
    }

    // -------------- Signals ------------
    pub fn lookup_signal(&self, message_id: u32, name: &str) -> Option<&Signal> {
        self.messages.get(&message_id)?.signals.get(name)
    }

    pub fn lookup_signal_mut(&mut self, message_id: u32, name: &str) -> Option<&mut Signal> {
        self.messages.get_mut(&message_id)?.signals.get_mut(name)
    }

    // -------- Environment variables --------
    pub fn add_env_variable_if_absent(&mut self, name: &str) -> &mut EnvironmentVariable {
        self.env_variables
            .entry(name.to_string())
            .or_insert_with(|| EnvironmentVariable::new(name))
    }

    pub fn lookup_env_variable(&self, name: &str) -> Option<&EnvironmentVariable> {
        self.env_variables.get(name)
    }

    pub fn lookup_env_variable_mut(&mut self, name: &str) -> Option<&mut EnvironmentVariable> {
        self.env_variables.get_mut(name)
    }

    // -------------- Value tables ------------
    pub fn lookup_value_table(&self, name: &str) -> Option<&ValueDescriptions> {
        self.value_tables.get(name)
    }

    // -------------- Relations ------------
    /// Inserts a relation attribute; a relation with the same key tuple is
    /// replaced, keeping the set free of duplicate keys.
    pub fn add_attribute_relation(&mut self, relation: AttributeRelation) {
        self.attribute_relations.replace(relation);
    }

    /// Clear the database.
    pub fn clear(&mut self) {
        *self = Network::default();
    }
}
