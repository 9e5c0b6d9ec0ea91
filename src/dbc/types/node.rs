use crate::dbc::types::attributes::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node/ECU defined in the database (`BU_`).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Node {
    /// Node/ECU name.
    pub name: String,
    /// Associated comment (DBC `CM_ BU_` section).
    pub comment: String,

    // --- Attributes ---
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Node {
            name: name.to_string(),
            ..Default::default()
        }
    }
}
