use crate::dbc::types::ValueDescriptions;
use crate::dbc::types::attributes::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Value kind of an environment variable.
///
/// `String` and `Data` are derived while reading: an access type with the
/// 0x8000 flag forces `String`, a matching `ENVVAR_DATA_` line forces
/// `Data`. On write both collapse back to the `'0'` type character.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum EnvVarType {
    #[default]
    Integer, // '0'
    Float,  // '1'
    String, // 's'
    Data,   // 'd'
}

impl EnvVarType {
    /// Type character as written in an `EV_` declaration.
    pub fn dbc_char(self) -> char {
        match self {
            EnvVarType::Float => '1',
            // Integer, String and Data all declare as '0'.
            _ => '0',
        }
    }
}

/// Access permissions of an environment variable, as declared by the
/// `DUMMY_NODE_VECTOR<hex>` token of its `EV_` line.
///
/// Bit 0x0001 grants read, 0x0002 grants write; 0x8000 marks the variable
/// as string-valued.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AccessType(pub u16);

impl AccessType {
    pub const UNRESTRICTED: AccessType = AccessType(0x0000);
    pub const READ: AccessType = AccessType(0x0001);
    pub const WRITE: AccessType = AccessType(0x0002);
    pub const READ_WRITE: AccessType = AccessType(0x0003);
    pub const STRING_ON_READ: AccessType = AccessType(0x8000);

    pub fn is_read(self) -> bool {
        self.0 & Self::READ.0 != 0
    }

    pub fn is_write(self) -> bool {
        self.0 & Self::WRITE.0 != 0
    }

    pub fn is_string(self) -> bool {
        self.0 & Self::STRING_ON_READ.0 != 0
    }
}

/// Environment variable defined in the database (`EV_`).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    /// Environment variable name.
    pub name: String,
    pub var_type: EnvVarType,
    /// Minimum physical value.
    pub minimum: f64,
    /// Maximum physical value.
    pub maximum: f64,
    /// Unit of measure.
    pub unit: String,
    pub initial_value: f64,
    /// Numeric identifier carried by the `EV_` line.
    pub id: u32,
    pub access_type: AccessType,
    /// Nodes allowed to access the variable; empty set means unrestricted
    /// (`Vector__XXX` in the file).
    pub access_nodes: BTreeSet<String>,
    /// Value-to-text mapping (DBC `VAL_` section).
    pub value_descriptions: ValueDescriptions,
    /// Payload size in bytes for `Data` variables (`ENVVAR_DATA_`).
    pub data_size: u32,
    /// Associated comment (DBC `CM_ EV_` section).
    pub comment: String,

    // --- Attributes ---
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl EnvironmentVariable {
    pub fn new(name: &str) -> Self {
        EnvironmentVariable {
            name: name.to_string(),
            ..Default::default()
        }
    }
}
