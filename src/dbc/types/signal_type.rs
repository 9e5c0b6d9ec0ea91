use crate::dbc::types::signal::{ByteOrder, ValueType};
use serde::{Deserialize, Serialize};

/// Reusable signal layout template (`SGTYPE_` definition).
///
/// Signals opt in by name via
/// [`Signal::signal_type_ref`](crate::dbc::types::signal::Signal::signal_type_ref).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SignalType {
    pub name: String,
    /// Bit size of signals of this type.
    pub size: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    pub factor: f64,
    pub offset: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub unit: String,
    pub default_value: f64,
    /// Name of the value table shared by signals of this type.
    pub value_table: String,
}
