use crate::dbc::types::attributes::AttributeValue;
use crate::dbc::types::signal::Signal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// CAN message defined in the database (`BO_`).
///
/// The `id` field stores the identifier exactly as written in the file;
/// bit 31 flags an extended (29-bit) frame. Signals keep their declaration
/// order, which is also the order they are written back in.
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Message {
    /// CAN identifier; bit 31 set means extended frame format.
    pub id: u32,
    /// Message name.
    pub name: String,
    /// Payload length in bytes.
    pub size: u16,
    /// Transmitting node; empty when the file says `Vector__XXX`.
    pub transmitter: String,
    /// Signals that belong to this message, in declaration order.
    pub signals: IndexMap<String, Signal>,
    /// Further transmitters (`BO_TX_BU_`).
    pub additional_transmitters: BTreeSet<String>,
    /// Signal groups (`SIG_GROUP_`), in declaration order.
    pub signal_groups: IndexMap<String, SignalGroup>,
    /// Associated comment (DBC `CM_ BO_` section).
    pub comment: String,

    // --- Attributes ---
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Message {
    /// Bit 31 of the identifier flags the extended frame format.
    pub const EXTENDED_FLAG: u32 = 0x8000_0000;

    pub fn new(id: u32, name: &str, size: u16, transmitter: &str) -> Self {
        Message {
            id,
            name: name.to_string(),
            size,
            transmitter: transmitter.to_string(),
            ..Default::default()
        }
    }

    pub fn is_extended(&self) -> bool {
        self.id & Self::EXTENDED_FLAG != 0
    }

    /// Identifier with the frame-format flag stripped.
    pub fn raw_id(&self) -> u32 {
        self.id & !Self::EXTENDED_FLAG
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.get(name)
    }

    pub fn signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        self.signals.get_mut(name)
    }

    /// Appends a signal unless the name is already taken; returns whether it
    /// was inserted.
    pub fn add_signal_if_absent(&mut self, signal: Signal) -> bool {
        if self.signals.contains_key(&signal.name) {
            return false;
        }
        self.signals.insert(signal.name.clone(), signal);
        true
    }
}

/// Named group of signals within a message (`SIG_GROUP_`).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct SignalGroup {
    pub name: String,
    pub repetitions: u32,
    /// Member signal names, in declaration order.
    pub signals: Vec<String>,
}
