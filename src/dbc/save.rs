//! Canonical DBC emission.
//!
//! The section order is fixed, every collection iterates in its canonical
//! order (nodes and signals by declaration, everything else sorted), and
//! the numeric formatting is deterministic, so `parse(emit(net))`
//! reproduces `net` and emitting a canonical file reproduces it
//! byte-for-byte. Line endings are LF.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::dbc::core::strings::quote;
use crate::dbc::types::attributes::{
    AttributeDefinition, AttributeObjectType, AttributeValue, AttributeValueType, RelationKind,
};
use crate::dbc::types::env_variable::EnvVarType;
use crate::dbc::types::errors::DbcSaveError;
use crate::dbc::types::message::Message;
use crate::dbc::types::network::Network;
use crate::dbc::types::signal::{MultiplexorKind, Signal};

/// Renders the network as canonical DBC text.
pub fn to_string(net: &Network) -> String {
    let mut out: String = String::with_capacity(1024 + net.messages.len() * 256);

    // Header: VERSION, new symbols, bit timing, nodes.
    out.push_str("VERSION ");
    out.push_str(&quote(&net.version));
    out.push_str("\n\nNS_ :\n");
    for symbol in &net.new_symbols {
        out.push('\t');
        out.push_str(symbol);
        out.push('\n');
    }
    out.push('\n');

    match &net.bit_timing {
        Some(bt) => out.push_str(&format!(
            "BS_: {} : {},{}\n",
            bt.baudrate, bt.btr1, bt.btr2
        )),
        None => out.push_str("BS_:\n"),
    }

    out.push_str("BU_:");
    for name in net.nodes.keys() {
        out.push(' ');
        out.push_str(name);
    }
    out.push('\n');

    emit_value_tables(net, &mut out);
    emit_messages(net, &mut out);
    emit_transmitter_lists(net, &mut out);
    emit_env_variables(net, &mut out);
    emit_signal_types(net, &mut out);
    emit_comments(net, &mut out);
    emit_attribute_definitions(net, &mut out);
    emit_attribute_defaults(net, &mut out);
    emit_attribute_values(net, &mut out);
    emit_value_descriptions(net, &mut out);
    emit_extended_value_types(net, &mut out);
    emit_signal_groups(net, &mut out);
    emit_extended_multiplexors(net, &mut out);

    out
}

/// Writes canonical DBC text to `writer`.
pub fn to_writer<W: Write>(net: &Network, mut writer: W) -> Result<(), DbcSaveError> {
    writer
        .write_all(to_string(net).as_bytes())
        .map_err(|source| DbcSaveError::Write { source })
}

/// Writes canonical DBC text to a file, replacing it if present.
pub fn to_file<P: AsRef<Path>>(net: &Network, path: P) -> Result<(), DbcSaveError> {
    let file: File = File::create(&path).map_err(|source| DbcSaveError::CreateFile {
        path: path.as_ref().display().to_string(),
        source,
    })?;
    to_writer(net, BufWriter::new(file))
}

fn emit_value_tables(net: &Network, out: &mut String) {
    if net.value_tables.is_empty() {
        return;
    }
    out.push('\n');
    for (name, descriptions) in &net.value_tables {
        out.push_str("VAL_TABLE_ ");
        out.push_str(name);
        for (value, label) in descriptions {
            out.push_str(&format!(" {} {}", value, quote(label)));
        }
        out.push_str(";\n");
    }
}

fn emit_messages(net: &Network, out: &mut String) {
    for msg in net.messages.values() {
        out.push('\n');
        out.push_str(&format!(
            "BO_ {} {}: {} {}\n",
            msg.id,
            msg.name,
            msg.size,
            if msg.transmitter.is_empty() {
                "Vector__XXX"
            } else {
                &msg.transmitter
            }
        ));
        for sig in msg.signals.values() {
            emit_signal(sig, out);
        }
    }
}

fn emit_signal(sig: &Signal, out: &mut String) {
    let mux: String = match sig.multiplexor {
        MultiplexorKind::None => String::new(),
        MultiplexorKind::Multiplexed(v) => format!(" m{v}"),
        MultiplexorKind::Switch => " M".to_string(),
        MultiplexorKind::SwitchAndMultiplexed(v) => format!(" m{v}M"),
    };
    let receivers: String = if sig.receivers.is_empty() {
        "Vector__XXX".to_string()
    } else {
        sig.receivers
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    };
    out.push_str(&format!(
        " SG_ {}{} : {}|{}@{}{} ({},{}) [{}|{}] {} {}\n",
        sig.name,
        mux,
        sig.start_bit,
        sig.bit_size,
        sig.byte_order.dbc_char(),
        sig.value_type.dbc_char(),
        fmt_num(sig.factor),
        fmt_num(sig.offset),
        fmt_num(sig.minimum),
        fmt_num(sig.maximum),
        quote(&sig.unit),
        receivers
    ));
}

fn emit_transmitter_lists(net: &Network, out: &mut String) {
    let entries: Vec<&Message> = net
        .messages
        .values()
        .filter(|m| !m.additional_transmitters.is_empty())
        .collect();
    if entries.is_empty() {
        return;
    }
    out.push('\n');
    for msg in entries {
        let list: String = msg
            .additional_transmitters
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&format!("BO_TX_BU_ {} : {};\n", msg.id, list));
    }
}

fn emit_env_variables(net: &Network, out: &mut String) {
    if net.env_variables.is_empty() {
        return;
    }
    out.push('\n');
    for var in net.env_variables.values() {
        let access: u16 = var.access_type.0
            | if var.var_type == EnvVarType::String {
                0x8000
            } else {
                0
            };
        let nodes: String = if var.access_nodes.is_empty() {
            "Vector__XXX".to_string()
        } else {
            var.access_nodes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };
        out.push_str(&format!(
            "EV_ {} : {} [{}|{}] {} {} {} DUMMY_NODE_VECTOR{:X} {};\n",
            var.name,
            var.var_type.dbc_char(),
            fmt_num(var.minimum),
            fmt_num(var.maximum),
            quote(&var.unit),
            fmt_num(var.initial_value),
            var.id,
            access,
            nodes
        ));
    }
    for var in net.env_variables.values() {
        if var.var_type == EnvVarType::Data {
            out.push_str(&format!("ENVVAR_DATA_ {} : {};\n", var.name, var.data_size));
        }
    }
}

fn emit_signal_types(net: &Network, out: &mut String) {
    let mut refs: Vec<String> = Vec::new();
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            if let Some(type_name) = &sig.signal_type_ref {
                refs.push(format!("SGTYPE_ {} {} : {};\n", msg.id, sig.name, type_name));
            }
        }
    }
    if net.signal_types.is_empty() && refs.is_empty() {
        return;
    }
    out.push('\n');
    for ty in net.signal_types.values() {
        out.push_str(&format!(
            "SGTYPE_ {} : {}@{}{} ({},{}) [{}|{}] {} {}, {};\n",
            ty.name,
            ty.size,
            ty.byte_order.dbc_char(),
            ty.value_type.dbc_char(),
            fmt_num(ty.factor),
            fmt_num(ty.offset),
            fmt_num(ty.minimum),
            fmt_num(ty.maximum),
            quote(&ty.unit),
            fmt_num(ty.default_value),
            ty.value_table
        ));
    }
    for line in refs {
        out.push_str(&line);
    }
}

// Fixed class order: network, nodes, messages, signals, env-vars.
fn emit_comments(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    if !net.comment.is_empty() {
        lines.push(format!("CM_ {};\n", quote(&net.comment)));
    }
    for node in net.nodes.values() {
        if !node.comment.is_empty() {
            lines.push(format!("CM_ BU_ {} {};\n", node.name, quote(&node.comment)));
        }
    }
    for msg in net.messages.values() {
        if !msg.comment.is_empty() {
            lines.push(format!("CM_ BO_ {} {};\n", msg.id, quote(&msg.comment)));
        }
    }
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            if !sig.comment.is_empty() {
                lines.push(format!(
                    "CM_ SG_ {} {} {};\n",
                    msg.id,
                    sig.name,
                    quote(&sig.comment)
                ));
            }
        }
    }
    for var in net.env_variables.values() {
        if !var.comment.is_empty() {
            lines.push(format!("CM_ EV_ {} {};\n", var.name, quote(&var.comment)));
        }
    }

    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

fn emit_attribute_definitions(net: &Network, out: &mut String) {
    if net.attribute_definitions.is_empty() {
        return;
    }
    out.push('\n');
    for def in net
        .attribute_definitions
        .values()
        .filter(|d| !d.object_type.is_relation())
    {
        emit_definition("BA_DEF_", def, out);
    }
    for def in net
        .attribute_definitions
        .values()
        .filter(|d| d.object_type.is_relation())
    {
        emit_definition("BA_DEF_REL_", def, out);
    }
}

fn emit_definition(keyword: &str, def: &AttributeDefinition, out: &mut String) {
    out.push_str(keyword);
    out.push(' ');
    if def.object_type != AttributeObjectType::Network {
        out.push_str(def.object_type.dbc_tag());
        out.push(' ');
    }
    out.push_str(&quote(&def.name));
    match &def.value_type {
        AttributeValueType::Int { min, max } => out.push_str(&format!(" INT {min} {max}")),
        AttributeValueType::Hex { min, max } => out.push_str(&format!(" HEX {min} {max}")),
        AttributeValueType::Float { min, max } => {
            out.push_str(&format!(" FLOAT {} {}", fmt_num(*min), fmt_num(*max)));
        }
        AttributeValueType::String => out.push_str(" STRING"),
        AttributeValueType::Enum(values) => {
            let list: String = values
                .iter()
                .map(|v| quote(v))
                .collect::<Vec<_>>()
                .join(",");
            out.push_str(&format!(" ENUM {list}"));
        }
    }
    out.push_str(";\n");
}

fn emit_attribute_defaults(net: &Network, out: &mut String) {
    if net.attribute_defaults.is_empty() {
        return;
    }
    out.push('\n');
    for relation in [false, true] {
        for (name, value) in net.attribute_defaults.iter().filter(|(name, _)| {
            net.attribute_definitions
                .get(*name)
                .is_some_and(|d| d.object_type.is_relation() == relation)
        }) {
            out.push_str(&format!(
                "{} {} {};\n",
                if relation {
                    "BA_DEF_DEF_REL_"
                } else {
                    "BA_DEF_DEF_"
                },
                quote(name),
                fmt_attribute_value(value)
            ));
        }
    }
}

// Fixed class order mirroring the comments: network, nodes, messages,
// signals, env-vars, then the relation values.
fn emit_attribute_values(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    for (name, value) in &net.attributes {
        lines.push(format!(
            "BA_ {} {};\n",
            quote(name),
            fmt_attribute_value(value)
        ));
    }
    for node in net.nodes.values() {
        for (name, value) in &node.attributes {
            lines.push(format!(
                "BA_ {} BU_ {} {};\n",
                quote(name),
                node.name,
                fmt_attribute_value(value)
            ));
        }
    }
    for msg in net.messages.values() {
        for (name, value) in &msg.attributes {
            lines.push(format!(
                "BA_ {} BO_ {} {};\n",
                quote(name),
                msg.id,
                fmt_attribute_value(value)
            ));
        }
    }
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            for (name, value) in &sig.attributes {
                lines.push(format!(
                    "BA_ {} SG_ {} {} {};\n",
                    quote(name),
                    msg.id,
                    sig.name,
                    fmt_attribute_value(value)
                ));
            }
        }
    }
    for var in net.env_variables.values() {
        for (name, value) in &var.attributes {
            lines.push(format!(
                "BA_ {} EV_ {} {};\n",
                quote(name),
                var.name,
                fmt_attribute_value(value)
            ));
        }
    }
    for relation in &net.attribute_relations {
        let body: String = match &relation.kind {
            RelationKind::ControlUnitEnvVar { node, env_var } => {
                format!("BU_EV_REL_ {node} {env_var}")
            }
            RelationKind::NodeTxMessage { node, message_id } => {
                format!("BU_BO_REL_ {node} {message_id}")
            }
            RelationKind::NodeMappedRxSignal {
                node,
                message_id,
                signal,
            } => format!("BU_SG_REL_ {node} SG_ {message_id} {signal}"),
        };
        lines.push(format!(
            "BA_REL_ {} {} {};\n",
            quote(&relation.name),
            body,
            fmt_attribute_value(&relation.value)
        ));
    }

    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

fn emit_value_descriptions(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            if sig.value_descriptions.is_empty() {
                continue;
            }
            let mut line: String = format!("VAL_ {} {}", msg.id, sig.name);
            for (value, label) in &sig.value_descriptions {
                line.push_str(&format!(" {} {}", value, quote(label)));
            }
            line.push_str(";\n");
            lines.push(line);
        }
    }
    for var in net.env_variables.values() {
        if var.value_descriptions.is_empty() {
            continue;
        }
        let mut line: String = format!("VAL_ {}", var.name);
        for (value, label) in &var.value_descriptions {
            line.push_str(&format!(" {} {}", value, quote(label)));
        }
        line.push_str(";\n");
        lines.push(line);
    }

    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

fn emit_extended_value_types(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            if let Some(digit) = sig.extended_value_type.dbc_digit() {
                lines.push(format!("SIG_VALTYPE_ {} {} : {};\n", msg.id, sig.name, digit));
            }
        }
    }
    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

fn emit_signal_groups(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    for msg in net.messages.values() {
        for group in msg.signal_groups.values() {
            lines.push(format!(
                "SIG_GROUP_ {} {} {} : {};\n",
                msg.id,
                group.name,
                group.repetitions,
                group.signals.join(" ")
            ));
        }
    }
    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

fn emit_extended_multiplexors(net: &Network, out: &mut String) {
    let mut lines: Vec<String> = Vec::new();
    for msg in net.messages.values() {
        for sig in msg.signals.values() {
            for entry in sig.extended_multiplexors.values() {
                let ranges: String = entry
                    .ranges
                    .iter()
                    .map(|(lo, hi)| format!("{lo}-{hi}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                lines.push(format!(
                    "SIG_MUL_VAL_ {} {} {} {};\n",
                    msg.id, sig.name, entry.switch_name, ranges
                ));
            }
        }
    }
    if lines.is_empty() {
        return;
    }
    out.push('\n');
    for line in lines {
        out.push_str(&line);
    }
}

// Integral values emit bare, everything else uses the shortest decimal
// form that parses back to the same f64.
fn fmt_num(value: f64) -> String {
    if value.is_finite() && value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn fmt_attribute_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Int(v) => format!("{v}"),
        AttributeValue::Hex(v) => format!("{v}"),
        AttributeValue::Float(v) => fmt_num(*v),
        AttributeValue::String(v) => quote(v),
        AttributeValue::Enum(index) => format!("{index}"),
    }
}
