use crate::dbc::core::strings;
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;
use crate::dbc::types::signal::{ByteOrder, ValueType};
use crate::dbc::types::signal_type::SignalType;

/// `true` when the `SGTYPE_` line is a reference (second token is a message
/// id) rather than a definition.
pub(crate) fn is_reference(line: &str) -> bool {
    line.split_ascii_whitespace()
        .nth(1)
        .is_some_and(|t| t.parse::<u32>().is_ok())
}

/// Decode a signal type definition.
pub(crate) fn decode_definition(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: SGTYPE_ TempSensor : 16@1- (0.1,-40) [-40|215] "degC" 0, TempTable;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("SGTYPE_") => {}
        _ => return,
    }

    let Some(name_token) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "SGTYPE_ line carries no type name".to_string(),
        );
        return;
    };
    let name: &str = name_token.trim_end_matches(':');

    let mut layout_token: Option<&str> = parts.next();
    if layout_token == Some(":") {
        layout_token = parts.next();
    }

    // "16@1-"
    let Some((size, byte_order, value_type)) = layout_token.and_then(decode_layout) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid layout on SGTYPE_ {name}"),
        );
        return;
    };

    // "(factor,offset)"
    let paren: &str = parts.next().unwrap_or("");
    let inner: &str = paren.trim_start_matches('(').trim_end_matches(')');
    let mut nums = inner.split(',').map(str::trim);
    let factor: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let offset: Option<f64> = nums.next().and_then(|s| s.parse().ok());

    // "[min|max]"
    let bounds: &str = parts.next().unwrap_or("");
    let inner: &str = bounds.trim_start_matches('[').trim_end_matches(']');
    let mut nums = inner.split('|').map(str::trim);
    let minimum: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let maximum: Option<f64> = nums.next().and_then(|s| s.parse().ok());

    let (Some(factor), Some(offset), Some(minimum), Some(maximum)) =
        (factor, offset, minimum, maximum)
    else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid scaling or range on SGTYPE_ {name}"),
        );
        return;
    };

    // Quoted unit, then "default, table".
    let tail: String = parts.collect::<Vec<_>>().join(" ");
    let Some((unit, unit_end)) = strings::take_quoted(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SGTYPE_ {name} carries no quoted unit"),
        );
        return;
    };
    let after_unit: &str = tail[unit_end..].trim();
    let (default_part, table_part): (&str, &str) = match after_unit.split_once(',') {
        Some((d, t)) => (d.trim(), t.trim()),
        None => (after_unit, ""),
    };
    let Ok(default_value) = default_part.parse::<f64>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid default value on SGTYPE_ {name}"),
        );
        return;
    };

    if net.signal_types.contains_key(name) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("signal type '{name}' is declared twice"),
        );
        return;
    }

    net.signal_types.insert(
        name.to_string(),
        SignalType {
            name: name.to_string(),
            size,
            byte_order,
            value_type,
            factor,
            offset,
            minimum,
            maximum,
            unit,
            default_value,
            value_table: table_part.to_string(),
        },
    );
}

/// Decode a signal type reference attaching a type to a signal.
pub(crate) fn decode_reference(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Example: SGTYPE_ 960 Key_Position : TempSensor;
    let line: &str = line.trim_end_matches(';');
    let mut parts = line.split_ascii_whitespace();
    match parts.next() {
        Some("SGTYPE_") => {}
        _ => return,
    }

    let Some(message_id) = parts.next().and_then(|t| t.parse::<u32>().ok()) else {
        return;
    };
    let Some(signal_name) = parts.next() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SGTYPE_ {message_id} names no signal"),
        );
        return;
    };

    let mut type_token: Option<&str> = parts.next();
    if type_token == Some(":") {
        type_token = parts.next();
    }
    let Some(type_name) = type_token.map(|t| t.trim_start_matches(':')) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("SGTYPE_ {message_id} {signal_name} names no type"),
        );
        return;
    };

    if !net.signal_types.contains_key(type_name) {
        log.push(
            DiagnosticKind::DanglingReference,
            format!("SGTYPE_ references unknown signal type '{type_name}'"),
        );
        return;
    }
    match net.lookup_signal_mut(message_id, signal_name) {
        Some(sig) => sig.signal_type_ref = Some(type_name.to_string()),
        None => log.push(
            DiagnosticKind::DanglingReference,
            format!("SGTYPE_ references unknown signal '{signal_name}' in message {message_id}"),
        ),
    }
}

// "16@1-"
fn decode_layout(token: &str) -> Option<(u16, ByteOrder, ValueType)> {
    let (size_part, order_sign) = token.split_once('@')?;
    let size: u16 = size_part.parse().ok()?;
    let mut chars = order_sign.chars();
    let byte_order: ByteOrder = match chars.next()? {
        '0' => ByteOrder::BigEndian,
        '1' => ByteOrder::LittleEndian,
        _ => return None,
    };
    let value_type: ValueType = match chars.next()? {
        '+' => ValueType::Unsigned,
        '-' => ValueType::Signed,
        _ => return None,
    };
    Some((size, byte_order, value_type))
}
