use crate::dbc::core::{message_layout, strings};
use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::Network;
use crate::dbc::types::signal::{ByteOrder, MultiplexorKind, Signal, ValueType};

/// Decode a `SG_` line belonging to the **current message** (the last parsed BO_).
/// Format:
/// SG_ <name> [m<v>|M|m<v>M] : <start>|<size>@<order><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <recv>(,<recv>)*
pub(crate) fn decode(
    net: &mut Network,
    log: &mut DiagnosticLog,
    line: &str,
    current_msg: Option<u32>,
) {
    let Some(msg_id) = current_msg else {
        log.push(
            DiagnosticKind::DanglingReference,
            "SG_ line outside a BO_ block".to_string(),
        );
        return;
    };

    let line: &str = line.trim_start().trim_end_matches(';');
    let mut split_colon = line.splitn(2, ':');
    let left: &str = split_colon.next().unwrap_or("").trim(); // "SG_ NAME [mux]"
    let Some(right) = split_colon.next().map(str::trim) else {
        log.push(
            DiagnosticKind::ParseError,
            "SG_ line carries no ':' separator".to_string(),
        );
        return;
    };

    // Left part analysis: SG_ NAME [M|mX|mXM]
    let mut left_it = left.split_ascii_whitespace();
    let _sg: &str = left_it.next().unwrap_or(""); // "SG_"
    let Some(name) = left_it.next() else {
        log.push(
            DiagnosticKind::ParseError,
            "SG_ line carries no signal name".to_string(),
        );
        return;
    };
    let mux_token: &str = left_it.next().unwrap_or("");

    let Some(multiplexor) = decode_mux_token(mux_token) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid multiplexor indicator '{mux_token}' on signal '{name}'"),
        );
        return;
    };

    // Right part analysis, token by token.
    let mut it = right.split_ascii_whitespace();

    // 1) bit info: "63|1@1+"
    let bit_info: &str = it.next().unwrap_or("");
    let Some((start_bit, bit_size, byte_order, value_type)) = decode_bit_info(bit_info) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid bit layout '{bit_info}' on signal '{name}'"),
        );
        return;
    };
    if bit_size > 64 {
        log.push(
            DiagnosticKind::ParseError,
            format!("signal '{name}' is {bit_size} bits wide; at most 64 are allowed"),
        );
        return;
    }

    // 2) "(factor,offset)" — may be split across tokens; gather until ')'.
    let Some(paren) = gather(&mut it, ')') else {
        log.push(
            DiagnosticKind::ParseError,
            format!("signal '{name}' carries no (factor,offset) group"),
        );
        return;
    };
    let inner: &str = paren.trim_start_matches('(').trim_end_matches(')');
    let mut nums = inner.split(',').map(str::trim);
    let factor: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let offset: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let (Some(factor), Some(offset)) = (factor, offset) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid (factor,offset) group '{paren}' on signal '{name}'"),
        );
        return;
    };

    // 3) "[min|max]"
    let Some(bounds) = gather(&mut it, ']') else {
        log.push(
            DiagnosticKind::ParseError,
            format!("signal '{name}' carries no [min|max] group"),
        );
        return;
    };
    let inner: &str = bounds.trim_start_matches('[').trim_end_matches(']');
    let mut nums = inner.split('|').map(str::trim);
    let minimum: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let maximum: Option<f64> = nums.next().and_then(|s| s.parse().ok());
    let (Some(minimum), Some(maximum)) = (minimum, maximum) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid [min|max] group '{bounds}' on signal '{name}'"),
        );
        return;
    };

    // 4) quoted unit, then 5) receivers; rejoin so the unit may hold spaces.
    let tail: String = it.collect::<Vec<_>>().join(" ");
    let Some((unit, unit_end)) = strings::take_quoted(&tail) else {
        log.push(
            DiagnosticKind::ParseError,
            format!("signal '{name}' carries no quoted unit"),
        );
        return;
    };

    let mut sig: Signal = Signal {
        name: name.to_string(),
        multiplexor,
        start_bit,
        bit_size,
        byte_order,
        value_type,
        factor,
        offset,
        minimum,
        maximum,
        unit,
        ..Default::default()
    };

    for receiver in tail[unit_end..].split([',', ' ']) {
        let receiver: &str = receiver.trim();
        if !receiver.is_empty() && receiver != "Vector__XXX" {
            sig.receivers.insert(receiver.to_string());
        }
    }

    let Some(msg) = net.lookup_message_mut(msg_id) else {
        log.push(
            DiagnosticKind::DanglingReference,
            format!("message {msg_id} vanished before signal '{name}'"),
        );
        return;
    };

    if let Err(reason) = message_layout::check_signal_fits(msg.size, start_bit, bit_size, byte_order)
    {
        log.push(
            DiagnosticKind::BitOverflow,
            format!("signal '{name}' in message '{}': {reason}", msg.name),
        );
        // The signal is kept; the codec truncates at the payload edge.
    }

    let name_owned: String = sig.name.clone();
    if !msg.add_signal_if_absent(sig) {
        log.push(
            DiagnosticKind::DuplicateName,
            format!("signal '{name_owned}' is declared twice in message '{}'", msg.name),
        );
    }
}

fn decode_mux_token(token: &str) -> Option<MultiplexorKind> {
    if token.is_empty() {
        return Some(MultiplexorKind::None);
    }
    if token == "M" {
        return Some(MultiplexorKind::Switch);
    }
    let rest: &str = token.strip_prefix('m')?;
    if let Some(value_part) = rest.strip_suffix('M') {
        let value: u32 = value_part.parse().ok()?;
        Some(MultiplexorKind::SwitchAndMultiplexed(value))
    } else {
        let value: u32 = rest.parse().ok()?;
        Some(MultiplexorKind::Multiplexed(value))
    }
}

// "start|size@<order><sign>"
fn decode_bit_info(token: &str) -> Option<(u16, u16, ByteOrder, ValueType)> {
    let (pos_len, order_sign) = token.split_once('@')?;
    let (start, size) = pos_len.split_once('|')?;
    let start_bit: u16 = start.parse().ok()?;
    let bit_size: u16 = size.parse().ok()?;

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
    Some((start_bit, bit_size, byte_order, value_type))
}

// Gather tokens until one ends with `close` (groups may hold spaces).
fn gather(it: &mut std::str::SplitAsciiWhitespace<'_>, close: char) -> Option<String> {
    let mut acc: String = it.next()?.to_string();
    while !acc.ends_with(close) {
        let tok: &str = it.next()?;
        acc.push(' ');
        acc.push_str(tok);
    }
    Some(acc)
}
