use crate::dbc::types::diagnostics::{DiagnosticKind, DiagnosticLog};
use crate::dbc::types::network::{BitTiming, Network};

pub(crate) fn decode(net: &mut Network, log: &mut DiagnosticLog, line: &str) {
    // Expected formats:
    // BS_:
    // BS_: 500000
    // BS_: 500000 : 1,1
    let rest: &str = line.trim_start().strip_prefix("BS_:").unwrap_or("").trim();
    if rest.is_empty() {
        net.bit_timing = None;
        return;
    }

    let (baud_part, btr_part): (&str, Option<&str>) = match rest.split_once(':') {
        Some((b, t)) => (b.trim(), Some(t.trim())),
        None => (rest, None),
    };

    let Ok(baudrate) = baud_part.parse::<u32>() else {
        log.push(
            DiagnosticKind::ParseError,
            format!("invalid baud rate '{baud_part}' in BS_ line"),
        );
        return;
    };

    let (btr1, btr2): (u32, u32) = match btr_part {
        Some(btr) => {
            let mut nums = btr.split(',').map(str::trim);
            let one: Option<u32> = nums.next().and_then(|n| n.parse().ok());
            let two: Option<u32> = nums.next().and_then(|n| n.parse().ok());
            match (one, two) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    log.push(
                        DiagnosticKind::ParseError,
                        format!("invalid BTR values '{btr}' in BS_ line"),
                    );
                    return;
                }
            }
        }
        None => (0, 0),
    };

    net.bit_timing = Some(BitTiming {
        baudrate,
        btr1,
        btr2,
    });
}
