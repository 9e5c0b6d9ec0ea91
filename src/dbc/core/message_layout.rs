use crate::dbc::types::signal::ByteOrder;

/// Verify that (start_bit, bit_size) fits within a payload of `size` bytes.
/// Returns Ok(()) if the signal fits; Err(...) with the reason otherwise.
///
/// DBC assumptions:
/// - Little-endian: the field occupies bits [start, start + len - 1] on a
///   linear 0..(8*size-1) plane.
/// - Big-endian: map the DBC start bit to the MSB-first linear index
///   `inv = (start & !7) + (7 - (start & 7))`; the sawtooth walk then
///   occupies [inv .. inv + len - 1] on that plane.
pub(crate) fn check_signal_fits(
    size: u16,
    start_bit: u16,
    bit_size: u16,
    byte_order: ByteOrder,
) -> Result<(), String> {
    if bit_size == 0 {
        return Ok(());
    }
    let total_bits: usize = usize::from(size) * 8;
    let start: usize = usize::from(start_bit);

    let (first, last): (usize, usize) = match byte_order {
        ByteOrder::LittleEndian => (start, start + usize::from(bit_size) - 1),
        ByteOrder::BigEndian => {
            let inv: usize = (start & !7) + (7 - (start & 7));
            (inv, inv + usize::from(bit_size) - 1)
        }
    };

    if first >= total_bits {
        return Err(format!(
            "signal start bit {} lies outside the {}-bit payload",
            start_bit, total_bits
        ));
    }
    if last >= total_bits {
        return Err(format!(
            "signal runs {} bits past the end of the {}-bit payload",
            last + 1 - total_bits,
            total_bits
        ));
    }
    Ok(())
}
