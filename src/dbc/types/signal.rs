//! Signal definition and the payload bit codec.
//!
//! A signal is a slice of contiguous bits within a CAN payload. Two layout
//! conventions exist: little-endian (Intel), where bits advance linearly
//! from `start_bit`, and big-endian (Motorola "sawtooth"), where
//! `start_bit` holds the MSB and the intra-byte bit index walks down,
//! jumping back to bit 7 of the next byte on rollunder.
//!
//! Both decode and encode are driven by the same per-byte extraction
//! [`Step`]s, so a signal can only ever touch the bits its layout claims.

use crate::dbc::types::ValueDescriptions;
use crate::dbc::types::attributes::AttributeValue;
use crate::dbc::types::diagnostics::Status;
use crate::dbc::types::errors::CodecError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Byte order of a signal within the payload.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ByteOrder {
    /// Motorola sawtooth layout (`@0`).
    #[default]
    BigEndian,
    /// Intel layout (`@1`).
    LittleEndian,
}

impl ByteOrder {
    pub fn dbc_char(self) -> char {
        match self {
            ByteOrder::BigEndian => '0',
            ByteOrder::LittleEndian => '1',
        }
    }
}

/// Signedness of the raw value.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ValueType {
    /// `+`
    #[default]
    Unsigned,
    /// `-`
    Signed,
}

impl ValueType {
    pub fn dbc_char(self) -> char {
        match self {
            ValueType::Unsigned => '+',
            ValueType::Signed => '-',
        }
    }
}

/// Extended value type (`SIG_VALTYPE_`): how the raw bits are interpreted.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum ExtendedValueType {
    #[default]
    Undefined, // ' '
    Integer, // '0'
    Float,   // '1'
    Double,  // '2'
}

impl ExtendedValueType {
    /// Digit written in a `SIG_VALTYPE_` statement; `None` for `Undefined`,
    /// which is never written.
    pub fn dbc_digit(self) -> Option<u32> {
        match self {
            ExtendedValueType::Undefined => None,
            ExtendedValueType::Integer => Some(0),
            ExtendedValueType::Float => Some(1),
            ExtendedValueType::Double => Some(2),
        }
    }

    pub fn from_dbc_digit(digit: u32) -> Option<ExtendedValueType> {
        match digit {
            0 => Some(ExtendedValueType::Integer),
            1 => Some(ExtendedValueType::Float),
            2 => Some(ExtendedValueType::Double),
            _ => None,
        }
    }
}

/// Role a signal plays in multiplexing, as a single tagged variant.
///
/// The switch value lives inside the variant, so "multiplexed but no
/// switch value" cannot be represented.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MultiplexorKind {
    /// Not multiplexed (always present).
    #[default]
    None,
    /// Present only when the switch carries this value (`m<value>`).
    Multiplexed(u32),
    /// This signal is the multiplexor switch (`M`).
    Switch,
    /// Both a switch and itself multiplexed (`m<value>M`).
    SwitchAndMultiplexed(u32),
}

impl MultiplexorKind {
    pub fn is_switch(self) -> bool {
        matches!(
            self,
            MultiplexorKind::Switch | MultiplexorKind::SwitchAndMultiplexed(_)
        )
    }

    pub fn switch_value(self) -> Option<u32> {
        match self {
            MultiplexorKind::Multiplexed(v) | MultiplexorKind::SwitchAndMultiplexed(v) => Some(v),
            _ => None,
        }
    }
}

/// Extended multiplexing entry (`SIG_MUL_VAL_`): the signal is present when
/// the named switch signal's value falls in one of the ranges.
#[derive(Default, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ExtendedMultiplexor {
    pub switch_name: String,
    /// Closed `(min, max)` value ranges.
    pub ranges: BTreeSet<(u32, u32)>,
}

// Elementary step for moving a bit field between a payload byte and the
// raw value. Shared by decode and encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Step {
    // Payload byte index.
    pub(crate) byte_index: usize,
    // LSB within the payload byte (0..7).
    pub(crate) src_lsb: u8,
    // Number of bits moved (1..8).
    pub(crate) width: u8,
    // LSB position in the raw value.
    pub(crate) dst_lsb: u16,
}

/// Definition of a signal within a CAN message (`SG_`).
///
/// Describes position/bit-length, byte order, sign, scaling
/// (factor/offset), physical range, unit, receivers and the multiplexing
/// role, plus everything later statements attach (value descriptions,
/// comment, attributes, extended multiplexors).
#[derive(Default, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Signal {
    /// Signal name.
    pub name: String,
    pub multiplexor: MultiplexorKind,
    /// Start bit: LSB position for little-endian signals, MSB position for
    /// big-endian signals.
    pub start_bit: u16,
    /// Bit length; at most 64.
    pub bit_size: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
    /// Minimum physical value.
    pub minimum: f64,
    /// Maximum physical value.
    pub maximum: f64,
    /// Unit of measure.
    pub unit: String,
    /// Receiver nodes; empty set means `Vector__XXX` in the file.
    pub receivers: BTreeSet<String>,
    pub extended_value_type: ExtendedValueType,
    /// Value-to-text mapping (DBC `VAL_` section).
    pub value_descriptions: ValueDescriptions,
    /// Name of the `SGTYPE_` this signal refers to, if any.
    pub signal_type_ref: Option<String>,
    /// Associated comment (DBC `CM_ SG_` section).
    pub comment: String,
    /// Extended multiplexors keyed by switch signal name (`SIG_MUL_VAL_`).
    pub extended_multiplexors: BTreeMap<String, ExtendedMultiplexor>,

    // --- Attributes ---
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Signal {
    // The parser rejects wider signals; an API-built one is clamped so the
    // codec cannot overshoot a 64-bit raw value.
    fn codec_width(&self) -> u16 {
        self.bit_size.min(64)
    }

    /// Extraction steps for this signal's layout, most significant last
    /// for Intel and first for Motorola; `dst_lsb` orders them either way.
    pub(crate) fn steps(&self) -> Vec<Step> {
        if self.bit_size == 0 {
            return Vec::new();
        }
        match self.byte_order {
            ByteOrder::LittleEndian => self.steps_intel(),
            ByteOrder::BigEndian => self.steps_motorola(),
        }
    }

    // Bits advance linearly from start_bit, LSB of the signal first.
    fn steps_intel(&self) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::with_capacity(self.bit_size.div_ceil(8) as usize + 1);
        let mut remaining: u16 = self.codec_width();
        let mut bit: u16 = self.start_bit;
        let mut dst: u16 = 0;

        while remaining > 0 {
            let src_lsb: u8 = (bit % 8) as u8;
            let take: u8 = remaining.min(8 - u16::from(src_lsb)) as u8;

            steps.push(Step {
                byte_index: usize::from(bit / 8),
                src_lsb,
                width: take,
                dst_lsb: dst,
            });

            bit += u16::from(take);
            dst += u16::from(take);
            remaining -= u16::from(take);
        }
        steps
    }

    // The MSB of the signal sits at start_bit; the intra-byte index walks
    // down and rolls over to bit 7 of the following byte.
    fn steps_motorola(&self) -> Vec<Step> {
        let mut steps: Vec<Step> = Vec::with_capacity(self.bit_size.div_ceil(8) as usize + 1);
        let mut remaining: u16 = self.codec_width();
        let mut byte_index: usize = usize::from(self.start_bit / 8);
        let mut msb: u8 = (self.start_bit % 8) as u8;

        while remaining > 0 {
            let take: u8 = remaining.min(u16::from(msb) + 1) as u8;
            let src_lsb: u8 = msb + 1 - take;

            steps.push(Step {
                byte_index,
                src_lsb,
                width: take,
                dst_lsb: remaining - u16::from(take),
            });

            remaining -= u16::from(take);
            byte_index += 1;
            msb = 7;
        }
        steps
    }

    /// Extracts the raw value from `payload`.
    ///
    /// Bits falling outside the payload read as absent. For signed signals
    /// with the sign bit set, bits above `bit_size` come back all ones, so
    /// the result reinterprets directly as `i64`.
    pub fn decode(&self, payload: &[u8]) -> u64 {
        if self.bit_size == 0 {
            return 0;
        }

        let mut raw: u64 = 0;
        for st in self.steps() {
            if let Some(&byte) = payload.get(st.byte_index) {
                let mask: u8 = width_mask(st.width);
                let chunk: u64 = u64::from((byte >> st.src_lsb) & mask);
                raw |= chunk << st.dst_lsb;
            }
        }

        if self.value_type == ValueType::Signed {
            let width: u16 = self.codec_width();
            let sign_bit: u64 = 1u64 << (width - 1);
            if raw & sign_bit != 0 {
                raw |= !bit_size_mask(width);
            }
        }
        raw
    }

    /// Deposits `raw` into `payload`, leaving every unclaimed bit alone.
    ///
    /// Steps falling outside the payload are dropped and reported as
    /// [`Status::WARN_BIT_OVERFLOW`]; the caller sizes the buffer.
    pub fn encode(&self, payload: &mut [u8], raw: u64) -> Status {
        if self.bit_size == 0 {
            return Status::OK;
        }

        let mut status: Status = Status::OK;
        for st in self.steps() {
            let Some(byte) = payload.get_mut(st.byte_index) else {
                status |= Status::WARN_BIT_OVERFLOW;
                continue;
            };
            let mask: u8 = width_mask(st.width);
            let chunk: u8 = ((raw >> st.dst_lsb) as u8) & mask;
            *byte = (*byte & !(mask << st.src_lsb)) | (chunk << st.src_lsb);
        }
        status
    }

    /// Decodes the payload and applies the extended value type and the
    /// affine conversion, yielding the physical value.
    pub fn decode_physical(&self, payload: &[u8]) -> f64 {
        let raw: u64 = self.decode(payload);
        let raw_value: f64 = match self.extended_value_type {
            ExtendedValueType::Float => f64::from(f32::from_bits(raw as u32)),
            ExtendedValueType::Double => f64::from_bits(raw),
            _ => match self.value_type {
                ValueType::Signed => raw as i64 as f64,
                ValueType::Unsigned => raw as f64,
            },
        };
        self.raw_to_physical(raw_value)
    }

    /// `physical = raw * factor + offset`
    pub fn raw_to_physical(&self, raw: f64) -> f64 {
        raw * self.factor + self.offset
    }

    /// `raw = (physical - offset) / factor`
    ///
    /// Fails when `factor` is zero, which the conversion cannot invert.
    pub fn physical_to_raw(&self, physical: f64) -> Result<f64, CodecError> {
        if self.factor == 0.0 {
            return Err(CodecError::ZeroFactor);
        }
        Ok((physical - self.offset) / self.factor)
    }

    /// Smallest raw value representable by this signal's type and width.
    pub fn min_raw(&self) -> f64 {
        match self.extended_value_type {
            ExtendedValueType::Float => f64::from(f32::MIN_POSITIVE),
            ExtendedValueType::Double => f64::MIN_POSITIVE,
            _ => {
                if self.bit_size == 0 {
                    return 0.0;
                }
                match self.value_type {
                    ValueType::Unsigned => 0.0,
                    ValueType::Signed => -(2f64.powi(i32::from(self.bit_size) - 1)),
                }
            }
        }
    }

    /// Largest raw value representable by this signal's type and width.
    pub fn max_raw(&self) -> f64 {
        match self.extended_value_type {
            ExtendedValueType::Float => f64::from(f32::MAX),
            ExtendedValueType::Double => f64::MAX,
            _ => {
                if self.bit_size == 0 {
                    return 0.0;
                }
                match self.value_type {
                    ValueType::Unsigned => 2f64.powi(i32::from(self.bit_size)) - 1.0,
                    ValueType::Signed => 2f64.powi(i32::from(self.bit_size) - 1) - 1.0,
                }
            }
        }
    }
}

#[inline]
fn width_mask(width: u8) -> u8 {
    if width >= 8 {
        0xFF
    } else {
        ((1u16 << width) - 1) as u8
    }
}

#[inline]
fn bit_size_mask(bit_size: u16) -> u64 {
    if bit_size >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_size) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(start_bit: u16, bit_size: u16, byte_order: ByteOrder, value_type: ValueType) -> Signal {
        Signal {
            name: "S".to_string(),
            start_bit,
            bit_size,
            byte_order,
            value_type,
            factor: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_little_endian_byte() {
        let sig: Signal = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        let mut payload: [u8; 8] = [0xAB, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(sig.decode(&payload), 0xAB);

        assert_eq!(sig.encode(&mut payload, 0x55), Status::OK);
        assert_eq!(payload, [0x55, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_little_endian_signed_nibble() {
        let sig: Signal = signal(0, 4, ByteOrder::LittleEndian, ValueType::Signed);
        let payload: [u8; 8] = [0x0F, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(sig.decode(&payload), u64::MAX);
        assert_eq!(sig.decode(&payload) as i64, -1);
    }

    #[test]
    fn test_big_endian_word() {
        let sig: Signal = signal(7, 16, ByteOrder::BigEndian, ValueType::Unsigned);
        let mut payload: [u8; 8] = [0x12, 0x34, 0, 0, 0, 0, 0, 0];
        assert_eq!(sig.decode(&payload), 0x1234);

        assert_eq!(sig.encode(&mut payload, 0xABCD), Status::OK);
        assert_eq!(payload, [0xAB, 0xCD, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_big_endian_twelve_bits() {
        let sig: Signal = signal(7, 12, ByteOrder::BigEndian, ValueType::Unsigned);
        let payload: [u8; 8] = [0x12, 0x30, 0, 0, 0, 0, 0, 0];
        assert_eq!(sig.decode(&payload), 0x123);
    }

    #[test]
    fn test_big_endian_unaligned_start() {
        // MSB at bit 3 of byte 0: 4 bits there, 6 more from byte 1.
        let sig: Signal = signal(3, 10, ByteOrder::BigEndian, ValueType::Unsigned);
        let mut payload: [u8; 2] = [0x0A, 0xFC];
        assert_eq!(sig.decode(&payload), 0x2BF);

        payload = [0xF0, 0x03];
        assert_eq!(sig.encode(&mut payload, 0x2BF), Status::OK);
        assert_eq!(payload, [0xFA, 0xFF]);
    }

    #[test]
    fn test_sign_extension_fills_upper_bits() {
        let sig: Signal = signal(0, 12, ByteOrder::LittleEndian, ValueType::Signed);
        let payload: [u8; 8] = [0x00, 0x08, 0, 0, 0, 0, 0, 0];
        let raw: u64 = sig.decode(&payload);
        for bit in 12..64 {
            assert_ne!(raw & (1u64 << bit), 0, "bit {bit} not extended");
        }
        assert_eq!(raw as i64, -2048);
    }

    #[test]
    fn test_single_bit_signed() {
        let sig: Signal = signal(5, 1, ByteOrder::LittleEndian, ValueType::Signed);
        assert_eq!(sig.decode(&[0x20]) as i64, -1);
        assert_eq!(sig.decode(&[0x00]) as i64, 0);
        assert_eq!(sig.min_raw(), -1.0);
        assert_eq!(sig.max_raw(), 0.0);
    }

    #[test]
    fn test_encode_preserves_other_bits() {
        let sig: Signal = signal(8, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        let mut payload: [u8; 4] = [0xFF, 0x00, 0xFF, 0xFF];
        assert_eq!(sig.encode(&mut payload, 0xA5), Status::OK);
        assert_eq!(payload, [0xFF, 0xA5, 0xFF, 0xFF]);
    }

    #[test]
    fn test_encode_past_payload_truncates() {
        let sig: Signal = signal(7, 16, ByteOrder::BigEndian, ValueType::Unsigned);
        let mut payload: [u8; 1] = [0x00];
        let status: Status = sig.encode(&mut payload, 0x1234);
        assert!(status.contains(Status::WARN_BIT_OVERFLOW));
        assert_eq!(payload, [0x12]);
        // The decoder reads back what fits.
        assert_eq!(sig.decode(&payload), 0x1200);
    }

    #[test]
    fn test_zero_bit_size() {
        let sig: Signal = signal(0, 0, ByteOrder::LittleEndian, ValueType::Unsigned);
        let mut payload: [u8; 2] = [0xAA, 0xBB];
        assert_eq!(sig.decode(&payload), 0);
        assert_eq!(sig.encode(&mut payload, 0xFF), Status::OK);
        assert_eq!(payload, [0xAA, 0xBB]);
    }

    #[test]
    fn test_raw_physical_conversion() {
        let mut sig: Signal = signal(0, 16, ByteOrder::LittleEndian, ValueType::Unsigned);
        sig.factor = 0.1;
        sig.offset = -40.0;
        let physical: f64 = sig.raw_to_physical(500.0);
        assert!((physical - 10.0).abs() < 1e-9);
        let raw: f64 = sig.physical_to_raw(physical).unwrap();
        assert!((raw - 500.0).abs() < 1e-9);

        sig.factor = 0.0;
        assert_eq!(sig.physical_to_raw(1.0), Err(CodecError::ZeroFactor));
    }

    #[test]
    fn test_integer_raw_bounds() {
        let unsigned: Signal = signal(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned);
        assert_eq!(unsigned.min_raw(), 0.0);
        assert_eq!(unsigned.max_raw(), 255.0);

        let signed: Signal = signal(0, 8, ByteOrder::LittleEndian, ValueType::Signed);
        assert_eq!(signed.min_raw(), -128.0);
        assert_eq!(signed.max_raw(), 127.0);
    }

    #[test]
    fn test_float_raw_bounds() {
        let mut sig: Signal = signal(0, 32, ByteOrder::LittleEndian, ValueType::Unsigned);
        sig.extended_value_type = ExtendedValueType::Float;
        assert_eq!(sig.min_raw(), f64::from(f32::MIN_POSITIVE));
        assert_eq!(sig.max_raw(), f64::from(f32::MAX));

        sig.extended_value_type = ExtendedValueType::Double;
        assert_eq!(sig.min_raw(), f64::MIN_POSITIVE);
        assert_eq!(sig.max_raw(), f64::MAX);
    }

    #[test]
    fn test_decode_physical_float() {
        let mut sig: Signal = signal(0, 32, ByteOrder::LittleEndian, ValueType::Unsigned);
        sig.factor = 2.0;
        sig.extended_value_type = ExtendedValueType::Float;
        let bits: u32 = 1.5f32.to_bits();
        let payload: [u8; 4] = bits.to_le_bytes();
        assert!((sig.decode_physical(&payload) - 3.0).abs() < 1e-9);
    }
}
