//! End-to-end checks: canonical round trips, the codec inverse and
//! isolation properties, and the documented conversion scenarios.

use candb::dbc::save;
use candb::dbc::types::signal::{ByteOrder, Signal, ValueType};
use candb::{Network, from_str};
use proptest::prelude::*;

// A canonical document exercising every statement kind, laid out exactly
// as the serializer writes it.
const CANONICAL: &str = "VERSION \"1.0\"\n\
\n\
NS_ :\n\
\tCM_\n\
\tBA_DEF_\n\
\n\
BS_: 500000 : 1,1\n\
BU_: BCM Gateway\n\
\n\
VAL_TABLE_ GearTable 0 \"N\" 1 \"D\";\n\
\n\
BO_ 960 Key_Status: 4 BCM\n\
 SG_ Key_Position : 0|8@1+ (1,0) [0|5] \"\" Gateway\n\
 SG_ Key_Lock : 8|1@1+ (1,0) [0|1] \"\" Gateway\n\
\n\
BO_ 2147484308 Aux_Data: 8 Gateway\n\
 SG_ Mode M : 0|4@1+ (1,0) [0|15] \"\" Vector__XXX\n\
 SG_ Detail m1 : 15|16@0- (0.1,-40) [-40|215] \"degC\" BCM\n\
 SG_ Ratio : 24|32@1+ (1,0) [0|0] \"\" Vector__XXX\n\
\n\
BO_TX_BU_ 960 : ABS,Gateway;\n\
\n\
EV_ EnvBlob : 0 [0|0] \"\" 0 8 DUMMY_NODE_VECTOR0 Vector__XXX;\n\
EV_ EnvTemp : 1 [-40|215] \"degC\" 20 7 DUMMY_NODE_VECTOR3 Gateway;\n\
ENVVAR_DATA_ EnvBlob : 16;\n\
\n\
SGTYPE_ TempSensor : 16@1- (0.1,-40) [-40|215] \"degC\" 0, GearTable;\n\
SGTYPE_ 960 Key_Position : TempSensor;\n\
\n\
CM_ \"Example network\";\n\
CM_ BU_ BCM \"Body controller\";\n\
CM_ BO_ 960 \"Key state\";\n\
CM_ SG_ 960 Key_Position \"Position of the key\";\n\
CM_ EV_ EnvTemp \"Cabin temperature\";\n\
\n\
BA_DEF_ \"DBName\" STRING;\n\
BA_DEF_ BO_ \"GenMsgCycleTime\" INT 0 10000;\n\
BA_DEF_ BU_ \"NmNode\" ENUM \"No\",\"Yes\";\n\
BA_DEF_REL_ BU_BO_REL_ \"TxTimeout\" INT 0 65535;\n\
\n\
BA_DEF_DEF_ \"GenMsgCycleTime\" 100;\n\
BA_DEF_DEF_ \"NmNode\" \"Yes\";\n\
BA_DEF_DEF_REL_ \"TxTimeout\" 0;\n\
\n\
BA_ \"DBName\" \"Example\";\n\
BA_ \"NmNode\" BU_ Gateway 1;\n\
BA_ \"GenMsgCycleTime\" BO_ 960 20;\n\
BA_REL_ \"TxTimeout\" BU_BO_REL_ Gateway 960 50;\n\
\n\
VAL_ 960 Key_Position 0 \"Out\" 1 \"Inserted\";\n\
VAL_ EnvTemp 0 \"Cold\";\n\
\n\
SIG_VALTYPE_ 2147484308 Ratio : 1;\n\
\n\
SIG_GROUP_ 960 KeyGroup 1 : Key_Position Key_Lock;\n\
\n\
SIG_MUL_VAL_ 2147484308 Detail Mode 1-3, 5-7;\n";

#[test]
fn canonical_document_round_trips_byte_for_byte() {
    let outcome = from_str(CANONICAL);
    assert!(outcome.status.is_ok(), "{:?}", outcome.diagnostics);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let emitted: String = save::to_string(&outcome.network);
    assert_eq!(emitted, CANONICAL);
}

#[test]
fn emitted_network_parses_back_structurally_equal() {
    let first: Network = from_str(CANONICAL).network;
    let reparsed: Network = from_str(&save::to_string(&first)).network;
    assert_eq!(first, reparsed);
}

#[test]
fn parsed_model_is_fully_populated() {
    let net: Network = from_str(CANONICAL).network;

    assert_eq!(net.version, "1.0");
    assert_eq!(net.new_symbols.len(), 2);
    assert!(net.bit_timing.is_some());
    assert_eq!(net.nodes.len(), 2);
    assert_eq!(net.value_tables.len(), 1);
    assert_eq!(net.messages.len(), 2);
    assert_eq!(net.env_variables.len(), 2);
    assert_eq!(net.signal_types.len(), 1);
    assert_eq!(net.attribute_definitions.len(), 4);
    assert_eq!(net.attribute_defaults.len(), 3);
    assert_eq!(net.attribute_relations.len(), 1);

    let aux = net.lookup_message(2147484308).unwrap();
    assert!(aux.is_extended());
    assert_eq!(aux.raw_id(), 0x294);

    // The multiplexed signal decodes through the parsed scaling.
    let detail: &Signal = net.lookup_signal(2147484308, "Detail").unwrap();
    let mut payload: [u8; 8] = [0u8; 8];
    assert_eq!(detail.encode(&mut payload, 500).0, 0);
    assert_eq!(detail.decode(&payload), 500);
    let physical: f64 = detail.raw_to_physical(500.0);
    assert!((physical - 10.0).abs() < 1e-9);
    assert!((detail.physical_to_raw(physical).unwrap() - 500.0).abs() < 1e-9);
}

#[test]
fn relation_attributes_iterate_in_key_order() {
    let extra: &str = concat!(
        "BU_: A B\n",
        "BO_ 1 M1: 8 A\n",
        " SG_ S : 0|8@1+ (1,0) [0|255] \"\" B\n",
        "EV_ Env : 0 [0|1] \"\" 0 1 DUMMY_NODE_VECTOR0 Vector__XXX;\n",
        "BA_DEF_REL_ BU_SG_REL_ \"Zeta\" INT 0 100;\n",
        "BA_DEF_REL_ BU_BO_REL_ \"Alpha\" INT 0 100;\n",
        "BA_DEF_REL_ BU_EV_REL_ \"Alpha2\" INT 0 100;\n",
        "BA_REL_ \"Zeta\" BU_SG_REL_ A SG_ 1 S 3;\n",
        "BA_REL_ \"Alpha2\" BU_EV_REL_ A Env 2;\n",
        "BA_REL_ \"Alpha\" BU_BO_REL_ B 1 1;\n",
        "BA_REL_ \"Alpha\" BU_BO_REL_ A 1 1;\n",
    );
    let net: Network = from_str(extra).network;
    let order: Vec<(String, String)> = net
        .attribute_relations
        .iter()
        .map(|r| (r.name.clone(), format!("{:?}", r.kind)))
        .collect();

    assert_eq!(net.attribute_relations.len(), 4);
    assert_eq!(order[0].0, "Alpha");
    assert!(order[0].1.contains("\"A\""));
    assert_eq!(order[1].0, "Alpha");
    assert!(order[1].1.contains("\"B\""));
    assert_eq!(order[2].0, "Alpha2");
    assert_eq!(order[3].0, "Zeta");
}

// Replicates the layout admission rule: the signal must fit an 8-byte
// payload in its own addressing scheme.
fn fits(start: u16, size: u16, byte_order: ByteOrder) -> bool {
    match byte_order {
        ByteOrder::LittleEndian => u32::from(start) + u32::from(size) <= 64,
        ByteOrder::BigEndian => {
            let inv: u32 = u32::from(start & !7) + (7 - u32::from(start & 7));
            inv + u32::from(size) <= 64
        }
    }
}

fn codec_signal(start: u16, size: u16, byte_order: ByteOrder, value_type: ValueType) -> Signal {
    Signal {
        name: "P".to_string(),
        start_bit: start,
        bit_size: size,
        byte_order,
        value_type,
        factor: 1.0,
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn decode_inverts_encode(
        start in 0u16..64,
        size in 1u16..=64,
        big_endian in any::<bool>(),
        raw in any::<u64>(),
        mut payload in any::<[u8; 8]>(),
    ) {
        let byte_order: ByteOrder = if big_endian { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
        prop_assume!(fits(start, size, byte_order));

        let sig: Signal = codec_signal(start, size, byte_order, ValueType::Unsigned);
        let masked: u64 = if size == 64 { raw } else { raw & ((1u64 << size) - 1) };

        let status = sig.encode(&mut payload, masked);
        prop_assert!(status.is_ok() && !status.has_warnings());
        prop_assert_eq!(sig.decode(&payload), masked);
    }

    #[test]
    fn signed_decode_sign_extends(
        start in 0u16..64,
        size in 1u16..=64,
        big_endian in any::<bool>(),
        raw in any::<u64>(),
    ) {
        let byte_order: ByteOrder = if big_endian { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
        prop_assume!(fits(start, size, byte_order));

        let sig: Signal = codec_signal(start, size, byte_order, ValueType::Signed);
        let masked: u64 = if size == 64 { raw } else { raw & ((1u64 << size) - 1) };

        let mut payload: [u8; 8] = [0u8; 8];
        sig.encode(&mut payload, masked);
        let decoded: u64 = sig.decode(&payload);

        if size < 64 && masked & (1u64 << (size - 1)) != 0 {
            // Bits above the sign bit come back all ones.
            prop_assert_eq!(decoded, masked | !((1u64 << size) - 1));
        } else {
            prop_assert_eq!(decoded, masked);
        }
    }

    #[test]
    fn encode_touches_only_claimed_bits(
        start in 0u16..64,
        size in 1u16..=64,
        big_endian in any::<bool>(),
        raw in any::<u64>(),
        payload in any::<[u8; 8]>(),
    ) {
        let byte_order: ByteOrder = if big_endian { ByteOrder::BigEndian } else { ByteOrder::LittleEndian };
        prop_assume!(fits(start, size, byte_order));

        let sig: Signal = codec_signal(start, size, byte_order, ValueType::Unsigned);

        // Claimed-bit mask: encoding all ones into a zeroed buffer.
        let mut claimed: [u8; 8] = [0u8; 8];
        sig.encode(&mut claimed, u64::MAX);

        let mut written: [u8; 8] = payload;
        sig.encode(&mut written, raw);

        for i in 0..8 {
            prop_assert_eq!(written[i] & !claimed[i], payload[i] & !claimed[i]);
        }
    }

    #[test]
    fn physical_raw_conversion_inverts(
        factor in prop_oneof![-1e3f64..-1e-3, 1e-3f64..1e3],
        offset in -1e6f64..1e6,
        raw in -1e9f64..1e9,
    ) {
        let mut sig: Signal = codec_signal(0, 16, ByteOrder::LittleEndian, ValueType::Unsigned);
        sig.factor = factor;
        sig.offset = offset;

        let physical: f64 = sig.raw_to_physical(raw);
        let back: f64 = sig.physical_to_raw(physical).unwrap();
        let tolerance: f64 = 1e-9 * (raw.abs() + offset.abs() / factor.abs() + 1.0);
        prop_assert!((back - raw).abs() <= tolerance, "raw={raw} back={back}");
    }
}
