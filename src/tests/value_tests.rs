use super::*;
use crate::wire::{ByteReader, ByteWriter};

fn round_trip(kind: ValueKind, value: Value) -> (Vec<u8>, Value) {
    let mut writer = ByteWriter::new();
    kind.write(&mut writer, &value).expect("value must encode");
    let bytes = writer.into_inner();
    let mut reader = ByteReader::new(&bytes);
    let decoded = kind.read(&mut reader).expect("value must decode");
    assert_eq!(reader.remaining(), 0, "decode must consume every byte");
    (bytes, decoded)
}

#[test]
fn size_table_matches_the_wire_format() {
    assert_eq!(ValueKind::Bool.byte_size(), Some(1));
    assert_eq!(ValueKind::U16.byte_size(), Some(2));
    assert_eq!(ValueKind::S64.byte_size(), Some(8));
    assert_eq!(ValueKind::ColorRgb.byte_size(), Some(3));
    assert_eq!(ValueKind::ColorRgba.byte_size(), Some(4));
    assert_eq!(ValueKind::Vector3.byte_size(), Some(12));
    assert_eq!(ValueKind::Transform.byte_size(), Some(36));
    assert_eq!(ValueKind::Enum.byte_size(), Some(4));
    assert_eq!(ValueKind::String.byte_size(), None);
    assert_eq!(ValueKind::Struct.byte_size(), None);
    assert_eq!(ValueKind::Comment.byte_size(), None);
    assert_eq!(ValueKind::Unknown.byte_size(), None);
}

#[test]
fn signedness_table() {
    assert!(ValueKind::S8.is_signed());
    assert!(ValueKind::F64.is_signed());
    assert!(!ValueKind::U32.is_signed());
    assert!(!ValueKind::String.is_signed());
}

#[test]
fn keywords_round_trip_for_every_kind() {
    for kind in [
        ValueKind::Bool,
        ValueKind::U8,
        ValueKind::S8,
        ValueKind::U16,
        ValueKind::S16,
        ValueKind::U32,
        ValueKind::S32,
        ValueKind::U64,
        ValueKind::S64,
        ValueKind::F32,
        ValueKind::F64,
        ValueKind::String,
        ValueKind::ColorRgb,
        ValueKind::ColorRgba,
        ValueKind::Vector3,
        ValueKind::Transform,
        ValueKind::Struct,
        ValueKind::Enum,
        ValueKind::Comment,
        ValueKind::Unknown,
    ] {
        assert_eq!(ValueKind::from_keyword(kind.keyword()), Some(kind));
    }
    assert_eq!(ValueKind::from_keyword("u32"), None);
}

#[test]
fn integers_encode_big_endian() {
    let (bytes, decoded) = round_trip(ValueKind::U32, Value::U32(0x0102_0304));
    assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04]);
    assert_eq!(decoded, Value::U32(0x0102_0304));

    let (bytes, decoded) = round_trip(ValueKind::S16, Value::S16(-2));
    assert_eq!(bytes, [0xFF, 0xFE]);
    assert_eq!(decoded, Value::S16(-2));
}

#[test]
fn empty_string_is_just_its_length_prefix() {
    let (bytes, decoded) = round_trip(ValueKind::String, Value::Str(String::new()));
    assert_eq!(bytes, [0x00, 0x00]);
    assert_eq!(decoded, Value::Str(String::new()));
}

#[test]
fn strings_carry_no_terminator() {
    let (bytes, decoded) = round_trip(ValueKind::String, Value::Str("door".into()));
    assert_eq!(bytes, [0x00, 0x04, b'd', b'o', b'o', b'r']);
    assert_eq!(decoded, Value::Str("door".into()));
}

#[test]
fn color_triple_is_consecutive_bytes_and_quad_is_one_word() {
    let (bytes, _) = round_trip(ValueKind::ColorRgb, Value::ColorRgb([0x10, 0x20, 0x30]));
    assert_eq!(bytes, [0x10, 0x20, 0x30]);

    let (bytes, decoded) = round_trip(
        ValueKind::ColorRgba,
        Value::ColorRgba([0x10, 0x20, 0x30, 0x40]),
    );
    assert_eq!(bytes, [0x10, 0x20, 0x30, 0x40]);
    assert_eq!(decoded, Value::ColorRgba([0x10, 0x20, 0x30, 0x40]));
}

#[test]
fn transform_is_nine_floats_in_declaration_order() {
    let transform = Transform {
        translation: [1.0, 2.0, 3.0],
        rotation: [90.0, 0.0, -90.0],
        scale: [1.0, 1.0, 2.0],
    };
    let (bytes, decoded) = round_trip(ValueKind::Transform, Value::Transform(transform));
    assert_eq!(bytes.len(), 36);
    assert_eq!(&bytes[0..4], &1.0f32.to_be_bytes());
    assert_eq!(&bytes[12..16], &90.0f32.to_be_bytes());
    assert_eq!(&bytes[32..36], &2.0f32.to_be_bytes());
    assert_eq!(decoded, Value::Transform(transform));
}

#[test]
fn non_physical_kinds_never_dispatch_to_the_binary_tables() {
    let mut reader = ByteReader::new(&[0u8; 4]);
    let err = ValueKind::Struct
        .read(&mut reader)
        .expect_err("struct has no encoding");
    assert!(matches!(err, crate::error::CodecError::Unencodable(_)));

    let mut writer = ByteWriter::new();
    let err = ValueKind::Comment
        .write(&mut writer, &Value::None)
        .expect_err("comment has no encoding");
    assert!(matches!(err, crate::error::CodecError::Unencodable(_)));
}

#[test]
fn kind_value_mismatch_is_rejected() {
    let mut writer = ByteWriter::new();
    let err = ValueKind::U32
        .write(&mut writer, &Value::U8(1))
        .expect_err("mismatched kinds must fail");
    assert!(matches!(err, crate::error::CodecError::Schema(_)));
}

#[test]
fn enum_members_hold_plain_u32_values() {
    assert!(ValueKind::Enum.matches(&Value::U32(7)));
    assert!(!ValueKind::Enum.matches(&Value::U16(7)));
    let (bytes, decoded) = round_trip(ValueKind::Enum, Value::U32(0x0000_0005));
    assert_eq!(bytes, [0, 0, 0, 5]);
    assert_eq!(decoded, Value::U32(5));
}

#[test]
fn array_count_widening() {
    assert_eq!(Value::U8(9).as_i64(), Some(9));
    assert_eq!(Value::S16(-3).as_i64(), Some(-3));
    assert_eq!(Value::U64(u64::MAX).as_i64(), None);
    assert_eq!(Value::Str("9".into()).as_i64(), None);
}
