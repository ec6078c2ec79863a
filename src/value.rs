//! Value taxonomy: the closed set of member kinds and their binary forms.
//!
//! Each kind knows its fixed byte size (where one exists), its signedness,
//! its template keyword, and how to read and write itself big-endian. The
//! reader/writer pair is resolved per variant at parse time; nothing
//! inspects a value's runtime type at serialize time.

use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::hash::{decode_default, encode_default};
use crate::wire::{ByteReader, ByteWriter};

// -----------------------------------------------------------------------------
// ValueKind
// -----------------------------------------------------------------------------

/// The kind of one schema member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Bool,
    U8,
    S8,
    U16,
    S16,
    U32,
    S32,
    U64,
    S64,
    F32,
    F64,
    String,
    ColorRgb,
    ColorRgba,
    Vector3,
    Transform,
    Struct,
    Enum,
    Comment,
    Unknown,
}

impl ValueKind {
    /// Fixed encoded size in bytes, or `None` for variable-length and
    /// non-physical kinds. Every kind except `Struct`, `Comment`, and
    /// `Unknown` that returns `None` here is variable-length (`String`).
    pub const fn byte_size(self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::S8 => Some(1),
            Self::U16 | Self::S16 => Some(2),
            Self::U32 | Self::S32 | Self::F32 | Self::Enum | Self::ColorRgba => Some(4),
            Self::U64 | Self::S64 | Self::F64 => Some(8),
            Self::ColorRgb => Some(3),
            Self::Vector3 => Some(12),
            Self::Transform => Some(36),
            Self::String | Self::Struct | Self::Comment | Self::Unknown => None,
        }
    }

    /// Whether the kind's native representation is signed.
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::S8 | Self::S16 | Self::S32 | Self::S64 | Self::F32 | Self::F64
        )
    }

    /// The keyword naming this kind in template text.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "BOOL",
            Self::U8 => "U8",
            Self::S8 => "S8",
            Self::U16 => "U16",
            Self::S16 => "S16",
            Self::U32 => "U32",
            Self::S32 => "S32",
            Self::U64 => "U64",
            Self::S64 => "S64",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::String => "STRING",
            Self::ColorRgb => "COLOR3",
            Self::ColorRgba => "COLOR4",
            Self::Vector3 => "VEC3",
            Self::Transform => "TRANSFORM",
            Self::Struct => "STRUCT",
            Self::Enum => "ENUM",
            Self::Comment => "COMMENT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Resolves a template keyword, case-sensitively.
    pub fn from_keyword(word: &str) -> Option<Self> {
        const ALL: [ValueKind; 20] = [
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
        ];
        ALL.into_iter().find(|kind| kind.keyword() == word)
    }

    /// The value a freshly instantiated member of this kind holds.
    pub fn default_value(self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::U8 => Value::U8(0),
            Self::S8 => Value::S8(0),
            Self::U16 => Value::U16(0),
            Self::S16 => Value::S16(0),
            Self::U32 | Self::Enum => Value::U32(0),
            Self::S32 => Value::S32(0),
            Self::U64 => Value::U64(0),
            Self::S64 => Value::S64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::String => Value::Str(String::new()),
            Self::ColorRgb => Value::ColorRgb([0; 3]),
            Self::ColorRgba => Value::ColorRgba([0; 4]),
            Self::Vector3 => Value::Vector3([0.0; 3]),
            Self::Transform => Value::Transform(Transform::default()),
            Self::Struct | Self::Comment | Self::Unknown => Value::None,
        }
    }

    /// Whether `value` can be stored in a member of this kind.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Enum => value.kind() == Self::U32,
            Self::Struct | Self::Comment | Self::Unknown => matches!(value, Value::None),
            _ => value.kind() == self,
        }
    }

    /// Reads one value of this kind from the stream.
    ///
    /// # Errors
    /// `Struct`, `Comment`, and `Unknown` have no physical encoding and must
    /// never be dispatched here.
    pub fn read(self, reader: &mut ByteReader<'_>) -> CodecResult<Value> {
        Ok(match self {
            Self::Bool => Value::Bool(reader.read_u8()? != 0),
            Self::U8 => Value::U8(reader.read_u8()?),
            Self::S8 => Value::S8(reader.read_u8()? as i8),
            Self::U16 => Value::U16(reader.read_u16()?),
            Self::S16 => Value::S16(reader.read_u16()? as i16),
            Self::U32 => Value::U32(reader.read_u32()?),
            Self::S32 => Value::S32(reader.read_u32()? as i32),
            Self::U64 => Value::U64(reader.read_u64()?),
            Self::S64 => Value::S64(reader.read_u64()? as i64),
            Self::F32 => Value::F32(reader.read_f32()?),
            Self::F64 => Value::F64(reader.read_f64()?),
            Self::String => {
                let length = reader.read_u16()? as usize;
                let bytes = reader.read_bytes(length)?;
                Value::Str(decode_default(bytes))
            }
            Self::ColorRgb => {
                let bytes = reader.read_bytes(3)?;
                Value::ColorRgb([bytes[0], bytes[1], bytes[2]])
            }
            Self::ColorRgba => Value::ColorRgba(reader.read_u32()?.to_be_bytes()),
            Self::Vector3 => {
                let mut coords = [0.0f32; 3];
                for slot in &mut coords {
                    *slot = reader.read_f32()?;
                }
                Value::Vector3(coords)
            }
            Self::Transform => {
                let mut floats = [0.0f32; 9];
                for slot in &mut floats {
                    *slot = reader.read_f32()?;
                }
                Value::Transform(Transform {
                    translation: [floats[0], floats[1], floats[2]],
                    rotation: [floats[3], floats[4], floats[5]],
                    scale: [floats[6], floats[7], floats[8]],
                })
            }
            Self::Enum => Value::U32(reader.read_u32()?),
            Self::Struct | Self::Comment | Self::Unknown => {
                return Err(CodecError::Unencodable(self))
            }
        })
    }

    /// Writes one value of this kind to the stream.
    ///
    /// # Errors
    /// Non-physical kinds and kind/value mismatches fail; a string longer
    /// than its 16-bit length prefix can carry fails too.
    pub fn write(self, writer: &mut ByteWriter, value: &Value) -> CodecResult<()> {
        match (self, value) {
            (Self::Bool, Value::Bool(v)) => writer.put_u8(u8::from(*v)),
            (Self::U8, Value::U8(v)) => writer.put_u8(*v),
            (Self::S8, Value::S8(v)) => writer.put_u8(*v as u8),
            (Self::U16, Value::U16(v)) => writer.put_u16(*v),
            (Self::S16, Value::S16(v)) => writer.put_u16(*v as u16),
            (Self::U32, Value::U32(v)) | (Self::Enum, Value::U32(v)) => writer.put_u32(*v),
            (Self::S32, Value::S32(v)) => writer.put_u32(*v as u32),
            (Self::U64, Value::U64(v)) => writer.put_u64(*v),
            (Self::S64, Value::S64(v)) => writer.put_u64(*v as u64),
            (Self::F32, Value::F32(v)) => writer.put_f32(*v),
            (Self::F64, Value::F64(v)) => writer.put_f64(*v),
            (Self::String, Value::Str(text)) => {
                let encoded = encode_default(text)?;
                let length = u16::try_from(encoded.len()).map_err(|_| {
                    CodecError::Encoding(format!(
                        "string of {} bytes exceeds the 16-bit length prefix",
                        encoded.len()
                    ))
                })?;
                writer.put_u16(length);
                writer.put_bytes(&encoded);
            }
            (Self::ColorRgb, Value::ColorRgb(channels)) => writer.put_bytes(channels),
            (Self::ColorRgba, Value::ColorRgba(channels)) => {
                writer.put_u32(u32::from_be_bytes(*channels));
            }
            (Self::Vector3, Value::Vector3(coords)) => {
                for coord in coords {
                    writer.put_f32(*coord);
                }
            }
            (Self::Transform, Value::Transform(transform)) => {
                for group in [transform.translation, transform.rotation, transform.scale] {
                    for coord in group {
                        writer.put_f32(coord);
                    }
                }
            }
            (Self::Struct | Self::Comment | Self::Unknown, _) => {
                return Err(CodecError::Unencodable(self))
            }
            (kind, value) => {
                return Err(CodecError::Schema(format!(
                    "cannot write a {} value as {}",
                    value.kind().keyword(),
                    kind.keyword()
                )))
            }
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Transform
// -----------------------------------------------------------------------------

/// Nine consecutive floats on the wire: translation, rotation as Euler
/// degrees, scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Transform {
    pub translation: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

// -----------------------------------------------------------------------------
// Value
// -----------------------------------------------------------------------------

/// One member's current value. `None` is reserved for the kinds that have no
/// physical encoding.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    None,
    Bool(bool),
    U8(u8),
    S8(i8),
    U16(u16),
    S16(i16),
    U32(u32),
    S32(i32),
    U64(u64),
    S64(i64),
    F32(f32),
    F64(f64),
    Str(String),
    ColorRgb([u8; 3]),
    ColorRgba([u8; 4]),
    Vector3([f32; 3]),
    Transform(Transform),
}

impl Value {
    /// The kind a member holding this value has. Enum members hold `U32`.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::None => ValueKind::Unknown,
            Self::Bool(_) => ValueKind::Bool,
            Self::U8(_) => ValueKind::U8,
            Self::S8(_) => ValueKind::S8,
            Self::U16(_) => ValueKind::U16,
            Self::S16(_) => ValueKind::S16,
            Self::U32(_) => ValueKind::U32,
            Self::S32(_) => ValueKind::S32,
            Self::U64(_) => ValueKind::U64,
            Self::S64(_) => ValueKind::S64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::Str(_) => ValueKind::String,
            Self::ColorRgb(_) => ValueKind::ColorRgb,
            Self::ColorRgba(_) => ValueKind::ColorRgba,
            Self::Vector3(_) => ValueKind::Vector3,
            Self::Transform(_) => ValueKind::Transform,
        }
    }

    /// Widening integer view, used when this value supplies an array count.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Bool(v) => Some(i64::from(v)),
            Self::U8(v) => Some(i64::from(v)),
            Self::S8(v) => Some(i64::from(v)),
            Self::U16(v) => Some(i64::from(v)),
            Self::S16(v) => Some(i64::from(v)),
            Self::U32(v) => Some(i64::from(v)),
            Self::S32(v) => Some(i64::from(v)),
            Self::U64(v) => i64::try_from(v).ok(),
            Self::S64(v) => Some(v),
            _ => None,
        }
    }

    /// Unsigned bit view, used by enum flag masking.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Bool(v) => Some(u64::from(v)),
            Self::U8(v) => Some(u64::from(v)),
            Self::S8(v) => Some(v as u8 as u64),
            Self::U16(v) => Some(u64::from(v)),
            Self::S16(v) => Some(v as u16 as u64),
            Self::U32(v) => Some(u64::from(v)),
            Self::S32(v) => Some(v as u32 as u64),
            Self::U64(v) => Some(v),
            Self::S64(v) => Some(v as u64),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/value_tests.rs"]
mod tests;
