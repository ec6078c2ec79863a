//! Schema-driven binary codec for stage entity archives.
//!
//! Entities are self-describing, hash-verified, recursively-grouped binary
//! records whose payload layout is decided at load time by external text
//! templates. The crate covers the value taxonomy, the member tree, the
//! template parser, qualified-path addressing, the entity envelope, and the
//! registry/config plumbing around them.

mod config;
mod entity;
mod error;
mod hash;
mod member;
mod path;
mod registry;
mod resource;
mod schema;
mod value;
mod view;
mod wire;

pub use config::{CodecConfig, GroupTable, DEFAULT_GROUP_HASHES};
pub use entity::{read_entities, write_entities, Entity};
pub use error::{CodecError, CodecResult};
pub use hash::{
    decode_alternate, decode_default, encode_alternate, encode_default, rolling_hash,
};
pub use member::{
    ArraySize, EnumFlag, MemberDef, MemberId, MemberTree, INDEFINITE_ARRAY, MAX_ARRAY_SIZE,
};
pub use path::{QualifiedPath, PATH_SEPARATOR};
pub use registry::{RegistryFingerprint, SchemaRegistry, TEMPLATE_EXTENSION};
pub use resource::ResourceLimits;
pub use schema::Schema;
pub use value::{Transform, Value, ValueKind};
pub use view::{EntityView, MemberView};
pub use wire::{ByteReader, ByteWriter};
