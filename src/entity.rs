//! The entity envelope: length-prefixed, hash-verified records with
//! schema-driven payloads and recursive child groups.
//!
//! # Contracts
//! - **Invariant**: an entity owns children only when its name hash is in
//!   the configured group table.
//! - **Postcondition**: a record that fails verification never yields a
//!   partially-built entity.

use crate::config::CodecConfig;
use crate::error::{CodecError, CodecResult};
use crate::hash::{
    decode_alternate, decode_default, encode_alternate, encode_default, rolling_hash,
};
use crate::member::{MemberId, MemberTree};
use crate::registry::SchemaRegistry;
use crate::schema::Schema;
use crate::wire::{ByteReader, ByteWriter};

/// Fixed header size: u32 total length plus the two hash/length word pairs.
const HEADER_BYTES: usize = 4 + 2 + 2 + 2 + 2;

/// One self-contained binary record: hashed name and description, a
/// schema-driven member payload, and, for group kinds, owned children.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Entity {
    pub name: String,
    pub description: String,
    pub members: MemberTree,
    pub children: Vec<Entity>,
    /// Unclaimed payload bytes between the loaded members and the record
    /// end, kept so unknown entity kinds round-trip their raw envelope.
    pub trailing: Vec<u8>,
}

impl Entity {
    /// A default-valued entity instantiated from a schema.
    pub fn instantiate(schema: &Schema) -> Self {
        Self {
            name: schema.name.clone(),
            description: String::new(),
            members: schema.tree.clone(),
            children: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Shorthand for resolving one member by qualified path.
    pub fn member(&self, path: &str) -> Option<MemberId> {
        let path = path.parse().ok()?;
        self.members.resolve(&path)
    }

    /// Reads one entity record, recursing into children for group kinds.
    pub fn read(
        reader: &mut ByteReader<'_>,
        registry: &SchemaRegistry,
        config: &CodecConfig,
    ) -> CodecResult<Self> {
        Self::read_at_depth(reader, registry, config, 0)
    }

    fn read_at_depth(
        reader: &mut ByteReader<'_>,
        registry: &SchemaRegistry,
        config: &CodecConfig,
        depth: usize,
    ) -> CodecResult<Self> {
        if depth > config.limits.max_depth {
            return Err(CodecError::Limit(format!(
                "group nesting deeper than {} levels",
                config.limits.max_depth
            )));
        }
        let record_start = reader.pos();
        let total = reader.read_u32()? as usize;
        if total < HEADER_BYTES {
            return Err(CodecError::Corruption(format!(
                "record length {total} is shorter than its own header"
            )));
        }
        if total > config.limits.max_record_bytes {
            return Err(CodecError::Limit(format!(
                "record of {total} bytes exceeds the {} byte budget",
                config.limits.max_record_bytes
            )));
        }
        let end = record_start + total;
        if end > reader.len() {
            return Err(CodecError::Corruption(format!(
                "record of {total} bytes extends past the end of the stream"
            )));
        }

        let (name, name_hash) = read_verified_text(reader, config, false)?;
        let (description, _) = read_verified_text(reader, config, true)?;

        let mut members = match registry.get(&name) {
            Some(schema) => schema.tree.clone(),
            None => {
                tracing::warn!(entity = %name, "no schema for entity, falling back to an empty payload");
                MemberTree::new()
            }
        };
        let roots: Vec<MemberId> = members.roots().to_vec();
        for root in roots {
            members.load(root, reader, end)?;
        }

        let mut children = Vec::new();
        if config.groups.contains(name_hash) {
            let declared = reader.read_u32()? as usize;
            if declared > config.limits.max_children {
                return Err(CodecError::Limit(format!(
                    "group '{name}' declares {declared} children, budget is {}",
                    config.limits.max_children
                )));
            }
            for _ in 0..declared {
                children.push(Self::read_at_depth(reader, registry, config, depth + 1)?);
            }
        }
        let trailing = reader.take_until(end)?.to_vec();

        Ok(Self {
            name,
            description,
            members,
            children,
            trailing,
        })
    }

    /// Appends this entity's record to the stream.
    pub fn write(&self, writer: &mut ByteWriter, config: &CodecConfig) -> CodecResult<()> {
        let record = self.to_record_bytes(config)?;
        writer.put_bytes(&record);
        Ok(())
    }

    /// Serializes this entity to one record, lengths computed bottom-up.
    pub fn to_record_bytes(&self, config: &CodecConfig) -> CodecResult<Vec<u8>> {
        let name_bytes = encode_default(&self.name)?;
        let desc_bytes = encode_alternate(&self.description);
        let name_hash = rolling_hash(&name_bytes);
        let desc_hash = rolling_hash(&desc_bytes);
        let name_len = encoded_text_len(&name_bytes, config)?;
        let desc_len = encoded_text_len(&desc_bytes, config)?;

        let mut payload = ByteWriter::new();
        for &root in self.members.roots() {
            self.members.save(root, &mut payload)?;
        }
        let payload = payload.into_inner();

        let is_group = config.groups.contains(name_hash);
        if !is_group && !self.children.is_empty() {
            return Err(CodecError::Schema(format!(
                "entity '{}' is not a group kind and cannot own children",
                self.name
            )));
        }
        let mut child_bytes = Vec::new();
        if is_group {
            if self.children.len() > config.limits.max_children {
                return Err(CodecError::Limit(format!(
                    "group '{}' owns {} children, budget is {}",
                    self.name,
                    self.children.len(),
                    config.limits.max_children
                )));
            }
            let mut child_writer = ByteWriter::new();
            child_writer.put_u32(self.children.len() as u32);
            for child in &self.children {
                child.write(&mut child_writer, config)?;
            }
            child_bytes = child_writer.into_inner();
        }

        let total = HEADER_BYTES
            + name_bytes.len()
            + desc_bytes.len()
            + payload.len()
            + child_bytes.len()
            + self.trailing.len();
        if total > config.limits.max_record_bytes {
            return Err(CodecError::Limit(format!(
                "record of {total} bytes exceeds the {} byte budget",
                config.limits.max_record_bytes
            )));
        }
        let total_word = u32::try_from(total).map_err(|_| {
            CodecError::Corruption(format!("record of {total} bytes overflows the length prefix"))
        })?;

        let mut out = ByteWriter::with_capacity(total);
        out.put_u32(total_word);
        out.put_u16(name_hash);
        out.put_u16(name_len);
        out.put_bytes(&name_bytes);
        out.put_u16(desc_hash);
        out.put_u16(desc_len);
        out.put_bytes(&desc_bytes);
        out.put_bytes(&payload);
        out.put_bytes(&child_bytes);
        out.put_bytes(&self.trailing);
        Ok(out.into_inner())
    }
}

/// Reads one hash-verified text field of the envelope.
///
/// The stored hash and byte length are checked against the decoded,
/// re-encoded text, so a mismatch fails before any entity is built.
fn read_verified_text(
    reader: &mut ByteReader<'_>,
    config: &CodecConfig,
    alternate: bool,
) -> CodecResult<(String, u16)> {
    let stored_hash = reader.read_u16()?;
    let stored_len = reader.read_u16()? as usize;
    if stored_len > config.limits.max_text_bytes {
        return Err(CodecError::Limit(format!(
            "text of {stored_len} bytes exceeds the {} byte budget",
            config.limits.max_text_bytes
        )));
    }
    let bytes = reader.read_bytes(stored_len)?;
    let text = if alternate {
        decode_alternate(bytes)?
    } else {
        decode_default(bytes)
    };
    let reencoded = if alternate {
        encode_alternate(&text)
    } else {
        encode_default(&text)?
    };
    if reencoded.len() != stored_len {
        return Err(CodecError::Corruption(format!(
            "stored length {stored_len} does not match '{text}'"
        )));
    }
    let computed = rolling_hash(&reencoded);
    if computed != stored_hash {
        return Err(CodecError::Corruption(format!(
            "stored hash {stored_hash:#06x} does not match '{text}' ({computed:#06x})"
        )));
    }
    Ok((text, stored_hash))
}

fn encoded_text_len(bytes: &[u8], config: &CodecConfig) -> CodecResult<u16> {
    if bytes.len() > config.limits.max_text_bytes {
        return Err(CodecError::Limit(format!(
            "text of {} bytes exceeds the {} byte budget",
            bytes.len(),
            config.limits.max_text_bytes
        )));
    }
    u16::try_from(bytes.len()).map_err(|_| {
        CodecError::Encoding(format!(
            "text of {} bytes exceeds the 16-bit length prefix",
            bytes.len()
        ))
    })
}

/// Reads consecutive entity records until the stream is exactly exhausted.
///
/// Zero remaining bytes is the clean end of stream; a record that fails
/// mid-parse is an error, never a silent stop.
pub fn read_entities(
    bytes: &[u8],
    registry: &SchemaRegistry,
    config: &CodecConfig,
) -> CodecResult<Vec<Entity>> {
    let mut reader = ByteReader::new(bytes);
    let mut entities = Vec::new();
    while reader.remaining() > 0 {
        entities.push(Entity::read(&mut reader, registry, config)?);
    }
    Ok(entities)
}

/// Concatenates entity records into one stream.
pub fn write_entities(entities: &[Entity], config: &CodecConfig) -> CodecResult<Vec<u8>> {
    let mut writer = ByteWriter::new();
    for entity in entities {
        entity.write(&mut writer, config)?;
    }
    Ok(writer.into_inner())
}

#[cfg(test)]
#[path = "tests/entity_tests.rs"]
mod tests;
