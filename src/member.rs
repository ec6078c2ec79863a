//! The member tree: one schema field per node, leaf or struct, with array
//! repetition.
//!
//! Nodes live in an arena owned by the tree and refer to each other through
//! `MemberId` indices; the parent link is a relation resolved via the tree,
//! never a second owner. Cloning the whole tree is the deep copy used to
//! instantiate a schema per entity, since ids stay valid across the clone.
//!
//! # Contracts
//! - **Invariant**: a child's formatted name is unique among its siblings.
//! - **Invariant**: an array-size reference resolves to an already-defined
//!   member and never to the member itself.
//! - **Postcondition**: mutating a materialized array element never changes
//!   the canonical instance or any other element.

use std::collections::BTreeMap;

use crate::error::{CodecError, CodecResult};
use crate::path::{split_element_suffix, QualifiedPath};
use crate::value::{Value, ValueKind};
use crate::wire::{ByteReader, ByteWriter};

/// Largest explicit array count; also the sentinel returned when a size
/// source is indefinite or unresolved, meaning "read until the
/// caller-supplied end position".
pub const MAX_ARRAY_SIZE: usize = 127;

/// Literal count stored for templates that declare `[*]`.
pub const INDEFINITE_ARRAY: i32 = -1;

// -----------------------------------------------------------------------------
// Ids and definitions
// -----------------------------------------------------------------------------

/// Index of one member node within its owning tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(u32);

impl MemberId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a member's array count comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArraySize {
    /// A count fixed in the template; `INDEFINITE_ARRAY` for `[*]`.
    Literal(i32),
    /// Another member whose current value supplies the count at read time.
    Ref(MemberId),
}

/// One named bit within an enum member's flag table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumFlag {
    pub name: String,
    pub mask: u32,
}

/// Everything needed to create a member; built by the template parser or by
/// hand in tests.
#[derive(Clone, Debug)]
pub struct MemberDef {
    pub name: String,
    pub kind: ValueKind,
    pub description: String,
    pub read_only: bool,
    pub array_size: ArraySize,
    pub flags: Vec<EnumFlag>,
}

impl MemberDef {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: String::new(),
            read_only: false,
            array_size: ArraySize::Literal(1),
            flags: Vec::new(),
        }
    }

    pub fn with_array_size(mut self, size: ArraySize) -> Self {
        self.array_size = size;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_flags(mut self, flags: Vec<EnumFlag>) -> Self {
        self.flags = flags;
        self
    }
}

// -----------------------------------------------------------------------------
// Nodes and the tree
// -----------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
struct MemberNode {
    name: String,
    kind: ValueKind,
    value: Value,
    read_only: bool,
    description: String,
    parent: Option<MemberId>,
    array_size: ArraySize,
    array_index: u32,
    /// Sparse cache of materialized array elements, canonical instance only.
    elements: BTreeMap<u32, MemberId>,
    /// Members whose array size references this one.
    size_dependents: Vec<MemberId>,
    /// Struct children in declaration order.
    children: Vec<MemberId>,
    /// Enum flag table.
    flags: Vec<EnumFlag>,
}

/// Arena of member nodes plus the ordered list of top-level members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemberTree {
    nodes: Vec<MemberNode>,
    roots: Vec<MemberId>,
}

impl MemberTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level members in declaration order.
    pub fn roots(&self) -> &[MemberId] {
        &self.roots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: MemberId) -> &MemberNode {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: MemberId) -> &mut MemberNode {
        &mut self.nodes[id.index()]
    }

    fn contains(&self, id: MemberId) -> bool {
        id.index() < self.nodes.len()
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Adds a top-level member.
    pub fn add_root(&mut self, def: MemberDef) -> CodecResult<MemberId> {
        let id = self.insert_node(def, None)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Adds a child to a struct member.
    ///
    /// # Errors
    /// The parent must be a struct and the child's formatted name must be
    /// unique among its siblings.
    pub fn add_child(&mut self, parent: MemberId, def: MemberDef) -> CodecResult<MemberId> {
        if !self.is_struct(parent) {
            return Err(CodecError::Schema(format!(
                "member '{}' is not a struct and cannot own children",
                self.node(parent).name
            )));
        }
        let id = self.insert_node(def, Some(parent))?;
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    fn insert_node(&mut self, def: MemberDef, parent: Option<MemberId>) -> CodecResult<MemberId> {
        let formatted = format_name(&def.name, 0);
        let siblings = match parent {
            Some(parent) => &self.node(parent).children,
            None => &self.roots,
        };
        let duplicate = siblings
            .iter()
            .any(|&sibling| format_name(&self.node(sibling).name, 0) == formatted);
        if duplicate {
            return Err(CodecError::Schema(format!(
                "duplicate member name '{formatted}'"
            )));
        }
        if let ArraySize::Ref(source) = def.array_size {
            if !self.contains(source) {
                return Err(CodecError::Schema(format!(
                    "member '{}' references an unknown member as its array size",
                    def.name
                )));
            }
        }
        let id = MemberId(self.nodes.len() as u32);
        let value = def.kind.default_value();
        self.nodes.push(MemberNode {
            name: def.name,
            kind: def.kind,
            value,
            read_only: def.read_only,
            description: def.description,
            parent,
            array_size: def.array_size,
            array_index: 0,
            elements: BTreeMap::new(),
            size_dependents: Vec::new(),
            children: Vec::new(),
            flags: def.flags,
        });
        if let ArraySize::Ref(source) = self.node(id).array_size {
            self.node_mut(source).size_dependents.push(id);
        }
        Ok(id)
    }

    /// Declares one flag of an enum member's bit table.
    pub fn add_flag(&mut self, id: MemberId, flag: EnumFlag) -> CodecResult<()> {
        let node = self.node(id);
        if node.kind != ValueKind::Enum {
            return Err(CodecError::Schema(format!(
                "member '{}' is not an enum and cannot carry flags",
                node.name
            )));
        }
        if node.flags.iter().any(|existing| existing.name == flag.name) {
            return Err(CodecError::Schema(format!(
                "duplicate flag '{}' on member '{}'",
                flag.name, node.name
            )));
        }
        self.node_mut(id).flags.push(flag);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Attributes
    // -------------------------------------------------------------------------

    /// Template-level name, placeholders unexpanded.
    pub fn name(&self, id: MemberId) -> &str {
        &self.node(id).name
    }

    pub fn kind(&self, id: MemberId) -> ValueKind {
        self.node(id).kind
    }

    pub fn description(&self, id: MemberId) -> &str {
        &self.node(id).description
    }

    pub fn is_read_only(&self, id: MemberId) -> bool {
        self.node(id).read_only
    }

    pub fn parent(&self, id: MemberId) -> Option<MemberId> {
        self.node(id).parent
    }

    /// 0 for the canonical instance, >0 for a materialized array element.
    pub fn array_index(&self, id: MemberId) -> u32 {
        self.node(id).array_index
    }

    pub fn value(&self, id: MemberId) -> &Value {
        &self.node(id).value
    }

    /// Stores a value after kind and mutability checks.
    ///
    /// # Errors
    /// Read-only members refuse mutation; so do kind mismatches.
    pub fn set_value(&mut self, id: MemberId, value: Value) -> CodecResult<()> {
        let node = self.node(id);
        if node.read_only {
            return Err(CodecError::ReadOnly(self.formatted_name(id)));
        }
        if !node.kind.matches(&value) {
            return Err(CodecError::Schema(format!(
                "cannot store a {} value in {} member '{}'",
                value.kind().keyword(),
                node.kind.keyword(),
                node.name
            )));
        }
        self.node_mut(id).value = value;
        Ok(())
    }

    /// Load-path store: populating from the stream bypasses the read-only
    /// guard, which exists for callers, not for the codec.
    fn store_value(&mut self, id: MemberId, value: Value) {
        self.node_mut(id).value = value;
    }

    // -------------------------------------------------------------------------
    // Array size
    // -------------------------------------------------------------------------

    pub fn array_size_source(&self, id: MemberId) -> ArraySize {
        self.node(id).array_size
    }

    /// Members whose array size references this one.
    pub fn size_dependents(&self, id: MemberId) -> &[MemberId] {
        &self.node(id).size_dependents
    }

    /// Resolved array count in `[1, MAX_ARRAY_SIZE]`.
    ///
    /// A materialized element always reports 1. Anything out of range
    /// (non-positive, past the maximum, or an unresolvable reference)
    /// resolves to the sentinel maximum, telling loaders to read until the
    /// caller-supplied end position.
    pub fn array_size(&self, id: MemberId) -> usize {
        let node = self.node(id);
        if node.array_index > 0 {
            return 1;
        }
        let resolved = match node.array_size {
            ArraySize::Literal(count) => i64::from(count),
            ArraySize::Ref(source) => self.node(source).value.as_i64().unwrap_or(-1),
        };
        if (1..=MAX_ARRAY_SIZE as i64).contains(&resolved) {
            resolved as usize
        } else {
            MAX_ARRAY_SIZE
        }
    }

    /// Replaces the array-size source, maintaining the back-reference lists
    /// of the old and new referenced members.
    pub fn set_array_size(&mut self, id: MemberId, size: ArraySize) -> CodecResult<()> {
        if let ArraySize::Ref(source) = size {
            if source == id {
                return Err(CodecError::Schema(format!(
                    "member '{}' cannot supply its own array size",
                    self.node(id).name
                )));
            }
            if !self.contains(source) {
                return Err(CodecError::Schema(format!(
                    "member '{}' references an unknown member as its array size",
                    self.node(id).name
                )));
            }
        }
        if let ArraySize::Ref(old) = self.node(id).array_size {
            let dependents = &mut self.node_mut(old).size_dependents;
            if let Some(position) = dependents.iter().position(|&dep| dep == id) {
                dependents.remove(position);
            }
        }
        self.node_mut(id).array_size = size;
        if let ArraySize::Ref(source) = size {
            self.node_mut(source).size_dependents.push(id);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Array elements
    // -------------------------------------------------------------------------

    /// Indexed access. Index 0 is the canonical instance; higher indices
    /// materialize (and cache) an independent deep copy whose parent is the
    /// canonical instance's parent.
    ///
    /// # Errors
    /// Indexing at or past the resolved array size.
    pub fn element(&mut self, id: MemberId, index: u32) -> CodecResult<MemberId> {
        if index == 0 {
            return Ok(id);
        }
        let size = self.array_size(id);
        if index as usize >= size {
            return Err(CodecError::Index {
                name: self.formatted_name(id),
                index,
                size,
            });
        }
        if let Some(&cached) = self.node(id).elements.get(&index) {
            return Ok(cached);
        }
        let parent = self.node(id).parent;
        let clone = self.clone_subtree(id, parent, index, false);
        self.node_mut(id).elements.insert(index, clone);
        Ok(clone)
    }

    /// Materialized elements of a member, in index order, clipped to the
    /// currently resolved size.
    pub fn elements(&self, id: MemberId) -> Vec<(u32, MemberId)> {
        let size = self.array_size(id);
        self.node(id)
            .elements
            .iter()
            .filter(|(&index, _)| (index as usize) < size)
            .map(|(&index, &element)| (index, element))
            .collect()
    }

    /// Canonical instance followed by its materialized elements.
    pub fn instances(&self, id: MemberId) -> Vec<MemberId> {
        let mut out = vec![id];
        out.extend(self.elements(id).into_iter().map(|(_, element)| element));
        out
    }

    /// Deep copy of a member: children, flag table, and every materialized
    /// array element are cloned; the copy is detached (no parent) for the
    /// caller to re-attach.
    pub fn clone_member(&mut self, id: MemberId) -> MemberId {
        let array_index = self.node(id).array_index;
        self.clone_subtree(id, None, array_index, true)
    }

    fn clone_subtree(
        &mut self,
        source: MemberId,
        parent: Option<MemberId>,
        array_index: u32,
        with_elements: bool,
    ) -> MemberId {
        let mut mapping = BTreeMap::new();
        let root = self.clone_rec(source, parent, array_index, with_elements, &mut mapping);
        // Size references into the copied subtree follow the copy; references
        // to members outside it keep pointing at the shared originals.
        let clones: Vec<MemberId> = mapping.values().copied().collect();
        for clone in clones {
            if let ArraySize::Ref(old) = self.node(clone).array_size {
                match mapping.get(&old) {
                    Some(&new) => {
                        self.node_mut(clone).array_size = ArraySize::Ref(new);
                        self.node_mut(new).size_dependents.push(clone);
                    }
                    None => self.node_mut(old).size_dependents.push(clone),
                }
            }
        }
        root
    }

    fn clone_rec(
        &mut self,
        source: MemberId,
        parent: Option<MemberId>,
        array_index: u32,
        with_elements: bool,
        mapping: &mut BTreeMap<MemberId, MemberId>,
    ) -> MemberId {
        let copied = {
            let node = self.node(source);
            MemberNode {
                name: node.name.clone(),
                kind: node.kind,
                value: node.value.clone(),
                read_only: node.read_only,
                description: node.description.clone(),
                parent,
                array_size: node.array_size,
                array_index,
                elements: BTreeMap::new(),
                size_dependents: Vec::new(),
                children: Vec::new(),
                flags: node.flags.clone(),
            }
        };
        let id = MemberId(self.nodes.len() as u32);
        self.nodes.push(copied);
        mapping.insert(source, id);
        let children = self.node(source).children.clone();
        for child in children {
            let child_index = self.node(child).array_index;
            let cloned = self.clone_rec(child, Some(id), child_index, with_elements, mapping);
            self.node_mut(id).children.push(cloned);
        }
        if with_elements {
            let elements: Vec<(u32, MemberId)> = self
                .node(source)
                .elements
                .iter()
                .map(|(&index, &element)| (index, element))
                .collect();
            for (index, element) in elements {
                let cloned = self.clone_rec(element, parent, index, with_elements, mapping);
                self.node_mut(id).elements.insert(index, cloned);
            }
        }
        id
    }

    // -------------------------------------------------------------------------
    // Names and paths
    // -------------------------------------------------------------------------

    /// Template name with placeholders substituted for this instance's array
    /// index: `{a}` the lowercase letter sequence, `{A}` its uppercase form,
    /// `{i}` the literal index.
    pub fn formatted_name(&self, id: MemberId) -> String {
        let node = self.node(id);
        format_name(&node.name, node.array_index)
    }

    /// Formatted names from the outermost ancestor down to this member.
    pub fn qualified_name(&self, id: MemberId) -> QualifiedPath {
        let mut segments = vec![self.formatted_name(id)];
        let mut cursor = self.node(id).parent;
        while let Some(parent) = cursor {
            segments.push(self.formatted_name(parent));
            cursor = self.node(parent).parent;
        }
        segments.reverse();
        QualifiedPath::from_segments(segments)
    }

    /// Resolves a qualified path against this tree. Segments may carry an
    /// `[n]` element suffix; only already-materialized elements resolve.
    pub fn resolve(&self, path: &QualifiedPath) -> Option<MemberId> {
        let mut segments = path.segments().iter();
        let mut current = self.match_segment(&self.roots, segments.next()?)?;
        for segment in segments {
            current = self.match_segment(self.children(current), segment)?;
        }
        Some(current)
    }

    fn match_segment(&self, candidates: &[MemberId], segment: &str) -> Option<MemberId> {
        let (name, element) = split_element_suffix(segment);
        let base = candidates
            .iter()
            .copied()
            .find(|&candidate| self.formatted_name(candidate) == name)?;
        match element {
            None | Some(0) => Some(base),
            Some(index) => self.node(base).elements.get(&index).copied(),
        }
    }

    // -------------------------------------------------------------------------
    // Struct operations (silent no-ops on non-structs)
    // -------------------------------------------------------------------------

    pub fn is_struct(&self, id: MemberId) -> bool {
        self.node(id).kind == ValueKind::Struct
    }

    pub fn has_child(&self, id: MemberId, name: &str) -> bool {
        self.child(id, name).is_some()
    }

    pub fn child(&self, id: MemberId, name: &str) -> Option<MemberId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.formatted_name(child) == name)
    }

    /// Declared children of a struct; empty for any other kind.
    pub fn children(&self, id: MemberId) -> &[MemberId] {
        if !self.is_struct(id) {
            return &[];
        }
        &self.node(id).children
    }

    /// Children plus their materialized array elements, in declaration then
    /// index order.
    pub fn children_with_arrays(&self, id: MemberId) -> Vec<MemberId> {
        let mut out = Vec::new();
        for &child in self.children(id) {
            out.push(child);
            out.extend(self.elements(child).into_iter().map(|(_, element)| element));
        }
        out
    }

    // -------------------------------------------------------------------------
    // Enum flags
    // -------------------------------------------------------------------------

    pub fn flag_table(&self, id: MemberId) -> &[EnumFlag] {
        &self.node(id).flags
    }

    /// Flag name to "is set", derived from the current value.
    pub fn enum_flags(&self, id: MemberId) -> BTreeMap<String, bool> {
        let node = self.node(id);
        let bits = node.value.as_u64().unwrap_or(0);
        node.flags
            .iter()
            .map(|flag| (flag.name.clone(), bits & u64::from(flag.mask) != 0))
            .collect()
    }

    /// ORs or ANDs one flag's mask into the underlying integer.
    ///
    /// # Errors
    /// Unknown flag names and read-only members.
    pub fn set_enum_flag(&mut self, id: MemberId, name: &str, on: bool) -> CodecResult<()> {
        let node = self.node(id);
        if node.read_only {
            return Err(CodecError::ReadOnly(self.formatted_name(id)));
        }
        let Some(flag) = node.flags.iter().find(|flag| flag.name == name) else {
            return Err(CodecError::Schema(format!(
                "member '{}' has no flag named '{name}'",
                node.name
            )));
        };
        let mask = flag.mask;
        let bits = match node.value {
            Value::U32(bits) => bits,
            _ => 0,
        };
        let next = if on { bits | mask } else { bits & !mask };
        self.node_mut(id).value = Value::U32(next);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Binary load and save
    // -------------------------------------------------------------------------

    /// Reads `array_size` instances of this member from the stream, stopping
    /// before any instance once the cursor reaches `end`. That early stop is
    /// how indefinite trailing arrays are bounded without a stored count.
    pub fn load(
        &mut self,
        id: MemberId,
        reader: &mut ByteReader<'_>,
        end: usize,
    ) -> CodecResult<()> {
        let count = self.array_size(id);
        for index in 0..count {
            if reader.pos() >= end {
                break;
            }
            let instance = if index == 0 {
                id
            } else {
                self.element(id, index as u32)?
            };
            self.load_instance(instance, reader, end)?;
        }
        Ok(())
    }

    fn load_instance(
        &mut self,
        id: MemberId,
        reader: &mut ByteReader<'_>,
        end: usize,
    ) -> CodecResult<()> {
        if self.is_struct(id) {
            let children = self.node(id).children.clone();
            for child in children {
                self.load(child, reader, end)?;
            }
        } else {
            let value = self.node(id).kind.read(reader)?;
            self.store_value(id, value);
        }
        Ok(())
    }

    /// Writes this member's instances in load order. Finite arrays write
    /// their full resolved count, filling never-materialized slots from the
    /// canonical instance; indefinite arrays write exactly what was
    /// materialized.
    pub fn save(&self, id: MemberId, writer: &mut ByteWriter) -> CodecResult<()> {
        let count = self.save_count(id);
        for index in 0..count {
            let instance = if index == 0 {
                id
            } else {
                match self.node(id).elements.get(&(index as u32)) {
                    Some(&element) => element,
                    None => id,
                }
            };
            self.save_instance(instance, writer)?;
        }
        Ok(())
    }

    fn save_count(&self, id: MemberId) -> usize {
        let node = self.node(id);
        if node.array_index > 0 {
            return 1;
        }
        let resolved = match node.array_size {
            ArraySize::Literal(count) => i64::from(count),
            ArraySize::Ref(source) => self.node(source).value.as_i64().unwrap_or(-1),
        };
        if (1..=MAX_ARRAY_SIZE as i64).contains(&resolved) {
            resolved as usize
        } else {
            1 + node
                .elements
                .keys()
                .next_back()
                .map_or(0, |&index| index as usize)
        }
    }

    fn save_instance(&self, id: MemberId, writer: &mut ByteWriter) -> CodecResult<()> {
        if self.is_struct(id) {
            for &child in &self.node(id).children {
                self.save(child, writer)?;
            }
        } else {
            let node = self.node(id);
            node.kind.write(writer, &node.value)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Name formatting
// -----------------------------------------------------------------------------

/// Bijective base-26 letter sequence: 0 is "a", 25 is "z", 26 is "aa".
pub(crate) fn letter_index(mut index: u32) -> String {
    let mut out = String::new();
    loop {
        out.insert(0, char::from(b'a' + (index % 26) as u8));
        index /= 26;
        if index == 0 {
            break;
        }
        index -= 1;
    }
    out
}

fn format_name(template: &str, array_index: u32) -> String {
    if !template.contains('{') {
        return template.to_owned();
    }
    let letters = letter_index(array_index);
    template
        .replace("{a}", &letters)
        .replace("{A}", &letters.to_uppercase())
        .replace("{i}", &array_index.to_string())
}

#[cfg(test)]
#[path = "tests/member_tests.rs"]
mod tests;
