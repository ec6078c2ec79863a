//! Contractual snapshots of loaded entities for property inspectors.
//!
//! Views carry qualified names, values, and flag states without exposing
//! tree internals; edits go back through `MemberTree::set_value`,
//! `set_enum_flag`, and `set_array_size`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entity::Entity;
use crate::error::CodecResult;
use crate::member::{MemberId, MemberTree};
use crate::value::{Value, ValueKind};

#[derive(Clone, Debug, Serialize)]
pub struct EntityView {
    pub name: String,
    pub description: String,
    pub members: Vec<MemberView>,
    pub children: Vec<EntityView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MemberView {
    /// Qualified path of this instance, element suffixes included.
    pub path: String,
    pub kind: ValueKind,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub flags: BTreeMap<String, bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberView>,
}

impl EntityView {
    /// Snapshot of an entity and all its materialized member instances.
    pub fn of(entity: &Entity) -> Self {
        let tree = &entity.members;
        let mut members = Vec::new();
        for &root in tree.roots() {
            for instance in tree.instances(root) {
                members.push(MemberView::of(tree, instance));
            }
        }
        Self {
            name: entity.name.clone(),
            description: entity.description.clone(),
            members,
            children: entity.children.iter().map(Self::of).collect(),
        }
    }
}

impl MemberView {
    fn of(tree: &MemberTree, id: MemberId) -> Self {
        let kind = tree.kind(id);
        let value = match kind {
            ValueKind::Struct | ValueKind::Comment | ValueKind::Unknown => None,
            _ => Some(tree.value(id).clone()),
        };
        let flags = if kind == ValueKind::Enum {
            tree.enum_flags(id)
        } else {
            BTreeMap::new()
        };
        let members = tree
            .children_with_arrays(id)
            .into_iter()
            .map(|child| Self::of(tree, child))
            .collect();
        Self {
            path: display_path(tree, id),
            kind,
            read_only: tree.is_read_only(id),
            value,
            flags,
            members,
        }
    }
}

/// Qualified name with an explicit `[n]` suffix on array element instances.
fn display_path(tree: &MemberTree, id: MemberId) -> String {
    let path = tree.qualified_name(id).to_string();
    let index = tree.array_index(id);
    if index > 0 {
        format!("{path}[{index}]")
    } else {
        path
    }
}

impl Entity {
    /// Renders the inspector view of this entity as pretty JSON.
    pub fn to_json(&self) -> CodecResult<String> {
        Ok(serde_json::to_string_pretty(&EntityView::of(self))?)
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
