//! Resource budgets for decoding untrusted archives.

use serde::{Deserialize, Serialize};

/// Hard bounds applied while reading entity records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Deepest allowed group nesting.
    pub max_depth: usize,
    /// Most children one group entity may declare.
    pub max_children: usize,
    /// Largest accepted record, header included.
    pub max_record_bytes: usize,
    /// Longest accepted encoded name or description.
    pub max_text_bytes: usize,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_children: 4_096,
            max_record_bytes: 16 * 1024 * 1024,
            max_text_bytes: 4_096,
        }
    }
}
