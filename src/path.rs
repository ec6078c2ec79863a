//! Qualified member paths: the chain of formatted names from a tree root to
//! one member instance.

use serde::Serialize;

/// Scope separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// Ordered list of formatted member names, outermost first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct QualifiedPath {
    segments: Vec<String>,
}

impl QualifiedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn push(&mut self, segment: impl Into<String>) {
        self.segments.push(segment.into());
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Prefix containment: whether `prefix` names this member or one of its
    /// ancestors.
    pub fn starts_with(&self, prefix: &QualifiedPath) -> bool {
        prefix.segments.len() <= self.segments.len()
            && self.segments[..prefix.segments.len()] == prefix.segments[..]
    }
}

impl std::fmt::Display for QualifiedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(&PATH_SEPARATOR.to_string())?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for QualifiedPath {
    type Err = std::convert::Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Ok(Self::new());
        }
        Ok(Self {
            segments: input.split(PATH_SEPARATOR).map(str::to_owned).collect(),
        })
    }
}

/// Splits an optional `[n]` element suffix off a path segment.
///
/// `"Items[2]"` resolves to `("Items", Some(2))`; a malformed suffix is left
/// as part of the name.
pub(crate) fn split_element_suffix(segment: &str) -> (&str, Option<u32>) {
    if let Some(open) = segment.rfind('[') {
        if let Some(stripped) = segment.strip_suffix(']') {
            if let Ok(index) = stripped[open + 1..].parse::<u32>() {
                return (&segment[..open], Some(index));
            }
        }
    }
    (segment, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_on_the_separator() {
        let path: QualifiedPath = "Items/X".parse().expect("paths always parse");
        assert_eq!(path.segments(), ["Items", "X"]);
        assert_eq!(path.to_string(), "Items/X");
    }

    #[test]
    fn prefix_containment() {
        let full: QualifiedPath = "Root/Items/X".parse().unwrap();
        let prefix: QualifiedPath = "Root/Items".parse().unwrap();
        let other: QualifiedPath = "Root/Other".parse().unwrap();
        assert!(full.starts_with(&prefix));
        assert!(full.starts_with(&full.clone()));
        assert!(!full.starts_with(&other));
        assert!(!prefix.starts_with(&full));
    }

    #[test]
    fn element_suffix_parsing() {
        assert_eq!(split_element_suffix("Items[2]"), ("Items", Some(2)));
        assert_eq!(split_element_suffix("Items"), ("Items", None));
        assert_eq!(split_element_suffix("Items[x]"), ("Items[x]", None));
    }
}
