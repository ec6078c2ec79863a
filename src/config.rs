//! Codec configuration: the group-hash table and resource limits.
//!
//! The group table decides which entity kinds may own children. The default
//! set is a fixed literal with no generating rule; deployments that need a
//! different set pin their own through a config file.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CodecResult;
use crate::resource::ResourceLimits;

/// Name hashes of the entity kinds permitted to own child entities.
pub const DEFAULT_GROUP_HASHES: [u16; 7] = [
    0x0015, 0x00a4, 0x0801, 0x0d9a, 0x11d5, 0x2a1c, 0x6c2b,
];

/// Opaque set of group hashes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupTable {
    hashes: BTreeSet<u16>,
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP_HASHES)
    }
}

impl GroupTable {
    pub fn new(hashes: impl IntoIterator<Item = u16>) -> Self {
        Self {
            hashes: hashes.into_iter().collect(),
        }
    }

    pub fn contains(&self, hash: u16) -> bool {
        self.hashes.contains(&hash)
    }

    pub fn insert(&mut self, hash: u16) -> bool {
        self.hashes.insert(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

/// Everything the codec needs besides the schema registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodecConfig {
    #[serde(default)]
    pub groups: GroupTable,
    #[serde(default)]
    pub limits: ResourceLimits,
}

impl CodecConfig {
    /// Loads a config from a toml file.
    pub fn load(path: &Path) -> CodecResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Saves the config as pretty toml.
    pub fn save(&self, path: &Path) -> CodecResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = CodecConfig::default();
        config.groups.insert(0x1234);
        config.limits.max_depth = 4;

        let text = toml::to_string_pretty(&config).expect("config must serialize");
        let loaded: CodecConfig = toml::from_str(&text).expect("config must parse");
        assert_eq!(loaded, config);
        assert!(loaded.groups.contains(0x1234));
        assert_eq!(loaded.limits.max_depth, 4);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let loaded: CodecConfig = toml::from_str("").expect("empty config must parse");
        assert_eq!(loaded, CodecConfig::default());
        assert!(loaded.groups.contains(DEFAULT_GROUP_HASHES[0]));
    }
}
